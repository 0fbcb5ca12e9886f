//! Pricing and cancellation settings.

use atelier::{
    cancellation::{CUSTOMER_NOTICE_HOURS, CancellationPolicy, PARTNER_MIN_DAYS},
    pricing::percent_points,
};
use clap::Args;
use decimal_percentage::Percentage;
use jiff::{SignedDuration, tz::TimeZone};
use rust_decimal::Decimal;
use thiserror::Error;

/// Configuration values that parse but cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// GST outside 0-100%.
    #[error("GST percent must be between 0 and 100, got {0}")]
    GstOutOfRange(Decimal),

    /// Negative cancellation window.
    #[error("{0} must not be negative")]
    NegativeWindow(&'static str),

    /// Time zone not found in the tz database.
    #[error("unknown time zone {name}: {source}")]
    UnknownTimeZone {
        /// Configured name
        name: String,

        /// Lookup failure
        source: jiff::Error,
    },
}

/// Invoice pricing settings.
#[derive(Debug, Args)]
pub struct PricingConfig {
    /// GST applied to quotes that do not set their own rate, in percent
    #[arg(long, env = "GST_PERCENT", default_value = "18", global = true)]
    pub gst_percent: Decimal,
}

impl PricingConfig {
    /// Configured GST as a fraction.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::GstOutOfRange`] unless the percent is within 0-100.
    pub fn gst_rate(&self) -> Result<Percentage, ConfigError> {
        if self.gst_percent < Decimal::ZERO || self.gst_percent > Decimal::ONE_HUNDRED {
            return Err(ConfigError::GstOutOfRange(self.gst_percent));
        }

        Ok(percent_points(self.gst_percent))
    }
}

/// Cancellation window settings.
#[derive(Debug, Args)]
pub struct PolicyConfig {
    /// Hours of notice a customer must give, exclusive
    #[arg(
        long,
        env = "CUSTOMER_CANCEL_NOTICE_HOURS",
        default_value_t = CUSTOMER_NOTICE_HOURS,
        global = true
    )]
    pub customer_cancel_notice_hours: i64,

    /// Minimum calendar days ahead a partner may request cancellation
    #[arg(
        long,
        env = "PARTNER_CANCEL_MIN_DAYS",
        default_value_t = PARTNER_MIN_DAYS,
        global = true
    )]
    pub partner_cancel_min_days: i64,

    /// IANA time zone booking dates are expressed in
    #[arg(long, env = "BOOKING_TIME_ZONE", default_value = "UTC", global = true)]
    pub booking_time_zone: String,
}

impl PolicyConfig {
    /// Cancellation policy for the configured windows and zone.
    ///
    /// # Errors
    ///
    /// Returns an error if a window is negative or the zone is unknown.
    pub fn policy(&self) -> Result<CancellationPolicy, ConfigError> {
        if self.customer_cancel_notice_hours < 0 {
            return Err(ConfigError::NegativeWindow("CUSTOMER_CANCEL_NOTICE_HOURS"));
        }

        if self.partner_cancel_min_days < 0 {
            return Err(ConfigError::NegativeWindow("PARTNER_CANCEL_MIN_DAYS"));
        }

        let time_zone = TimeZone::get(&self.booking_time_zone).map_err(|source| {
            ConfigError::UnknownTimeZone {
                name: self.booking_time_zone.clone(),
                source,
            }
        })?;

        Ok(CancellationPolicy {
            customer_notice: SignedDuration::from_hours(self.customer_cancel_notice_hours),
            partner_min_days: self.partner_cancel_min_days,
            time_zone,
        })
    }
}
