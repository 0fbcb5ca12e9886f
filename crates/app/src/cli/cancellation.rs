use atelier::{cancellation::CancellationVerdict, fixtures::QuoteFixture};
use atelier_app::config::AppConfig;
use clap::Args;
use jiff::Timestamp;

#[derive(Debug, Args)]
pub(crate) struct CancellationArgs {
    /// Fixture set name, loaded from `quotes/<name>.yml`
    #[arg(long)]
    fixture: String,

    /// Instant to evaluate at (RFC 3339); defaults to now
    #[arg(long)]
    now: Option<Timestamp>,
}

pub(crate) fn run(args: CancellationArgs, config: &AppConfig) -> Result<(), String> {
    let policy = config
        .policy
        .policy()
        .map_err(|error| error.to_string())?;

    let gst_rate = config
        .pricing
        .gst_rate()
        .map_err(|error| error.to_string())?;

    let fixture = QuoteFixture::load(&config.fixtures_dir, &args.fixture)
        .map_err(|error| format!("failed to load fixture {}: {error}", args.fixture))?;

    let booking = fixture
        .booking_with(gst_rate)
        .map_err(|error| format!("failed to build booking for {}: {error}", args.fixture))?
        .ok_or_else(|| format!("fixture {} has no booking section", args.fixture))?;

    let now = policy.local_now(args.now.unwrap_or_else(Timestamp::now));

    println!("booking: {}", booking.custom_booking_id);
    println!("status: {}", booking.status);
    println!("partner_cancel_status: {}", booking.partner_cancel_status);
    println!(
        "earliest_date: {}",
        booking
            .earliest_date()
            .map_or_else(|| "none".to_string(), |slot| slot.starts_at().to_string())
    );
    println!("evaluated_at: {now}");
    println!(
        "customer: {}",
        verdict(&policy.customer_can_cancel(&booking, now))
    );
    println!(
        "partner: {}",
        verdict(&policy.partner_can_cancel(&booking, now))
    );

    Ok(())
}

fn verdict(verdict: &CancellationVerdict) -> String {
    verdict
        .reason()
        .map_or_else(|| "allowed".to_string(), |reason| format!("denied ({reason})"))
}
