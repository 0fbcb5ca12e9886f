use atelier::{
    fixtures::{QuoteFixture, QuoteTarget},
    invoice::{InvoiceBreakdown, InvoiceLineKind},
};
use atelier_app::config::AppConfig;
use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Args)]
pub(crate) struct QuoteArgs {
    /// Fixture set name, loaded from `quotes/<name>.yml`
    #[arg(long)]
    fixture: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct QuoteSummary {
    fixture: String,
    booked: String,
    mode: String,
    hours: String,
    lines: Vec<LineSummary>,
    subtotal: String,
    gst: String,
    grand_total: String,
    advance: String,
    on_site: String,
}

#[derive(Debug, Serialize)]
struct LineSummary {
    description: String,
    amount: String,
}

pub(crate) fn run(args: QuoteArgs, config: &AppConfig) -> Result<(), String> {
    let gst_rate = config
        .pricing
        .gst_rate()
        .map_err(|error| error.to_string())?;

    let fixture = QuoteFixture::load(&config.fixtures_dir, &args.fixture)
        .map_err(|error| format!("failed to load fixture {}: {error}", args.fixture))?;

    let invoice = fixture
        .invoice_with(gst_rate)
        .map_err(|error| format!("failed to price fixture {}: {error}", args.fixture))?;

    if let Some(expected) = fixture.expected() {
        if expected.grand_total == invoice.grand_total() {
            info!(fixture = %args.fixture, "grand total matches the fixture");
        } else {
            warn!(
                fixture = %args.fixture,
                expected = %expected.grand_total,
                actual = %invoice.grand_total(),
                "grand total differs from the fixture"
            );
        }
    }

    let summary = summarise(&fixture, &invoice);

    match args.format {
        OutputFormat::Text => print_text(&summary),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)
                .map_err(|error| format!("failed to serialise quote: {error}"))?;

            println!("{json}");
        }
    }

    Ok(())
}

fn summarise(fixture: &QuoteFixture, invoice: &InvoiceBreakdown<'_>) -> QuoteSummary {
    let booked = match fixture.target() {
        QuoteTarget::Entity(entity) => format!("{} ({})", entity.name(), entity.kind()),
        QuoteTarget::Package(package) => format!("{} (package)", package.name),
    };

    QuoteSummary {
        fixture: fixture.name().to_string(),
        booked,
        mode: invoice.mode().to_string(),
        hours: invoice.total_hours().normalize().to_string(),
        lines: invoice
            .lines()
            .iter()
            .map(|line| LineSummary {
                description: describe(&line.kind),
                amount: line.amount.to_string(),
            })
            .collect(),
        subtotal: invoice.subtotal().to_string(),
        gst: invoice.gst_amount().to_string(),
        grand_total: invoice.grand_total().to_string(),
        advance: invoice.advance_amount().to_string(),
        on_site: invoice.on_site_amount().to_string(),
    }
}

fn describe(kind: &InvoiceLineKind<'_>) -> String {
    match kind {
        InvoiceLineKind::Hours { hours, rate } => format!("{} h at {rate}/h", hours.normalize()),
        InvoiceLineKind::Item {
            category,
            name,
            quantity,
            unit_price,
            ..
        } => format!("{category}: {name} ({quantity} x {unit_price})"),
        InvoiceLineKind::Package { hours, .. } => {
            format!("admin package ({} h)", hours.normalize())
        }
    }
}

fn print_text(summary: &QuoteSummary) {
    println!("fixture: {}", summary.fixture);
    println!("booked: {}", summary.booked);
    println!("mode: {}", summary.mode);
    println!("hours: {}", summary.hours);
    println!();

    for line in &summary.lines {
        println!("  {:<48} {:>14}", line.description, line.amount);
    }

    println!();
    println!("subtotal: {}", summary.subtotal);
    println!("gst: {}", summary.gst);
    println!("grand_total: {}", summary.grand_total);
    println!("advance: {}", summary.advance);
    println!("on_site: {}", summary.on_site);
}
