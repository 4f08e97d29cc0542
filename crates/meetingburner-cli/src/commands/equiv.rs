use clap::Args;
use meetingburner_core::{format_currency, Currency, Progress};

#[derive(Args)]
pub struct EquivArgs {
    /// Amount of money burned so far
    pub cost: f64,
    /// Currency used for display (usd or eur)
    #[arg(short, long, default_value = "usd")]
    pub currency: Currency,
}

pub fn run(args: EquivArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.cost.is_finite() || args.cost < 0.0 {
        return Err(format!("cost must be a non-negative number, got {}", args.cost).into());
    }
    let progress = Progress::at(args.cost);
    let out = serde_json::json!({
        "cost": args.cost,
        "formatted": format_currency(args.cost, args.currency),
        "current": progress.current,
        "next": progress.next,
        "next_formatted": progress.next.map(|e| format_currency(e.threshold, args.currency)),
        "progress_pct": progress.percent,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
