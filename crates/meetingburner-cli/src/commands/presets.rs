use clap::Args;
use meetingburner_core::meeting::RATE_PRESETS;
use meetingburner_core::{format_rate, Currency};

#[derive(Args)]
pub struct PresetsArgs {
    /// Currency used for display (usd or eur)
    #[arg(short, long, default_value = "usd")]
    pub currency: Currency,
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: PresetsArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(&RATE_PRESETS)?);
        return Ok(());
    }
    for preset in &RATE_PRESETS {
        println!(
            "{:<8} {}",
            preset.label,
            format_rate(preset.hourly_rate, args.currency, "h")
        );
    }
    Ok(())
}
