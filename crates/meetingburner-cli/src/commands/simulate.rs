use std::sync::Arc;

use clap::Args;
use meetingburner_core::{
    CostSample, Equivalence, Event, ManualClock, MeetingConfig, MeetingEngine, MeetingReceipt,
    Settings,
};
use serde::Serialize;

use super::meeting::MeetingArgs;

const SIM_TICK_MS: u64 = 100;

#[derive(Args)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub meeting: MeetingArgs,
    /// Active meeting length in seconds
    #[arg(short, long)]
    pub seconds: u64,
    /// Pause after this many active seconds
    #[arg(long)]
    pub pause_at: Option<u64>,
    /// Length of the pause in seconds
    #[arg(long, default_value = "0")]
    pub pause_for: u64,
    /// Include the full cost history in the output
    #[arg(long)]
    pub history: bool,
}

#[derive(Serialize)]
struct Milestone {
    elapsed_seconds: u64,
    total_cost: f64,
    equivalence: &'static Equivalence,
}

#[derive(Serialize)]
struct SimulationReport {
    receipt: MeetingReceipt,
    milestones: Vec<Milestone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    history: Option<Vec<CostSample>>,
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load_or_default();
    let config = args.meeting.resolve(&settings)?;
    let report = simulate(&args, config, settings.timer.sample_interval_secs)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn simulate(
    args: &SimulateArgs,
    config: MeetingConfig,
    sample_interval_secs: u64,
) -> Result<SimulationReport, Box<dyn std::error::Error>> {
    let clock = ManualClock::new();
    let mut engine = MeetingEngine::with_clock(Arc::new(clock.clone()))
        .with_sample_interval(sample_interval_secs);
    let mut milestones = Vec::new();

    engine.start(config)?;

    let total_ms = args.seconds.saturating_mul(1000);
    let pause_ms = args.pause_at.map(|s| s.saturating_mul(1000).min(total_ms));

    let mut active_ms = 0;
    while active_ms < total_ms {
        if pause_ms == Some(active_ms) && !engine.is_paused() {
            engine.pause()?;
            clock.advance_ms(args.pause_for.saturating_mul(1000));
            engine.resume()?;
        }
        let step = SIM_TICK_MS.min(total_ms - active_ms);
        clock.advance_ms(step);
        active_ms += step;
        collect(engine.tick(), &mut milestones);
    }
    engine.stop()?;

    let receipt = engine.receipt().ok_or("simulation did not produce a receipt")?;
    Ok(SimulationReport {
        receipt,
        milestones,
        history: args.history.then(|| engine.history().to_vec()),
    })
}

fn collect(events: Vec<Event>, milestones: &mut Vec<Milestone>) {
    for event in events {
        if let Event::EquivalenceReached {
            equivalence,
            total_cost,
            elapsed_seconds,
        } = event
        {
            milestones.push(Milestone {
                elapsed_seconds,
                total_cost,
                equivalence,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meetingburner_core::Currency;

    fn sim_args(seconds: u64) -> SimulateArgs {
        SimulateArgs {
            meeting: MeetingArgs {
                attendees: None,
                rate: None,
                preset: None,
                currency: None,
            },
            seconds,
            pause_at: None,
            pause_for: 0,
            history: true,
        }
    }

    #[test]
    fn one_minute_default_meeting() {
        let report = simulate(&sim_args(60), MeetingConfig::default(), 5).unwrap();
        assert_eq!(report.receipt.elapsed_seconds, 60);
        assert!((report.receipt.total_cost - 5.0).abs() < 1e-9);
        assert_eq!(report.milestones.len(), 1);
        assert_eq!(report.milestones[0].equivalence.item, "A Fancy Coffee");
        assert_eq!(report.history.unwrap().len(), 13);
    }

    #[test]
    fn pause_does_not_add_cost() {
        let mut args = sim_args(30);
        args.pause_at = Some(10);
        args.pause_for = 3600;
        let config = MeetingConfig::new(2, 90.0, Currency::Eur);
        let report = simulate(&args, config, 5).unwrap();
        assert_eq!(report.receipt.elapsed_seconds, 30);
        assert!((report.receipt.total_cost - 1.5).abs() < 1e-9);
        let start = report.receipt.start_time.unwrap();
        let end = report.receipt.end_time.unwrap();
        assert_eq!((end - start).num_seconds(), 3630);
    }
}
