use std::io::Write;
use std::time::Duration;

use clap::Args;
use meetingburner_core::{
    format_currency, format_currency_short, format_rate, Event, MeetingEngine, MeetingSnapshot,
    MeetingState, MeetingTimer, Settings,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use super::meeting::MeetingArgs;

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub meeting: MeetingArgs,
    /// Print the final receipt as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load_or_default();
    let config = args.meeting.resolve(&settings)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(live(config, &settings, args.json))
}

async fn live(
    config: meetingburner_core::MeetingConfig,
    settings: &Settings,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = MeetingEngine::new().with_sample_interval(settings.timer.sample_interval_secs);
    let mut timer = MeetingTimer::new(engine).with_tick_interval(settings.tick_interval()?);
    let mut events = timer.subscribe();
    let short = settings.display.short_currency;

    timer.start(config)?;
    eprintln!(
        "Burning at {} with {} attendees. Commands: [p]ause [r]esume [s]top [q]uit",
        format_rate(config.cost_per_minute(), config.currency, "min"),
        config.attendees
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut redraw = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            _ = redraw.tick() => print_status(&timer.snapshot(), short),
            event = events.recv() => match event {
                Ok(Event::EquivalenceReached { equivalence, .. }) => {
                    eprintln!("\nYou have just burned: {} {}", equivalence.emoji, equivalence.item);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event stream lagged"),
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // stdin closed: treat as stop
                    finish(&mut timer, json)?;
                    break;
                };
                match line.trim() {
                    "p" | "pause" => report(timer.pause()),
                    "r" | "resume" => report(timer.resume()),
                    "s" | "stop" => {
                        finish(&mut timer, json)?;
                        break;
                    }
                    "q" | "quit" => {
                        timer.reset();
                        eprintln!();
                        break;
                    }
                    "" => {}
                    other => eprintln!("\nunknown command: {other}"),
                }
            }
        }
    }
    Ok(())
}

fn report(result: meetingburner_core::error::Result<Event>) {
    if let Err(e) = result {
        eprintln!("\n{e}");
    }
}

fn finish(timer: &mut MeetingTimer, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if timer.snapshot().state != MeetingState::Stopped {
        timer.stop()?;
    }
    let receipt = timer.receipt().ok_or("meeting was not started")?;
    eprintln!();
    if json {
        println!("{}", serde_json::to_string_pretty(&receipt)?);
    } else {
        println!("{receipt}");
    }
    Ok(())
}

fn print_status(snap: &MeetingSnapshot, short: bool) {
    let Some(config) = snap.config else {
        return;
    };
    let cost = if short {
        format_currency_short(snap.total_cost, config.currency)
    } else {
        format_currency(snap.total_cost, config.currency)
    };
    let milestone = snap
        .equivalence
        .current
        .map(|e| format!("{} {}", e.emoji, e.item))
        .unwrap_or_default();
    let paused = if snap.is_paused { " [paused]" } else { "" };

    eprint!(
        "\r\x1b[2K{}  {}{}  {}  ({:.0}% to next)",
        snap.elapsed_label, cost, paused, milestone, snap.equivalence.percent
    );
    let _ = std::io::stderr().flush();
}
