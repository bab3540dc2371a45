mod args;
mod ble;

use std::process::ExitCode;

use anyhow::{Context as _, Result};
use args::Args;
use clap::Parser as _;
use lywsd02_clock::{
    lywsd02::{Clock, SystemClock, TimeResolver, ZeroTimestamp, ZonedClock},
    request::{SetTimePlan, SetTimeRequest},
};
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    if let Err(e) = run().await {
        eprintln!("{e:#}");
        return ExitCode::from(1);
    }

    ExitCode::from(0)
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let request = args.request().context("failed to build request")?;

    let plan = match args.timezone {
        Some(tz) => plan(&request, ZonedClock(tz), args.zero_timestamp.into()),
        None => plan(&request, SystemClock, args.zero_timestamp.into()),
    }
    .context("failed to prepare device writes")?;

    if args.dry_run {
        for write in &plan.writes {
            println!("{}: {}", write.target, hex(&write.bytes));
        }
        return Ok(());
    }

    ble::set_time(&plan)
        .await
        .with_context(|| format!("failed to update time on {}", plan.device))?;

    info!(
        device = %plan.device,
        epoch_seconds = plan.resolved.epoch_seconds,
        offset_hours = plan.resolved.offset_hours,
        "refreshed device time"
    );

    Ok(())
}

fn plan<C: Clock>(
    request: &SetTimeRequest,
    clock: C,
    zero_timestamp: ZeroTimestamp,
) -> lywsd02_clock::Result<SetTimePlan> {
    request.plan(&TimeResolver::new(clock).with_zero_timestamp(zero_timestamp))
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
