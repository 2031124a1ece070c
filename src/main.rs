use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use sharewatch::{
    await_first_refresh, init_logging, Diagnostics, Overrides, Presenter, RetryPolicy, Settings,
    SpeedUnit,
};
use sharewatch_adapter::SharePoller;
use sharewatch_sdk::{Coordinator, CycleOutcome, Output, Snapshot, UnitId};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "sharewatch", version)]
#[command(about = "Poll a shared vehicle-location feed")]
struct Args {
    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Share code issued by the tracking service
    #[arg(long, global = true)]
    shared_code: Option<String>,

    /// Full share URL, used verbatim as the request URL
    #[arg(long, global = true)]
    share_url: Option<String>,

    /// Seconds between refresh cycles (15-3600)
    #[arg(long, global = true)]
    poll_interval: Option<u64>,

    /// Unit for displayed speeds
    #[arg(long, global = true, value_enum)]
    speed_unit: Option<SpeedUnit>,

    /// Decimals kept in coordinates (0-6)
    #[arg(long, global = true)]
    coord_precision: Option<u32>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Refresh periodically and print one line per unit per cycle
    Watch {
        /// Exit if the first refresh fails instead of retrying
        #[arg(long)]
        fail_fast: bool,

        /// Also write every snapshot to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a single cycle and print the units as JSON
    Once,
    /// Run a single cycle and print redacted settings plus the last table
    Diagnostics,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            shared_code: self.shared_code.clone(),
            share_url: self.share_url.clone(),
            poll_interval: self.poll_interval,
            speed_unit: self.speed_unit,
            coord_precision: self.coord_precision,
            timeout_secs: self.timeout,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let settings = Settings::load(args.config.as_deref(), &args.overrides())?;

    match args.command {
        Command::Watch { fail_fast, output } => watch(&settings, fail_fast, output).await,
        Command::Once => once(&settings).await,
        Command::Diagnostics => diagnostics(&settings).await,
    }
}

fn build_coordinator(settings: &Settings, output: Option<PathBuf>) -> Result<Coordinator> {
    let target = settings.target()?;
    let poller = SharePoller::builder()
        .user_agent(concat!("sharewatch/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let mut builder = Coordinator::builder()
        .target(&target)
        .poller(poller)
        .timeout(settings.timeout())
        .interval(settings.poll_interval());

    if let Some(path) = output {
        builder = builder.output(Output::file(path));
    }

    Ok(builder.build()?)
}

/// Follow the share until interrupted.
async fn watch(settings: &Settings, fail_fast: bool, output: Option<PathBuf>) -> Result<()> {
    let coordinator = build_coordinator(settings, output)?;
    let policy = if fail_fast {
        RetryPolicy::fail_fast()
    } else {
        RetryPolicy::every(settings.poll_interval())
    };

    let first = tokio::select! {
        result = await_first_refresh(&coordinator, policy) => result?,
        _ = tokio::signal::ctrl_c() => {
            coordinator.shutdown();
            return Ok(());
        }
    };

    // Units listed by the first refresh are the ones followed from here on.
    let tracked: Vec<UnitId> = first.table.keys().copied().collect();
    if tracked.is_empty() {
        warn!("share currently lists no units");
    }

    let presenter = Presenter::from_settings(settings);
    print_units(&presenter, &first, &tracked);

    let mut updates = coordinator.subscribe();
    let handle = coordinator.start();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                print_units(&presenter, &snapshot, &tracked);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                break;
            }
        }
    }

    handle.teardown().await;
    Ok(())
}

fn print_units(presenter: &Presenter, snapshot: &Snapshot, tracked: &[UnitId]) {
    for unit_id in tracked {
        println!("{}", presenter.view(snapshot, *unit_id));
    }
}

/// One cycle; a failed cycle is a failed command.
async fn once(settings: &Settings) -> Result<()> {
    let coordinator = build_coordinator(settings, None)?;
    let presenter = Presenter::from_settings(settings);

    match coordinator.refresh().await {
        CycleOutcome::Updated(snapshot) => {
            let views = presenter.views(&snapshot);
            println!("{}", serde_json::to_string_pretty(&views)?);
            Ok(())
        }
        CycleOutcome::Failed { failure, .. } => bail!("Refresh failed: {}", failure),
        other => bail!("Refresh did not complete: {:?}", other),
    }
}

/// One cycle, then dump what a bug report needs.
async fn diagnostics(settings: &Settings) -> Result<()> {
    let coordinator = build_coordinator(settings, None)?;

    if let Some(failure) = coordinator.refresh().await.failure() {
        warn!("refresh failed: {}", failure);
    }

    let report = Diagnostics::collect(settings, coordinator.snapshot());
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
