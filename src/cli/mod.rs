pub mod output;
pub mod report;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use report::{
    process_score_command, process_timeline_command, process_usage_command, ScoreCommand,
    TimelineCommand, UsageCommand,
};
use tracing::level_filters::LevelFilter;

use crate::{
    config::DashboardConfig,
    dashboard::start_dashboard,
    metrics::{read_metrics, SysinfoMetrics},
    utils::{
        dir::create_application_default_path,
        logging::{enable_logging, CLI_PREFIX, WATCH_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "SageMode", version, long_about = None)]
#[command(about = "Dashboard of your activity throughout the day", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Print logs to stderr")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default $XDG_STATE_HOME/sagemode or $HOME/.local/state/sagemode"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Show how the day's intervals are laid out on the timeline")]
    Timeline {
        #[command(flatten)]
        command: TimelineCommand,
    },
    #[command(about = "Show time spent per app or per category")]
    Usage {
        #[command(flatten)]
        command: UsageCommand,
    },
    #[command(about = "Show xp and level earned during the day")]
    Score {
        #[command(flatten)]
        command: ScoreCommand,
    },
    #[command(about = "Continuously refresh today's dashboard until Ctrl-C")]
    Watch {
        #[arg(long, help = "Seconds between refreshes. Overrides the config file")]
        interval: Option<u64>,
        #[arg(long, help = "Print a json document per refresh")]
        json: bool,
    },
    #[command(about = "Print current cpu and memory utilization")]
    Metrics {
        #[arg(long, help = "Print json instead of text")]
        json: bool,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = args.dir.map_or_else(create_application_default_path, Ok)?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    let prefix = match args.commands {
        Commands::Watch { .. } => WATCH_PREFIX,
        _ => CLI_PREFIX,
    };
    enable_logging(prefix, &dir.join("logs"), logging_level, args.log)?;

    let mut config = DashboardConfig::load(&dir)?;

    match args.commands {
        Commands::Timeline { command } => process_timeline_command(command, &dir, &config).await,
        Commands::Usage { command } => process_usage_command(command, &dir, &config).await,
        Commands::Score { command } => process_score_command(command, &dir, &config).await,
        Commands::Watch { interval, json } => {
            if let Some(interval) = interval {
                config.refresh_interval_secs = interval;
            }
            start_dashboard(dir, config, json).await
        }
        Commands::Metrics { json } => {
            let reading = read_metrics(&mut SysinfoMetrics::new())?;
            if json {
                println!("{}", serde_json::to_string(&reading)?);
            } else {
                println!("cpu {}\tmemory {}", reading.cpu, reading.memory);
            }
            Ok(())
        }
    }
}
