use std::fs::File;

use clap::{Parser, Subcommand};
use tracing::{debug, info, level_filters::LevelFilter};

mod demo;
mod script;

use demo::{execute_demo, DemoArgs};
use script::{execute_script, ScriptArgs};

/// Push, pop and peek on a linked-list stack.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Write logs to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<String>,
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Walk through push, peek and pop on a stack of integers.
    Demo(DemoArgs),
    /// Run stack commands given as arguments or piped on stdin.
    Script(ScriptArgs),
}

fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = level_for(cli.verbose);
    match &cli.log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_ansi(false)
                .with_writer(file)
                .init();
        }
        None => tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .init(),
    }

    debug!("Parsed arguments: {:?}", cli);

    match cli.command {
        Commands::Demo(args) => execute_demo(args).await,
        Commands::Script(args) => {
            info!("Running script");
            execute_script(args).await
        }
    }
}
