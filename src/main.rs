use std::path::PathBuf;
use std::process::ExitCode;

use blockaudit::commands::{self, OutputFormat};
use blockaudit::{diagnostics, info, watch};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "BLOCKAUDIT_LOG";

#[derive(Parser)]
#[command(name = "blockaudit", version, about = "Find orphan block anchors and broken block links in a markdown vault")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Vault directory to scan
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the vault and report orphan anchors and broken links
    Check {
        /// Characters of context around each defect (overrides config)
        #[arg(long)]
        context: Option<usize>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the syntax reference, configuration and current state
    Info {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check once, then re-check whenever a document changes
    Watch {
        /// Characters of context around each defect (overrides config)
        #[arg(long)]
        context: Option<usize>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Log to stderr so stdout stays parseable, filtered by `BLOCKAUDIT_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| return EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { context, format } => commands::check(&cli.root, format, context),
        Commands::Info { json } => {
            info::run(&cli.root, json);
            Ok(ExitCode::SUCCESS)
        },
        Commands::Watch { context, format } => watch::run(&cli.root, format, context),
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(3_u8)
        },
    };
}
