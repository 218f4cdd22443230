use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ts_funnel::cli::commands::{config, down, resolve, scan, status, up};
use ts_funnel::types::ExposureMode;

#[derive(Parser)]
#[command(name = "ts-funnel")]
#[command(
    version,
    about = "Find local web apps, fix their port clashes and expose them through Tailscale"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List detected web apps and port conflicts
    Scan {
        #[arg(help = "Directory to scan (default: auto-detect)")]
        path: Option<PathBuf>,
        #[arg(short = 'd', long, help = "Directory levels to descend")]
        depth: Option<usize>,
    },

    /// Reassign clashing ports and rewrite project config
    Resolve {
        #[arg(help = "Directory to scan (default: auto-detect)")]
        path: Option<PathBuf>,
        #[arg(short = 'd', long, help = "Directory levels to descend")]
        depth: Option<usize>,
        #[arg(short = 'n', long = "dry-run", help = "Show what would change")]
        dry_run: bool,
        #[arg(short = 'y', long, help = "Apply without asking")]
        yes: bool,
    },

    /// Set up Tailscale funnels/serves for detected web apps
    Up {
        #[arg(help = "Directory to scan (default: auto-detect)")]
        path: Option<PathBuf>,
        #[arg(short = 'd', long, help = "Directory levels to descend")]
        depth: Option<usize>,
        #[arg(short = 'p', long, help = "Only expose apps on this port")]
        port: Option<u16>,
        #[arg(short = 'm', long, help = "funnel (public) or serve (tailnet only)")]
        mode: Option<ExposureMode>,
        #[arg(long, help = "Leave CORS configs untouched")]
        no_cors: bool,
        #[arg(long, help = "Expose current ports without fixing conflicts")]
        no_resolve: bool,
        #[arg(long, help = "Tailnet domain (default: ask Tailscale)")]
        domain: Option<String>,
        #[arg(short = 'n', long = "dry-run", help = "Show what would be done")]
        dry_run: bool,
        #[arg(short = 'y', long, help = "Apply port changes without asking")]
        yes: bool,
    },

    /// Remove Tailscale funnels
    Down {
        #[arg(short = 'a', long = "all", help = "Remove all funnels")]
        all: bool,
    },

    /// Show current Tailscale funnel status
    Status,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Write a default configuration file
    Init {
        #[arg(long, short, help = "Write ./.ts-funnel.toml instead of the global file")]
        project: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mts-funnel encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Scan { path, depth } => {
            scan::run(path, depth)?;
        }
        Commands::Resolve {
            path,
            depth,
            dry_run,
            yes,
        } => {
            resolve::run(resolve::ResolveOptions {
                path,
                depth,
                dry_run,
                yes,
            })?;
        }
        Commands::Up {
            path,
            depth,
            port,
            mode,
            no_cors,
            no_resolve,
            domain,
            dry_run,
            yes,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(up::run(up::UpOptions {
                path,
                depth,
                port,
                mode,
                no_cors,
                no_resolve,
                domain,
                dry_run,
                yes,
            }))?;
        }
        Commands::Down { all } => {
            let rt = Runtime::new()?;
            rt.block_on(down::run(all))?;
        }
        Commands::Status => {
            let rt = Runtime::new()?;
            rt.block_on(status::run())?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => config::show(&format)?,
            ConfigAction::Path => config::path()?,
            ConfigAction::Init { project, force } => config::init(project, force)?,
        },
    }

    Ok(())
}
