mod builtins;
mod config_commands;
mod console;

use std::{
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    herald_commands::CommandNode,
    herald_config::HeraldConfig,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "herald", about = "Herald: hierarchical chat command dispatcher")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Command tree file (skips discovery in ./ and ~/.config/herald/).
    #[arg(long, global = true, env = "HERALD_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read messages from stdin and dispatch them (default).
    Console(console::ConsoleArgs),
    /// Command tree file management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so replies on stdout stay clean.
    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Explicit file if given, otherwise the discovered one (or defaults).
pub(crate) fn load_config(explicit: Option<&Path>) -> anyhow::Result<HeraldConfig> {
    match explicit {
        Some(path) => herald_config::load_config(path)
            .with_context(|| format!("loading {}", path.display())),
        None => herald_config::discover_and_load().context("loading discovered command config"),
    }
}

/// Built-in commands plus everything the config declares.
pub(crate) fn build_tree(config: &HeraldConfig) -> anyhow::Result<CommandNode> {
    let mut root = builtins::command_tree()?;
    let added = herald_config::apply_commands(&mut root, &config.commands)?;
    info!(configured = added, "command tree built");
    Ok(root)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "herald starting");

    match cli.command {
        None => run_console(cli.config.as_deref(), console::ConsoleArgs::default()).await,
        Some(Commands::Console(args)) => run_console(cli.config.as_deref(), args).await,
        Some(Commands::Config { action }) => {
            config_commands::handle_config(action, cli.config.as_deref())
        },
    }
}

async fn run_console(config: Option<&Path>, args: console::ConsoleArgs) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let prefix = args.prefix.clone().unwrap_or(config.prefix.clone());
    let tree = Arc::new(RwLock::new(build_tree(&config)?));
    console::run(tree, prefix, args).await
}
