//! CLI entry point.
//!
//! Settings and paths are resolved once, wired through bootstrap, and the
//! composed context is handed to the command handlers.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use salvo_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

const DEFAULT_FILTER: &str = "warn,salvo_core=info,salvo_voice=info,salvo_cli=info";

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging on stderr so command output stays pipeable
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(mut cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command.take() else {
        // No command provided - show help
        Cli::command().print_help()?;
        return Ok(());
    };

    // Bootstrap the CLI context (composition root)
    let config = CliConfig::load(cli.settings.as_deref(), &cli.settings_update())?;
    let ctx = bootstrap(config);

    match command {
        Commands::Paths => handlers::paths::execute(&ctx)?,
        Commands::Warm => handlers::warm::execute(&ctx).await?,
        Commands::Preview(args) => handlers::preview::execute(&ctx, &args)?,
        Commands::Render(args) => handlers::render::execute(&ctx, &args).await?,
        Commands::Launch(args) => handlers::launch::execute(&ctx, &args).await?,
        Commands::PurgeCache => handlers::purge_cache::execute(&ctx).await?,
        Commands::Roster { file, command } => handlers::roster::execute(&file, command)?,
    }
    Ok(())
}
