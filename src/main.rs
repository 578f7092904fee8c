//! redsync CLI entry point.

use clap::Parser;
use redsync::cli::commands::{self, GlobalOptions};
use redsync::cli::{Cli, Commands};
use redsync::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    // Resolve effective JSON mode: --json OR non-TTY stdout
    let json = cli.json || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    let opts = GlobalOptions {
        state_dir: cli.state_dir.as_deref(),
        config: cli.config.as_deref(),
        json,
        quiet: cli.quiet,
    };

    match run(&cli, opts) {
        Ok(code) => code,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,reqwest=info,hyper=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, opts: GlobalOptions<'_>) -> Result<ExitCode, Error> {
    let done = |()| ExitCode::SUCCESS;

    match &cli.command {
        Commands::Import {
            file,
            connection,
            prune,
        } => commands::import::execute(file, connection, *prune, opts),
        Commands::Delete { file, connection } => commands::delete::execute(file, connection, opts),
        Commands::Status { file, target } => commands::status::execute(file, target, opts).map(done),
        Commands::Checkpoint { command } => commands::checkpoint::execute(command, opts).map(done),
        Commands::Completions { shell } => commands::completions::execute(shell).map(done),
        Commands::Version => commands::version::execute(opts).map(done),
    }
}
