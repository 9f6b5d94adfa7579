//! Process Entry Helper
//!
//! Everything a special remote executable needs in its `main`:
//!
//! ```ignore
//! fn main() -> std::process::ExitCode {
//!     annex_remote::cli::run(MyRemote::default())
//! }
//! ```
//!
//! Without arguments the process serves the protocol on stdin/stdout.
//! `setup` runs the backend's interactive setup instead.

use std::ffi::OsString;
use std::io;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::error::RemoteError;
use crate::remote::SpecialRemote;
use crate::session::Session;

/// Command line of a special remote executable
#[derive(Parser, Debug)]
#[command(about = "git-annex external special remote")]
#[command(version)]
pub struct RemoteArgs {
    #[command(subcommand)]
    pub command: Option<RemoteCommand>,

    /// Tracing filter for the log written to stderr
    #[arg(long, env = "ANNEX_REMOTE_LOG")]
    pub log: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum RemoteCommand {
    /// Interactive setup before `git annex initremote`
    Setup,
}

/// Parse the process arguments and run
pub fn run<B: SpecialRemote>(remote: B) -> ExitCode {
    run_with_args(remote, std::env::args_os())
}

/// Parse `args` and run
///
/// Returns `FAILURE` when the arguments do not parse, setup fails, or the
/// session ends on a structural error.
pub fn run_with_args<B, I, T>(remote: B, args: I) -> ExitCode
where
    B: SpecialRemote,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = match RemoteArgs::try_parse_from(args) {
        Ok(args) => args,
        Err(e) => {
            // Prints help/version too, which are not failures
            let _ = e.print();
            return if e.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
        }
    };

    let mut config = Config::default();
    if let Some(filter) = &args.log {
        config.log_filter = filter.clone();
    }
    init_tracing(&config);

    match args.command {
        Some(RemoteCommand::Setup) => setup(remote),
        None => serve(remote, config),
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    // stdout carries the protocol, so logs go to stderr only
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .try_init();
}

fn setup<B: SpecialRemote>(mut remote: B) -> ExitCode {
    match remote.setup() {
        Ok(()) => ExitCode::SUCCESS,
        Err(RemoteError::Unsupported) => {
            println!("Nothing to do. Just run 'git annex initremote' with your desired parameters.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Setup failed: {}", e);
            eprintln!("Setup failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn serve<B: SpecialRemote>(remote: B, config: Config) -> ExitCode {
    tracing::info!("annex-remote v{}", crate::VERSION);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Session::with_config(config, remote, stdin.lock(), stdout.lock());

    match session.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Session failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
