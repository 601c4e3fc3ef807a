use std::env;
use std::io;
use std::process::ExitCode;

use hbencode::cli::{self, Cli};
use hbencode::prefs::Preferences;
use hbencode::resolve::{StdinPrompt, resolve};
use hbencode::{EncodeProfile, Error, HandBrake};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hbencode=info".into()),
        )
        .init();

    let cli = cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_usage() => {
            eprintln!("hbencode: {e}");
            eprintln!("Run 'hbencode --help' for usage.");
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("hbencode: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let profile = EncodeProfile::default();
    let base = cli.settings(&profile)?;

    let prefs_path = cli.preferences_path()?;
    let mut prefs = Preferences::load(&prefs_path)?;
    let path_env = env::var_os("PATH");
    let resolved = resolve(&mut prefs, &mut StdinPrompt, path_env.as_deref())?;
    prefs.save(&prefs_path)?;

    let handbrake = HandBrake::new_with_path(&resolved.handbrake_cli)?;
    match handbrake.version().await {
        Ok(version) => info!(%version, "found HandBrakeCLI"),
        Err(e) => warn!("{e}"),
    }

    handbrake
        .encode_all(&cli.files, &base, &resolved.output_directory, &profile)
        .await
}
