//! TrackMyBugs command-line client.

use clap::Parser;
use tracing::error;

use trackmybugs::app::App;
use trackmybugs::commands::{self, render, Cli, Command};
use trackmybugs::config::{Config, Profile};
use trackmybugs::error::AppError;
use trackmybugs::logging::{self, LogOptions};

/// Exit status for errors that need the user to change something first.
const EXIT_CRITICAL: i32 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load()
        .and_then(|config| {
            let profile = config.resolve_profile(cli.profile.as_deref())?;
            Ok((config, profile))
        })
        .map_err(AppError::from);

    let log_options = match &loaded {
        Ok((config, profile)) => LogOptions::from_config(config, &profile.name),
        Err(_) => LogOptions::default(),
    };
    if let Err(e) = logging::init(&log_options) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let result = match loaded {
        Ok((config, profile)) => run(config, profile, cli.command).await,
        Err(e) => Err(e),
    };
    logging::shutdown();

    if let Err(e) = result {
        error!(
            critical = e.is_critical(),
            recoverable = e.is_recoverable(),
            "Command failed: {}",
            e
        );
        eprintln!("Error: {}", e.user_message());
        if let Some(action) = e.suggested_action() {
            eprintln!("{}", action);
        } else if e.is_recoverable() {
            eprintln!("This may be temporary. Try the command again.");
        }
        std::process::exit(if e.is_critical() { EXIT_CRITICAL } else { 1 });
    }
    Ok(())
}

async fn run(config: Config, profile: Profile, command: Command) -> Result<(), AppError> {
    let mut app = App::new(config, profile)?;

    let output = commands::execute(&mut app, command).await;
    let login_required = app.login_required();

    match output {
        Ok(text) => {
            println!("{}", text);
            Ok(())
        }
        Err(e) => {
            if login_required {
                eprintln!("{}", render::LOGIN_HINT);
            }
            Err(e)
        }
    }
}
