//! Command handlers. Every handler returns an error for the process to
//! report; `main` turns it into exit code 1.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use tasknode_core::api::{ApiClient, AuthApi};
use tasknode_core::auth::{
    KeyringStore, LogoutOutcome, SecretStore, SessionManager, LOGIN_REQUIRED_MESSAGE,
};
use tasknode_core::deploy::{DeployPackager, SystemProbe};
use tasknode_core::submit::{submit as submit_package, SubmitStage};
use tasknode_core::Config;

use crate::cli::Command;
use crate::prompt::{self, AccountAction};

/// Spinner refresh interval
const SPINNER_TICK_MS: u64 = 100;

pub async fn run(command: Command) -> Result<()> {
    match command {
        Command::Help => {
            print!("{}", command_list());
            Ok(())
        }
        Command::Submit { script } => {
            let config = Config::load()?;
            submit(&session_manager(&config)?, &config, &script).await
        }
        Command::Login => login(&session_manager(&Config::load()?)?).await,
        Command::Signup => signup(&session_manager(&Config::load()?)?).await,
        Command::Logout => logout(&session_manager(&Config::load()?)?),
    }
}

fn session_manager(config: &Config) -> Result<SessionManager<ApiClient, KeyringStore>> {
    let api = ApiClient::new(config).context("Failed to create HTTP client")?;
    Ok(SessionManager::new(api, KeyringStore::new(&config.service_name)))
}

/// Categorised command overview shown by `tasknode help`.
fn command_list() -> String {
    [
        "",
        "📋 Available Commands",
        "",
        "🔑 Account Management:",
        "  • signup     Sign up for a TaskNode account",
        "  • login      Log in to your TaskNode account",
        "  • logout     Log out of your TaskNode account",
        "",
        "🚀 Core Functions:",
        "  • submit     Submit a Python script to be run in the cloud",
        "",
        "ℹ️  Help:",
        "  • help       Show help for the TaskNode CLI",
        "",
    ]
    .join("\n")
        + "\n"
}

async fn login<A: AuthApi, S: SecretStore>(session: &SessionManager<A, S>) -> Result<()> {
    let email = prompt::email()?;
    let password = prompt::password("Password: ")?;

    session.login(&email, &password).await?;
    println!("Successfully logged in! 🎉");
    Ok(())
}

async fn signup<A: AuthApi, S: SecretStore>(session: &SessionManager<A, S>) -> Result<()> {
    let email = prompt::email()?;
    let password = prompt::password("Password: ")?;
    let confirmation = prompt::password("Repeat for confirmation: ")?;
    if password != confirmation {
        bail!("Passwords do not match");
    }

    session.signup(&email, &password).await?;
    println!("Successfully signed up! 🎉");
    Ok(())
}

fn logout<A: AuthApi, S: SecretStore>(session: &SessionManager<A, S>) -> Result<()> {
    match session.logout()? {
        LogoutOutcome::LoggedOut => println!("Successfully logged out!"),
        LogoutOutcome::AlreadyLoggedOut => println!("Already logged out!"),
    }
    Ok(())
}

/// Offer to log in or sign up when no session is stored.
async fn ensure_session<A: AuthApi, S: SecretStore>(session: &SessionManager<A, S>) -> Result<()> {
    if session.has_session()? {
        return Ok(());
    }

    println!("You are not logged in.");
    match prompt::account_action()? {
        Some(AccountAction::Login) => login(session).await?,
        Some(AccountAction::Signup) => signup(session).await?,
        None => bail!(LOGIN_REQUIRED_MESSAGE),
    }

    if !session.has_session()? {
        bail!(LOGIN_REQUIRED_MESSAGE);
    }
    Ok(())
}

fn stage_message(stage: SubmitStage) -> &'static str {
    match stage {
        SubmitStage::Authenticating => "Checking session...",
        SubmitStage::Packaging => "Packaging project...",
        SubmitStage::RequestingUpload => "Requesting upload URL...",
        SubmitStage::Uploading => "Uploading...",
    }
}

async fn submit<A: AuthApi, S: SecretStore>(
    session: &SessionManager<A, S>,
    config: &Config,
    script: &str,
) -> Result<()> {
    ensure_session(session).await?;

    let working_dir = std::env::current_dir().context("Failed to read current directory")?;
    let packager = DeployPackager::new(SystemProbe::from_config(config));

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));

    let result = submit_package(session, &packager, &working_dir, script, |stage| {
        spinner.set_message(stage_message(stage));
    })
    .await;
    spinner.finish_and_clear();

    let receipt = result?;
    info!(script = %receipt.script, bytes = receipt.archive_bytes, "Submitted");
    println!("Successfully uploaded code! 🚀");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_list_mentions_every_command() {
        let list = command_list();
        for command in ["submit", "login", "signup", "logout", "help"] {
            assert!(list.contains(&format!("• {command}")), "missing {command}");
        }
    }
}
