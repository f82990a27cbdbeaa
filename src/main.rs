
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use lovele::{
    AuthError, ClientConfig, GatewayKind, SessionManager, ValidationResult, password_score, validate_login_form,
    validate_password, validate_signup_form,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("form has errors: {0}")]
    InvalidForm(ValidationResult),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "lovele", about = "Lovele account CLI")]
struct Cli {
    #[arg(long, env = "LOVELE_API_URL")]
    api_url: Option<String>,

    /// Use the in-process mock backend instead of HTTP. Its session is kept
    /// next to the token file so later commands can see it.
    #[arg(long, default_value_t = false)]
    mock: bool,

    #[arg(long, env = "LOVELE_TOKEN_FILE", default_value = ".lovele/tokens.json")]
    token_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "LOVELE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Signup {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "LOVELE_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    Logout,
    /// Resume the stored session and print the signed-in user.
    Whoami,
    Refresh,
    /// Report validity, strength and meter score for a password.
    CheckPassword {
        password: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordCheck {
    #[serde(flatten)]
    report: lovele::PasswordReport,
    score: f32,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Mock backend state kept next to the token file, e.g. `tokens.mock.json`.
fn mock_state_path(token_file: &Path) -> PathBuf {
    token_file.with_extension("mock.json")
}

fn build_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.trim_end_matches('/').to_owned();
    }
    if cli.mock {
        config.gateway = GatewayKind::Mock;
    }
    if config.gateway == GatewayKind::Mock && config.mock_state_file.is_none() {
        config.mock_state_file = Some(mock_state_path(&cli.token_file));
    }
    config.token_file = Some(cli.token_file.clone());
    Ok(config)
}

fn session(cli: &Cli) -> Result<SessionManager, CliError> {
    let config = build_config(cli)?;
    tracing::debug!(api = %config.api_base_url, gateway = ?config.gateway, "session configured");
    Ok(SessionManager::from_config(&config)?)
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    if let Err(e) = dotenv {
        if !e.not_found() {
            tracing::warn!(error = %e, ".env load failed");
        }
    }

    let cli = Cli::parse();

    match &cli.command {
        Command::CheckPassword { password } => {
            print_json(&PasswordCheck { report: validate_password(password), score: password_score(password) })
        }
        Command::Login { email, password } => {
            let form = validate_login_form(email, password);
            if !form.is_valid {
                return Err(CliError::InvalidForm(form));
            }
            let user = session(&cli)?.login(email, password).await?;
            print_json(&user)
        }
        Command::Signup { full_name, email, password, confirm_password } => {
            let form = validate_signup_form(full_name, email, password, confirm_password);
            if !form.is_valid {
                return Err(CliError::InvalidForm(form));
            }
            let user = session(&cli)?.signup(full_name, email, password).await?;
            print_json(&user)
        }
        Command::Logout => {
            session(&cli)?.logout().await;
            println!("signed out");
            Ok(())
        }
        Command::Whoami => match session(&cli)?.restore().await? {
            Some(user) => print_json(&user),
            None => {
                println!("not signed in");
                Ok(())
            }
        },
        Command::Refresh => {
            let user = session(&cli)?.refresh_tokens().await?;
            print_json(&user)
        }
    }
}
