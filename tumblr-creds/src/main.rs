//! tumblr-creds - OAuth credential management for the Tumblr tools
//!
//! Runs the three-legged handshake, shows stored keys on request and
//! checks a credential file against the validation rules.

use anyhow::Result;
use clap::{Parser, Subcommand};
use libtumblr::config::Config;
use libtumblr::credentials::{
    Authorizer, CredentialManager, CredentialSource, FixedAuthorizer, StdinAuthorizer, Verbosity,
};
use libtumblr::TumblrError;
use std::path::{Path, PathBuf};
use tracing::error;

#[derive(Parser)]
#[command(name = "tumblr-creds")]
#[command(about = "Manage Tumblr OAuth credentials", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Credential file (default: from config, else tumblr.conf.json)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Authorize this application and obtain an access token pair
    Auth {
        /// Consumer key (read from the credential file when omitted)
        #[arg(long, env = "TUMBLR_CONSUMER_KEY", default_value = "")]
        consumer_key: String,

        /// Consumer secret (read from the credential file when omitted)
        #[arg(long, env = "TUMBLR_CONSUMER_SECRET", default_value = "", hide_env_values = true)]
        consumer_secret: String,

        /// Write the obtained tokens back to the credential file
        #[arg(long)]
        save: bool,

        /// Print the obtained tokens
        #[arg(long)]
        reveal: bool,

        /// Redirect URL from a previous authorization (skips the prompt)
        #[arg(long)]
        redirect_url: Option<String>,
    },

    /// Print consumer keys and OAuth tokens from the credential file
    Show,

    /// Validate the credential file
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    libtumblr::logging::init_default(cli.verbose);

    if let Err(e) = run_command(cli).await {
        error!("{}", e);
        let code = e
            .downcast_ref::<TumblrError>()
            .map(TumblrError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }

    Ok(())
}

async fn run_command(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let file = cli
        .file
        .unwrap_or_else(|| config.credentials.expanded_path());

    match cli.command {
        Commands::Auth {
            consumer_key,
            consumer_secret,
            save,
            reveal,
            redirect_url,
        } => {
            let source =
                CredentialSource::from_parts(&consumer_key, &consumer_secret, "", "", &file);
            authorize(&config, source, &file, save, reveal, redirect_url).await
        }
        Commands::Show => {
            CredentialManager::load(&file, Verbosity::Reveal)?;
            Ok(())
        }
        Commands::Check => check(&file),
    }
}

async fn authorize(
    config: &Config,
    source: CredentialSource,
    file: &Path,
    save: bool,
    reveal: bool,
    redirect_url: Option<String>,
) -> Result<()> {
    let mut manager =
        CredentialManager::new(source, Verbosity::Quiet)?.with_endpoints(config.oauth.clone());

    let authorizer: Box<dyn Authorizer> = match redirect_url {
        Some(url) => Box::new(FixedAuthorizer(url)),
        None => Box::new(StdinAuthorizer),
    };
    let verbosity = if reveal {
        Verbosity::Reveal
    } else {
        Verbosity::Quiet
    };

    manager
        .acquire_tokens(authorizer.as_ref(), save.then_some(file), verbosity)
        .await?;

    if save {
        println!("✓ Stored OAuth tokens in {}", file.display());
    } else {
        println!("✓ Authorization complete (tokens not saved, use --save to keep them)");
    }
    Ok(())
}

fn check(file: &Path) -> Result<()> {
    let manager = CredentialManager::load(file, Verbosity::Quiet)?;
    let state = if manager.state().is_authenticated() {
        "authenticated"
    } else {
        "consumer keys only"
    };
    println!("✓ {} is valid ({})", file.display(), state);
    Ok(())
}
