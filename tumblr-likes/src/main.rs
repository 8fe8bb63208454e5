//! tumblr-likes - fetch a blog's likes using `backup.conf` credentials

use anyhow::Result;
use clap::Parser;
use libtumblr::legacy::{self, LegacyConfig, DEFAULT_LEGACY_FILE, LEGACY_API_URL};
use libtumblr::TumblrError;
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "tumblr-likes")]
#[command(about = "Fetch a blog's liked posts with the legacy backup.conf credentials", long_about = None)]
struct Cli {
    /// Legacy key=value config file
    #[arg(short, long, default_value = DEFAULT_LEGACY_FILE)]
    config: PathBuf,

    /// API root URL
    #[arg(long, default_value = LEGACY_API_URL)]
    base_url: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    libtumblr::logging::init_default(cli.verbose);

    match run(cli).await {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{}", e);
            let code = e
                .downcast_ref::<TumblrError>()
                .map(TumblrError::exit_code)
                .unwrap_or(1);
            std::process::exit(code);
        }
    }
}

/// Returns `false` when the config file is incomplete.
async fn run(cli: Cli) -> Result<bool> {
    let config = LegacyConfig::load(&cli.config)?;

    let missing = config.missing();
    if !missing.is_empty() {
        for problem in missing {
            println!("ERROR: {}", problem);
        }
        return Ok(false);
    }

    println!("user = {}", config.user);
    println!("oauth_key = {}", config.oauth_key);
    println!("oauth_sec = {}", config.oauth_sec);

    let http = reqwest::Client::new();
    let body = legacy::fetch_likes(&http, &config, &cli.base_url).await?;

    match legacy::status_line(&body) {
        Some(line) => println!("{}", line),
        None => {
            return Err(TumblrError::Decode("response body has no meta status".to_string()).into())
        }
    }
    Ok(true)
}
