//! tumblr-get - read-only Tumblr API calls from the command line
//!
//! Signs each request with the stored OAuth credentials and prints the
//! normalized response envelope as JSON on stdout.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use libtumblr::credentials::{CredentialManager, Verbosity};
use libtumblr::endpoints::{DashboardOptions, FollowingOptions, LikesOptions, PostsOptions};
use libtumblr::{Config, Params, RequestEnvelope, TumblrClient, TumblrError};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "tumblr-get")]
#[command(version, about = "Query the Tumblr v2 API")]
#[command(long_about = r#"Query the Tumblr v2 API and print the response envelope as JSON.

EXAMPLES:
    # Blog info, or your own user info
    tumblr-get info staff
    tumblr-get info

    # Your likes, five at a time
    tumblr-get likes --limit 5

    # Photo posts tagged "cats"
    tumblr-get posts staff --type photo --tag cats

    # Scripting
    tumblr-get dashboard --limit 3 | jq '.response.posts[] | .post_url'

EXIT CODES:
    0 - Success (including API error envelopes)
    1 - Request or response error
    2 - Invalid credentials
    3 - Invalid input
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Credential file (default: from config, else tumblr.conf.json)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// API root URL (default: from config)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Blog info, or the authenticated user's info without a blog
    Info {
        blog: Option<String>,
    },

    /// Liked posts of a blog, or of the authenticated user
    Likes {
        blog: Option<String>,

        #[command(flatten)]
        page: Page,

        /// Only likes before this timestamp
        #[arg(long)]
        before: Option<u64>,

        /// Only likes after this timestamp
        #[arg(long)]
        after: Option<u64>,
    },

    /// Blogs followed by a blog, or by the authenticated user
    Following {
        blog: Option<String>,

        #[command(flatten)]
        page: Page,
    },

    /// The authenticated user's dashboard
    Dashboard {
        #[command(flatten)]
        page: Page,

        /// Post type (text, photo, quote, link, chat, audio, video, answer)
        #[arg(long = "type")]
        post_type: Option<String>,

        /// Only posts after this post id
        #[arg(long)]
        since_id: Option<u64>,

        #[command(flatten)]
        extra: ExtraInfo,
    },

    /// Posts of a blog
    Posts {
        blog: String,

        /// Post type (empty for all types)
        #[arg(long = "type", default_value = "")]
        post_type: String,

        /// A single post id
        #[arg(long)]
        id: Option<u64>,

        /// Only posts with this tag
        #[arg(long)]
        tag: Option<String>,

        #[command(flatten)]
        page: Page,

        #[command(flatten)]
        extra: ExtraInfo,

        /// Post body format (text, raw)
        #[arg(long)]
        filter: Option<String>,
    },
}

#[derive(Args)]
struct Page {
    /// Number of results to return
    #[arg(long)]
    limit: Option<u32>,

    /// Result number to start at
    #[arg(long)]
    offset: Option<u32>,
}

#[derive(Args)]
struct ExtraInfo {
    /// Include reblog information
    #[arg(long)]
    reblog_info: bool,

    /// Include note counts and metadata
    #[arg(long)]
    notes_info: bool,
}

impl ExtraInfo {
    fn reblog(&self) -> Option<bool> {
        self.reblog_info.then_some(true)
    }

    fn notes(&self) -> Option<bool> {
        self.notes_info.then_some(true)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    libtumblr::logging::init_default(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("{}", e);
        let code = e
            .downcast_ref::<TumblrError>()
            .map(TumblrError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let file = cli
        .file
        .unwrap_or_else(|| config.credentials.expanded_path());

    let credentials = CredentialManager::load(&file, Verbosity::Quiet)?;
    let mut client = TumblrClient::new(credentials, &config);
    if let Some(base_url) = &cli.base_url {
        client = client.with_base_url(base_url);
    }

    let envelope = execute(&client, cli.command).await?;
    info!(
        status = envelope.status().unwrap_or_default(),
        request = %envelope.request,
        "Request complete"
    );

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

async fn execute(client: &TumblrClient, command: Commands) -> libtumblr::Result<RequestEnvelope> {
    match command {
        Commands::Info { blog } => client.info(blog.as_deref().unwrap_or_default()).await,
        Commands::Likes {
            blog,
            page,
            before,
            after,
        } => {
            let opts = LikesOptions {
                limit: page.limit,
                offset: page.offset,
                before,
                after,
            };
            client
                .likes(blog.as_deref().unwrap_or_default(), &Params::from(&opts))
                .await
        }
        Commands::Following { blog, page } => {
            let opts = FollowingOptions {
                limit: page.limit,
                offset: page.offset,
            };
            client
                .following(blog.as_deref().unwrap_or_default(), &Params::from(&opts))
                .await
        }
        Commands::Dashboard {
            page,
            post_type,
            since_id,
            extra,
        } => {
            let opts = DashboardOptions {
                limit: page.limit,
                offset: page.offset,
                post_type,
                since_id,
                reblog_info: extra.reblog(),
                notes_info: extra.notes(),
            };
            client.dashboard(&Params::from(&opts)).await
        }
        Commands::Posts {
            blog,
            post_type,
            id,
            tag,
            page,
            extra,
            filter,
        } => {
            let opts = PostsOptions {
                id,
                tag,
                limit: page.limit,
                offset: page.offset,
                reblog_info: extra.reblog(),
                notes_info: extra.notes(),
                filter,
            };
            client
                .posts(&blog, &post_type, &Params::from(&opts))
                .await
        }
    }
}
