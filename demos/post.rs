//! Post a tweet or a reply from the command line.
//!
//! Demonstrates:
//! - Launching headless Firefox
//! - Building an engine from environment credentials
//! - Reusing the saved cookie session across runs
//!
//! Usage:
//!   cargo run --example post -- "hello world"
//!   cargo run --example post -- --reply jack 20 "hi there"
//!   cargo run --example post -- --debug "hello world"
//!
//! Environment:
//!   TWITTER_EMAIL, TWITTER_USERNAME, TWITTER_PASSWORD  login credentials
//!   TWEETFREE_SESSION_PATH                             cookie file (default cookies.json)
//!   TWEETFREE_MODE                                     browser (default) or api
//!   FIREFOX_BINARY                                     Firefox executable (default firefox)

// ============================================================================
// Imports
// ============================================================================

use tracing_subscriber::EnvFilter;
use tweetfree::{
    Credentials, Engine, Error, ExecutionMode, FirefoxPage, LaunchOptions, Result,
};

// ============================================================================
// Args
// ============================================================================

/// Command-line arguments.
#[derive(Debug)]
struct Args {
    debug: bool,
    reply_to: Option<(String, String)>,
    text: String,
}

impl Args {
    fn parse() -> Result<Self> {
        let mut debug = false;
        let mut reply_to = None;
        let mut rest = Vec::new();

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--debug" => debug = true,
                "--reply" => match (args.next(), args.next()) {
                    (Some(user), Some(id)) => reply_to = Some((user, id)),
                    _ => return Err(Error::invalid_argument("--reply needs <user> <id>")),
                },
                _ => rest.push(arg),
            }
        }

        Ok(Self {
            debug,
            reply_to,
            text: rest.join(" "),
        })
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse()?;
    init_logging(args.debug);

    match ExecutionMode::from_env()? {
        ExecutionMode::Browser => post_with_browser(&args).await?,
        ExecutionMode::OfficialApi => {
            return Err(Error::config(
                "no official API client is linked into this build; set TWEETFREE_MODE=browser",
            ));
        }
    }

    println!("[OK] Posted");
    Ok(())
}

async fn post_with_browser(args: &Args) -> Result<()> {
    let binary = std::env::var("FIREFOX_BINARY").unwrap_or_else(|_| "firefox".to_string());
    let page = FirefoxPage::launch(&LaunchOptions::new(binary)).await?;

    let engine = Engine::builder(page)
        .credentials(Credentials::from_env()?)
        .build();

    let outcome = match &args.reply_to {
        Some((user, id)) => engine.reply(user, id, &args.text).await,
        None => engine.tweet(&args.text).await,
    };

    engine.shutdown().await?;
    outcome
}

fn init_logging(debug: bool) {
    let filter = if debug { "tweetfree=debug" } else { "tweetfree=info" };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}
