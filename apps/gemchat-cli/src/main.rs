use clap::Parser;
use gemchat_auth::{AuthConfig, DEFAULT_COUNTRIES_URL};
use gemchat_store::{ChatConfig, ChatroomRegistry, KeyValueStore, MemoryStore, SettingsManager};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod auth;
mod chatroom;
mod dashboard;
mod input;
mod render;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// SQLite file holding the chatroom list
    #[arg(long, default_value = "gemchat.db")]
    db: PathBuf,

    /// Keep chatrooms in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Messages revealed per page of history
    #[arg(long, default_value_t = 20)]
    page_size: usize,

    /// Demo messages generated when a chatroom opens
    #[arg(long, default_value_t = 40)]
    seed_count: usize,

    /// Simulated latency for loading older messages
    #[arg(long, default_value = "700ms", value_parser = humantime::parse_duration)]
    load_delay: Duration,

    /// Simulated latency for agent replies
    #[arg(long, default_value = "1200ms", value_parser = humantime::parse_duration)]
    reply_delay: Duration,

    /// Use the built-in country list instead of fetching it
    #[arg(long)]
    offline: bool,

    /// Country list endpoint
    #[arg(long, default_value = DEFAULT_COUNTRIES_URL)]
    countries_url: String,

    /// Go straight to the dashboard
    #[arg(long)]
    skip_auth: bool,
}

impl Args {
    fn chat_config(&self) -> ChatConfig {
        ChatConfig {
            page_size: self.page_size,
            seed_count: self.seed_count,
            load_delay: self.load_delay,
            reply_delay: self.reply_delay,
            ..Default::default()
        }
    }

    fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            countries_url: self.countries_url.clone(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let args = Args::parse();
    let mut input = input::Input::new(BufReader::new(tokio::io::stdin()).lines());

    if !args.skip_auth && !auth::run(&mut input, &args.auth_config(), args.offline).await? {
        return Ok(());
    }

    let storage: Arc<dyn KeyValueStore> = if args.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(SettingsManager::open(&args.db).await?)
    };
    info!("Using {} storage", if args.ephemeral { "in-memory" } else { "SQLite" });

    let mut registry = ChatroomRegistry::new(storage);
    dashboard::run(&mut input, &mut registry, args.chat_config()).await
}
