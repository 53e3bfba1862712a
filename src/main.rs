use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use personabot::analysis::WatsonPersonalityInsights;
use personabot::config::Config;
use personabot::narrative::{NarrativeFormatter, PhraseBook};
use personabot::platform::RedditClient;
use personabot::poller::{PollLoop, PollerDeps, SystemClock};

#[derive(Parser)]
#[command(
    name = "personabot",
    version,
    about = "Reply to Reddit mentions with a personality summary"
)]
struct Cli {
    /// Handle the newest mention once and exit.
    #[arg(long)]
    once: bool,

    /// Log output format.
    #[arg(long, value_enum, default_value = "text", env = "PERSONABOT_LOG_FORMAT")]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("personabot=info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = Config::from_env()?;

    let phrases = match &config.bot.phrases_path {
        Some(path) => PhraseBook::load(path)?,
        None => PhraseBook::builtin(),
    };
    let formatter = NarrativeFormatter::new(phrases, config.bot.phrase_policy);

    let reddit = Arc::new(RedditClient::new(config.reddit.clone()));
    let deps = PollerDeps {
        inbox: reddit.clone(),
        content: reddit,
        analyzer: Arc::new(WatsonPersonalityInsights::new(config.watson.clone())),
        formatter,
        clock: Arc::new(SystemClock),
    };
    let poller = PollLoop::new(deps, &config.bot, config.reddit.username.clone());

    if cli.once {
        let outcome = poller.run_once().await?;
        tracing::info!(?outcome, "Single pass complete");
        return Ok(());
    }

    tokio::select! {
        biased;
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received, shutting down...");
            Ok(())
        }
        result = poller.run() => {
            result?;
            Ok(())
        }
    }
}
