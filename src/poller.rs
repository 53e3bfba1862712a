//! Mention poll loop.
//!
//! Each pass looks at the single newest mention in the inbox, works out who
//! the bot was asked to analyze, pulls their recent comments through the
//! analysis service and replies with the narrative. Between passes the loop
//! sleeps for a fixed interval, which is also the only throttle on the
//! analysis service's quota.
//!
//! Nothing is remembered between passes. A mention counts as new only while it
//! is younger than the freshness window, so a mention that arrives while the
//! bot is down is never answered.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use regex::Regex;

use crate::analysis::PersonalityAnalyzer;
use crate::config::BotConfig;
use crate::error::Error;
use crate::narrative::NarrativeFormatter;
use crate::platform::{Comment, Inbox, Mention, UserContent};

/// `u/name` or `/u/name`, capturing the account name.
static USER_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/?u/([A-Za-z0-9_-]+)").expect("static regex is valid"));

/// Source of time for the loop.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    async fn sleep(&self, duration: Duration);
}

/// Wall-clock time and tokio timers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Why a mention did not name a user to analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Second word is not `u/name` or `/u/name`.
    Malformed,
    /// Older than the freshness window.
    Stale,
    /// Asked to analyze the bot itself.
    SelfMention,
}

impl std::fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed => write!(f, "not in u/ or /u/ format"),
            Self::Stale => write!(f, "outside the freshness window"),
            Self::SelfMention => write!(f, "self-mention"),
        }
    }
}

/// Outcome of inspecting a mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    User(String),
    Ignored(IgnoreReason),
}

/// Work out which user a mention asks the bot to analyze.
///
/// Checks run in order: format, freshness, self-mention.
pub fn resolve_mentioned_user(
    mention: &Mention,
    now: DateTime<Utc>,
    bot_username: &str,
    freshness_window: Duration,
) -> Resolution {
    let Some(token) = mention.body.split_whitespace().nth(1) else {
        return Resolution::Ignored(IgnoreReason::Malformed);
    };
    let Some(username) = USER_MENTION.captures(token).and_then(|c| c.get(1)) else {
        return Resolution::Ignored(IgnoreReason::Malformed);
    };

    let window = TimeDelta::from_std(freshness_window).unwrap_or(TimeDelta::MAX);
    if now - mention.created_at >= window {
        return Resolution::Ignored(IgnoreReason::Stale);
    }

    if username.as_str().eq_ignore_ascii_case(bot_username) {
        return Resolution::Ignored(IgnoreReason::SelfMention);
    }

    Resolution::User(username.as_str().to_string())
}

/// Concatenate comments into one document, each preceded by ". ".
pub fn build_document(comments: &[Comment]) -> String {
    comments
        .iter()
        .map(|comment| format!(". {}", comment.body))
        .collect()
}

/// What a single pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    NoMention,
    InboxUnavailable,
    Ignored(IgnoreReason),
    ContentUnavailable { user: String },
    AnalysisFailed { user: String },
    ReplyFailed { user: String },
    Replied { user: String },
}

/// Collaborators the loop needs, constructed once at startup.
pub struct PollerDeps {
    pub inbox: Arc<dyn Inbox>,
    pub content: Arc<dyn UserContent>,
    pub analyzer: Arc<dyn PersonalityAnalyzer>,
    pub formatter: NarrativeFormatter,
    pub clock: Arc<dyn Clock>,
}

/// Timer-driven mention handler.
pub struct PollLoop {
    deps: PollerDeps,
    bot_username: String,
    poll_interval: Duration,
    freshness_window: Duration,
    comment_limit: usize,
}

impl PollLoop {
    pub fn new(deps: PollerDeps, config: &BotConfig, bot_username: impl Into<String>) -> Self {
        Self {
            deps,
            bot_username: bot_username.into(),
            poll_interval: config.poll_interval,
            freshness_window: config.freshness_window,
            comment_limit: config.comment_limit,
        }
    }

    /// Run passes forever, sleeping the poll interval after each.
    ///
    /// Returns only on a fatal error (a facet with no phrase under the
    /// strict policy).
    pub async fn run(&self) -> Result<(), Error> {
        tracing::info!(
            interval_secs = self.poll_interval.as_secs(),
            freshness_secs = self.freshness_window.as_secs(),
            analyzer = self.deps.analyzer.name(),
            "Poll loop started"
        );

        loop {
            let outcome = self.run_once().await?;
            tracing::debug!(?outcome, "Pass complete, sleeping");
            self.deps.clock.sleep(self.poll_interval).await;
        }
    }

    /// Handle the newest mention once.
    pub async fn run_once(&self) -> Result<PassOutcome, Error> {
        let mention = match self.deps.inbox.latest_mentions(1).await {
            Ok(mentions) => match mentions.into_iter().next() {
                Some(mention) => mention,
                None => return Ok(PassOutcome::NoMention),
            },
            Err(e) => {
                tracing::warn!(error = %e, "Failed to check inbox");
                return Ok(PassOutcome::InboxUnavailable);
            }
        };

        let user = match resolve_mentioned_user(
            &mention,
            self.deps.clock.now(),
            &self.bot_username,
            self.freshness_window,
        ) {
            Resolution::User(user) => user,
            Resolution::Ignored(reason) => {
                tracing::debug!(mention = %mention.id, %reason, "Ignoring mention");
                return Ok(PassOutcome::Ignored(reason));
            }
        };
        tracing::info!(mention = %mention.id, author = %mention.author, user = %user, "Analyzing user");

        let document = match self
            .deps
            .content
            .recent_comments(&user, self.comment_limit)
            .await
        {
            Ok(comments) => build_document(&comments),
            Err(e) => {
                tracing::warn!(user = %user, error = %e, "Failed to fetch comments");
                return Ok(PassOutcome::ContentUnavailable { user });
            }
        };

        let result = match self.deps.analyzer.analyze(&document).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(
                    user = %user,
                    code = ?e.code(),
                    error = %e,
                    "Analysis failed"
                );
                return Ok(PassOutcome::AnalysisFailed { user });
            }
        };
        for warning in &result.warnings {
            tracing::info!(id = %warning.warning_id, "Analysis warning: {}", warning.message);
        }

        let reply = self.deps.formatter.compose_reply(&result)?;

        match self.deps.inbox.reply(&mention, &reply).await {
            Ok(()) => {
                tracing::info!(mention = %mention.id, user = %user, "Replied to mention");
                Ok(PassOutcome::Replied { user })
            }
            Err(e) => {
                tracing::error!(mention = %mention.id, error = %e, "Failed to post reply");
                Ok(PassOutcome::ReplyFailed { user })
            }
        }
    }
}
