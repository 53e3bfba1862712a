//! Test doubles for the poll loop's collaborators.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use crate::analysis::{AnalysisResult, PersonalityAnalyzer, Trait};
use crate::error::{AnalysisError, PlatformError};
use crate::platform::{Comment, Inbox, Mention, UserContent};
use crate::poller::Clock;

pub fn mention_at(body: &str, created_at: DateTime<Utc>) -> Mention {
    Mention {
        id: "t1_mention".to_string(),
        author: "requester".to_string(),
        body: body.to_string(),
        created_at,
    }
}

pub fn comment(body: &str) -> Comment {
    Comment {
        id: "t1_comment".to_string(),
        body: body.to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn scored(id: &str, name: &str, percentile: f64) -> Trait {
    Trait {
        trait_id: id.to_string(),
        name: name.to_string(),
        category: String::new(),
        percentile,
        raw_score: None,
        significant: None,
        children: Vec::new(),
    }
}

/// A profile every built-in phrase table can describe.
pub fn sample_profile() -> AnalysisResult {
    let mut openness = scored("big5_openness", "Openness", 0.8);
    openness.children = vec![
        scored("facet_adventurousness", "Adventurousness", 0.81),
        scored("facet_intellect", "Intellect", 0.93),
        scored("facet_imagination", "Imagination", 0.47),
    ];
    let mut agreeableness = scored("big5_agreeableness", "Agreeableness", 0.3);
    agreeableness.children = vec![
        scored("facet_trust", "Trust", 0.12),
        scored("facet_modesty", "Modesty", 0.25),
        scored("facet_altruism", "Altruism", 0.66),
    ];

    AnalysisResult {
        word_count: 1200,
        personality: vec![openness, agreeableness],
        needs: vec![
            scored("need_challenge", "Challenge", 0.72),
            scored("need_closeness", "Closeness", 0.18),
            scored("need_curiosity", "Curiosity", 0.9),
            scored("need_harmony", "Harmony", 0.33),
            scored("need_structure", "Structure", 0.51),
            scored("need_stability", "Stability", 0.2),
        ],
        ..AnalysisResult::default()
    }
}

/// Clock that only moves when the loop sleeps.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        let mut now = self.now.lock().unwrap();
        *now += TimeDelta::from_std(duration).unwrap();
    }
}

/// Inbox that serves one canned listing per call and records replies.
pub struct StubInbox {
    listings: Mutex<VecDeque<Vec<Mention>>>,
    unavailable: bool,
    fail_replies: bool,
    replies: Mutex<Vec<(String, String)>>,
}

impl StubInbox {
    /// Each call to `latest_mentions` pops the next listing; empty afterwards.
    pub fn with_mentions(listings: Vec<Vec<Mention>>) -> Self {
        Self {
            listings: Mutex::new(listings.into()),
            unavailable: false,
            fail_replies: false,
            replies: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::with_mentions(Vec::new())
        }
    }

    pub fn failing_replies(mut self) -> Self {
        self.fail_replies = true;
        self
    }

    /// `(mention id, text)` for each reply posted.
    pub fn replies(&self) -> Vec<(String, String)> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl Inbox for StubInbox {
    async fn latest_mentions(&self, limit: usize) -> Result<Vec<Mention>, PlatformError> {
        if self.unavailable {
            return Err(PlatformError::RequestFailed("simulated outage".to_string()));
        }
        let mut listing = self.listings.lock().unwrap().pop_front().unwrap_or_default();
        listing.truncate(limit);
        Ok(listing)
    }

    async fn reply(&self, mention: &Mention, text: &str) -> Result<(), PlatformError> {
        if self.fail_replies {
            return Err(PlatformError::Api {
                code: "RATELIMIT".to_string(),
                message: "you are doing that too much".to_string(),
            });
        }
        self.replies
            .lock()
            .unwrap()
            .push((mention.id.clone(), text.to_string()));
        Ok(())
    }
}

/// User content source with a fixed comment list.
pub struct StubContent {
    comments: Vec<Comment>,
    unavailable: bool,
    requests: Mutex<Vec<(String, usize)>>,
}

impl StubContent {
    pub fn with_comments(comments: Vec<Comment>) -> Self {
        Self {
            comments,
            unavailable: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every fetch fails, as for a deleted or suspended account.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::with_comments(Vec::new())
        }
    }

    pub fn requests(&self) -> Vec<(String, usize)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserContent for StubContent {
    async fn recent_comments(
        &self,
        username: &str,
        limit: usize,
    ) -> Result<Vec<Comment>, PlatformError> {
        self.requests
            .lock()
            .unwrap()
            .push((username.to_string(), limit));
        if self.unavailable {
            return Err(PlatformError::Api {
                code: "404".to_string(),
                message: "Not Found".to_string(),
            });
        }
        Ok(self.comments.iter().take(limit).cloned().collect())
    }
}

/// Analyzer that returns the same result for every document.
pub struct StubAnalyzer {
    response: Result<AnalysisResult, (u16, String)>,
    documents: Mutex<Vec<String>>,
}

impl StubAnalyzer {
    pub fn returning(result: AnalysisResult) -> Self {
        Self {
            response: Ok(result),
            documents: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(code: u16, message: &str) -> Self {
        Self {
            response: Err((code, message.to_string())),
            documents: Mutex::new(Vec::new()),
        }
    }

    pub fn documents(&self) -> Vec<String> {
        self.documents.lock().unwrap().clone()
    }
}

#[async_trait]
impl PersonalityAnalyzer for StubAnalyzer {
    fn name(&self) -> &str {
        "stub"
    }

    async fn analyze(&self, document: &str) -> Result<AnalysisResult, AnalysisError> {
        self.documents.lock().unwrap().push(document.to_string());
        match &self.response {
            Ok(result) => Ok(result.clone()),
            Err((code, message)) => Err(AnalysisError::Service {
                code: *code,
                message: message.clone(),
            }),
        }
    }
}
