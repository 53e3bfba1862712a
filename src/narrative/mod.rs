//! Turns an analysis profile into the reply text.
//!
//! Three independent blocks are produced:
//!
//! - **traits**: the three strongest and three weakest facets, phrased through
//!   the high/low facet tables.
//! - **needs**: the three strongest and three weakest needs, by name.
//! - **consumption**: liked (score 1) and disliked (score 0) preferences that
//!   have a phrase; anything else is dropped.
//!
//! Ranking is a stable ascending sort on percentile, so facets with equal
//! scores keep the order the service reported them in.

mod phrases;

pub use phrases::{PhraseBook, PhraseLookup, PhraseTable};

use std::borrow::Cow;

use crate::analysis::AnalysisResult;
use crate::error::FormatError;

/// What to do when a ranked facet has no phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPhrasePolicy {
    /// Fail the formatting pass. The poll loop treats this as fatal.
    #[default]
    Strict,
    /// Log a warning and describe the facet by its identifier.
    Lenient,
}

impl std::str::FromStr for MissingPhrasePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" | "fatal" => Ok(Self::Strict),
            "lenient" | "tolerant" => Ok(Self::Lenient),
            _ => Err(format!(
                "invalid phrase policy '{}', expected 'strict' or 'lenient'",
                s
            )),
        }
    }
}

impl std::fmt::Display for MissingPhrasePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Lenient => write!(f, "lenient"),
        }
    }
}

/// Top and bottom three entries of a ranking, each listed strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranked<T> {
    pub greatest: [T; 3],
    pub lowest: [T; 3],
}

/// Pick the three highest and three lowest scored entries.
///
/// With fewer than six entries the two groups overlap.
pub fn rank<T: Copy>(entries: &[(T, f64)], section: &'static str) -> Result<Ranked<T>, FormatError> {
    if entries.len() < 3 {
        return Err(FormatError::InsufficientEntries {
            section,
            found: entries.len(),
        });
    }

    // `sort_by` is stable: equal percentiles keep encounter order.
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1));

    let strongest_first = |slice: &[(T, f64)]| {
        let mut group = slice.to_vec();
        group.sort_by(|a, b| b.1.total_cmp(&a.1));
        [group[0].0, group[1].0, group[2].0]
    };

    Ok(Ranked {
        greatest: strongest_first(&sorted[sorted.len() - 3..]),
        lowest: strongest_first(&sorted[..3]),
    })
}

fn join_three(items: [&str; 3]) -> String {
    format!("{}, {}, and {}", items[0], items[1], items[2])
}

/// Builds reply text from analysis profiles.
#[derive(Debug, Clone, Default)]
pub struct NarrativeFormatter {
    phrases: PhraseBook,
    policy: MissingPhrasePolicy,
}

impl NarrativeFormatter {
    pub fn new(phrases: PhraseBook, policy: MissingPhrasePolicy) -> Self {
        Self { phrases, policy }
    }

    pub fn policy(&self) -> MissingPhrasePolicy {
        self.policy
    }

    /// Two sentences: strongest facets, then weakest facets.
    pub fn describe_traits(&self, result: &AnalysisResult) -> Result<String, FormatError> {
        let facets: Vec<(&str, f64)> = result
            .facets()
            .map(|facet| (facet.trait_id.as_str(), facet.percentile))
            .collect();
        let ranked = rank(&facets, "personality facets")?;

        let high = self.facet_sentence(&self.phrases.high_facets, ranked.greatest, "high")?;
        let low = self.facet_sentence(&self.phrases.low_facets, ranked.lowest, "low")?;
        Ok(format!("{high}\n{low}"))
    }

    /// One sentence contrasting the strongest and weakest needs.
    pub fn describe_needs(&self, result: &AnalysisResult) -> Result<String, FormatError> {
        let needs: Vec<(&str, f64)> = result
            .needs
            .iter()
            .map(|need| (need.name.as_str(), need.percentile))
            .collect();
        let ranked = rank(&needs, "needs")?;

        Ok(format!(
            "You value {} more than you might value {}.",
            join_three(ranked.greatest),
            join_three(ranked.lowest)
        ))
    }

    /// Liked and disliked consumption preferences. Never fails.
    pub fn describe_consumption(&self, result: &AnalysisResult) -> String {
        let mut liked = Vec::new();
        let mut disliked = Vec::new();

        for preference in result.preferences() {
            let id = preference.consumption_preference_id.as_str();
            let phrase = match self.phrases.consumption.lookup(id) {
                PhraseLookup::Found(phrase) => phrase,
                PhraseLookup::Missing => {
                    tracing::debug!(id, "No consumption phrase, skipping");
                    continue;
                }
            };
            if preference.score == 1.0 {
                liked.push(phrase);
            } else if preference.score == 0.0 {
                disliked.push(phrase);
            }
        }

        format!(
            "Here are some things I think you might like:\n\n {}. \n\n Here are some things I think you might not like as much:\n\n {}.",
            liked.join(", "),
            disliked.join(", ")
        )
    }

    /// Full reply body: traits, needs and consumption separated by blank lines.
    pub fn compose_reply(&self, result: &AnalysisResult) -> Result<String, FormatError> {
        let traits = self.describe_traits(result)?;
        let needs = self.describe_needs(result)?;
        let consumption = self.describe_consumption(result);
        Ok(format!("{traits} \n\n \n\n {needs} \n\n \n\n {consumption}"))
    }

    fn facet_sentence(
        &self,
        table: &PhraseTable,
        ids: [&str; 3],
        level: &str,
    ) -> Result<String, FormatError> {
        let mut phrases: Vec<Cow<'_, str>> = Vec::with_capacity(3);
        for id in ids {
            let phrase = match (table.lookup(id), self.policy) {
                (PhraseLookup::Found(phrase), _) => Cow::Borrowed(phrase),
                (PhraseLookup::Missing, MissingPhrasePolicy::Strict) => {
                    return Err(FormatError::MissingPhrase {
                        table: table.name(),
                        id: id.to_string(),
                    });
                }
                (PhraseLookup::Missing, MissingPhrasePolicy::Lenient) => {
                    tracing::warn!(id, table = table.name(), "No facet phrase, using fallback");
                    Cow::Owned(fallback_phrase(id, level))
                }
            };
            phrases.push(phrase);
        }

        Ok(format!(
            "You {}, {}, and {}.",
            phrases[0], phrases[1], phrases[2]
        ))
    }
}

/// "facet_self_discipline" -> "score high on self discipline".
fn fallback_phrase(id: &str, level: &str) -> String {
    let readable = id.strip_prefix("facet_").unwrap_or(id).replace('_', " ");
    format!("score {level} on {readable}")
}
