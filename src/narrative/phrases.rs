//! Phrase tables for narrative replies.
//!
//! Three tables map analysis identifiers to prose: what to say when a facet
//! scores high, when it scores low, and how to name a consumption preference.
//! Facet phrases complete a sentence starting with "You "; consumption phrases
//! are noun phrases that read well in a comma-separated list.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Result of looking up an identifier in a [`PhraseTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhraseLookup<'a> {
    Found(&'a str),
    Missing,
}

/// Immutable identifier -> phrase mapping.
#[derive(Debug, Clone, Default)]
pub struct PhraseTable {
    name: &'static str,
    entries: HashMap<String, String>,
}

impl PhraseTable {
    /// Build a table from `(identifier, phrase)` pairs.
    pub fn new<I, K, V>(name: &'static str, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name,
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Built-in phrases for facets with a high percentile.
    pub fn high_facets() -> Self {
        Self::new("high facet", HIGH_FACET_PHRASES.iter().copied())
    }

    /// Built-in phrases for facets with a low percentile.
    pub fn low_facets() -> Self {
        Self::new("low facet", LOW_FACET_PHRASES.iter().copied())
    }

    /// Built-in phrases for consumption preferences.
    pub fn consumption() -> Self {
        Self::new("consumption", CONSUMPTION_PHRASES.iter().copied())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, id: &str) -> PhraseLookup<'_> {
        match self.entries.get(id) {
            Some(phrase) => PhraseLookup::Found(phrase),
            None => PhraseLookup::Missing,
        }
    }

    fn extend(&mut self, overrides: HashMap<String, String>) {
        self.entries.extend(overrides);
    }
}

/// The three tables the formatter needs.
#[derive(Debug, Clone)]
pub struct PhraseBook {
    pub high_facets: PhraseTable,
    pub low_facets: PhraseTable,
    pub consumption: PhraseTable,
}

impl Default for PhraseBook {
    fn default() -> Self {
        Self::builtin()
    }
}

/// On-disk overrides, one TOML table per phrase table.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PhraseOverrides {
    #[serde(default)]
    high_facets: HashMap<String, String>,
    #[serde(default)]
    low_facets: HashMap<String, String>,
    #[serde(default)]
    consumption: HashMap<String, String>,
}

impl PhraseBook {
    pub fn builtin() -> Self {
        Self {
            high_facets: PhraseTable::high_facets(),
            low_facets: PhraseTable::low_facets(),
            consumption: PhraseTable::consumption(),
        }
    }

    /// Built-in phrases with entries from a TOML file layered on top.
    ///
    /// ```toml
    /// [high_facets]
    /// facet_intellect = "love a good puzzle"
    ///
    /// [consumption]
    /// consumption_preferences_movie_horror = "scary movies"
    /// ```
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let overrides: PhraseOverrides = toml::from_str(&content).map_err(|e| {
            ConfigError::ParseError(format!("phrase file {}: {e}", path.display()))
        })?;

        tracing::info!(
            path = %path.display(),
            high_facets = overrides.high_facets.len(),
            low_facets = overrides.low_facets.len(),
            consumption = overrides.consumption.len(),
            "Loaded phrase overrides"
        );

        let mut book = Self::builtin();
        book.high_facets.extend(overrides.high_facets);
        book.low_facets.extend(overrides.low_facets);
        book.consumption.extend(overrides.consumption);
        Ok(book)
    }
}

const HIGH_FACET_PHRASES: &[(&str, &str)] = &[
    // Openness
    ("facet_adventurousness", "are eager to try new activities and see new places"),
    ("facet_artistic_interests", "appreciate beauty in art and nature"),
    ("facet_emotionality", "are aware of your feelings and how to express them"),
    ("facet_imagination", "have a vivid imagination"),
    ("facet_intellect", "are drawn to challenging ideas"),
    ("facet_liberalism", "like to question authority and tradition"),
    // Conscientiousness
    ("facet_achievement_striving", "set high goals and work hard to reach them"),
    ("facet_cautiousness", "think carefully before acting"),
    ("facet_dutifulness", "take your obligations seriously"),
    ("facet_orderliness", "like to keep things organized"),
    ("facet_self_discipline", "stick with difficult tasks until they are done"),
    ("facet_self_efficacy", "feel confident in your ability to get things done"),
    // Extraversion
    ("facet_activity_level", "enjoy a fast-paced, busy schedule"),
    ("facet_assertiveness", "tend to take charge of a situation"),
    ("facet_cheerfulness", "radiate joy and good humor"),
    ("facet_excitement_seeking", "get a thrill out of taking risks"),
    ("facet_friendliness", "make friends easily"),
    ("facet_gregariousness", "enjoy being in the company of others"),
    // Agreeableness
    ("facet_altruism", "feel fulfilled when helping others"),
    ("facet_cooperation", "are easy to please and try to avoid confrontation"),
    ("facet_modesty", "are comfortable staying out of the spotlight"),
    ("facet_morality", "think it is wrong to take advantage of others"),
    ("facet_sympathy", "feel what others feel and are compassionate towards them"),
    ("facet_trust", "believe the best in others"),
    // Emotional range
    ("facet_anger", "have a fiery temper when things don't go your way"),
    ("facet_anxiety", "tend to worry about things that might happen"),
    ("facet_depression", "often feel down or discouraged"),
    ("facet_immoderation", "feel strong temptations and find them hard to resist"),
    ("facet_self_consciousness", "are sensitive about what others think of you"),
    ("facet_vulnerability", "feel overwhelmed in stressful situations"),
];

const LOW_FACET_PHRASES: &[(&str, &str)] = &[
    // Openness
    ("facet_adventurousness", "enjoy familiar routines and prefer not to deviate from them"),
    ("facet_artistic_interests", "are less concerned with artistic or creative activities"),
    ("facet_emotionality", "don't often think about or openly express your emotions"),
    ("facet_imagination", "prefer facts over fantasy"),
    ("facet_intellect", "prefer dealing with the world as it is, rarely considering abstract ideas"),
    ("facet_liberalism", "prefer following tradition to keep a sense of stability"),
    // Conscientiousness
    ("facet_achievement_striving", "are content with what you have accomplished and don't feel the need to set ambitious goals"),
    ("facet_cautiousness", "prefer acting right away over spending time deliberating"),
    ("facet_dutifulness", "do what you want, regardless of rules and obligations"),
    ("facet_orderliness", "don't make a lot of time for organization in your daily life"),
    ("facet_self_discipline", "have a hard time sticking with difficult tasks for a long time"),
    ("facet_self_efficacy", "often doubt your ability to achieve your goals"),
    // Extraversion
    ("facet_activity_level", "appreciate a relaxed pace in life"),
    ("facet_assertiveness", "prefer to listen rather than talk, especially in groups"),
    ("facet_cheerfulness", "are generally serious and don't joke much"),
    ("facet_excitement_seeking", "prefer quiet, calm and safe activities"),
    ("facet_friendliness", "are a private person and don't let many people in"),
    ("facet_gregariousness", "have a strong need for time to yourself"),
    // Agreeableness
    ("facet_altruism", "are more concerned with taking care of yourself than taking time for others"),
    ("facet_cooperation", "don't shy away from contradicting others"),
    ("facet_modesty", "hold yourself in high regard and are satisfied with who you are"),
    ("facet_morality", "are comfortable using every trick in the book to get what you want"),
    ("facet_sympathy", "think people should rely more on themselves than on others"),
    ("facet_trust", "are wary of other people's intentions and don't trust easily"),
    // Emotional range
    ("facet_anger", "have a calm temperament and rarely get frustrated"),
    ("facet_anxiety", "tend to feel calm and self-assured"),
    ("facet_depression", "are generally comfortable with yourself as you are"),
    ("facet_immoderation", "keep your desires under control"),
    ("facet_self_consciousness", "are hard to embarrass and self-confident most of the time"),
    ("facet_vulnerability", "handle unexpected events calmly and effectively"),
];

const CONSUMPTION_PHRASES: &[(&str, &str)] = &[
    // Shopping
    ("consumption_preferences_automobile_ownership_cost", "keeping an eye on what a car costs to own"),
    ("consumption_preferences_automobile_safety", "putting safety first when buying a car"),
    ("consumption_preferences_clothes_quality", "buying clothes for their quality"),
    ("consumption_preferences_clothes_style", "buying clothes for their style"),
    ("consumption_preferences_clothes_comfort", "buying clothes for their comfort"),
    ("consumption_preferences_influence_brand_name", "well-known brand names"),
    ("consumption_preferences_influence_utility", "products picked for their usefulness"),
    ("consumption_preferences_influence_online_ads", "online ads"),
    ("consumption_preferences_influence_social_media", "products you discover on social media"),
    ("consumption_preferences_influence_family_members", "products your family recommends"),
    ("consumption_preferences_spur_of_moment", "spur-of-the-moment purchases"),
    ("consumption_preferences_credit_card_payment", "paying with a credit card"),
    // Health and activity
    ("consumption_preferences_eat_out", "eating out"),
    ("consumption_preferences_gym_membership", "having a gym membership"),
    ("consumption_preferences_outdoor", "outdoor activities"),
    // Environment, entrepreneurship, volunteering
    ("consumption_preferences_concerned_environment", "caring for the environment"),
    ("consumption_preferences_start_business", "starting your own business"),
    ("consumption_preferences_volunteer", "volunteering for social causes"),
    ("consumption_preferences_volunteering_time", "spending your free time volunteering"),
    ("consumption_preferences_volunteer_learning", "learning about social causes through volunteering"),
    // Movies
    ("consumption_preferences_movie_romance", "romance movies"),
    ("consumption_preferences_movie_adventure", "adventure movies"),
    ("consumption_preferences_movie_horror", "horror movies"),
    ("consumption_preferences_movie_musical", "musicals"),
    ("consumption_preferences_movie_historical", "historical movies"),
    ("consumption_preferences_movie_science_fiction", "science-fiction movies"),
    ("consumption_preferences_movie_war", "war movies"),
    ("consumption_preferences_movie_drama", "dramas"),
    ("consumption_preferences_movie_action", "action movies"),
    ("consumption_preferences_movie_documentary", "documentaries"),
    // Music
    ("consumption_preferences_music_rap", "rap music"),
    ("consumption_preferences_music_country", "country music"),
    ("consumption_preferences_music_r_b", "R&B music"),
    ("consumption_preferences_music_hip_hop", "hip hop music"),
    ("consumption_preferences_music_live_event", "live music events"),
    ("consumption_preferences_music_playing", "playing a musical instrument"),
    ("consumption_preferences_music_latin", "Latin music"),
    ("consumption_preferences_music_rock", "rock music"),
    ("consumption_preferences_music_classical", "classical music"),
    // Reading
    ("consumption_preferences_read_frequency", "reading often"),
    ("consumption_preferences_books_entertainment_magazines", "entertainment magazines"),
    ("consumption_preferences_books_non_fiction", "non-fiction books"),
    ("consumption_preferences_books_financial_investing", "books about investing"),
    ("consumption_preferences_books_autobiographies", "autobiographies"),
];
