//! Core domain types for Inkflow pipeline artifacts.

use chrono::{NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current local time at microsecond precision, the timestamp written into
/// every artifact.
pub fn local_timestamp() -> NaiveDateTime {
    chrono::Local::now().naive_local().trunc_subsecs(6)
}

/// Artifact timestamps: `YYYY-MM-DDTHH:MM:SS.ffffff` on write; any ISO-8601
/// naive form (with or without fraction) on read.
mod iso_micros {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&ts.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one pipeline run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// The pipeline steps that can abort a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    GenerateIdeas,
    SelectTopic,
    Research,
    WriteArticle,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GenerateIdeas => write!(f, "idea generation"),
            Self::SelectTopic => write!(f, "topic selection"),
            Self::Research => write!(f, "research"),
            Self::WriteArticle => write!(f, "article writing"),
        }
    }
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// `idea_generated.json`: titles produced for a domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaSet {
    /// Domain the ideas were generated for.
    pub domain: String,
    /// Local time of generation.
    #[serde(with = "iso_micros")]
    pub timestamp: NaiveDateTime,
    /// Titles in model output order.
    pub topic_ideas: Vec<String>,
}

impl IdeaSet {
    /// Build an idea set stamped with the current local time.
    pub fn new(domain: impl Into<String>, topic_ideas: Vec<String>) -> Self {
        Self {
            domain: domain.into(),
            timestamp: local_timestamp(),
            topic_ideas,
        }
    }
}

/// `research_summary.json`: bullet-point research for one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchSummary {
    pub topic: String,
    #[serde(with = "iso_micros")]
    pub timestamp: NaiveDateTime,
    pub summary: String,
}

impl ResearchSummary {
    /// Build a summary record; the text is stored trimmed.
    pub fn new(topic: impl Into<String>, summary: &str) -> Self {
        Self {
            topic: topic.into(),
            timestamp: local_timestamp(),
            summary: summary.trim().to_string(),
        }
    }
}

/// `article_output.json`: the final written article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub topic: String,
    #[serde(with = "iso_micros")]
    pub timestamp: NaiveDateTime,
    /// Article body.
    pub article: String,
}

impl Article {
    /// Build an article record; the body is stored trimmed.
    pub fn new(topic: impl Into<String>, body: &str) -> Self {
        Self {
            topic: topic.into(),
            timestamp: local_timestamp(),
            article: body.trim().to_string(),
        }
    }
}
