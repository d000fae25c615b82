//! Domain types shared by retrieval, extraction and orchestration.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::text::fold;

/// One row of the metadata store; row `i` pairs with vector `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub text: String,
    pub source: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub priority: u8,
}

/// Canonical topics that can be injected as whole-document passages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyntheticKind {
    TechniqueRow,
    Leadership,
    RankRequirements,
    Weapons,
    Schools,
    KihonHappo,
    TechniqueDescriptions,
}

impl SyntheticKind {
    /// Sort key for the synthetic prefix. Always above any similarity score.
    pub fn score(self) -> f32 {
        match self {
            Self::TechniqueRow => 999.0,
            Self::Leadership => 998.0,
            Self::RankRequirements => 997.0,
            Self::Weapons => 996.0,
            Self::Schools => 995.0,
            Self::KihonHappo => 994.0,
            Self::TechniqueDescriptions => 993.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "topic")]
pub enum Origin {
    Retrieved,
    Synthetic(SyntheticKind),
}

/// A candidate text passage. Reranking and injection build new lists;
/// a passage is never edited after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    pub source: String,
    pub page: Option<u32>,
    pub priority: u8,
    pub base_score: f32,
    pub rerank_score: f32,
    pub origin: Origin,
}

impl Passage {
    pub fn retrieved(record: &ChunkRecord, similarity: f32) -> Self {
        Self {
            text: record.text.clone(),
            source: record.source.clone(),
            page: record.page,
            priority: record.priority,
            base_score: similarity,
            rerank_score: similarity,
            origin: Origin::Retrieved,
        }
    }

    pub fn synthetic(kind: SyntheticKind, text: String, source: String) -> Self {
        Self {
            text,
            source,
            page: None,
            priority: 1,
            base_score: 1.0,
            rerank_score: kind.score(),
            origin: Origin::Synthetic(kind),
        }
    }

    pub fn with_rerank_score(&self, score: f32) -> Self {
        Self { rerank_score: score, ..self.clone() }
    }

    pub fn synthetic_kind(&self) -> Option<SyntheticKind> {
        match self.origin {
            Origin::Synthetic(kind) => Some(kind),
            Origin::Retrieved => None,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic_kind().is_some()
    }

    /// File name portion of `source`.
    pub fn source_name(&self) -> &str {
        self.source.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(&self.source)
    }

    pub fn source_matches(&self, needle: &str) -> bool {
        self.source.to_lowercase().contains(needle)
    }
}

/// An incoming question. Case-lowered and folded views are computed once.
#[derive(Debug, Clone)]
pub struct Query {
    text: String,
    top_k: Option<usize>,
    lower: String,
    folded: String,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let lower = text.to_lowercase();
        let folded = fold(&text);
        Self { text, top_k: None, lower, folded }
    }

    pub fn with_top_k(mut self, top_k: Option<usize>) -> Self {
        self.top_k = top_k.filter(|k| *k > 0);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn top_k(&self) -> Option<usize> {
        self.top_k
    }

    pub fn lower(&self) -> &str {
        &self.lower
    }

    /// Lowercased, diacritic-free, whitespace-collapsed form.
    pub fn folded(&self) -> &str {
        &self.folded
    }

    pub fn mentions_any(&self, terms: &[&str]) -> bool {
        terms.iter().any(|t| self.folded.contains(t))
    }
}

/// Diagnostic tag naming the pipeline stage that produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetPath {
    #[serde(rename = "technique/single")]
    TechniqueSingle,
    #[serde(rename = "leadership/soke")]
    LeadershipSoke,
    #[serde(rename = "schools/list")]
    SchoolsList,
    #[serde(rename = "schools/profile")]
    SchoolsProfile,
    #[serde(rename = "schools/llm")]
    SchoolsLlm,
    #[serde(rename = "leadership/fallback")]
    LeadershipFallback,
    #[serde(rename = "weapons/rank")]
    WeaponsRank,
    #[serde(rename = "rank/requirements")]
    RankRequirements,
    #[serde(rename = "concept/kihon-happo")]
    KihonHappo,
    #[serde(rename = "deterministic/core")]
    DeterministicCore,
    #[serde(rename = "llm/fallback")]
    LlmFallback,
    #[serde(rename = "llm/empty")]
    LlmEmpty,
}

impl DetPath {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TechniqueSingle => "technique/single",
            Self::LeadershipSoke => "leadership/soke",
            Self::SchoolsList => "schools/list",
            Self::SchoolsProfile => "schools/profile",
            Self::SchoolsLlm => "schools/llm",
            Self::LeadershipFallback => "leadership/fallback",
            Self::WeaponsRank => "weapons/rank",
            Self::RankRequirements => "rank/requirements",
            Self::KihonHappo => "concept/kihon-happo",
            Self::DeterministicCore => "deterministic/core",
            Self::LlmFallback => "llm/fallback",
            Self::LlmEmpty => "llm/empty",
        }
    }

    pub fn is_deterministic(self) -> bool {
        !matches!(self, Self::SchoolsLlm | Self::LlmFallback | Self::LlmEmpty)
    }
}

impl fmt::Display for DetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A final answer plus the stage that produced it.
///
/// `extractor` names the registry entry for deterministic answers and is
/// empty for completion answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub det_path: DetPath,
    pub extractor: String,
}

impl Answer {
    pub fn new(text: impl Into<String>, det_path: DetPath, extractor: impl Into<String>) -> Self {
        Self { text: text.into(), det_path, extractor: extractor.into() }
    }
}

/// Result of a completion call. Never an error: failures leave `text`
/// empty and describe themselves in `raw`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    pub raw: String,
}

impl Completion {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Bullets,
    Paragraph,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Crisp,
    Chatty,
}
