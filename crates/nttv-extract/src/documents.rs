//! Whole-document views over the chunked corpus.
//!
//! Chunks are regrouped by source so parsers see a document's lines in
//! order regardless of where the chunker cut them.

use nttv_core::types::{ChunkRecord, Passage};

/// Lowercased substrings identifying the canonical source documents.
pub mod sources {
    pub const RANK_REQUIREMENTS: &str = "nttv rank requirements";
    pub const LEADERSHIP: &str = "bujinkan leadership and wisdom";
    pub const SCHOOLS: &str = "schools of the bujinkan summaries";
    pub const WEAPONS: &str = "weapons reference";
    pub const TECHNIQUES: &str = "technique descriptions";
    pub const TRAINING: &str = "nttv training reference";
    pub const GLOSSARY: &str = "glossary";
    pub const KYUSHO: &str = "kyusho";
}

#[derive(Debug, Clone)]
pub struct Document {
    pub source: String,
    pub text: String,
}

/// Documents in first-appearance order.
#[derive(Debug, Clone, Default)]
pub struct DocumentSet {
    docs: Vec<Document>,
}

impl DocumentSet {
    pub fn from_records(records: &[ChunkRecord]) -> Self {
        let mut set = Self::default();
        for r in records {
            set.push(&r.source, &r.text);
        }
        set
    }

    pub fn from_passages(passages: &[Passage]) -> Self {
        let mut set = Self::default();
        for p in passages {
            set.push(&p.source, &p.text);
        }
        set
    }

    fn push(&mut self, source: &str, text: &str) {
        match self.docs.iter_mut().find(|d| d.source == source) {
            Some(doc) => {
                doc.text.push('\n');
                doc.text.push_str(text);
            }
            None => self.docs.push(Document { source: source.to_string(), text: text.to_string() }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.iter()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Concatenated text of every document whose source contains `needle`,
    /// plus the first matching source path.
    pub fn gather(&self, needle: &str) -> Option<(String, String)> {
        let mut hits = self.docs.iter().filter(|d| d.source.to_lowercase().contains(needle));
        let first = hits.next()?;
        let mut text = first.text.clone();
        for d in hits {
            text.push_str("\n\n");
            text.push_str(&d.text);
        }
        Some((first.source.clone(), text))
    }

    pub fn text_of(&self, needle: &str) -> String {
        self.gather(needle).map(|(_, t)| t).unwrap_or_default()
    }

    /// Every line of every document, in order.
    pub fn all_text(&self) -> String {
        self.docs.iter().map(|d| d.text.as_str()).collect::<Vec<_>>().join("\n\n")
    }
}

/// Text of the passages whose source contains `needle`, joined by newlines.
pub fn passages_from(passages: &[Passage], needle: &str) -> String {
    passages
        .iter()
        .filter(|p| p.source_matches(needle))
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
