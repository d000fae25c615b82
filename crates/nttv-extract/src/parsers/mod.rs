//! Structured parsers for the corpus micro-formats.
//!
//! Bullet/heading documents and pseudo-CSV tables are each parsed by one
//! shared skeleton; every catalog then exposes the same lookup surface
//! through [`StructuredCatalog`].

pub mod glossary;
pub mod kihon;
pub mod kyusho;
pub mod lineage;
pub mod rank;
pub mod schools;
pub mod sections;
pub mod techniques;
pub mod weapons;

use std::collections::HashMap;

use nttv_core::text::{contains_phrase, fold, keylite};

/// How much of a record to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Detail {
    /// One line.
    Brief,
    /// Title line plus `- Field: value` bullets.
    #[default]
    Full,
}

pub trait StructuredCatalog {
    type Record;

    fn list_all(&self) -> &[Self::Record];

    /// Exact folded match, then substring containment, then the trailing
    /// one or two words of the candidate.
    fn find(&self, candidate: &str) -> Option<&Self::Record>;

    fn format(&self, record: &Self::Record, detail: Detail) -> String;
}

/// Folded alias to record index, built once per corpus load.
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    /// (folded alias, record index) in insertion order.
    entries: Vec<(String, usize)>,
    by_fold: HashMap<String, usize>,
    by_lite: HashMap<String, usize>,
}

impl AliasIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an alias. The first record to claim a key keeps it.
    pub fn insert(&mut self, alias: &str, id: usize) {
        let folded = fold(alias.trim());
        if folded.is_empty() {
            return;
        }
        let lite = keylite(&folded);
        if !self.by_fold.contains_key(&folded) {
            self.by_fold.insert(folded.clone(), id);
            self.entries.push((folded, id));
        }
        if !lite.is_empty() {
            self.by_lite.entry(lite).or_insert(id);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn exact(&self, candidate: &str) -> Option<usize> {
        let folded = fold(candidate.trim());
        self.by_fold.get(&folded).or_else(|| self.by_lite.get(&keylite(&folded))).copied()
    }

    pub fn lookup(&self, candidate: &str) -> Option<usize> {
        let cand = fold(candidate.trim());
        if cand.chars().count() < 2 {
            return None;
        }
        if let Some(id) = self.exact(&cand) {
            return Some(id);
        }
        let contained = self
            .entries
            .iter()
            .filter(|(key, _)| key.len() >= 4 && (cand.contains(key.as_str()) || (cand.len() >= 4 && key.contains(&cand))))
            .max_by_key(|(key, _)| key.len());
        if let Some((_, id)) = contained {
            return Some(*id);
        }
        let words: Vec<&str> = cand.split_whitespace().collect();
        for span in [2, 1] {
            if words.len() > span {
                let tail = words[words.len() - span..].join(" ");
                if tail.len() >= 4 {
                    if let Some(id) = self.exact(&tail) {
                        return Some(id);
                    }
                }
            }
        }
        None
    }

    /// Longest alias that appears in `text` as a whole phrase.
    pub fn find_in_text(&self, text: &str) -> Option<usize> {
        let folded = fold(text);
        self.entries
            .iter()
            .filter(|(key, _)| contains_phrase(&folded, key))
            .max_by_key(|(key, _)| key.len())
            .map(|(_, id)| *id)
    }

    /// Every distinct record index named in `text`, by first alias position.
    pub fn all_in_text(&self, text: &str) -> Vec<usize> {
        let folded = fold(text);
        let mut hits: Vec<(usize, usize, usize)> = Vec::new();
        for (key, id) in &self.entries {
            if let Some(at) = folded.find(key.as_str()) {
                if contains_phrase(&folded, key) {
                    hits.push((at, usize::MAX - key.len(), *id));
                }
            }
        }
        hits.sort_unstable();
        let mut out = Vec::new();
        for (_, _, id) in hits {
            if !out.contains(&id) {
                out.push(id);
            }
        }
        out
    }
}

/// "hicho no kamae" -> "Hicho No Kamae".
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
