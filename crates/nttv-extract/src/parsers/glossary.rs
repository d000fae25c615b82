//! `Term - Definition` glossary lines. A line without a dash continues the
//! previous definition.

use once_cell::sync::Lazy;
use regex::Regex;

use nttv_core::text::{fold, is_dash, squash_ws};

use super::{AliasIndex, Detail, StructuredCatalog};

static CANDIDATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:what is|what's|define|definition of|meaning of|what does)\s+(?:the\s+|a\s+|an\s+)?(.+)$")
        .expect("static regex")
});
static NOISE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(in japanese|in ninjutsu|in bujinkan|term|word|mean|meaning)\b").expect("static regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossaryEntry {
    pub term: String,
    pub definition: String,
}

#[derive(Debug, Clone, Default)]
pub struct Glossary {
    entries: Vec<GlossaryEntry>,
    index: AliasIndex,
}

/// Split `Term - Definition` on the first dash, requiring a non-empty
/// definition after it.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let at = line.char_indices().skip(1).find(|(_, c)| is_dash(*c)).map(|(i, _)| i)?;
    let term = line[..at].trim();
    let rest = line[at..].trim_start_matches(is_dash).trim();
    if term.is_empty() || rest.is_empty() {
        return None;
    }
    Some((term, rest))
}

impl Glossary {
    pub fn parse(text: &str) -> Self {
        let mut g = Self::default();
        let mut last: Option<usize> = None;
        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() || fold(line) == "glossary" {
                continue;
            }
            if let Some((term, definition)) = split_entry(line) {
                match g.index.exact(term) {
                    Some(id) => last = Some(id),
                    None => {
                        let id = g.entries.len();
                        g.index.insert(term, id);
                        g.entries.push(GlossaryEntry { term: term.to_string(), definition: definition.to_string() });
                        last = Some(id);
                    }
                }
                continue;
            }
            if let Some(entry) = last.and_then(|id| g.entries.get_mut(id)) {
                entry.definition = squash_ws(&format!("{} {}", entry.definition, line));
            }
        }
        g
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge entries from another glossary; existing terms win.
    pub fn extend(&mut self, other: Glossary) {
        for entry in other.entries {
            if self.index.exact(&entry.term).is_none() {
                self.index.insert(&entry.term, self.entries.len());
                self.entries.push(entry);
            }
        }
    }
}

/// The term fragment of a definition question.
pub fn extract_candidate(folded: &str) -> String {
    let cand = CANDIDATE_RE.captures(folded).and_then(|c| c.get(1)).map_or(folded, |m| m.as_str());
    let cand = cand.trim().trim_end_matches(['?', '!', '.', ',', ' ']);
    squash_ws(&NOISE_RE.replace_all(cand, ""))
}

impl StructuredCatalog for Glossary {
    type Record = GlossaryEntry;

    fn list_all(&self) -> &[GlossaryEntry] {
        &self.entries
    }

    fn find(&self, candidate: &str) -> Option<&GlossaryEntry> {
        if fold(candidate).chars().count() < 3 {
            return None;
        }
        self.index.lookup(candidate).and_then(|id| self.entries.get(id))
    }

    fn format(&self, entry: &GlossaryEntry, detail: Detail) -> String {
        match detail {
            Detail::Brief => entry.term.clone(),
            Detail::Full => format!("{}: {}", entry.term, entry.definition),
        }
    }
}
