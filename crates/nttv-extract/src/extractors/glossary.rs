use std::sync::Arc;

use nttv_core::text::{contains_phrase, fold};
use nttv_core::traits::Extractor;
use nttv_core::types::{Passage, Query};

use crate::documents::{passages_from, sources};
use crate::library::Library;
use crate::parsers::glossary::{extract_candidate, Glossary};
use crate::parsers::techniques::TechniqueTable;
use crate::parsers::{Detail, StructuredCatalog};

const QUESTION_LEADS: &[&str] =
    &["what is", "what's", "define", "definition of", "meaning of", "what does", "translate"];
const OPEN_WORDS: &[&str] = &["who", "when", "where", "why", "how"];

/// Words that mark a technique or kata name rather than a vocabulary term.
const TECHNIQUE_HINTS: &[&str] =
    &["gyaku", "kudaki", "dori", "gatame", "otoshi", "nage", "seoi", "kote", "musha", "juji", "kaiten", "gake", "ori"];

/// "What is X?" phrasing, or a bare term of one to three words.
fn looks_like_definition_question(q: &str) -> bool {
    if QUESTION_LEADS.iter().any(|l| q.contains(l)) {
        return true;
    }
    let words: Vec<&str> = q.split_whitespace().collect();
    (1..=3).contains(&words.len()) && !words.iter().any(|w| OPEN_WORDS.contains(&w.trim_matches(|c: char| !c.is_alphanumeric())))
}

/// Dictionary definition of a single term. Runs last and backs off from
/// anything that names a technique.
pub struct GlossaryTerm {
    library: Arc<Library>,
}

impl GlossaryTerm {
    pub fn new(library: Arc<Library>) -> Self {
        Self { library }
    }

    fn names_technique(&self, q: &str, candidate: &str, passages: &[Passage]) -> bool {
        if q.contains("kata") || q.contains("waza") || TECHNIQUE_HINTS.iter().any(|h| contains_phrase(q, h)) {
            return true;
        }
        if candidate.chars().count() < 3 {
            return false;
        }
        let retrieved = TechniqueTable::parse(&passages_from(passages, sources::TECHNIQUES), "");
        let is_name = |c: &str| {
            [&retrieved, &self.library.techniques]
                .iter()
                .any(|t| t.list_all().iter().any(|r| fold(&r.name) == c))
        };
        let words: Vec<&str> = candidate.split_whitespace().collect();
        is_name(candidate)
            || [2, 1].iter().any(|&span| words.len() >= span && is_name(&words[words.len() - span..].join(" ")))
    }
}

impl Extractor for GlossaryTerm {
    fn name(&self) -> &'static str {
        "glossary"
    }

    fn try_answer(&self, query: &Query, passages: &[Passage]) -> Option<String> {
        let q = query.folded();
        if !looks_like_definition_question(q) {
            return None;
        }
        let candidate = fold(&extract_candidate(q));
        if self.names_technique(q, &candidate, passages) {
            return None;
        }
        let scratch;
        let glossary = if self.library.glossary.is_empty() {
            scratch = Glossary::parse(&passages_from(passages, sources::GLOSSARY));
            &scratch
        } else {
            &self.library.glossary
        };
        let entry = glossary.find(&candidate)?;
        Some(glossary.format(entry, Detail::Full))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nttv_core::types::ChunkRecord;

    fn glossary_passage() -> Passage {
        let rec = ChunkRecord {
            text: "Glossary\nZanshin - Remaining mind; continued awareness\nKamae - Posture".into(),
            source: "data/Glossary.txt".into(),
            page: None,
            priority: 2,
        };
        Passage::retrieved(&rec, 0.4)
    }

    #[test]
    fn defines_terms_and_bare_words() {
        let ex = GlossaryTerm::new(Arc::new(Library::default()));
        let ans = ex.try_answer(&Query::new("What does zanshin mean?"), &[glossary_passage()]);
        assert_eq!(ans.as_deref(), Some("Zanshin: Remaining mind; continued awareness"));
        let bare = ex.try_answer(&Query::new("kamae"), &[glossary_passage()]);
        assert_eq!(bare.as_deref(), Some("Kamae: Posture"));
    }

    #[test]
    fn backs_off_for_techniques_and_open_questions() {
        let ex = GlossaryTerm::new(Arc::new(Library::default()));
        assert!(ex.try_answer(&Query::new("What is Oni Kudaki?"), &[glossary_passage()]).is_none());
        assert!(ex.try_answer(&Query::new("why zanshin"), &[glossary_passage()]).is_none());
    }
}
