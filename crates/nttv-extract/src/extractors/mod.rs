//! Deterministic topic extractors.
//!
//! Each extractor answers one family of questions from the ranked
//! passages and the shared [`Library`]. Returning `None` hands the query
//! to the next extractor in the registry.

pub mod concepts;
pub mod etiquette;
pub mod glossary;
pub mod leadership;
pub mod rank;
pub mod schools;
pub mod techniques;
pub mod training;
pub mod weapons;

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use nttv_core::traits::Extractor;

use crate::library::Library;

static RANKED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,2}(?:st|nd|rd|th)\s+(?:kyu|dan)\b").expect("static regex"));

const LIST_WORDS: &[&str] = &["list", "what are", "which", "name the"];

/// Questions pinned to a grade ("... at 6th kyu", "what rank ...").
pub(crate) fn is_rank_question(folded: &str) -> bool {
    RANKED_RE.is_match(folded) || folded.contains(" rank")
}

pub(crate) fn wants_list(folded: &str) -> bool {
    LIST_WORDS.iter().any(|w| folded.contains(w))
}

/// The generic dispatcher's entries, in precedence order.
pub fn registry(library: Arc<Library>) -> Vec<Box<dyn Extractor>> {
    vec![
        Box::new(techniques::TechniqueDiff::new(library.clone())),
        Box::new(concepts::Kyusho::new(library.clone())),
        Box::new(concepts::Sanshin),
        Box::new(training::Dakentaijutsu::new(library.clone())),
        Box::new(training::Taihenjutsu::new(library.clone())),
        Box::new(training::NageWaza::new(library.clone())),
        Box::new(training::JimeWaza::new(library.clone())),
        Box::new(techniques::GyakuWaza::new(library.clone())),
        Box::new(techniques::Kamae::new(library.clone())),
        Box::new(etiquette::Etiquette),
        Box::new(weapons::WeaponProfile::new(library.clone())),
        Box::new(techniques::TechniqueLookup::new(library.clone())),
        Box::new(glossary::GlossaryTerm::new(library)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_order_is_fixed() {
        let names: Vec<&str> = registry(Arc::new(Library::default())).iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec![
                "technique-diff",
                "kyusho",
                "sanshin",
                "dakentaijutsu",
                "taihenjutsu",
                "nage-waza",
                "jime-waza",
                "gyaku-waza",
                "kamae",
                "etiquette",
                "weapon-profile",
                "technique",
                "glossary",
            ]
        );
    }

    #[test]
    fn rank_question_detection() {
        assert!(is_rank_question("what throws do i learn at 6th kyu"));
        assert!(is_rank_question("at what rank is this taught"));
        assert!(!is_rank_question("what are the nage waza"));
    }

    #[test]
    fn static_patterns_compile() {
        Lazy::force(&RANKED_RE);
    }
}
