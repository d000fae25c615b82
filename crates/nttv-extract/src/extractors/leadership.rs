use std::sync::Arc;

use nttv_core::traits::Extractor;
use nttv_core::types::{Passage, Query};
use nttv_core::vocab::{find_school, LEADER_PHRASES, SOKE_TERMS};

use crate::documents::{passages_from, sources};
use crate::library::Library;
use crate::parsers::lineage::soke_of;

/// School-specific sōke lookup.
///
/// The strict form fires on sōke/grandmaster wording; the broad form
/// re-checks "head of", "who leads" and similar phrasings.
pub struct Leadership {
    library: Arc<Library>,
    triggers: &'static [&'static str],
    name: &'static str,
}

impl Leadership {
    pub fn strict(library: Arc<Library>) -> Self {
        Self { library, triggers: SOKE_TERMS, name: "leadership" }
    }

    pub fn broad(library: Arc<Library>) -> Self {
        Self { library, triggers: LEADER_PHRASES, name: "leadership-recheck" }
    }
}

impl Extractor for Leadership {
    fn name(&self) -> &'static str {
        self.name
    }

    fn try_answer(&self, query: &Query, passages: &[Passage]) -> Option<String> {
        if !query.mentions_any(self.triggers) {
            return None;
        }
        let school = find_school(query.text())?;

        // Whole leadership document first so chunk boundaries cannot hide a row.
        let leadership = passages_from(passages, sources::LEADERSHIP);
        let found = soke_of(&leadership, school)
            .or_else(|| passages.iter().find_map(|p| soke_of(&p.text, school)))
            .or_else(|| soke_of(&self.library.documents.text_of(sources::LEADERSHIP), school))?;
        Some(found.sentence())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nttv_core::types::SyntheticKind;

    fn leadership_passage() -> Passage {
        Passage::synthetic(
            SyntheticKind::Leadership,
            "Gyokko Ryu Kosshijutsu - Ishizuka Tetsuji\nKoto Ryu Koppojutsu - Sakasai Norio".into(),
            "data/Bujinkan Leadership and Wisdom.txt".into(),
        )
    }

    #[test]
    fn answers_soke_questions_with_typos() {
        let ex = Leadership::strict(Arc::new(Library::default()));
        let ans = ex.try_answer(&Query::new("Who is the soke of Gyokku Ryu?"), &[leadership_passage()]);
        assert_eq!(ans.as_deref(), Some("Ishizuka Tetsuji is the current sōke of Gyokko Ryū."));
    }

    #[test]
    fn broad_form_needs_leader_wording() {
        let ex = Leadership::broad(Arc::new(Library::default()));
        assert!(ex.try_answer(&Query::new("Tell me about Koto Ryu"), &[leadership_passage()]).is_none());
        let ans = ex.try_answer(&Query::new("Who is the head of Koto Ryu?"), &[leadership_passage()]);
        assert_eq!(ans.as_deref(), Some("Sakasai Norio is the current sōke of Koto Ryū."));
    }
}
