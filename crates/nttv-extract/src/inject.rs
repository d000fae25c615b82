//! Synthetic whole-document passages for canonical topics.
//!
//! Each topic contributes at most one passage. Synthetic passages sort
//! ahead of every retrieved passage by their fixed score and are never
//! rescored against them.

use std::sync::Arc;

use tracing::debug;

use nttv_core::types::{Passage, Query, SyntheticKind};
use nttv_core::vocab::{names_weapon, SOKE_TERMS, WEAPON_RANK_PHRASES};

use crate::documents::sources;
use crate::extractors::techniques::TechniqueDiff;
use crate::library::{Library, KIHON_COMPOSITE_SOURCE};

const RANK_TRIGGERS: &[&str] = &["kyu", "shodan", "rank requirement"];
const SCHOOL_TRIGGERS: &[&str] = &["school", "ryu", "bujinkan"];
const TECHNIQUE_TRIGGERS: &[&str] = &["technique", "kata"];
const RANK_LOOKUP_PHRASES: &[&str] = &["what rank", "which rank", "kyu"];

/// Topics in injection order.
const TOPICS: [SyntheticKind; 7] = [
    SyntheticKind::RankRequirements,
    SyntheticKind::Leadership,
    SyntheticKind::Schools,
    SyntheticKind::Weapons,
    SyntheticKind::TechniqueDescriptions,
    SyntheticKind::KihonHappo,
    SyntheticKind::TechniqueRow,
];

pub struct PassageInjector {
    library: Arc<Library>,
}

impl PassageInjector {
    pub fn new(library: Arc<Library>) -> Self {
        Self { library }
    }

    /// New list with the triggered synthetic passages in front.
    ///
    /// A topic whose text is already injected is skipped, and a retrieved
    /// passage with the same text as a synthetic one is dropped, so
    /// injecting an injected list returns it unchanged.
    pub fn inject(&self, query: &Query, ranked: &[Passage]) -> Vec<Passage> {
        let mut synthetic: Vec<Passage> = ranked.iter().filter(|p| p.is_synthetic()).cloned().collect();

        for kind in TOPICS {
            let Some(passage) = self.build(kind, query) else { continue };
            if synthetic.iter().any(|p| p.text == passage.text) {
                debug!(topic = ?kind, "synthetic passage already present");
                continue;
            }
            debug!(topic = ?kind, source = %passage.source, chars = passage.text.len(), "injected synthetic passage");
            synthetic.push(passage);
        }

        synthetic.sort_by(|a, b| b.rerank_score.total_cmp(&a.rerank_score));
        let retrieved: Vec<Passage> = ranked
            .iter()
            .filter(|p| !p.is_synthetic() && !synthetic.iter().any(|s| s.text == p.text))
            .cloned()
            .collect();
        synthetic.extend(retrieved);
        synthetic
    }

    fn build(&self, kind: SyntheticKind, query: &Query) -> Option<Passage> {
        let q = query.folded();
        match kind {
            SyntheticKind::RankRequirements => {
                self.whole_document(kind, query.mentions_any(RANK_TRIGGERS), sources::RANK_REQUIREMENTS)
            }
            SyntheticKind::Leadership => self.whole_document(kind, query.mentions_any(SOKE_TERMS), sources::LEADERSHIP),
            SyntheticKind::Schools => self.whole_document(kind, query.mentions_any(SCHOOL_TRIGGERS), sources::SCHOOLS),
            SyntheticKind::Weapons => {
                let wanted = names_weapon(q) || query.mentions_any(WEAPON_RANK_PHRASES);
                self.whole_document(kind, wanted, sources::WEAPONS)
            }
            SyntheticKind::TechniqueDescriptions => {
                let wanted = query.mentions_any(TECHNIQUE_TRIGGERS) || self.library.techniques.find_in_text(q).is_some();
                self.whole_document(kind, wanted, sources::TECHNIQUES)
            }
            SyntheticKind::KihonHappo => {
                if !q.contains("kihon happo") {
                    return None;
                }
                let text = self.library.kihon_composite()?;
                Some(Passage::synthetic(kind, text, KIHON_COMPOSITE_SOURCE.to_string()))
            }
            SyntheticKind::TechniqueRow => {
                if TechniqueDiff::applies(query) || query.mentions_any(RANK_LOOKUP_PHRASES) {
                    return None;
                }
                let table = &self.library.techniques;
                let record = table.resolve(query)?;
                Some(Passage::synthetic(kind, record.raw.clone(), table.source().to_string()))
            }
        }
    }

    fn whole_document(&self, kind: SyntheticKind, wanted: bool, needle: &str) -> Option<Passage> {
        if !wanted {
            return None;
        }
        let (source, text) = self.library.documents.gather(needle)?;
        if text.trim().is_empty() {
            return None;
        }
        Some(Passage::synthetic(kind, text, source))
    }
}
