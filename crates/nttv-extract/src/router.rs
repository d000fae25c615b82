//! Fixed-order dispatch from a ranked passage list to a deterministic
//! answer, or to the completion fallback.

use std::sync::Arc;

use tracing::{debug, info};

use nttv_core::traits::Extractor;
use nttv_core::types::{Answer, DetPath, OutputFormat, Passage, Query, SyntheticKind};
use nttv_core::vocab::{asks_soke, mentions_school, LEADER_PHRASES};

use crate::extractors::concepts::KihonHappo;
use crate::extractors::leadership::Leadership;
use crate::extractors::rank::RankRequirements;
use crate::extractors::registry;
use crate::extractors::schools::{DescribeSchool, ListSchools};
use crate::extractors::weapons::WeaponRank;
use crate::library::Library;
use crate::parsers::techniques::parse_row;
use crate::parsers::{Detail, StructuredCatalog};

/// What the router decided.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Answered(Answer),
    /// No deterministic answer; the caller should ask the completion
    /// service. The tag records which branch gave up.
    NeedsCompletion(DetPath),
}

impl Route {
    pub fn answer(&self) -> Option<&Answer> {
        match self {
            Self::Answered(a) => Some(a),
            Self::NeedsCompletion(_) => None,
        }
    }
}

pub struct ExtractorRouter {
    library: Arc<Library>,
    soke: Leadership,
    schools_list: ListSchools,
    school_profile: DescribeSchool,
    leadership_recheck: Leadership,
    weapon_rank: WeaponRank,
    rank_requirements: RankRequirements,
    kihon_happo: KihonHappo,
    dispatcher: Vec<Box<dyn Extractor>>,
}

impl ExtractorRouter {
    pub fn new(library: Arc<Library>, format: OutputFormat) -> Self {
        Self {
            soke: Leadership::strict(library.clone()),
            schools_list: ListSchools::new(library.clone(), format),
            school_profile: DescribeSchool::new(library.clone(), format),
            leadership_recheck: Leadership::broad(library.clone()),
            weapon_rank: WeaponRank::new(library.clone()),
            rank_requirements: RankRequirements::new(library.clone()),
            kihon_happo: KihonHappo::new(library.clone()),
            dispatcher: registry(library.clone()),
            library,
        }
    }

    /// Names of the generic dispatcher entries, in order.
    pub fn dispatcher_names(&self) -> Vec<&'static str> {
        self.dispatcher.iter().map(|e| e.name()).collect()
    }

    pub fn route(&self, query: &Query, passages: &[Passage]) -> Route {
        let route = self.decide(query, passages);
        match &route {
            Route::Answered(a) => info!(det_path = %a.det_path, extractor = %a.extractor, "deterministic answer"),
            Route::NeedsCompletion(path) => info!(det_path = %path, "no deterministic answer"),
        }
        route
    }

    fn decide(&self, query: &Query, passages: &[Passage]) -> Route {
        if let Some(text) = self.technique_row(passages) {
            return answered(text, DetPath::TechniqueSingle, "technique-row");
        }

        let q = query.folded();
        if asks_soke(q) {
            if let Some(route) = attempt(&self.soke, query, passages, DetPath::LeadershipSoke) {
                return route;
            }
        }
        if ListSchools::applies(query) {
            if let Some(route) = attempt(&self.schools_list, query, passages, DetPath::SchoolsList) {
                return route;
            }
        }
        if is_school_profile_query(q) {
            return attempt(&self.school_profile, query, passages, DetPath::SchoolsProfile)
                .unwrap_or(Route::NeedsCompletion(DetPath::SchoolsLlm));
        }

        let staged: [(&dyn Extractor, DetPath); 3] = [
            (&self.leadership_recheck, DetPath::LeadershipFallback),
            (&self.weapon_rank, DetPath::WeaponsRank),
            (&self.rank_requirements, DetPath::RankRequirements),
        ];
        for (extractor, path) in staged {
            if let Some(route) = attempt(extractor, query, passages, path) {
                return route;
            }
        }
        if KihonHappo::applies(query) {
            if let Some(route) = attempt(&self.kihon_happo, query, passages, DetPath::KihonHappo) {
                return route;
            }
        }

        for extractor in &self.dispatcher {
            if let Some(route) = attempt(extractor.as_ref(), query, passages, DetPath::DeterministicCore) {
                return route;
            }
        }
        Route::NeedsCompletion(DetPath::LlmFallback)
    }

    /// The fast path: an injected single-technique row at the head.
    fn technique_row(&self, passages: &[Passage]) -> Option<String> {
        let head = passages.first()?;
        if head.synthetic_kind() != Some(SyntheticKind::TechniqueRow) {
            return None;
        }
        let record = parse_row(&head.text)?;
        Some(self.library.techniques.format(&record, Detail::Full))
    }
}

/// A named school without leader wording; leader questions belong to the
/// leadership re-check.
fn is_school_profile_query(folded: &str) -> bool {
    mentions_school(folded) && !LEADER_PHRASES.iter().any(|p| folded.contains(p))
}

fn attempt(extractor: &dyn Extractor, query: &Query, passages: &[Passage], path: DetPath) -> Option<Route> {
    let text = extractor.try_answer(query, passages)?;
    if text.trim().is_empty() {
        debug!(extractor = extractor.name(), "empty answer ignored");
        return None;
    }
    Some(answered(text, path, extractor.name()))
}

fn answered(text: String, path: DetPath, extractor: &str) -> Route {
    Route::Answered(Answer::new(text, path, extractor))
}
