//! Query-aware rescoring of raw similarity hits.
//!
//! The score of a candidate is its similarity plus a handful of fixed
//! boosts and penalties. Every signal is a pure function of the query text,
//! the passage text and its metadata, so identical inputs always produce
//! identical orderings.

use serde::Serialize;
use std::cmp::Ordering;

use nttv_core::text::fold;
use nttv_core::types::{Passage, Query};
use nttv_core::vocab::{asks_soke, find_school, names_weapon, Kyu};

#[derive(Debug, Clone, PartialEq)]
pub struct RerankWeights {
    /// Boost per document tier 1, 2, 3.
    pub priority: [f32; 3],
    pub ryu_keyword: f32,
    pub school_keyword: f32,
    pub bujinkan_keyword: f32,
    pub kihon_happo: f32,
    pub sanshin: f32,
    pub kyusho: f32,
    pub boshi_shito: f32,
    pub weapon: f32,
    pub weapon_source: f32,
    pub school: f32,
    pub soke: f32,
    pub leadership_source: f32,
    pub exact_rank: f32,
    pub kihon_kyusho_confusion: f32,
    pub sanshin_kyusho_confusion: f32,
    pub lore: f32,
    pub length_divisor: f32,
    pub length_cap: f32,
}

impl Default for RerankWeights {
    fn default() -> Self {
        Self {
            priority: [0.0, 0.20, 0.40],
            ryu_keyword: 0.10,
            school_keyword: 0.05,
            bujinkan_keyword: 0.05,
            kihon_happo: 0.60,
            sanshin: 0.45,
            kyusho: 0.25,
            boshi_shito: 0.45,
            weapon: 0.55,
            weapon_source: 0.25,
            school: 0.45,
            soke: 0.60,
            leadership_source: 0.20,
            exact_rank: 0.50,
            kihon_kyusho_confusion: 0.15,
            sanshin_kyusho_confusion: 0.12,
            lore: 0.10,
            length_divisor: 2000.0,
            length_cap: 0.3,
        }
    }
}

/// Per-signal contributions for one candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub base: f32,
    pub priority: f32,
    pub keyword: f32,
    pub topic: f32,
    pub exact_rank: f32,
    pub length_penalty: f32,
    pub offtopic_penalty: f32,
    pub lore_penalty: f32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f32 {
        self.base + self.priority + self.keyword + self.topic + self.exact_rank
            - self.length_penalty
            - self.offtopic_penalty
            - self.lore_penalty
    }
}

const LORE_MARKERS: &[&str] = &["sarutobi", "sasuke", "leaping from tree", "legend", "folklore"];
const WEAPON_QUESTION_PHRASES: &[&str] = &["weapon", "what rank", "introduced at", "when do i learn"];

#[derive(Debug, Clone, Default)]
pub struct Reranker {
    weights: RerankWeights,
}

impl Reranker {
    pub fn new(weights: RerankWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &RerankWeights {
        &self.weights
    }

    pub fn score(&self, query: &Query, passage: &Passage) -> ScoreBreakdown {
        let w = &self.weights;
        let q = query.folded();
        let t = fold(&passage.text);
        let source = passage.source_name().to_lowercase();

        let priority = match passage.priority {
            1..=3 => w.priority[usize::from(passage.priority) - 1],
            _ if source.contains("nttv rank requirements") => w.priority[2],
            _ if source.contains("nttv training reference") || source.contains("technique descriptions") => w.priority[1],
            _ => 0.0,
        };

        let mut keyword = 0.0;
        if t.contains("ryu") {
            keyword += w.ryu_keyword;
        }
        if t.contains("school") {
            keyword += w.school_keyword;
        }
        if t.contains("bujinkan") {
            keyword += w.bujinkan_keyword;
        }

        let mut topic = 0.0;
        let both = |term: &str| q.contains(term) && t.contains(term);
        if both("kihon happo") {
            topic += w.kihon_happo;
        }
        let ask_sanshin = q.contains("sanshin") || q.contains("san shin");
        if ask_sanshin && (t.contains("sanshin") || t.contains("san shin")) {
            topic += w.sanshin;
        }
        if both("kyusho") {
            topic += w.kyusho;
        }
        let boshi = |s: &str| s.contains("boshi ken") || s.contains("shito ken");
        if boshi(q) && boshi(&t) {
            topic += w.boshi_shito;
        }
        let ask_weapon = names_weapon(q) || WEAPON_QUESTION_PHRASES.iter().any(|p| q.contains(p));
        if ask_weapon {
            if names_weapon(&t) || t.contains("[weapon]") || t.contains("weapons reference") {
                topic += w.weapon;
            }
            if source.contains("weapons reference") || source.contains("glossary") {
                topic += w.weapon_source;
            }
        }
        if find_school(q).is_some() && find_school(&t).is_some() {
            topic += w.school;
        }
        if asks_soke(q) {
            let leadership_file = source.contains("leadership");
            if leadership_file || t.contains("[sokeship]") || t.contains(" soke") {
                topic += w.soke;
                if leadership_file {
                    topic += w.leadership_source;
                }
            }
        }

        let text_ranks = Kyu::all_in(&t);
        let exact_rank = Kyu::all_in(q).iter().filter(|k| text_ranks.contains(k)).count() as f32 * w.exact_rank;

        let mut offtopic_penalty = 0.0;
        if q.contains("kihon happo") && t.contains("kyusho") {
            offtopic_penalty += w.kihon_kyusho_confusion;
        }
        if q.contains("kyusho") && t.contains("kihon happo") {
            offtopic_penalty += w.kihon_kyusho_confusion;
        }
        if ask_sanshin && t.contains("kyusho") {
            offtopic_penalty += w.sanshin_kyusho_confusion;
        }

        let lore_penalty = if LORE_MARKERS.iter().any(|m| t.contains(m)) { w.lore } else { 0.0 };
        let length_penalty = (passage.text.chars().count() as f32 / w.length_divisor).min(w.length_cap);

        ScoreBreakdown {
            base: passage.base_score,
            priority,
            keyword,
            topic,
            exact_rank,
            length_penalty,
            offtopic_penalty,
            lore_penalty,
        }
    }

    /// Rescore, stable-sort descending and keep the best `k`.
    pub fn rerank(&self, query: &Query, candidates: Vec<Passage>, k: usize) -> Vec<Passage> {
        let mut scored: Vec<Passage> = candidates
            .iter()
            .map(|p| {
                let breakdown = self.score(query, p);
                tracing::debug!(source = %p.source, ?breakdown, "rerank");
                p.with_rerank_score(breakdown.total())
            })
            .collect();
        scored.sort_by(|a, b| b.rerank_score.partial_cmp(&a.rerank_score).unwrap_or(Ordering::Equal));
        scored.truncate(k);
        scored
    }
}
