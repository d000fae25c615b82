use std::sync::Arc;

use nttv_core::text::{dedupe_preserve, fold, join_oxford, split_items};
use nttv_core::traits::Extractor;
use nttv_core::types::{Passage, Query};
use nttv_core::vocab::Kyu;

use crate::documents::{passages_from, sources};
use crate::library::Library;
use crate::parsers::rank::{Category, RankBlock, RankTable};
use crate::parsers::{Detail, StructuredCatalog};

const CUMULATIVE_PHRASES: &[&str] = &["need to know", "everything", "cumulative", "so far", "up to"];

/// Generic striking questions get both the kicks and the punches line.
const STRIKE_TRIGGERS: &[&str] = &["strike", "strikes", "striking"];

/// Rank blocks from the retrieved requirements passages, else the library
/// copy, else whatever the passages happen to contain.
pub(crate) fn rank_table<'a>(library: &'a Library, passages: &[Passage], scratch: &'a mut Option<RankTable>) -> &'a RankTable {
    let scoped = RankTable::parse(&passages_from(passages, sources::RANK_REQUIREMENTS));
    if !scoped.is_empty() {
        return scratch.insert(scoped);
    }
    if !library.ranks.is_empty() {
        return &library.ranks;
    }
    let joined = passages.iter().map(|p| p.text.as_str()).collect::<Vec<_>>().join("\n\n");
    scratch.insert(RankTable::parse(&joined))
}

/// A named kata set inside the kata category.
#[derive(Debug, Clone, Copy)]
enum KataSet {
    KihonHappo,
    Sanshin,
}

impl KataSet {
    fn detect(folded: &str) -> Option<Self> {
        if folded.contains("kihon happo") {
            Some(Self::KihonHappo)
        } else if folded.contains("sanshin") || folded.contains("san shin") {
            Some(Self::Sanshin)
        } else {
            None
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::KihonHappo => "Kihon Happo",
            Self::Sanshin => "Sanshin no Kata",
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::KihonHappo => "kihon happo",
            Self::Sanshin => "sanshin",
        }
    }

    /// Items under a field labelled with this set, else every kata item.
    fn items(self, block: &RankBlock) -> Vec<String> {
        let labelled: Vec<String> = block
            .fields
            .iter()
            .filter(|(label, _)| fold(label).contains(self.key()))
            .flat_map(|(_, value)| split_items(value))
            .collect();
        if labelled.is_empty() { block.items(Category::Kata) } else { labelled }
    }
}

/// Requirements for one kyu grade, optionally narrowed to a category.
pub struct RankRequirements {
    library: Arc<Library>,
}

impl RankRequirements {
    pub fn new(library: Arc<Library>) -> Self {
        Self { library }
    }

    fn items(block: &RankBlock, category: Category, kata: Option<KataSet>) -> Vec<String> {
        match (category, kata) {
            (Category::Kata, Some(set)) => set.items(block),
            _ => block.items(category),
        }
    }
}

fn render_items(items: &[String]) -> String {
    if items.is_empty() {
        "(none listed)".to_string()
    } else {
        join_oxford(items).trim_end_matches('.').to_string()
    }
}

impl Extractor for RankRequirements {
    fn name(&self) -> &'static str {
        "rank-requirements"
    }

    fn try_answer(&self, query: &Query, passages: &[Passage]) -> Option<String> {
        let q = query.folded();
        let rank = Kyu::parse(q)?;
        let mut scratch = None;
        let table = rank_table(&self.library, passages, &mut scratch);
        let cumulative = CUMULATIVE_PHRASES.iter().any(|p| q.contains(p));
        let kata = KataSet::detect(q);
        let grades: Vec<&RankBlock> = if cumulative {
            rank.cumulative().into_iter().filter_map(|k| table.block(k)).collect()
        } else {
            table.block(rank).into_iter().collect()
        };
        if grades.is_empty() {
            return None;
        }
        let whole = || grades.iter().map(|b| table.format(b, Detail::Full)).collect::<Vec<_>>().join("\n\n");

        let (categories, strikes) = match Category::detect(q) {
            Some(category) => (vec![category], false),
            None if STRIKE_TRIGGERS.iter().any(|t| q.contains(t)) => (vec![Category::Kicks, Category::Punches], true),
            None => return Some(whole()),
        };

        let suffix = if cumulative { " (cumulative)" } else { "" };
        let mut lines = Vec::new();
        for category in categories {
            let items = dedupe_preserve(grades.iter().flat_map(|b| Self::items(b, category, kata)));
            if strikes && items.is_empty() {
                continue;
            }
            let noun = match (category, kata) {
                (Category::Kata, Some(set)) => set.label(),
                _ => category.noun(),
            };
            lines.push(format!("{} {noun}{suffix}: {}.", rank.label(), render_items(&items)));
        }
        if lines.is_empty() {
            return Some(whole());
        }
        Some(lines.join(" "))
    }
}
