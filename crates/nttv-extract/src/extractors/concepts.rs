//! Named concepts with a fixed shape: kyusho points, the Sanshin and the
//! Kihon Happo.

use std::sync::Arc;

use nttv_core::text::{fold, join_oxford};
use nttv_core::traits::Extractor;
use nttv_core::types::{Passage, Query};

use crate::documents::{passages_from, sources};
use crate::library::Library;
use crate::parsers::kihon::{KihonSubsets, CANONICAL};
use crate::parsers::kyusho::KyushoTable;
use crate::parsers::{Detail, StructuredCatalog};

const KYUSHO_LIST_CAP: usize = 20;

pub struct Kyusho {
    library: Arc<Library>,
}

impl Kyusho {
    pub fn new(library: Arc<Library>) -> Self {
        Self { library }
    }
}

impl Extractor for Kyusho {
    fn name(&self) -> &'static str {
        "kyusho"
    }

    fn try_answer(&self, query: &Query, passages: &[Passage]) -> Option<String> {
        let q = query.folded();
        if !q.contains("kyusho") && !q.contains("pressure point") {
            return None;
        }
        let scratch;
        let table = if self.library.kyusho.is_empty() {
            scratch = KyushoTable::parse(&passages_from(passages, sources::KYUSHO));
            &scratch
        } else {
            &self.library.kyusho
        };
        if table.is_empty() {
            return None;
        }

        if q.contains("list") || (q.contains("what") && q.contains("points")) {
            let names: Vec<&str> = table.list_all().iter().take(KYUSHO_LIST_CAP).map(|p| p.name.as_str()).collect();
            return Some(format!("Kyusho points: {}", join_oxford(&names)));
        }
        table.named_in(q).map(|p| table.format(p, Detail::Full))
    }
}

const SANSHIN_KATA: [&str; 5] = ["Chi no Kata", "Sui no Kata", "Ka no Kata", "Fu no Kata", "Ku no Kata"];
const SANSHIN_CANONICAL: &str =
    "Sanshin no Kata (Five Elements) consists of Chi no Kata, Sui no Kata, Ka no Kata, Fu no Kata, and Ku no Kata.";
const SANSHIN_WINDOW: usize = 6;

/// The five elemental forms, from context when at least three are named.
pub struct Sanshin;

impl Sanshin {
    fn applies(q: &str) -> bool {
        q.contains("sanshin") || q.contains("san shin") || (q.contains("five") && q.contains("elements") && q.contains("kata"))
    }
}

impl Extractor for Sanshin {
    fn name(&self) -> &'static str {
        "sanshin"
    }

    fn try_answer(&self, query: &Query, passages: &[Passage]) -> Option<String> {
        if !Self::applies(query.folded()) {
            return None;
        }
        let blob = fold(&passages.iter().take(SANSHIN_WINDOW).map(|p| p.text.as_str()).collect::<Vec<_>>().join("\n\n"));
        if blob.contains("sanshin") || blob.contains("san shin") {
            let found: Vec<&str> = SANSHIN_KATA.iter().copied().filter(|k| blob.contains(&fold(k))).collect();
            if found.len() >= 3 {
                return Some(format!("Sanshin no Kata consists of {}.", join_oxford(&found)));
            }
        }
        Some(SANSHIN_CANONICAL.to_string())
    }
}

const KIHON_WINDOW: usize = 8;
const KIHON_MIN_TEXT: usize = 20;

/// Kihon Happo split into its two subsets.
///
/// Falls back to the corpus-wide composite, then a definition sentence,
/// then the canonical one-liner.
pub struct KihonHappo {
    library: Arc<Library>,
}

impl KihonHappo {
    pub fn new(library: Arc<Library>) -> Self {
        Self { library }
    }

    pub fn applies(query: &Query) -> bool {
        query.folded().contains("kihon happo")
    }
}

fn first_sentence(text: &str) -> &str {
    text.char_indices()
        .find(|(i, c)| matches!(c, '.' | '!' | '?') && text[i + 1..].starts_with(char::is_whitespace))
        .map_or(text, |(i, _)| &text[..=i])
}

impl Extractor for KihonHappo {
    fn name(&self) -> &'static str {
        "kihon-happo"
    }

    fn try_answer(&self, query: &Query, passages: &[Passage]) -> Option<String> {
        if !Self::applies(query) {
            return None;
        }
        let texts = passages
            .iter()
            .take(KIHON_WINDOW)
            .map(|p| p.text.as_str())
            .filter(|t| t.chars().count() >= KIHON_MIN_TEXT);
        let subsets = KihonSubsets::harvest(texts);
        if !subsets.is_empty() {
            return Some(subsets.render());
        }
        if let Some(composite) = self.library.kihon_composite() {
            return Some(composite);
        }
        let definition = subsets.definition.as_deref().or(self.library.kihon.definition.as_deref());
        Some(definition.map_or_else(|| CANONICAL.to_string(), |d| first_sentence(d).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nttv_core::types::ChunkRecord;

    fn passage(text: &str, source: &str) -> Passage {
        Passage::retrieved(&ChunkRecord { text: text.into(), source: source.into(), page: None, priority: 1 }, 0.5)
    }

    #[test]
    fn sanshin_reads_context_or_falls_back() {
        let ctx = passage("Sanshin no Kata: Chi no Kata, Sui no Kata, Ka no Kata.", "data/training.txt");
        let ans = Sanshin.try_answer(&Query::new("What is the Sanshin?"), &[ctx]);
        assert_eq!(ans.as_deref(), Some("Sanshin no Kata consists of Chi no Kata, Sui no Kata, and Ka no Kata."));
        let bare = Sanshin.try_answer(&Query::new("What are the five elements kata?"), &[]);
        assert_eq!(bare.as_deref(), Some(SANSHIN_CANONICAL));
        assert!(Sanshin.try_answer(&Query::new("What is kamae?"), &[]).is_none());
    }

    #[test]
    fn kyusho_lists_and_looks_up_points() {
        let lib = Arc::new(Library::default());
        let ctx = passage("Ura Kimon: Lower ribs\nJinchu: Under the nose", "data/KYUSHO.txt");
        let ex = Kyusho::new(lib);
        let list = ex.try_answer(&Query::new("List the kyusho points"), &[ctx.clone()]);
        assert_eq!(list.as_deref(), Some("Kyusho points: Ura Kimon and Jinchu"));
        let one = ex.try_answer(&Query::new("Where is the Jinchu pressure point?"), &[ctx]);
        assert_eq!(one.as_deref(), Some("Jinchu: Under the nose"));
    }

    #[test]
    fn kihon_happo_prefers_context_subsets() {
        let ex = KihonHappo::new(Arc::new(Library::default()));
        let ctx = passage("Kosshi Kihon Sanpo: Ichimonji no Kata, Hicho no Kata, Jumonji no Kata", "data/training.txt");
        let ans = ex.try_answer(&Query::new("What is the Kihon Happo?"), &[ctx]).expect("answer");
        assert!(ans.starts_with(CANONICAL));
        assert!(ans.contains("Ichimonji no Kata"));
        let bare = ex.try_answer(&Query::new("Explain kihon happo"), &[]);
        assert_eq!(bare.as_deref(), Some(CANONICAL));
    }
}
