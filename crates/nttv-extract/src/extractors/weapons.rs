use std::sync::Arc;

use nttv_core::traits::Extractor;
use nttv_core::types::{Passage, Query};

use crate::documents::{passages_from, sources};
use crate::library::Library;
use crate::parsers::weapons::WeaponTable;
use crate::parsers::{Detail, StructuredCatalog};

const KATANA_PARTS_TEXT: &str = "\
Parts of the katana:
- Tsuka: handle
- Tsuka Kishiri: handle endcap
- Saya: sheath
- Sageo: cord for the sheath
- Tsuba: handguard
- Ha: blade edge
- Hi: blood gutter
- Hamon: temper line
- Mune: back of the sword
- Kissaki: the tip or point area that has a ridgeline.";

const SHURIKEN_TYPES_TEXT: &str = "\
Types of shuriken:

1) Bō-shuriken (spike-type)
   - Straight spike, like a needle, dart, or large nail.
   - Usually steel or iron, often 12 to 18 cm long.
   - Commonly thrown with a single spin from the center or tail.

2) Hira-shuriken (flat “star” type)
   - Flat, bladed forms: the classic ninja “throwing star”.
   - Typically 4 to 8 points, edges sharpened.
   - Thrown with a slicing rotation at short range.

3) Senban-shuriken
   - Square, four-point subtype of hira-shuriken.
   - Can be stuck in the ground as a trap or thrown edge-first.

4) Needle / hari-gata shuriken
   - Very thin needle-like forms.
   - Good for precise, stealthy insertion and often historically linked to poison use.

5) Modern improvised throwing tools
   - Chopsticks, pens, nails, hex keys and similar objects.
   - If it fits in the hand, can be controlled, and can pierce or distract, you can train it as shuriken.";

/// Weapons parsed from retrieved reference passages, else the library table.
pub(crate) fn weapon_table<'a>(library: &'a Library, passages: &[Passage], scratch: &'a mut Option<WeaponTable>) -> &'a WeaponTable {
    let text = passages_from(passages, sources::WEAPONS);
    let parsed = WeaponTable::parse(&text);
    if parsed.is_empty() {
        return &library.weapons;
    }
    scratch.insert(parsed)
}

/// Weapon profiles plus the katana-parts and shuriken-types answers.
pub struct WeaponProfile {
    library: Arc<Library>,
}

impl WeaponProfile {
    pub fn new(library: Arc<Library>) -> Self {
        Self { library }
    }
}

impl Extractor for WeaponProfile {
    fn name(&self) -> &'static str {
        "weapon-profile"
    }

    fn try_answer(&self, query: &Query, passages: &[Passage]) -> Option<String> {
        let q = query.folded();
        if q.contains("katana") && ["part", "terminology", "terms", "name"].iter().any(|w| q.contains(w)) {
            return Some(KATANA_PARTS_TEXT.to_string());
        }
        if q.contains("shuriken") && (q.contains("type") || q.contains("kind")) {
            return Some(SHURIKEN_TYPES_TEXT.to_string());
        }
        let mut scratch = None;
        let table = weapon_table(&self.library, passages, &mut scratch);
        let record = table.named_in(q)?;
        Some(table.format(record, Detail::Full))
    }
}

/// "At what rank do I learn kusari fundo?"
pub struct WeaponRank {
    library: Arc<Library>,
}

impl WeaponRank {
    pub fn new(library: Arc<Library>) -> Self {
        Self { library }
    }
}

impl Extractor for WeaponRank {
    fn name(&self) -> &'static str {
        "weapon-rank"
    }

    fn try_answer(&self, query: &Query, passages: &[Passage]) -> Option<String> {
        let q = query.folded();
        if !["rank", "kyu", "introduced"].iter().any(|w| q.contains(w)) {
            return None;
        }
        let mut scratch = None;
        let table = weapon_table(&self.library, passages, &mut scratch);
        let record = table.named_in(q)?;
        let rank = record.intro_rank()?;
        Some(format!("You first study {} at {rank}.", record.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nttv_core::types::SyntheticKind;

    const DOC: &str = "\
[WEAPON] Kusari Fundo
ALIASES: weighted chain, kusari-fundo
TYPE: Flexible
KAMAE: Ichimonji no Kamae
CORE ACTIONS: wrapping, striking
RANKS: Introduced at 4th Kyu
";

    fn passages() -> Vec<Passage> {
        vec![Passage::synthetic(SyntheticKind::Weapons, DOC.into(), "data/NTTV Weapons Reference.txt".into())]
    }

    #[test]
    fn rank_question_names_the_intro_grade() {
        let ex = WeaponRank::new(Arc::new(Library::default()));
        let ans = ex.try_answer(&Query::new("At what rank do I learn kusari fundo?"), &passages());
        assert_eq!(ans.as_deref(), Some("You first study Kusari Fundo at 4th Kyu."));
        assert!(ex.try_answer(&Query::new("Tell me about the kusari fundo"), &passages()).is_none());
    }

    #[test]
    fn profile_and_canned_answers() {
        let ex = WeaponProfile::new(Arc::new(Library::default()));
        let ans = ex.try_answer(&Query::new("Explain the weighted chain weapon"), &passages()).expect("profile");
        assert!(ans.starts_with("Kusari Fundo weapon profile:"));
        assert!(ans.contains("Core actions include: wrapping, striking."));
        let parts = ex.try_answer(&Query::new("What are the parts of the katana?"), &[]).expect("katana");
        assert!(parts.starts_with("Parts of the katana:"));
        let kinds = ex.try_answer(&Query::new("What types of shuriken are there?"), &[]).expect("shuriken");
        assert!(kinds.contains("Senban-shuriken"));
    }
}
