//! Extractors backed by the technique table: comparisons, joint locks,
//! kamae and single-technique lookup.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use nttv_core::text::{fold, join_oxford, split_items};
use nttv_core::traits::Extractor;
use nttv_core::types::{Passage, Query};
use nttv_core::vocab::Kyu;

use super::rank::rank_table;
use super::weapons::weapon_table;
use crate::documents::{passages_from, sources};
use crate::library::Library;
use crate::parsers::techniques::{TechniqueRecord, TechniqueTable};
use crate::parsers::{title_case, Detail, StructuredCatalog};

/// Technique rows from the retrieved descriptions passages, else the
/// library table.
fn technique_table<'a>(
    library: &'a Library,
    passages: &[Passage],
    scratch: &'a mut Option<TechniqueTable>,
) -> &'a TechniqueTable {
    let source = passages.iter().find(|p| p.source_matches(sources::TECHNIQUES)).map(|p| p.source.clone());
    let parsed = TechniqueTable::parse(&passages_from(passages, sources::TECHNIQUES), source.as_deref().unwrap_or_default());
    if parsed.is_empty() {
        return &library.techniques;
    }
    scratch.insert(parsed)
}

fn yes_no(v: Option<bool>) -> &'static str {
    match v {
        Some(true) => "Yes",
        Some(false) => "No",
        None => "-",
    }
}

const DIFF_PHRASES: &[&str] = &["difference between", "different from", "diff between", " vs ", "versus", "compare "];
const DIFF_FUZZY_THRESHOLD: f64 = 0.75;

static PAIR_FORMS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"difference between\s+(.+?)\s+and\s+(.+)",
        r"compare\s+(.+?)\s+and\s+(.+)",
        r"(.+?)\s+vs\.?\s+(.+)",
        r"(.+?)\s+versus\s+(.+)",
    ]
    .into_iter()
    .map(|re| Regex::new(re).expect("static regex"))
    .collect()
});

/// The two names in a comparison question.
fn extract_pair(lower: &str) -> Option<(String, String)> {
    let q = lower.trim().trim_end_matches(['?', '.', '!', ' ']);
    PAIR_FORMS.iter().find_map(|re| {
        let cap = re.captures(q)?;
        Some((cap.get(1)?.as_str().trim().to_string(), cap.get(2)?.as_str().trim().to_string()))
    })
}

/// "the omote gyaku" -> "omote gyaku".
fn strip_lead(name: &str) -> &str {
    name.trim_start_matches("the ").trim()
}

/// Field-by-field comparison of two techniques.
pub struct TechniqueDiff {
    library: Arc<Library>,
}

impl TechniqueDiff {
    pub fn new(library: Arc<Library>) -> Self {
        Self { library }
    }

    pub fn applies(query: &Query) -> bool {
        DIFF_PHRASES.iter().any(|p| query.lower().contains(p))
    }

    fn render(a: &TechniqueRecord, b: &TechniqueRecord) -> String {
        let text_fields = [
            ("Translation", a.translation.as_str(), b.translation.as_str()),
            ("Type", a.kind.as_str(), b.kind.as_str()),
            ("Rank intro", a.rank.as_str(), b.rank.as_str()),
            ("Primary focus", a.primary_focus.as_str(), b.primary_focus.as_str()),
            ("Safety", a.safety.as_str(), b.safety.as_str()),
        ];
        let mut rows: Vec<(&str, String, String)> =
            text_fields.iter().map(|(l, x, y)| (*l, x.trim().to_string(), y.trim().to_string())).collect();
        rows.push(("Partner required", yes_no(a.partner_required).to_string(), yes_no(b.partner_required).to_string()));
        rows.push(("Solo", yes_no(a.solo).to_string(), yes_no(b.solo).to_string()));
        rows.push(("Description", a.description.trim().to_string(), b.description.trim().to_string()));

        let mut lines = vec![format!("Difference between {} and {}:", a.name, b.name)];
        for (label, x, y) in rows {
            if x.is_empty() && y.is_empty() {
                continue;
            }
            let or_dash = |v: &str| if v.is_empty() { "-".to_string() } else { v.to_string() };
            lines.push(format!("\n{label}:"));
            lines.push(format!("- {}: {}", a.name, or_dash(&x)));
            lines.push(format!("- {}: {}", b.name, or_dash(&y)));
        }
        lines.join("\n")
    }
}

impl Extractor for TechniqueDiff {
    fn name(&self) -> &'static str {
        "technique-diff"
    }

    fn try_answer(&self, query: &Query, passages: &[Passage]) -> Option<String> {
        if !Self::applies(query) {
            return None;
        }
        let (left, right) = extract_pair(query.lower())?;
        let mut scratch = None;
        let table = technique_table(&self.library, passages, &mut scratch);
        let resolve = |name: &str| {
            let name = strip_lead(name);
            table.find(name).or_else(|| table.fuzzy(name, DIFF_FUZZY_THRESHOLD))
        };
        let (a, b) = (resolve(&left)?, resolve(&right)?);
        Some(Self::render(a, b))
    }
}

const RANK_INTENT: &[&str] = &["what rank", "which rank", "at what rank"];
const LOCK_LIST_WORDS: &[&str] = &["list", "what are", "which", "name the", "show me"];

fn name_with_translation(r: &TechniqueRecord) -> String {
    if r.translation.is_empty() {
        r.name.clone()
    } else {
        format!("{} - {}", r.name, r.translation)
    }
}

/// Joint locks: lists, per-grade lists, intro rank and full profiles.
pub struct GyakuWaza {
    library: Arc<Library>,
}

impl GyakuWaza {
    pub fn new(library: Arc<Library>) -> Self {
        Self { library }
    }

    fn profile(r: &TechniqueRecord) -> String {
        let mut headline = r.name.clone();
        if !r.translation.is_empty() {
            headline.push_str(&format!(" - {}", r.translation));
        }
        if !r.kind.is_empty() {
            headline.push_str(&format!(" ({})", r.kind));
        }
        let rank = if r.rank.is_empty() { "Not Ranked" } else { r.rank.as_str() };
        let mut lines = vec![headline];
        lines.push(if r.in_rank == Some(true) { format!("Rank Intro: {rank} (in-rank)") } else { format!("Rank Intro: {rank}") });
        if !r.japanese.is_empty() {
            lines.push(format!("Japanese: {}", r.japanese));
        }
        if !r.primary_focus.is_empty() {
            lines.push(format!("Primary Focus: {}", r.primary_focus));
        }
        if !r.safety.is_empty() {
            lines.push(format!("Safety: {}", r.safety));
        }
        if let Some(v) = r.partner_required {
            lines.push(format!("Partner Required: {}", yes_no(Some(v))));
        }
        if let Some(v) = r.solo {
            lines.push(format!("Can Train Solo: {}", yes_no(Some(v))));
        }
        if !r.tags.is_empty() {
            lines.push(format!("Tags: {}", r.tags.join(" | ")));
        }
        if !r.description.is_empty() {
            lines.push(String::new());
            lines.push("Definition:".to_string());
            lines.push(r.description.clone());
        }
        lines.join("\n")
    }
}

impl Extractor for GyakuWaza {
    fn name(&self) -> &'static str {
        "gyaku-waza"
    }

    fn try_answer(&self, query: &Query, passages: &[Passage]) -> Option<String> {
        let q = query.folded();
        let mut scratch = None;
        let table = technique_table(&self.library, passages, &mut scratch);
        let locks: Vec<&TechniqueRecord> = table.joint_locks().collect();
        if locks.is_empty() {
            return None;
        }
        let named = table.all_in_text(q).into_iter().find(|r| r.is_joint_lock());
        let topical = q.contains("gyaku")
            || q.contains("joint lock")
            || (q.contains("reversal") && (q.contains("lock") || q.contains("joint")));
        if !topical && named.is_none() {
            return None;
        }

        if let Some(rank) = Kyu::parse(q).filter(|_| q.contains("joint lock") || q.contains("gyaku")) {
            let at_rank: Vec<String> =
                locks.iter().filter(|r| Kyu::parse(&r.rank) == Some(rank)).map(|r| name_with_translation(r)).collect();
            if !at_rank.is_empty() {
                return Some(format!("Joint locks at {}: {}", rank.label(), at_rank.join("; ")));
            }
        }

        let lock_words = q.contains("gyaku") || q.contains("joint lock") || q.contains("locks");
        if lock_words && LOCK_LIST_WORDS.iter().any(|w| q.contains(w)) {
            let all: Vec<String> = locks.iter().map(|r| name_with_translation(r)).collect();
            return Some(format!("Gyaku Waza / joint locks in this curriculum: {}", all.join("; ")));
        }

        let lock = named?;
        let wants_rank = RANK_INTENT.iter().any(|p| q.contains(p)) || (q.contains("rank") && q.contains("learn"));
        if wants_rank {
            let rank = if lock.rank.is_empty() { "Not Ranked" } else { lock.rank.as_str() };
            let tail = if lock.in_rank == Some(true) { " and is part of the in-rank requirements." } else { "" };
            return Some(format!("{} is introduced at {rank}{tail}", lock.name));
        }
        Some(Self::profile(lock))
    }
}

/// Kamae for a grade, for a weapon, or one named kamae.
pub struct Kamae {
    library: Arc<Library>,
}

impl Kamae {
    pub fn new(library: Arc<Library>) -> Self {
        Self { library }
    }

    fn for_rank(&self, rank: Kyu, passages: &[Passage]) -> Option<String> {
        let mut scratch = None;
        let table = rank_table(&self.library, passages, &mut scratch);
        let block = table.block(rank)?;
        let items: Vec<String> = block
            .fields
            .iter()
            .filter(|(label, _)| fold(label) == "kamae")
            .flat_map(|(_, value)| split_items(value))
            .collect();
        Some(if items.is_empty() {
            format!("No specific kamae are listed for {}.", rank.label())
        } else {
            format!("Kamae for {}: {}", rank.label(), join_oxford(&items))
        })
    }

    fn for_weapon(&self, q: &str, passages: &[Passage]) -> Option<String> {
        let mut scratch = None;
        let table = weapon_table(&self.library, passages, &mut scratch);
        let (alias, record) = table.kamae_for(q)?;
        Some(format!("{} kamae: {}", title_case(&fold(&alias)), join_oxford(&record.kamae)))
    }

    fn named(&self, q: &str, passages: &[Passage]) -> Option<String> {
        let mut scratch = None;
        let table = technique_table(&self.library, passages, &mut scratch);
        let record = table.all_in_text(q).into_iter().find(|r| r.is_kamae())?;
        let mut lines = vec![format!("{}:", record.name)];
        if !record.translation.is_empty() {
            lines.push(format!("- Translation: {}", record.translation));
        }
        if !record.rank.is_empty() {
            lines.push(format!("- Rank intro: {}", record.rank));
        }
        let desc = if record.description.is_empty() { "(not listed)." } else { record.description.as_str() };
        lines.push(format!("- Description: {desc}"));
        Some(lines.join("\n"))
    }
}

impl Extractor for Kamae {
    fn name(&self) -> &'static str {
        "kamae"
    }

    fn try_answer(&self, query: &Query, passages: &[Passage]) -> Option<String> {
        let q = query.folded();
        if !q.contains("kamae") && !q.contains("stance") {
            return None;
        }
        Kyu::parse(q)
            .and_then(|rank| self.for_rank(rank, passages))
            .or_else(|| self.for_weapon(q, passages))
            .or_else(|| self.named(q, passages))
    }
}

/// One technique row in bullet form.
pub struct TechniqueLookup {
    library: Arc<Library>,
}

impl TechniqueLookup {
    pub fn new(library: Arc<Library>) -> Self {
        Self { library }
    }
}

impl Extractor for TechniqueLookup {
    fn name(&self) -> &'static str {
        "technique"
    }

    fn try_answer(&self, query: &Query, passages: &[Passage]) -> Option<String> {
        let mut scratch = None;
        let table = technique_table(&self.library, passages, &mut scratch);
        let record = table.resolve(query)?;
        Some(table.format(record, Detail::Full))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nttv_core::types::SyntheticKind;

    const TABLE: &str = "\
Omote Gyaku,表逆,Outside Reverse,Joint Lock,8th Kyu,yes,Wrist,Moderate,yes,no,wrist|lock,Turn the wrist outward.
Ura Gyaku,裏逆,Inside Reverse,Joint Lock,8th Kyu,yes,Wrist,Moderate,yes,no,wrist|lock,Turn the wrist inward.
Oni Kudaki,鬼砕,Demon Crusher,Joint Lock,7th Kyu,no,Shoulder,High,yes,no,shoulder,Bent-arm shoulder lock.
Hicho no Kamae,飛鳥の構,Flying Bird Posture,Kamae,9th Kyu,yes,Balance,Low,no,yes,kamae,Stand on one leg.
";

    fn passages() -> Vec<Passage> {
        vec![Passage::synthetic(
            SyntheticKind::TechniqueDescriptions,
            TABLE.into(),
            "data/Technique Descriptions.md".into(),
        )]
    }

    fn lib() -> Arc<Library> {
        Arc::new(Library::default())
    }

    #[test]
    fn diff_compares_field_by_field() {
        let ex = TechniqueDiff::new(lib());
        let ans = ex
            .try_answer(&Query::new("What's the difference between Omote Gyaku and Ura Gyaku?"), &passages())
            .expect("diff");
        assert!(ans.starts_with("Difference between Omote Gyaku and Ura Gyaku:"));
        assert!(ans.contains("\nTranslation:\n- Omote Gyaku: Outside Reverse\n- Ura Gyaku: Inside Reverse"));
        assert!(ans.contains("\nPartner required:\n- Omote Gyaku: Yes\n- Ura Gyaku: Yes"));
        assert!(ex.try_answer(&Query::new("What is Omote Gyaku?"), &passages()).is_none());
    }

    #[test]
    fn diff_accepts_vs_form() {
        let ex = TechniqueDiff::new(lib());
        let ans = ex.try_answer(&Query::new("omote gyaku vs oni kudaki"), &passages()).expect("vs");
        assert!(ans.starts_with("Difference between Omote Gyaku and Oni Kudaki:"));
    }

    #[test]
    fn gyaku_lists_ranks_and_profiles() {
        let ex = GyakuWaza::new(lib());
        let at_rank = ex.try_answer(&Query::new("What joint locks are at 8th kyu?"), &passages());
        assert_eq!(
            at_rank.as_deref(),
            Some("Joint locks at 8th Kyu: Omote Gyaku - Outside Reverse; Ura Gyaku - Inside Reverse")
        );
        let intro = ex.try_answer(&Query::new("At what rank do we learn Oni Kudaki?"), &passages());
        assert_eq!(intro.as_deref(), Some("Oni Kudaki is introduced at 7th Kyu"));
        let profile = ex.try_answer(&Query::new("Explain Oni Kudaki"), &passages()).expect("profile");
        assert!(profile.starts_with("Oni Kudaki - Demon Crusher (Joint Lock)\nRank Intro: 7th Kyu\n"));
        assert!(profile.ends_with("Definition:\nBent-arm shoulder lock."));
    }

    #[test]
    fn kamae_by_name() {
        let ex = Kamae::new(lib());
        let ans = ex.try_answer(&Query::new("What is Hicho no Kamae?"), &passages());
        assert_eq!(
            ans.as_deref(),
            Some("Hicho no Kamae:\n- Translation: Flying Bird Posture\n- Rank intro: 9th Kyu\n- Description: Stand on one leg.")
        );
    }

    #[test]
    fn lookup_renders_bullets() {
        let ex = TechniqueLookup::new(lib());
        let ans = ex.try_answer(&Query::new("What is Ura Gyaku?"), &passages()).expect("lookup");
        assert!(ans.starts_with("Ura Gyaku:\n- Translation: Inside Reverse\n- Type: Joint Lock"));
        assert!(ans.ends_with("- Definition: Turn the wrist inward."));
    }

    #[test]
    fn static_patterns_compile() {
        Lazy::force(&PAIR_FORMS);
    }
}
