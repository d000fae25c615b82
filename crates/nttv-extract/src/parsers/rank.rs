//! Rank requirement blocks, one per kyu grade.
//!
//! A block starts at the first line naming the grade and runs until the
//! next grade header. Inside it, `Label: items` lines become fields.

use once_cell::sync::Lazy;
use regex::Regex;

use nttv_core::text::{dedupe_preserve, fold, join_oxford, split_items, split_label, squash_ws, strip_bullet};
use nttv_core::vocab::{names_weapon, Kyu};

use super::{Detail, StructuredCatalog};

static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:#+\s*)?(?:kyu\s*:\s*)?(10|[1-9])\s*(?:st|nd|rd|th)?\s*kyu\b").expect("static regex")
});

/// A requirement category a question can focus on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Kicks,
    Punches,
    Throws,
    Chokes,
    JointLocks,
    Ukemi,
    Kamae,
    Weapons,
    Kata,
}

struct CategorySpec {
    category: Category,
    noun: &'static str,
    triggers: &'static [&'static str],
    labels: &'static [&'static str],
}

const CATEGORIES: &[CategorySpec] = &[
    CategorySpec { category: Category::Kicks, noun: "kicks", triggers: &["kick", "geri", "keri"], labels: &["kick", "keri", "geri"] },
    CategorySpec {
        category: Category::Punches,
        noun: "punches",
        triggers: &["punch", "tsuki", "fist"],
        labels: &["punch", "tsuki"],
    },
    CategorySpec { category: Category::Throws, noun: "throws", triggers: &["throw", "nage"], labels: &["throw", "nage"] },
    CategorySpec {
        category: Category::Chokes,
        noun: "chokes",
        triggers: &["choke", "jime", "strangle"],
        labels: &["choke", "jime"],
    },
    CategorySpec {
        category: Category::JointLocks,
        noun: "joint locks",
        triggers: &["joint lock", "gyaku", "locks"],
        labels: &["joint lock", "gyaku", "locks"],
    },
    CategorySpec {
        category: Category::Ukemi,
        noun: "ukemi",
        triggers: &["ukemi", "breakfall", "roll", "kaiten", "taihenjutsu"],
        labels: &["ukemi", "taihenjutsu", "roll", "kaiten", "breakfall"],
    },
    CategorySpec { category: Category::Kamae, noun: "kamae", triggers: &["kamae", "stance", "posture"], labels: &["kamae"] },
    CategorySpec { category: Category::Weapons, noun: "weapons", triggers: &["weapon"], labels: &["weapon"] },
    CategorySpec {
        category: Category::Kata,
        noun: "kata",
        triggers: &["sanshin", "kihon happo", "kata"],
        labels: &["sanshin", "kihon happo", "kata"],
    },
];

/// Field labels that mix kicks and punches on one line.
const STRIKING_LABELS: &[&str] = &["striking", "strikes", "strike", "dakentaijutsu"];

fn is_striking_label(label: &str) -> bool {
    let l = fold(label);
    STRIKING_LABELS.iter().any(|k| l.contains(k))
}

impl Category {
    fn spec(self) -> &'static CategorySpec {
        CATEGORIES.iter().find(|s| s.category == self).unwrap_or(&CATEGORIES[0])
    }

    pub fn noun(self) -> &'static str {
        self.spec().noun
    }

    /// First category the folded query asks about.
    pub fn detect(folded: &str) -> Option<Self> {
        CATEGORIES.iter().find(|s| s.triggers.iter().any(|t| folded.contains(t))).map(|s| s.category)
    }

    fn owns_label(self, label: &str) -> bool {
        let l = fold(label);
        if self == Self::Kamae && l.contains("weapon") {
            return false;
        }
        if self == Self::Weapons && l.contains("kamae") {
            return false;
        }
        self.spec().labels.iter().any(|k| l.contains(k))
    }

    /// Item-level test for shared striking lines and unlabelled blocks.
    fn owns_item(self, item: &str) -> bool {
        let x = fold(item);
        match self {
            Self::Kicks => x.contains("geri") || x.contains("keri"),
            Self::Punches => {
                x.contains("tsuki") || x.ends_with(" ken") || x.contains(" ken ") || x.contains("uraken") || x.contains("punch")
            }
            Self::Throws => x.contains("nage") || x.contains("otoshi") || x.contains("seoi"),
            Self::Chokes => x.contains("jime"),
            Self::JointLocks => x.contains("gyaku") || x.contains("kudaki") || x.contains("dori"),
            Self::Ukemi => x.contains("ukemi") || x.contains("kaiten") || x.contains("nagare"),
            Self::Kamae => x.contains("kamae"),
            Self::Weapons => names_weapon(&x),
            Self::Kata => x.contains("no kata") || x.contains("sanshin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankBlock {
    pub rank: Kyu,
    pub header: String,
    /// `(label, value)` pairs in document order; unlabeled lines have an
    /// empty label.
    pub fields: Vec<(String, String)>,
}

impl RankBlock {
    /// Items for one category: every item under its own labels, plus the
    /// matching items of a shared striking line; else filtered from every
    /// item in the block.
    pub fn items(&self, category: Category) -> Vec<String> {
        let striking = matches!(category, Category::Kicks | Category::Punches);
        let mut labelled = Vec::new();
        for (label, value) in self.fields.iter().filter(|(l, _)| !l.is_empty()) {
            if category.owns_label(label) {
                labelled.extend(split_items(value));
            } else if striking && is_striking_label(label) {
                labelled.extend(split_items(value).into_iter().filter(|item| category.owns_item(item)));
            }
        }
        if !labelled.is_empty() {
            return dedupe_preserve(labelled);
        }
        self.fields
            .iter()
            .flat_map(|(_, v)| split_items(v))
            .filter(|item| category.owns_item(item))
            .collect()
    }
}

fn header_rank(line: &str) -> Option<Kyu> {
    let folded = fold(line.trim());
    let cap = HEADER_RE.captures(&folded)?;
    cap.get(1)?.as_str().parse::<u8>().ok().and_then(Kyu::new)
}

#[derive(Debug, Clone, Default)]
pub struct RankTable {
    blocks: Vec<RankBlock>,
}

impl RankTable {
    pub fn parse(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        let mut blocks: Vec<RankBlock> = Vec::new();
        for n in (1..=10).rev() {
            let Some(rank) = Kyu::new(n) else { continue };
            if let Some(block) = Self::slice(&lines, rank) {
                blocks.push(block);
            }
        }
        Self { blocks }
    }

    /// Start at the grade's header line, or failing that the first line
    /// naming the grade; stop at the next header.
    fn slice(lines: &[&str], rank: Kyu) -> Option<RankBlock> {
        let start = lines
            .iter()
            .position(|l| header_rank(l) == Some(rank))
            .or_else(|| lines.iter().position(|l| Kyu::all_in(l).contains(&rank)))?;
        let mut fields = Vec::new();
        for line in &lines[start + 1..] {
            if header_rank(line).is_some() {
                break;
            }
            let t = line.trim();
            if t.is_empty() {
                continue;
            }
            let body = strip_bullet(t).unwrap_or(t);
            match split_label(body, 40) {
                Some((label, value)) if !value.is_empty() => fields.push((label.to_string(), squash_ws(value))),
                Some(_) => {}
                None => fields.push((String::new(), squash_ws(body))),
            }
        }
        Some(RankBlock { rank, header: squash_ws(lines[start]), fields })
    }

    pub fn block(&self, rank: Kyu) -> Option<&RankBlock> {
        self.blocks.iter().find(|b| b.rank == rank)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// `"8th Kyu kicks: a, b, and c."`
    pub fn category_line(&self, rank: Kyu, category: Category) -> Option<String> {
        let block = self.block(rank)?;
        let items = block.items(category);
        let list = if items.is_empty() { "(none listed)".to_string() } else { join_oxford(&items) };
        Some(format!("{} {}: {}.", rank.label(), category.noun(), list.trim_end_matches('.')))
    }
}

impl StructuredCatalog for RankTable {
    type Record = RankBlock;

    fn list_all(&self) -> &[RankBlock] {
        &self.blocks
    }

    fn find(&self, candidate: &str) -> Option<&RankBlock> {
        Kyu::parse(candidate).and_then(|k| self.block(k))
    }

    fn format(&self, block: &RankBlock, detail: Detail) -> String {
        if detail == Detail::Brief {
            return block.header.clone();
        }
        let mut lines = vec![format!("{} requirements:", block.rank.label())];
        for (label, value) in &block.fields {
            if label.is_empty() {
                lines.push(format!("- {value}"));
            } else {
                lines.push(format!("- {label}: {value}"));
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
NTTV Rank Requirements
9th Kyu
Kamae: Shizen no Kamae; Ichimonji no Kamae
Kicks: Zenpo Geri
Weapon Kamae: Hanbo Kamae
8th Kyu
Kicks: Sokuho Geri; Koho Geri; Sakui Geri; Happo Geri
Striking: Kikaku Ken, Shuto
7th Kyu
Kicks: Tobi Geri
";

    #[test]
    fn blocks_stop_at_the_next_grade() {
        let t = RankTable::parse(DOC);
        let eighth = t.block(Kyu::new(8).expect("kyu")).expect("8th");
        assert_eq!(eighth.items(Category::Kicks), vec!["Sokuho Geri", "Koho Geri", "Sakui Geri", "Happo Geri"]);
        let ninth = t.block(Kyu::new(9).expect("kyu")).expect("9th");
        assert_eq!(ninth.items(Category::Kamae), vec!["Shizen no Kamae", "Ichimonji no Kamae"]);
    }

    #[test]
    fn category_line_reports_missing_items() {
        let t = RankTable::parse(DOC);
        let seventh = Kyu::new(7).expect("kyu");
        assert_eq!(t.category_line(seventh, Category::Throws).as_deref(), Some("7th Kyu throws: (none listed)."));
        assert_eq!(t.category_line(seventh, Category::Kicks).as_deref(), Some("7th Kyu kicks: Tobi Geri."));
    }

    #[test]
    fn detects_category_from_query() {
        assert_eq!(Category::detect("what are the kicks for 8th kyu"), Some(Category::Kicks));
        assert_eq!(Category::detect("requirements for 8th kyu"), None);
        assert_eq!(Category::detect("what are the punches for 8th kyu"), Some(Category::Punches));
    }

    #[test]
    fn striking_line_splits_into_kicks_and_punches() {
        let t = RankTable::parse("8th Kyu\nStriking: Sokuho Geri; Koho Geri; Kikaku Ken; Shuto Ken\n7th Kyu\n");
        let eighth = t.block(Kyu::new(8).expect("kyu")).expect("8th");
        assert_eq!(eighth.items(Category::Kicks), vec!["Sokuho Geri", "Koho Geri"]);
        assert_eq!(eighth.items(Category::Punches), vec!["Kikaku Ken", "Shuto Ken"]);
    }

    #[test]
    fn static_patterns_compile() {
        Lazy::force(&HEADER_RE);
    }
}
