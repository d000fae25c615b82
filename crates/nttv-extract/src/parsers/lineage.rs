//! School-to-sōke pairs from the leadership document.
//!
//! Three shapes are read, in this order: pipe rows (`school | person`),
//! `School: Person` lines and a handful of sentence forms.

use once_cell::sync::Lazy;
use regex::Regex;

use nttv_core::text::squash_ws;
use nttv_core::vocab::{find_school, school_key, School};

const QUALIFIERS: &[&str] = &[
    "koshijutsu", "kosshijutsu", "koppojutsu", "dakentaijutsu", "jutaijutsu", "happo bikenjutsu", "happo hikenjutsu",
    "hikenjutsu", "ninpo taijutsu", "ninjutsu", "budo taijutsu",
];

static KV_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z0-9 .’'ʻ`\-ōūāī]+?)\s*[:\-–—]\s*(.+?)\s*$").expect("static regex"));

/// Sentence forms; `true` when the school comes first.
static SENTENCE_FORMS: Lazy<Vec<(Regex, bool)>> = Lazy::new(|| {
    [
        (r"(?i)^\s*(.+?)\s+(?:has\s+been|was|became)\s+(?:named|appointed|designated\s+as\s+)?(?:the\s+)?s[oō]ke\s+of\s+(.+?)\s*\.?\s*$", false),
        (r"(?i)^\s*(.+?)\s+is\s+(?:the\s+)?(?:current\s+)?s[oō]ke\s+of\s+(.+?)\s*\.?\s*$", false),
        (r"(?i)^\s*s[oō]ke\s+of\s+(.+?)\s+is\s+(.+?)\s*\.?\s*$", true),
        (r"(?i)^\s*(.+?)\s+s[oō]ke\s*[:\-–—]\s*(.+?)\s*$", true),
    ]
    .into_iter()
    .map(|(re, school_first)| (Regex::new(re).expect("static regex"), school_first))
    .collect()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Succession {
    pub school: &'static School,
    pub person: String,
}

impl Succession {
    pub fn sentence(&self) -> String {
        format!("{} is the current sōke of {}.", self.person, self.school.display)
    }
}

/// Map a school-ish phrase ("Gyokko Ryu Koshijutsu") to the roster.
pub fn school_of(school_like: &str) -> Option<&'static School> {
    let mut key = school_key(school_like);
    for q in QUALIFIERS {
        key = key.replace(q, " ");
    }
    find_school(&squash_ws(&key))
}

fn has_letter(s: &str) -> bool {
    s.chars().any(char::is_alphabetic)
}

/// Raw `(school-like, person)` pairs in harvest order.
pub fn harvest_pairs(text: &str) -> Vec<(String, String)> {
    let lines: Vec<&str> = text.lines().collect();
    let mut pairs = Vec::new();

    for line in lines.iter().filter(|l| l.contains('|')) {
        let cols: Vec<&str> = line.split('|').map(str::trim).collect();
        if cols.len() >= 2 && cols[0].len() >= 4 && cols[1].len() >= 2 && has_letter(cols[0]) && has_letter(cols[1]) {
            pairs.push((squash_ws(cols[0]), squash_ws(cols[1])));
        }
    }

    for line in &lines {
        // A colon wins over dashes, which also appear inside hyphenated names.
        let split = line
            .split_once(':')
            .or_else(|| KV_RE.captures(line).and_then(|cap| Some((cap.get(1)?.as_str(), cap.get(2)?.as_str()))));
        if let Some((school, person)) = split {
            let (school, person) = (squash_ws(school), squash_ws(person));
            if school.len() >= 4 && person.len() >= 2 {
                pairs.push((school, person));
            }
        }
    }

    for line in lines.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
        for (re, school_first) in SENTENCE_FORMS.iter() {
            let Some(cap) = re.captures(line) else { continue };
            let a = squash_ws(cap.get(1).map_or("", |m| m.as_str()));
            let b = squash_ws(cap.get(2).map_or("", |m| m.as_str()));
            let (school, person) = if *school_first { (a, b) } else { (b, a) };
            if school.len() >= 4 && person.len() >= 2 {
                pairs.push((school, person));
            }
        }
    }
    pairs
}

/// First pair in `text` whose school-like side maps to `school`.
pub fn soke_of(text: &str, school: &'static School) -> Option<Succession> {
    harvest_pairs(text).into_iter().find_map(|(school_like, person)| {
        let person = person.trim_end_matches('.').trim().to_string();
        (school_of(&school_like) == Some(school) && has_letter(&person)).then_some(Succession { school, person })
    })
}
