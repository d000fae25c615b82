//! Shared domain vocabulary: schools, grades, weapon and leadership terms.
//!
//! All alias strings are stored pre-folded with hyphens written as spaces,
//! matching [`school_key`].

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::text::{contains_phrase, fold};

#[derive(Debug, PartialEq, Eq)]
pub struct School {
    /// Roster name, e.g. "Gyokko Ryu".
    pub name: &'static str,
    /// Name with the long vowel marked, used in leadership answers.
    pub display: &'static str,
    pub aliases: &'static [&'static str],
}

/// The nine schools in their traditional roster order.
pub static SCHOOLS: [School; 9] = [
    School { name: "Togakure Ryu", display: "Togakure Ryū", aliases: &["togakure ryu", "togakure ryu ninpo", "togakure"] },
    School { name: "Gyokushin Ryu", display: "Gyokushin Ryū", aliases: &["gyokushin ryu", "gyokushin"] },
    School { name: "Kumogakure Ryu", display: "Kumogakure Ryū", aliases: &["kumogakure ryu", "kumogakure"] },
    School { name: "Gikan Ryu", display: "Gikan Ryū", aliases: &["gikan ryu", "gikan"] },
    School { name: "Gyokko Ryu", display: "Gyokko Ryū", aliases: &["gyokko ryu", "gyokku ryu", "gyokko"] },
    School { name: "Koto Ryu", display: "Koto Ryū", aliases: &["koto ryu", "koto ryu koppojutsu", "koto"] },
    School { name: "Shinden Fudo Ryu", display: "Shinden Fudo Ryū", aliases: &["shinden fudo ryu", "shinden fudo"] },
    School { name: "Kukishinden Ryu", display: "Kukishinden Ryū", aliases: &["kukishinden ryu", "kukishinden"] },
    School {
        name: "Takagi Yoshin Ryu",
        display: "Takagi Yoshin Ryū",
        aliases: &["takagi yoshin ryu", "hoko ryu takagi yoshin ryu", "takagi yoshin", "takagi"],
    },
];

/// Folded form with hyphens as spaces: "Gyokko-Ryū" -> "gyokko ryu".
pub fn school_key(s: &str) -> String {
    fold(&s.replace(['-', '‐', '–', '—'], " "))
}

static RYU_GUESS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b([a-z]+(?: [a-z]+)?) ryu\b").expect("static regex"));

/// First school named in `text`, by alias, then by a "<word> ryu" guess.
pub fn find_school(text: &str) -> Option<&'static School> {
    let key = school_key(text);
    if let Some(s) = SCHOOLS.iter().find(|s| s.aliases.iter().any(|a| contains_phrase(&key, a))) {
        return Some(s);
    }
    RYU_GUESS.captures_iter(&key).find_map(|cap| {
        let guess = cap.get(1)?.as_str();
        let last = guess.rsplit(' ').next().unwrap_or(guess);
        SCHOOLS.iter().find(|s| school_key(s.name).starts_with(guess) || school_key(s.name).starts_with(last))
    })
}

/// True when the text names a school or uses the "... ryu" shape.
pub fn mentions_school(text: &str) -> bool {
    let key = school_key(text);
    find_school(text).is_some() || contains_phrase(&key, "ryu")
}

/// A kyu grade, 10 (most junior) down to 1 (most senior).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Kyu(u8);

static KYU_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(10|[1-9])\s*(st|nd|rd|th)?\s*kyu\b").expect("static regex"));

impl Kyu {
    pub fn new(n: u8) -> Option<Self> {
        (1..=10).contains(&n).then_some(Self(n))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// "8th Kyu".
    pub fn label(self) -> String {
        let suffix = match self.0 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        };
        format!("{}{} Kyu", self.0, suffix)
    }

    /// First grade mentioned in the text.
    pub fn parse(text: &str) -> Option<Self> {
        Self::all_in(text).into_iter().next()
    }

    /// Every grade mentioned, in order of appearance, without repeats.
    pub fn all_in(text: &str) -> Vec<Self> {
        let mut out = Vec::new();
        for cap in KYU_RE.captures_iter(text) {
            let parsed = cap.get(1).and_then(|m| m.as_str().parse::<u8>().ok()).and_then(Self::new);
            if let Some(k) = parsed {
                if !out.contains(&k) {
                    out.push(k);
                }
            }
        }
        out
    }

    /// Grades taught before this one, most junior first, this one last.
    pub fn cumulative(self) -> Vec<Self> {
        (self.0..=10).rev().filter_map(Self::new).collect()
    }
}

impl fmt::Display for Kyu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Weapon names as they appear in folded text.
pub const WEAPON_TERMS: &[&str] = &[
    "hanbo", "rokushakubo", "rokushaku", "katana", "tanto", "shoto", "kusari", "fundo", "kusari fundo",
    "kyoketsu", "shoge", "shuko", "jutte", "jitte", "tessen", "kunai", "shuriken", "senban", "shaken",
];

/// Extra phrasings that pull in the weapons reference.
pub const WEAPON_RANK_PHRASES: &[&str] =
    &["weapon", "what rank", "when do i learn", "introduced at", "throwing star", "throwing spike"];

pub const SOKE_TERMS: &[&str] = &["soke", "grandmaster", "headmaster", "current head", "current grandmaster"];

/// Leadership phrasings not covered by [`SOKE_TERMS`].
pub const LEADER_PHRASES: &[&str] = &["head of", "leader of", "who leads", "who runs", "lineage holder", "in charge of"];

pub fn asks_soke(folded_query: &str) -> bool {
    SOKE_TERMS.iter().any(|t| folded_query.contains(t))
}

pub fn names_weapon(folded: &str) -> bool {
    WEAPON_TERMS.iter().any(|w| folded.contains(w))
}
