//! School profile blocks.
//!
//! A block opens on a `School:` header or a line ending in ` ryu:` and
//! runs until `---` or the next header. Recognized fields are
//! translation, type, focus, weapons and notes.

use once_cell::sync::Lazy;
use regex::Regex;

use nttv_core::text::fold;
use nttv_core::vocab::{find_school, school_key, School, SCHOOLS};

use super::{Detail, StructuredCatalog};

pub const FIELD_KEYS: [&str; 5] = ["translation", "type", "focus", "weapons", "notes"];

static FIELD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*([A-Za-z][A-Za-z ]{1,20}):\s*(.*)$").expect("static regex"));
static TRANSLATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)translation[: ]+["“](.+?)["”]"#).expect("static regex"));

const FOCUS_TERMS: &[&str] = &[
    "stealth", "infiltration", "surprise", "espionage", "distance", "timing", "kamae", "kosshijutsu", "koppojutsu",
    "striking", "bone", "joint", "throws", "grappling", "dakentaijutsu", "jutaijutsu",
];
const WEAPON_TERMS: &[&str] = &[
    "shuriken", "kunai", "kodachi", "katana", "yari", "naginata", "hanbo", "kusari fundo", "kyoketsu shoge", "tessen",
    "jutte", "jitte",
];

const LIST_TRIGGERS: &[&str] = &[
    "what are the schools of the bujinkan",
    "list the schools of the bujinkan",
    "nine schools of the bujinkan",
    "what are the nine schools",
    "list the nine schools",
    "what schools are in the bujinkan",
    "which schools are in the bujinkan",
];

pub fn is_list_query(folded: &str) -> bool {
    LIST_TRIGGERS.iter().any(|t| folded.contains(t))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolProfile {
    pub school: &'static School,
    /// `(key, value)` for the recognized keys, in [`FIELD_KEYS`] order.
    pub fields: Vec<(&'static str, String)>,
}

impl SchoolProfile {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }
}

fn looks_like_header(line: &str) -> bool {
    let t = school_key(line.trim());
    t.starts_with("school:") || t.starts_with("school -") || t.ends_with(" ryu:") || t.ends_with(" ryu :")
}

/// `(header, body lines)` per block.
fn slice_blocks(text: &str) -> Vec<(&str, Vec<&str>)> {
    let lines: Vec<&str> = text.lines().collect();
    let starts: Vec<usize> = lines.iter().enumerate().filter(|(_, l)| looks_like_header(l)).map(|(i, _)| i).collect();
    starts
        .iter()
        .enumerate()
        .map(|(j, &i)| {
            let next = starts.get(j + 1).copied().unwrap_or(lines.len());
            let end = (i + 1..next).find(|&k| lines[k].trim() == "---").unwrap_or(next);
            (lines[i], lines[i + 1..end].to_vec())
        })
        .collect()
}

fn order_fields(mut raw: Vec<(String, String)>) -> Vec<(&'static str, String)> {
    raw.retain(|(_, v)| !v.trim().is_empty());
    FIELD_KEYS
        .iter()
        .filter_map(|key| raw.iter().find(|(k, _)| k == key).map(|(_, v)| (*key, v.trim().to_string())))
        .collect()
}

/// `Key: value` lines; an unlabeled line continues the previous key.
fn parse_fields(body: &[&str]) -> Vec<(&'static str, String)> {
    let mut data: Vec<(String, String)> = Vec::new();
    for line in body {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(cap) = FIELD_RE.captures(line) {
            let key = fold(cap.get(1).map_or("", |m| m.as_str()).trim());
            let val = cap.get(2).map_or("", |m| m.as_str()).trim().to_string();
            match data.iter_mut().find(|(k, _)| *k == key) {
                Some((_, existing)) => {
                    existing.push(' ');
                    existing.push_str(&val);
                }
                None => data.push((key, val)),
            }
        } else if let Some((_, last)) = data.last_mut() {
            last.push(' ');
            last.push_str(line.trim());
        }
    }
    order_fields(data)
}

/// Field guesses for prose that lacks `Key:` lines.
fn infer_fields(lines: &[&str]) -> Vec<(&'static str, String)> {
    let parsed = parse_fields(lines);
    if !parsed.is_empty() {
        return parsed;
    }
    let text = lines.join("\n");
    let n = fold(&text);
    let mut raw = Vec::new();
    if let Some(cap) = TRANSLATION_RE.captures(&text) {
        raw.push(("translation".to_string(), cap.get(1).map_or("", |m| m.as_str()).trim().to_string()));
    }
    if n.contains("ninpo") || n.contains("ninjutsu") {
        raw.push(("type".to_string(), "Ninjutsu".to_string()));
    } else if ["kosshijutsu", "koppojutsu", "dakentaijutsu", "jutaijutsu", "samurai"].iter().any(|k| n.contains(k)) {
        raw.push(("type".to_string(), "Samurai".to_string()));
    }
    let mut focus: Vec<&str> = FOCUS_TERMS.iter().copied().filter(|t| n.contains(t)).collect();
    focus.sort_unstable();
    if !focus.is_empty() {
        raw.push(("focus".to_string(), focus.join(", ")));
    }
    let mut weapons: Vec<&str> = WEAPON_TERMS.iter().copied().filter(|t| n.contains(t)).collect();
    weapons.sort_unstable();
    if !weapons.is_empty() {
        raw.push(("weapons".to_string(), weapons.join(", ")));
    }
    order_fields(raw)
}

#[derive(Debug, Clone, Default)]
pub struct SchoolProfiles {
    profiles: Vec<SchoolProfile>,
    text: String,
}

impl SchoolProfiles {
    pub fn parse(text: &str) -> Self {
        let mut profiles: Vec<SchoolProfile> = Vec::new();
        for (header, body) in slice_blocks(text) {
            let Some(school) = find_school(header) else { continue };
            if profiles.iter().any(|p| p.school == school) {
                continue;
            }
            let fields = parse_fields(&body);
            if !fields.is_empty() {
                profiles.push(SchoolProfile { school, fields });
            }
        }
        Self { profiles, text: text.to_string() }
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Schools with a block header, in canonical roster order.
    pub fn roster(&self) -> Vec<&'static School> {
        let named: Vec<&'static School> =
            slice_blocks(&self.text).iter().filter_map(|(h, _)| find_school(h)).collect();
        SCHOOLS.iter().filter(|s| named.contains(s)).collect()
    }

    /// Profile for a school, falling back to inference over a window of
    /// lines around its first mention.
    pub fn profile(&self, school: &'static School) -> Option<SchoolProfile> {
        if let Some(p) = self.profiles.iter().find(|p| p.school == school) {
            return Some(p.clone());
        }
        let lines: Vec<&str> = self.text.lines().collect();
        let hit = lines.iter().position(|l| {
            let k = school_key(l);
            school.aliases.iter().any(|a| k.contains(a))
        })?;
        let start = (hit.saturating_sub(3)..hit)
            .rev()
            .find(|&j| lines[j].trim() == "---" || looks_like_header(lines[j]))
            .map_or(hit.saturating_sub(3), |j| j + 1);
        let mut end = (hit + 25).min(lines.len());
        if let Some(stop) = (hit + 1..end).find(|&j| lines[j].trim() == "---" || looks_like_header(lines[j])) {
            end = stop;
        }
        let fields = infer_fields(&lines[start..end]);
        (!fields.is_empty()).then_some(SchoolProfile { school, fields })
    }

    pub fn render_list(&self, detail: Detail) -> Option<String> {
        let names: Vec<&str> = self.roster().iter().map(|s| s.name).collect();
        if names.is_empty() {
            return None;
        }
        let title = "The Nine Schools of the Bujinkan";
        Some(match detail {
            Detail::Full => {
                std::iter::once(format!("{title}:")).chain(names.iter().map(|n| format!("- {n}"))).collect::<Vec<_>>().join("\n")
            }
            Detail::Brief => format!("{title}: {}.", names.join(", ")),
        })
    }
}

fn capitalize(key: &str) -> String {
    let mut c = key.chars();
    c.next().map(|f| f.to_uppercase().chain(c).collect()).unwrap_or_default()
}

impl StructuredCatalog for SchoolProfiles {
    type Record = SchoolProfile;

    fn list_all(&self) -> &[SchoolProfile] {
        &self.profiles
    }

    fn find(&self, candidate: &str) -> Option<&SchoolProfile> {
        let school = find_school(candidate)?;
        self.profiles.iter().find(|p| p.school == school)
    }

    fn format(&self, p: &SchoolProfile, detail: Detail) -> String {
        match detail {
            Detail::Full => std::iter::once(format!("{}:", p.school.name))
                .chain(p.fields.iter().map(|(k, v)| format!("- {}: {v}", capitalize(k))))
                .collect::<Vec<_>>()
                .join("\n"),
            Detail::Brief => {
                let segs: Vec<String> = p
                    .fields
                    .iter()
                    .map(|(k, v)| match *k {
                        "translation" => format!("“{}”.", v.trim_end_matches('.')),
                        _ => format!("{}: {}.", capitalize(k), v.trim_end_matches('.')),
                    })
                    .collect();
                format!("{}: {}", p.school.name, segs.join(" "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
School: Gyokko Ryu
Translation: Jewel Tiger School
Type: Samurai
Focus: Kosshijutsu,
  attacking muscle and sinew
---
Koto Ryu:
Translation: Tiger Knocking Down School
Weapons: shuriken
---
Togakure Ryu is a ninpo school known for stealth and shuriken use.
";

    #[test]
    fn parses_blocks_with_continuations() {
        let s = SchoolProfiles::parse(DOC);
        let gyokko = s.find("gyokko ryu").expect("gyokko");
        assert_eq!(gyokko.field("focus"), Some("Kosshijutsu, attacking muscle and sinew"));
        assert_eq!(
            s.format(gyokko, Detail::Full),
            "Gyokko Ryu:\n- Translation: Jewel Tiger School\n- Type: Samurai\n- Focus: Kosshijutsu, attacking muscle and sinew"
        );
    }

    #[test]
    fn infers_free_prose_profiles() {
        let s = SchoolProfiles::parse(DOC);
        let togakure = s.profile(&SCHOOLS[0]).expect("togakure");
        assert_eq!(togakure.field("type"), Some("Ninjutsu"));
        assert_eq!(togakure.field("weapons"), Some("shuriken"));
    }

    #[test]
    fn roster_follows_canonical_order() {
        let s = SchoolProfiles::parse(DOC);
        let names: Vec<&str> = s.roster().iter().map(|x| x.name).collect();
        assert_eq!(names, vec!["Gyokko Ryu", "Koto Ryu"]);
        assert!(is_list_query("what are the nine schools of the bujinkan?"));
    }

    #[test]
    fn static_patterns_compile() {
        Lazy::force(&FIELD_RE);
        Lazy::force(&TRANSLATION_RE);
    }
}
