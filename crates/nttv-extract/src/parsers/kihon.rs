//! Kihon Happo subset harvesting: Kosshi Kihon Sanpo and Torite Goho.

use once_cell::sync::Lazy;
use regex::Regex;

use nttv_core::text::{dedupe_preserve, fold, is_dash, join_oxford, squash_ws, strip_bullet};

static KOSSHI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(kosshi kohon sanpo|kosshi kihon sanpo|koshi kihon sanpo|kosshi sanpo|koshi sanpo)\b").expect("static regex"));
static TORITE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(torite[ -]goho(?: gata)?)\b").expect("static regex"));
static DEFINITION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bkihon ?happo\b").expect("static regex"));

pub const KOSSHI_LIMIT: usize = 3;
pub const TORITE_LIMIT: usize = 5;

pub const CANONICAL: &str = "Kihon Happo consists of Kosshi Kihon Sanpo and Torite Goho.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KihonSubsets {
    pub kosshi: Vec<String>,
    pub torite: Vec<String>,
    /// First short sentence mentioning kihon happo.
    pub definition: Option<String>,
}

impl KihonSubsets {
    pub fn is_empty(&self) -> bool {
        self.kosshi.is_empty() && self.torite.is_empty()
    }

    /// Capped lists merged across several texts.
    pub fn harvest<'a, I>(texts: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out = Self::default();
        for text in texts {
            let part = harvest_one(text);
            out.kosshi.extend(part.kosshi);
            out.torite.extend(part.torite);
            if out.definition.is_none() {
                out.definition = part.definition;
            }
        }
        out.kosshi = dedupe_preserve(out.kosshi);
        out.torite = dedupe_preserve(out.torite);
        out.kosshi.truncate(KOSSHI_LIMIT);
        out.torite.truncate(TORITE_LIMIT);
        out
    }

    /// Canonical sentence plus the subset lists.
    pub fn render(&self) -> String {
        let mut parts = vec![CANONICAL.to_string()];
        if !self.kosshi.is_empty() {
            parts.push(format!("Kosshi Kihon Sanpo: {}.", join_oxford(&self.kosshi)));
        }
        if !self.torite.is_empty() {
            parts.push(format!("Torite Goho: {}.", join_oxford(&self.torite)));
        }
        parts.join(" ")
    }
}

fn split_list(line: &str) -> Vec<String> {
    line.split([';', ','])
        .map(|p| p.trim().trim_matches(|c: char| is_dash(c) || c == '•' || c == '.' || c.is_whitespace()))
        .map(|p| p.strip_prefix("and ").unwrap_or(p))
        .filter(|p| (2..=60).contains(&p.chars().count()))
        .map(squash_ws)
        .collect()
}

fn is_heading_end(line: &str) -> bool {
    line.ends_with(':') || line.ends_with(is_dash)
}

/// Items under a subset heading: bullets or list lines until a blank or
/// another heading.
fn collect_after(lines: &[&str], start: usize) -> Vec<String> {
    let mut items = Vec::new();
    for raw in &lines[start + 1..] {
        let line = raw.trim();
        if line.is_empty() || (is_heading_end(line) && strip_bullet(line).is_none()) {
            break;
        }
        if line.contains([';', ',']) {
            items.extend(split_list(strip_bullet(line).unwrap_or(line)));
        } else if let Some(body) = strip_bullet(line) {
            items.push(squash_ws(body));
        }
    }
    items
}

fn harvest_one(text: &str) -> KihonSubsets {
    let lines: Vec<&str> = text.lines().collect();
    let mut out = KihonSubsets::default();
    for (i, raw) in lines.iter().enumerate() {
        let line = squash_ws(raw);
        if line.is_empty() {
            continue;
        }
        let folded = fold(&line);
        if out.definition.is_none() && DEFINITION_RE.is_match(&folded) && (12..=220).contains(&line.len()) {
            out.definition = Some(line.trim_end_matches([' ', ';', ',']).to_string());
        }
        let target = if KOSSHI_RE.is_match(&folded) {
            &mut out.kosshi
        } else if TORITE_RE.is_match(&folded) {
            &mut out.torite
        } else {
            continue;
        };
        if is_heading_end(&line) {
            target.extend(collect_after(&lines, i));
        } else if let Some((_, after)) = line.split_once(':') {
            target.extend(split_list(after));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harvests_heading_and_inline_forms() {
        let text = "\
Kihon Happo is the eight basic ways of the Bujinkan.
Kosshi Kihon Sanpo:
- Ichimonji no Kata
- Hicho no Kata
- Jumonji no Kata

Torite Goho: Omote Gyaku, Omote Gyaku Ken Sabaki, Ura Gyaku, Musha Dori, Ganseki Nage, Extra Lock";
        let k = KihonSubsets::harvest([text]);
        assert_eq!(k.kosshi, vec!["Ichimonji no Kata", "Hicho no Kata", "Jumonji no Kata"]);
        assert_eq!(k.torite.len(), TORITE_LIMIT);
        assert!(k.definition.as_deref().unwrap_or_default().starts_with("Kihon Happo is"));
        assert!(k.render().starts_with(CANONICAL));
        assert!(k.render().contains("Kosshi Kihon Sanpo: Ichimonji no Kata, Hicho no Kata, and Jumonji no Kata."));
    }

    #[test]
    fn static_patterns_compile() {
        Lazy::force(&KOSSHI_RE);
        Lazy::force(&TORITE_RE);
        Lazy::force(&DEFINITION_RE);
    }
}
