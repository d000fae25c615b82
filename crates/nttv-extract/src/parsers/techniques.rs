//! The technique table: one pseudo-CSV row per technique.
//!
//! Columns: name, japanese, translation, type, rank, in_rank,
//! primary_focus, safety, partner_required, solo, tags, description. The
//! description is last and may contain commas.

use once_cell::sync::Lazy;
use regex::Regex;

use nttv_core::text::{fold, parse_tagged_row, squash_ws};
use nttv_core::types::Query;

use super::{AliasIndex, Detail, StructuredCatalog};

pub const COLUMNS: usize = 12;

const HEADER_CELLS: &[&str] = &["name", "japanese", "translation", "description"];

/// Queries about these are concepts, not single techniques.
const CONCEPT_BANS: &[&str] = &["kihon happo", "sanshin", "school", "ryu"];

const TRIGGERS: &[&str] = &["what is", "define", "explain", "describe", "tell me about"];

pub const NAME_HINTS: &[&str] = &[
    "gyaku", "dori", "kudaki", "gatame", "otoshi", "nage", "seoi", "kote", "musha", "take ori", "juji", "omote", "ura",
    "ganseki", "hodoki", "kata", "no kata",
];

const LOOKUP_THRESHOLD: f64 = 0.80;

static CANDIDATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:what is|define|explain|describe|tell me about)\s+(?:the\s+|a\s+|an\s+)?(.+)$").expect("static regex")
});
static NOISE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(technique|in ninjutsu|in bujinkan|in taijutsu|please)\b").expect("static regex"));

#[derive(Debug, Clone, PartialEq)]
pub struct TechniqueRecord {
    pub name: String,
    pub japanese: String,
    pub translation: String,
    pub kind: String,
    pub rank: String,
    pub in_rank: Option<bool>,
    pub primary_focus: String,
    pub safety: String,
    pub partner_required: Option<bool>,
    pub solo: Option<bool>,
    pub tags: Vec<String>,
    pub description: String,
    /// The source line, used as the text of an injected passage.
    pub raw: String,
}

impl TechniqueRecord {
    pub fn is_joint_lock(&self) -> bool {
        let t = fold(&self.kind);
        t.contains("joint") && t.contains("lock")
    }

    pub fn is_kamae(&self) -> bool {
        fold(&self.kind) == "kamae"
    }

    /// Name with a trailing "no Kata"/"no Kamae" removed.
    pub fn short_name(&self) -> Option<String> {
        let folded = fold(&self.name);
        for suffix in [" no kata", " no kamae"] {
            if folded.ends_with(suffix) {
                let cut = self.name.chars().count() - suffix.chars().count();
                let short: String = self.name.chars().take(cut).collect();
                let short = short.trim();
                if !short.is_empty() {
                    return Some(short.to_string());
                }
            }
        }
        None
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match fold(s).as_str() {
        "1" | "true" | "yes" | "y" | "✅" | "✓" | "✔" => Some(true),
        "0" | "false" | "no" | "n" | "❌" | "✗" | "✕" => Some(false),
        _ => None,
    }
}

fn yes_no(v: Option<bool>) -> Option<&'static str> {
    v.map(|b| if b { "Yes" } else { "No" })
}

/// Parse one table line. Header rows, comments and lines without a
/// comma yield `None`.
pub fn parse_row(line: &str) -> Option<TechniqueRecord> {
    let trimmed = line.trim();
    if !trimmed.contains(',') || trimmed.starts_with('>') {
        return None;
    }
    let cols = parse_tagged_row(trimmed, COLUMNS)?;
    let name = squash_ws(&cols[0]);
    if name.is_empty() || HEADER_CELLS.contains(&fold(&name).as_str()) {
        return None;
    }
    let tags = cols[10]
        .split(['|', ';'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    Some(TechniqueRecord {
        name,
        japanese: cols[1].clone(),
        translation: cols[2].clone(),
        kind: cols[3].clone(),
        rank: cols[4].clone(),
        in_rank: parse_bool(&cols[5]),
        primary_focus: cols[6].clone(),
        safety: cols[7].clone(),
        partner_required: parse_bool(&cols[8]),
        solo: parse_bool(&cols[9]),
        tags,
        description: cols[11].trim().to_string(),
        raw: trimmed.to_string(),
    })
}

/// True when the query reads like a request about one named technique.
pub fn looks_like_technique_question(query: &Query) -> bool {
    let q = query.folded();
    if CONCEPT_BANS.iter().any(|b| q.contains(b)) {
        return false;
    }
    if TRIGGERS.iter().any(|t| q.contains(t)) {
        return true;
    }
    q.split_whitespace().count() <= 7 && NAME_HINTS.iter().any(|h| q.contains(h))
}

/// The name fragment of "what is X?" style questions, or the whole query.
pub fn extract_candidate(folded: &str) -> String {
    let cand = CANDIDATE_RE.captures(folded).and_then(|c| c.get(1)).map_or(folded, |m| m.as_str());
    let cand = cand.trim().trim_end_matches(['?', '!', '.', ' ']);
    squash_ws(&NOISE_RE.replace_all(cand, ""))
}

#[derive(Debug, Clone, Default)]
pub struct TechniqueTable {
    source: String,
    records: Vec<TechniqueRecord>,
    aliases: AliasIndex,
    tags: AliasIndex,
}

impl TechniqueTable {
    pub fn parse(text: &str, source: &str) -> Self {
        let mut table = Self { source: source.to_string(), ..Self::default() };
        for line in text.lines() {
            let Some(rec) = parse_row(line) else { continue };
            if table.aliases.exact(&rec.name).is_some() {
                continue;
            }
            let id = table.records.len();
            table.aliases.insert(&rec.name, id);
            if let Some(short) = rec.short_name() {
                table.aliases.insert(&short, id);
            } else if !rec.is_kamae() {
                table.aliases.insert(&format!("{} no kata", rec.name), id);
            }
            for extra in [&rec.japanese, &rec.translation] {
                if extra.chars().count() >= 4 {
                    table.aliases.insert(extra, id);
                }
            }
            for tag in &rec.tags {
                table.tags.insert(tag, id);
            }
            table.records.push(rec);
        }
        table
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&TechniqueRecord> {
        self.records.get(id)
    }

    /// Best fuzzy match on the record names at or above `threshold`.
    pub fn fuzzy(&self, candidate: &str, threshold: f64) -> Option<&TechniqueRecord> {
        let target = fold(candidate);
        if target.chars().count() < 4 {
            return None;
        }
        self.records
            .iter()
            .map(|r| (strsim::normalized_levenshtein(&fold(&r.name), &target), r))
            .filter(|(score, _)| *score >= threshold)
            .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(_, r)| r)
    }

    /// Longest technique name or alias mentioned in `text`.
    pub fn find_in_text(&self, text: &str) -> Option<&TechniqueRecord> {
        self.aliases.find_in_text(text).and_then(|id| self.records.get(id))
    }

    /// Every technique named in `text`, in order of mention.
    pub fn all_in_text(&self, text: &str) -> Vec<&TechniqueRecord> {
        self.aliases.all_in_text(text).into_iter().filter_map(|id| self.records.get(id)).collect()
    }

    /// Resolve a single-technique question to its row.
    pub fn resolve(&self, query: &Query) -> Option<&TechniqueRecord> {
        if self.is_empty() || !looks_like_technique_question(query) {
            return None;
        }
        let cand = extract_candidate(query.folded());
        self.find(&cand).or_else(|| self.find_in_text(query.folded()))
    }

    pub fn joint_locks(&self) -> impl Iterator<Item = &TechniqueRecord> {
        self.records.iter().filter(|r| r.is_joint_lock())
    }

    pub fn kamae(&self) -> impl Iterator<Item = &TechniqueRecord> {
        self.records.iter().filter(|r| r.is_kamae())
    }
}

impl StructuredCatalog for TechniqueTable {
    type Record = TechniqueRecord;

    fn list_all(&self) -> &[TechniqueRecord] {
        &self.records
    }

    fn find(&self, candidate: &str) -> Option<&TechniqueRecord> {
        let cand = squash_ws(candidate);
        if cand.is_empty() {
            return None;
        }
        let hyphenless = cand.replace('-', " ");
        let variants = [cand.as_str(), hyphenless.as_str()];
        variants
            .iter()
            .find_map(|v| self.aliases.lookup(v))
            .and_then(|id| self.records.get(id))
            .or_else(|| self.fuzzy(&cand, LOOKUP_THRESHOLD))
            .or_else(|| self.tags.exact(&cand).and_then(|id| self.records.get(id)))
    }

    fn format(&self, rec: &TechniqueRecord, detail: Detail) -> String {
        if detail == Detail::Brief {
            return match (rec.translation.is_empty(), rec.kind.is_empty()) {
                (false, false) => format!("{}: {} ({})", rec.name, rec.translation, rec.kind),
                (false, true) => format!("{}: {}", rec.name, rec.translation),
                _ => rec.name.clone(),
            };
        }
        let mut lines = vec![format!("{}:", rec.name)];
        let fields = [
            ("Translation", rec.translation.as_str()),
            ("Type", rec.kind.as_str()),
            ("Rank intro", rec.rank.as_str()),
            ("Focus", rec.primary_focus.as_str()),
            ("Safety", rec.safety.as_str()),
        ];
        for (label, value) in fields {
            if !value.is_empty() {
                lines.push(format!("- {label}: {value}"));
            }
        }
        if let Some(v) = yes_no(rec.partner_required) {
            lines.push(format!("- Partner required: {v}"));
        }
        if let Some(v) = yes_no(rec.solo) {
            lines.push(format!("- Solo: {v}"));
        }
        let def = if rec.description.is_empty() { "(not listed)." } else { rec.description.as_str() };
        lines.push(format!("- Definition: {def}"));
        lines.join("\n")
    }
}
