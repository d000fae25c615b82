//! Folding and micro-format helpers used by every parser.
//!
//! Everything here is pure and allocation-light so each parsing rule can be
//! tested on its own.

/// Map one character to its unaccented, ASCII-punctuation form.
fn base_char(c: char) -> char {
    match c {
        'ā' | 'á' | 'à' | 'â' | 'ä' | 'ã' | 'Ā' | 'Á' | 'À' | 'Â' | 'Ä' | 'Ã' => 'a',
        'ē' | 'é' | 'è' | 'ê' | 'ë' | 'Ē' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'ī' | 'í' | 'ì' | 'î' | 'ï' | 'Ī' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        'ō' | 'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'Ō' | 'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'o',
        'ū' | 'ú' | 'ù' | 'û' | 'ü' | 'Ū' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
        'ñ' | 'Ñ' => 'n',
        '‘' | '’' | 'ʻ' | '`' => '\'',
        '“' | '”' => '"',
        '‐' | '‑' | '‒' | '–' | '—' | '−' => '-',
        '\u{a0}' | '\u{3000}' => ' ',
        other => other,
    }
}

/// Case- and diacritic-insensitive form with collapsed whitespace.
pub fn fold(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_space = false;
    for c in s.chars().map(base_char) {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// Folded form with every non-alphanumeric character removed.
/// "Omote-Gyaku" and "omote gyaku" share the key `omotegyaku`.
pub fn keylite(s: &str) -> String {
    fold(s).chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Collapse runs of whitespace without changing case.
pub fn squash_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_dash(c: char) -> bool {
    matches!(c, '-' | '‐' | '‑' | '‒' | '–' | '—' | '−')
}

const BULLETS: [char; 5] = ['-', '·', '*', '•', '・'];

/// Body of a bullet line (`- x`, `· x`, `* x`, `• x`), or `None`.
pub fn strip_bullet(line: &str) -> Option<&str> {
    let t = line.trim_start();
    let first = t.chars().next()?;
    if !BULLETS.contains(&first) {
        return None;
    }
    let body = t[first.len_utf8()..].trim();
    if body.is_empty() { None } else { Some(body) }
}

/// Split a bullet body into `(name, description)` on the first dash-like
/// character. A dash with whitespace on either side wins over an inner
/// hyphen, so `Omote-Gyaku - Outside lock` keeps its hyphenated name.
pub fn split_bullet_body(body: &str) -> (String, String) {
    let chars: Vec<(usize, char)> = body.char_indices().collect();
    let spaced = chars.iter().enumerate().find(|(i, (_, c))| {
        is_dash(*c)
            && *i > 0
            && (chars[*i - 1].1.is_whitespace()
                || chars.get(*i + 1).map(|(_, n)| n.is_whitespace()).unwrap_or(true))
    });
    let any = chars.iter().enumerate().find(|(i, (_, c))| is_dash(*c) && *i > 0);
    match spaced.or(any) {
        Some((_, (at, c))) => {
            let name = body[..*at].trim();
            let desc = body[*at + c.len_utf8()..].trim_start_matches(is_dash).trim();
            (name.to_string(), desc.to_string())
        }
        None => (body.trim().to_string(), String::new()),
    }
}

/// Split a pseudo-CSV line into exactly `fields` columns.
///
/// Blank lines, `#` comments and markdown fences yield `None`. The final
/// column keeps any remaining commas; short rows are padded with empty
/// strings.
pub fn parse_tagged_row(line: &str, fields: usize) -> Option<Vec<String>> {
    let t = line.trim();
    if t.is_empty() || t.starts_with('#') || t.starts_with("```") || fields == 0 {
        return None;
    }
    let mut cols: Vec<String> = t.splitn(fields, ',').map(|c| unquote(c.trim()).to_string()).collect();
    cols.resize(fields, String::new());
    Some(cols)
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"').and_then(|x| x.strip_suffix('"')).unwrap_or(s)
}

/// Split a list-ish string on commas, semicolons, slashes, newlines,
/// pipes, bullets and the word "and". Wrapping parentheses and stray
/// dashes are trimmed; duplicates (case-insensitive) are dropped.
pub fn split_items(s: &str) -> Vec<String> {
    let mut normalized = String::with_capacity(s.len());
    for word in s.split_inclusive(char::is_whitespace) {
        if word.trim().eq_ignore_ascii_case("and") {
            normalized.push(',');
            normalized.push_str(&word[word.trim_end().len()..]);
        } else {
            normalized.push_str(word);
        }
    }
    let parts = normalized.split(|c: char| matches!(c, ',' | ';' | '/' | '\n' | '|' | '•' | '・' | '·'));
    let items = parts.filter_map(|p| {
        let t = p.trim().trim_matches(is_dash).trim();
        let t = t.strip_prefix('(').and_then(|x| x.strip_suffix(')')).unwrap_or(t).trim();
        if t.is_empty() { None } else { Some(squash_ws(t)) }
    });
    dedupe_preserve(items)
}

/// Keep first occurrences, comparing case-insensitively.
pub fn dedupe_preserve<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for item in items {
        let t = item.as_ref().trim();
        if t.is_empty() {
            continue;
        }
        if seen.insert(fold(t)) {
            out.push(t.to_string());
        }
    }
    out
}

/// "a", "a and b", "a, b, and c".
pub fn join_oxford<S: AsRef<str>>(items: &[S]) -> String {
    let items: Vec<&str> = items.iter().map(|s| s.as_ref().trim()).filter(|s| !s.is_empty()).collect();
    match items.as_slice() {
        [] => String::new(),
        [one] => (*one).to_string(),
        [a, b] => format!("{a} and {b}"),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}

/// Whole-word containment over already-folded strings.
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(at, m)| {
        let before = haystack[..at].chars().next_back();
        let after = haystack[at + m.len()..].chars().next();
        !before.map(char::is_alphanumeric).unwrap_or(false)
            && !after.map(char::is_alphanumeric).unwrap_or(false)
    })
}

/// Truthy spreadsheet flags: `1`, `true`, `yes`, `y`, `✅`.
pub fn parse_flag(s: &str) -> bool {
    matches!(fold(s).as_str(), "1" | "true" | "yes" | "y" | "✅" | "x")
}

/// Append a period unless the text already ends in terminal punctuation.
pub fn ensure_period(s: &str) -> String {
    let t = s.trim_end();
    if t.ends_with(['.', '!', '?']) { t.to_string() } else { format!("{t}.") }
}

/// Prefix of at most `max` characters, never splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((at, _)) => &s[..at],
        None => s,
    }
}

/// Split `Label: value` (colon or spaced dash) when the label is short and
/// wordy. Returns the trimmed label and value.
pub fn split_label(line: &str, max_label: usize) -> Option<(&str, &str)> {
    let t = line.trim();
    let (label, value) = match t.find(':') {
        Some(at) => (&t[..at], &t[at + 1..]),
        None => {
            let at = t.find(" - ").or_else(|| t.find(" – ")).or_else(|| t.find(" — "))?;
            let sep = t[at..].chars().nth(1).map(char::len_utf8).unwrap_or(1);
            (&t[..at], &t[at + 1 + sep..])
        }
    };
    let label = label.trim();
    let wordy = label.chars().all(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '-' | '\'' | '(' | ')' | '/'));
    if label.is_empty() || label.chars().count() > max_label || !wordy {
        return None;
    }
    Some((label, value.trim()))
}
