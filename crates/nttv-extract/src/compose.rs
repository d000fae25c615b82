//! Presentation of deterministic answers: bullets or prose, crisp or chatty.

use nttv_core::text::{ensure_period, fold, split_label, strip_bullet};
use nttv_core::types::{OutputFormat, Tone};

const CLOSING_LINE: &str = "Hope that helps! Want a quick example or drill, too?";
const MAX_LABEL: usize = 24;

/// Fields the paragraph form knows how to phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Translation,
    Type,
    Focus,
    Rank,
    Weapons,
    Definition,
    Notes,
}

impl Field {
    fn detect(label: &str) -> Option<Self> {
        let l = fold(label);
        Some(match l.as_str() {
            "translation" | "meaning" => Self::Translation,
            "type" | "kind" | "category" => Self::Type,
            "focus" | "primary focus" | "specialty" => Self::Focus,
            "rank intro" | "rank" | "introduced" => Self::Rank,
            "weapons" | "weapon" => Self::Weapons,
            "definition" | "description" => Self::Definition,
            "notes" | "note" => Self::Notes,
            _ => return None,
        })
    }
}

/// A "Title:" line followed by "- Label: value" bullets.
#[derive(Debug, Default)]
struct Structured<'a> {
    title: &'a str,
    fields: Vec<(&'a str, &'a str)>,
}

impl<'a> Structured<'a> {
    fn parse(text: &'a str) -> Option<Self> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        let title = lines.next()?.strip_suffix(':')?.trim();
        let mut fields = Vec::new();
        for line in lines {
            let body = strip_bullet(line)?;
            fields.push(split_label(body, MAX_LABEL)?);
        }
        (!fields.is_empty()).then_some(Self { title, fields })
    }

    fn get(&self, field: Field) -> Option<&'a str> {
        self.fields
            .iter()
            .find(|(label, value)| Field::detect(label) == Some(field) && !value.is_empty())
            .map(|&(_, value)| value.trim_end_matches('.'))
    }

    fn known(&self) -> bool {
        self.fields.iter().any(|(label, _)| Field::detect(label).is_some())
    }

    fn paragraph(&self) -> String {
        if !self.known() {
            // Nothing we can phrase; keep every field as "Label: value."
            let body = self.fields.iter().map(|(l, v)| format!("{l}: {}.", v.trim_end_matches('.')));
            return std::iter::once(self.title.to_string()).chain(body).collect::<Vec<_>>().join(" ");
        }
        let mut opening = self.title.to_string();
        if let Some(t) = self.get(Field::Translation) {
            opening.push_str(&format!(" (“{t}”)"));
        }
        match self.get(Field::Type) {
            Some(kind) => opening.push_str(&format!(" is classified as {kind}.")),
            None => opening.push('.'),
        }
        let mut sentences = vec![opening];
        if let Some(f) = self.get(Field::Focus) {
            sentences.push(format!("Its focus is {f}."));
        }
        if let Some(r) = self.get(Field::Rank) {
            sentences.push(format!("It is introduced at {r}."));
        }
        if let Some(w) = self.get(Field::Weapons) {
            sentences.push(format!("Weapons: {w}."));
        }
        if let Some(d) = self.get(Field::Definition) {
            sentences.push(ensure_period(d));
        }
        if let Some(n) = self.get(Field::Notes) {
            sentences.push(format!("Notes: {n}."));
        }
        sentences.join(" ")
    }

    fn summary(&self) -> Option<String> {
        let translation = self.get(Field::Translation);
        let kind = self.get(Field::Type);
        let focus = self.get(Field::Focus);
        if translation.is_none() && kind.is_none() && focus.is_none() {
            return None;
        }
        let mut line = format!("In short: {}", self.title);
        if let Some(t) = translation {
            line.push_str(&format!(" means “{t}”"));
        }
        if let Some(k) = kind {
            line.push_str(&format!("{} a {}", if translation.is_some() { "," } else { " is" }, k.to_lowercase()));
        }
        if let Some(f) = focus {
            line.push_str(&format!(" focused on {}", f.to_lowercase()));
        }
        line.push('.');
        Some(line)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AnswerComposer {
    format: OutputFormat,
    tone: Tone,
}

impl AnswerComposer {
    pub fn new(format: OutputFormat, tone: Tone) -> Self {
        Self { format, tone }
    }

    pub fn compose(&self, raw: &str) -> String {
        let raw = raw.trim();
        let structured = Structured::parse(raw);
        let body = match (self.format, &structured) {
            (OutputFormat::Paragraph, Some(s)) => s.paragraph(),
            _ => raw.to_string(),
        };
        match self.tone {
            Tone::Crisp => body,
            Tone::Chatty => {
                if body.ends_with('?') {
                    return body;
                }
                let mut out = String::new();
                if let Some(summary) = structured.as_ref().and_then(Structured::summary) {
                    out.push_str(&summary);
                    out.push_str("\n\n");
                }
                out.push_str(&body);
                out.push_str("\n\n");
                out.push_str(CLOSING_LINE);
                out
            }
        }
    }
}
