//! Heading-and-bullet sections of the training reference.
//!
//! A heading line switches the current section; bullets under it become
//! `(name, description)` records; any other non-blank line closes the
//! section.

use nttv_core::text::{contains_phrase, fold, is_dash, split_bullet_body, strip_bullet};

use super::{AliasIndex, Detail, StructuredCatalog};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Ukemi,
    Kaiten,
    Blocking,
    Striking,
    HokenJuroppoKen,
    StrikingPrinciples,
    Keri,
    UkeNagashi,
    NageWaza,
    JimeWaza,
}

impl Section {
    /// Label shown in parentheses after an item name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Ukemi => "Ukemi",
            Self::Kaiten => "Kaiten",
            Self::Blocking => "Blocking",
            Self::Striking => "Striking",
            Self::HokenJuroppoKen => "Hoken Juroppo Ken",
            Self::StrikingPrinciples => "Principles",
            Self::Keri => "Kicks",
            Self::UkeNagashi => "Uke Nagashi",
            Self::NageWaza => "Nage Waza",
            Self::JimeWaza => "Jime Waza",
        }
    }

    pub fn is_taihenjutsu(self) -> bool {
        matches!(self, Self::Ukemi | Self::Kaiten)
    }

    pub fn is_dakentaijutsu(self) -> bool {
        matches!(
            self,
            Self::Blocking
                | Self::Striking
                | Self::HokenJuroppoKen
                | Self::StrikingPrinciples
                | Self::Keri
                | Self::UkeNagashi
        )
    }
}

/// Folded heading prefixes, most specific first.
const HEADINGS: &[(&str, Section)] = &[
    ("dakentaijutsu- striking techniques", Section::Striking),
    ("hoken juroppo ken", Section::HokenJuroppoKen),
    ("principles of striking", Section::StrikingPrinciples),
    ("uke nagashi", Section::UkeNagashi),
    ("ukemi", Section::Ukemi),
    ("kaiten", Section::Kaiten),
    ("blocking", Section::Blocking),
    ("striking", Section::Striking),
    ("keri", Section::Keri),
    ("nage waza", Section::NageWaza),
    ("jime waza", Section::JimeWaza),
];

/// Headings that close a section without opening a new one.
const CLOSERS: &[&str] = &["notes", "zanshin", "taihenjutsu", "dakentaijutsu", "kihon happo"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionItem {
    pub name: String,
    pub description: String,
    pub section: Section,
    /// Text after the heading's dash, e.g. "Throwing Techniques".
    pub group: String,
}

#[derive(Debug, Clone, Default)]
pub struct SectionCatalog {
    items: Vec<SectionItem>,
    index: AliasIndex,
    hoken_description: String,
}

/// Text after the first dash of a heading, unquoted.
fn heading_tail(line: &str) -> String {
    match line.char_indices().find(|(_, c)| is_dash(*c)) {
        Some((at, c)) => line[at + c.len_utf8()..].trim().trim_matches(['"', '“', '”', '\'']).trim().to_string(),
        None => String::new(),
    }
}

/// A heading starts with the heading word followed by a dash, a colon,
/// an opening parenthesis, a short unpunctuated tail or the end of the line.
fn match_heading(line: &str) -> Option<Section> {
    let folded = fold(line);
    HEADINGS.iter().find_map(|(prefix, section)| {
        let rest = folded.strip_prefix(prefix)?;
        let next = rest.trim_start().chars().next();
        let ok = match next {
            None => true,
            Some(c) => {
                is_dash(c)
                    || matches!(c, ':' | '(')
                    || prefix.contains('-')
                    || (rest.starts_with(' ') && rest.split_whitespace().count() <= 3 && !rest.contains(['.', ',']))
            }
        };
        ok.then_some(*section)
    })
}

fn is_closer(line: &str) -> bool {
    let folded = fold(line);
    CLOSERS.iter().any(|c| folded.starts_with(c))
}

impl SectionCatalog {
    pub fn parse(text: &str) -> Self {
        let mut cat = Self::default();
        let mut current: Option<(Section, String)> = None;
        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(body) = strip_bullet(line) {
                if let Some((section, group)) = &current {
                    cat.push_item(body, *section, group);
                }
                continue;
            }
            if let Some(section) = match_heading(line) {
                let tail = heading_tail(line);
                if section == Section::HokenJuroppoKen && cat.hoken_description.is_empty() {
                    cat.hoken_description = tail.clone();
                }
                current = Some((section, tail));
                continue;
            }
            if is_closer(line) || current.is_some() {
                current = None;
            }
        }
        cat
    }

    fn push_item(&mut self, body: &str, section: Section, group: &str) {
        let (name, description) = split_bullet_body(body);
        if name.is_empty() || self.index.exact(&name).is_some() {
            return;
        }
        self.index.insert(&name, self.items.len());
        self.items.push(SectionItem {
            name,
            description: description.trim_matches(['"', '“', '”']).to_string(),
            section,
            group: group.to_string(),
        });
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn in_section(&self, section: Section) -> impl Iterator<Item = &SectionItem> {
        self.items.iter().filter(move |i| i.section == section)
    }

    pub fn names_in(&self, section: Section) -> Vec<String> {
        self.in_section(section).map(|i| i.name.clone()).collect()
    }

    pub fn hoken_description(&self) -> &str {
        &self.hoken_description
    }

    /// First item, in document order, named as a whole phrase in the query
    /// and accepted by `filter`.
    pub fn named_in<F>(&self, folded_query: &str, filter: F) -> Option<&SectionItem>
    where
        F: Fn(Section) -> bool,
    {
        self.items
            .iter()
            .filter(|i| filter(i.section))
            .find(|i| contains_phrase(folded_query, &fold(&i.name)))
    }
}

impl StructuredCatalog for SectionCatalog {
    type Record = SectionItem;

    fn list_all(&self) -> &[SectionItem] {
        &self.items
    }

    fn find(&self, candidate: &str) -> Option<&SectionItem> {
        self.index.lookup(candidate).and_then(|id| self.items.get(id))
    }

    /// `Name (Section): description`.
    fn format(&self, item: &SectionItem, detail: Detail) -> String {
        let label = match item.section {
            Section::NageWaza if !item.group.is_empty() => item.group.as_str(),
            s => s.label(),
        };
        match (detail, item.description.is_empty()) {
            (Detail::Brief, _) | (Detail::Full, true) => format!("{} ({label}).", item.name),
            (Detail::Full, false) => format!("{} ({label}): {}", item.name, item.description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
Taihenjutsu- Body Skills
Ukemi- Breakfalls
· Zenpo Ukemi- Forward Breakfall
· Yoko Nagare- Side Flow
Kaiten- Rolls
· Zenpo Kaiten Naname- Forward Diagonal Roll
Hoken Juroppo Ken- The Sixteen Hidden Fists
· Kikaku Ken- Demon Horn Fist
Nage waza- Throwing Techniques
· Ganseki Nage- Rock Throw
Some closing paragraph.
· Stray Bullet- not in any section
";

    #[test]
    fn bullets_attach_to_the_open_heading() {
        let c = SectionCatalog::parse(DOC);
        assert_eq!(c.names_in(Section::Ukemi), vec!["Zenpo Ukemi", "Yoko Nagare"]);
        assert_eq!(c.names_in(Section::Kaiten), vec!["Zenpo Kaiten Naname"]);
        assert_eq!(c.hoken_description(), "The Sixteen Hidden Fists");
        assert!(c.find("stray bullet").is_none());
    }

    #[test]
    fn nage_items_carry_their_group() {
        let c = SectionCatalog::parse(DOC);
        let g = c.find("ganseki nage").expect("ganseki");
        assert_eq!(c.format(g, Detail::Full), "Ganseki Nage (Throwing Techniques): Rock Throw");
    }
}
