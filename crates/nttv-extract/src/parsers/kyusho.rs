//! Pressure-point table: `Name: description` lines, optionally bulleted.

use nttv_core::text::{contains_phrase, fold, strip_bullet};

use super::{title_case, AliasIndex, Detail, StructuredCatalog};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KyushoPoint {
    /// Folded name, title-cased for display.
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct KyushoTable {
    points: Vec<KyushoPoint>,
    index: AliasIndex,
}

impl KyushoTable {
    pub fn parse(text: &str) -> Self {
        let mut table = Self::default();
        for raw in text.lines() {
            let line = raw.trim();
            let line = strip_bullet(line).unwrap_or(line);
            let Some((name, desc)) = line.split_once(':') else { continue };
            let key = fold(name.trim());
            if key.is_empty() || key.split_whitespace().count() > 5 || table.index.exact(&key).is_some() {
                continue;
            }
            table.index.insert(&key, table.points.len());
            table.points.push(KyushoPoint { name: title_case(&key), description: desc.trim().to_string() });
        }
        table
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First point, in table order, whose name appears as a whole phrase.
    pub fn named_in(&self, folded_query: &str) -> Option<&KyushoPoint> {
        self.points.iter().find(|p| contains_phrase(folded_query, &fold(&p.name)))
    }
}

impl StructuredCatalog for KyushoTable {
    type Record = KyushoPoint;

    fn list_all(&self) -> &[KyushoPoint] {
        &self.points
    }

    fn find(&self, candidate: &str) -> Option<&KyushoPoint> {
        self.index.lookup(candidate).and_then(|id| self.points.get(id))
    }

    fn format(&self, point: &KyushoPoint, detail: Detail) -> String {
        match (detail, point.description.is_empty()) {
            (Detail::Brief, _) => point.name.clone(),
            (Detail::Full, false) => format!("{}: {}", point.name, point.description),
            (Detail::Full, true) => {
                format!("{}: (location/description not listed in the provided context).", point.name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_matches_on_word_boundaries() {
        let t = KyushoTable::parse("KYUSHO\n- Ura Kimon: Lower ribs below the chest\nJinchu: Under the nose\nJinchu: duplicate");
        assert_eq!(t.len(), 2);
        assert_eq!(t.named_in("where is ura kimon kyusho?").map(|p| p.name.as_str()), Some("Ura Kimon"));
        assert!(t.named_in("jinchuu points").is_none());
        assert_eq!(t.find("jinchu").map(|p| p.description.as_str()), Some("Under the nose"));
    }
}
