//! `[WEAPON] Name` blocks with upper-case `KEY: value` lines.

use nttv_core::text::{fold, split_items};

use super::{AliasIndex, Detail, StructuredCatalog};

const HEADER: &str = "[WEAPON]";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeaponRecord {
    pub name: String,
    pub aliases: Vec<String>,
    pub kind: String,
    pub kamae: Vec<String>,
    pub core_actions: String,
    pub ranks: String,
    pub notes: String,
}

impl WeaponRecord {
    /// "Introduced at 4th Kyu" -> "4th Kyu".
    pub fn intro_rank(&self) -> Option<&str> {
        let r = self.ranks.trim();
        if r.is_empty() {
            return None;
        }
        const PREFIX: &str = "introduced at ";
        Some(match r.get(..PREFIX.len()) {
            Some(head) if head.eq_ignore_ascii_case(PREFIX) => r[PREFIX.len()..].trim(),
            _ => r,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct WeaponTable {
    records: Vec<WeaponRecord>,
    index: AliasIndex,
}

impl WeaponTable {
    pub fn parse(text: &str) -> Self {
        let mut records = Vec::new();
        let mut current: Option<WeaponRecord> = None;
        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(name) = line.strip_prefix(HEADER) {
                records.extend(current.take());
                current = Some(WeaponRecord { name: name.trim().to_string(), ..WeaponRecord::default() });
                continue;
            }
            let (Some(rec), Some((key, value))) = (current.as_mut(), line.split_once(':')) else { continue };
            let value = value.trim().to_string();
            match key.trim().to_uppercase().as_str() {
                "ALIASES" => rec.aliases = value.split(',').map(|a| a.trim().to_string()).filter(|a| !a.is_empty()).collect(),
                "TYPE" => rec.kind = value,
                "KAMAE" => rec.kamae = split_items(&value),
                "CORE ACTIONS" => rec.core_actions = value,
                "RANKS" | "RANK" => rec.ranks = value,
                "NOTES" => rec.notes = value,
                _ => {}
            }
        }
        records.extend(current);
        records.retain(|r| !r.name.is_empty());

        let mut index = AliasIndex::new();
        for (id, r) in records.iter().enumerate() {
            index.insert(&r.name, id);
            for a in &r.aliases {
                index.insert(a, id);
            }
        }
        Self { records, index }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First weapon, in table order, whose name or alias occurs in the query.
    pub fn named_in(&self, folded_query: &str) -> Option<&WeaponRecord> {
        self.records.iter().find(|r| {
            std::iter::once(&r.name).chain(&r.aliases).any(|a| {
                let a = fold(a);
                !a.is_empty() && folded_query.contains(&a)
            })
        })
    }

    /// (alias, record) pairs, name first, for kamae lookups.
    pub fn kamae_for(&self, folded_query: &str) -> Option<(String, &WeaponRecord)> {
        for r in &self.records {
            for a in std::iter::once(&r.name).chain(&r.aliases) {
                let key = fold(a);
                if !key.is_empty() && folded_query.contains(&key) && !r.kamae.is_empty() {
                    return Some((a.clone(), r));
                }
            }
        }
        None
    }
}

impl StructuredCatalog for WeaponTable {
    type Record = WeaponRecord;

    fn list_all(&self) -> &[WeaponRecord] {
        &self.records
    }

    fn find(&self, candidate: &str) -> Option<&WeaponRecord> {
        self.index.lookup(candidate).and_then(|id| self.records.get(id))
    }

    fn format(&self, r: &WeaponRecord, detail: Detail) -> String {
        if detail == Detail::Brief {
            return match r.intro_rank() {
                Some(rank) => format!("{} ({rank})", r.name),
                None => r.name.clone(),
            };
        }
        let mut parts = vec![format!("{} weapon profile:", r.name)];
        if !r.kind.is_empty() {
            parts.push(format!("Type: {}.", r.kind));
        }
        if !r.kamae.is_empty() {
            parts.push(format!("Kamae: {}.", r.kamae.join(", ")));
        }
        if !r.core_actions.is_empty() {
            parts.push(format!("Core actions include: {}.", r.core_actions.trim_end_matches('.')));
        }
        if !r.ranks.is_empty() {
            parts.push(format!("Ranks: {}.", r.ranks.trim_end_matches('.')));
        }
        if !r.notes.is_empty() {
            parts.push(format!("Notes: {}.", r.notes.trim_end_matches('.')));
        }
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
[WEAPON] Hanbo
ALIASES: half staff, hanbō
TYPE: Stick
KAMAE: Shizen no Kamae, Ichimonji no Kamae
CORE ACTIONS: strikes, locks
RANKS: Introduced at 8th Kyu

[WEAPON] Kusari Fundo
ALIASES: weighted chain
RANKS: Introduced at 4th Kyu
";

    #[test]
    fn parses_blocks_and_rank_label() {
        let t = WeaponTable::parse(DOC);
        assert_eq!(t.len(), 2);
        let kf = t.named_in("at what rank do i learn kusari fundo?").expect("kusari fundo");
        assert_eq!(kf.intro_rank(), Some("4th Kyu"));
        let hanbo = t.find("half staff").expect("hanbo");
        assert_eq!(hanbo.kamae, vec!["Shizen no Kamae", "Ichimonji no Kamae"]);
        assert!(t.format(hanbo, Detail::Full).contains("Core actions include: strikes, locks."));
    }
}
