//! Catalogs parsed once per corpus load and shared read-only afterwards.

use tracing::info;

use nttv_core::types::ChunkRecord;

use crate::documents::{sources, DocumentSet};
use crate::parsers::glossary::Glossary;
use crate::parsers::kihon::KihonSubsets;
use crate::parsers::kyusho::KyushoTable;
use crate::parsers::rank::RankTable;
use crate::parsers::schools::SchoolProfiles;
use crate::parsers::sections::SectionCatalog;
use crate::parsers::techniques::TechniqueTable;
use crate::parsers::weapons::WeaponTable;
use crate::parsers::StructuredCatalog;

/// Source label of the kihon happo composite passage.
pub const KIHON_COMPOSITE_SOURCE: &str = "kihon happo (composite)";

#[derive(Debug, Clone, Default)]
pub struct Library {
    pub documents: DocumentSet,
    pub techniques: TechniqueTable,
    pub glossary: Glossary,
    pub kyusho: KyushoTable,
    pub sections: SectionCatalog,
    pub weapons: WeaponTable,
    pub ranks: RankTable,
    pub schools: SchoolProfiles,
    pub kihon: KihonSubsets,
}

impl Library {
    pub fn from_records(records: &[ChunkRecord]) -> Self {
        Self::from_documents(DocumentSet::from_records(records))
    }

    pub fn from_documents(documents: DocumentSet) -> Self {
        let (tech_source, tech_text) = documents.gather(sources::TECHNIQUES).unwrap_or_default();
        let techniques = TechniqueTable::parse(&tech_text, &tech_source);

        // Glossary terms also appear in the training reference.
        let mut glossary = Glossary::parse(&documents.text_of(sources::GLOSSARY));
        glossary.extend(Glossary::parse(&documents.text_of(sources::TRAINING)));

        let kihon = {
            let texts: Vec<&str> = documents.iter().map(|d| d.text.as_str()).collect();
            KihonSubsets::harvest(texts)
        };

        let lib = Self {
            techniques,
            glossary,
            kyusho: KyushoTable::parse(&documents.text_of(sources::KYUSHO)),
            sections: SectionCatalog::parse(&documents.text_of(sources::TRAINING)),
            weapons: WeaponTable::parse(&documents.text_of(sources::WEAPONS)),
            ranks: RankTable::parse(&documents.text_of(sources::RANK_REQUIREMENTS)),
            schools: SchoolProfiles::parse(&documents.text_of(sources::SCHOOLS)),
            kihon,
            documents,
        };
        info!(
            documents = lib.documents.len(),
            techniques = lib.techniques.len(),
            glossary = lib.glossary.len(),
            kyusho = lib.kyusho.len(),
            sections = lib.sections.len(),
            weapons = lib.weapons.len(),
            schools = lib.schools.list_all().len(),
            "library built"
        );
        lib
    }

    /// Rendered kihon happo composite, when any subset items were found.
    pub fn kihon_composite(&self) -> Option<String> {
        (!self.kihon.is_empty()).then(|| self.kihon.render())
    }
}
