use std::sync::Arc;

use nttv_core::traits::Extractor;
use nttv_core::types::{OutputFormat, Passage, Query};
use nttv_core::vocab::find_school;

use crate::documents::{passages_from, sources};
use crate::library::Library;
use crate::parsers::schools::{is_list_query, SchoolProfiles};
use crate::parsers::{Detail, StructuredCatalog};

fn detail_for(format: OutputFormat) -> Detail {
    match format {
        OutputFormat::Bullets => Detail::Full,
        OutputFormat::Paragraph => Detail::Brief,
    }
}

/// Profiles from the retrieved schools passages, else the library copy.
fn profiles<'a>(library: &'a Library, passages: &[Passage], scratch: &'a mut Option<SchoolProfiles>) -> &'a SchoolProfiles {
    let text = passages_from(passages, sources::SCHOOLS);
    if text.trim().is_empty() {
        return &library.schools;
    }
    scratch.insert(SchoolProfiles::parse(&text))
}

/// "What are the nine schools of the Bujinkan?"
pub struct ListSchools {
    library: Arc<Library>,
    format: OutputFormat,
}

impl ListSchools {
    pub fn new(library: Arc<Library>, format: OutputFormat) -> Self {
        Self { library, format }
    }

    pub fn applies(query: &Query) -> bool {
        is_list_query(query.folded())
    }
}

impl Extractor for ListSchools {
    fn name(&self) -> &'static str {
        "schools-list"
    }

    fn try_answer(&self, query: &Query, passages: &[Passage]) -> Option<String> {
        if !Self::applies(query) {
            return None;
        }
        let mut scratch = None;
        profiles(&self.library, passages, &mut scratch).render_list(detail_for(self.format))
    }
}

/// Profile of one named school.
pub struct DescribeSchool {
    library: Arc<Library>,
    format: OutputFormat,
}

impl DescribeSchool {
    pub fn new(library: Arc<Library>, format: OutputFormat) -> Self {
        Self { library, format }
    }
}

impl Extractor for DescribeSchool {
    fn name(&self) -> &'static str {
        "school-profile"
    }

    fn try_answer(&self, query: &Query, passages: &[Passage]) -> Option<String> {
        let school = find_school(query.text())?;
        let mut scratch = None;
        let catalog = profiles(&self.library, passages, &mut scratch);
        let profile = catalog.profile(school)?;
        Some(catalog.format(&profile, detail_for(self.format)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nttv_core::types::SyntheticKind;

    const DOC: &str = "\
School: Togakure Ryu
Translation: Hidden Door School
Type: Ninjutsu
---
School: Gyokko Ryu
Translation: Jewel Tiger School
Type: Samurai
Focus: Kosshijutsu
";

    fn passage() -> Passage {
        Passage::synthetic(SyntheticKind::Schools, DOC.into(), "Schools of the Bujinkan Summaries.txt".into())
    }

    #[test]
    fn renders_profile_in_both_formats() {
        let lib = Arc::new(Library::default());
        let q = Query::new("Tell me about Gyokko-ryū");
        let bullets = DescribeSchool::new(lib.clone(), OutputFormat::Bullets).try_answer(&q, &[passage()]);
        assert_eq!(
            bullets.as_deref(),
            Some("Gyokko Ryu:\n- Translation: Jewel Tiger School\n- Type: Samurai\n- Focus: Kosshijutsu")
        );
        let para = DescribeSchool::new(lib, OutputFormat::Paragraph).try_answer(&q, &[passage()]);
        assert_eq!(para.as_deref(), Some("Gyokko Ryu: “Jewel Tiger School”. Type: Samurai. Focus: Kosshijutsu."));
    }

    #[test]
    fn list_uses_roster_order() {
        let ex = ListSchools::new(Arc::new(Library::default()), OutputFormat::Bullets);
        let ans = ex.try_answer(&Query::new("What are the schools of the Bujinkan?"), &[passage()]);
        assert_eq!(ans.as_deref(), Some("The Nine Schools of the Bujinkan:\n- Togakure Ryu\n- Gyokko Ryu"));
    }
}
