//! Lists and single items from the training reference sections: striking,
//! body skills, throws and chokes.

use std::sync::Arc;

use nttv_core::text::{fold, join_oxford};
use nttv_core::traits::Extractor;
use nttv_core::types::{Passage, Query};

use super::{is_rank_question, wants_list};
use crate::documents::{passages_from, sources};
use crate::library::Library;
use crate::parsers::sections::{Section, SectionCatalog};
use crate::parsers::{Detail, StructuredCatalog};

/// The library's sections, or the retrieved training passages when the
/// library was built without the training reference.
fn section_catalog<'a>(
    library: &'a Library,
    passages: &[Passage],
    scratch: &'a mut Option<SectionCatalog>,
) -> &'a SectionCatalog {
    if !library.sections.is_empty() {
        return &library.sections;
    }
    scratch.insert(SectionCatalog::parse(&passages_from(passages, sources::TRAINING)))
}

fn listed(prefix: &str, names: Vec<String>) -> Option<String> {
    (!names.is_empty()).then(|| format!("{prefix}: {}", join_oxford(&names)))
}

const HOKEN_TRIGGERS: &[&str] = &["hoken juroppo", "sixteen hidden fists", "sixteen secret fists", "sixteen fists"];

pub struct Dakentaijutsu {
    library: Arc<Library>,
}

impl Dakentaijutsu {
    pub fn new(library: Arc<Library>) -> Self {
        Self { library }
    }

    fn applies(q: &str) -> bool {
        if ["dakentaijutsu", "daken taijutsu", "uke nagashi", "principles of striking"].iter().any(|t| q.contains(t))
            || HOKEN_TRIGGERS.iter().any(|t| q.contains(t))
        {
            return true;
        }
        !q.contains("taihenjutsu") && (q.contains("kick") || q.contains("geri") || q.contains("block"))
    }

    fn list_answer(q: &str, catalog: &SectionCatalog) -> Option<String> {
        if HOKEN_TRIGGERS.iter().any(|t| q.contains(t)) {
            let desc = catalog.hoken_description();
            let header =
                if desc.is_empty() { "Hoken Juroppo Ken".to_string() } else { format!("Hoken Juroppo Ken ({desc})") };
            if let Some(ans) = listed(&header, catalog.names_in(Section::HokenJuroppoKen)) {
                return Some(ans);
            }
        }
        if q.contains("kick") || q.contains("geri") {
            if let Some(ans) = listed("Dakentaijutsu kicks (Keri)", catalog.names_in(Section::Keri)) {
                return Some(ans);
            }
        }
        if q.contains("block") {
            if let Some(ans) = listed("Basic Dakentaijutsu blocks", catalog.names_in(Section::Blocking)) {
                return Some(ans);
            }
        }
        if q.contains("uke nagashi") {
            if let Some(ans) = listed("Uke Nagashi (Receiving Flow) variations", catalog.names_in(Section::UkeNagashi)) {
                return Some(ans);
            }
        }
        if q.contains("principles") && q.contains("striking") {
            let items = catalog.names_in(Section::StrikingPrinciples);
            if !items.is_empty() {
                return Some(format!("Principles of striking: {}", items.join("; ")));
            }
        }
        None
    }
}

impl Extractor for Dakentaijutsu {
    fn name(&self) -> &'static str {
        "dakentaijutsu"
    }

    fn try_answer(&self, query: &Query, passages: &[Passage]) -> Option<String> {
        let q = query.folded();
        if !Self::applies(q) {
            return None;
        }
        let mut scratch = None;
        let catalog = section_catalog(&self.library, passages, &mut scratch);
        Self::list_answer(q, catalog).or_else(|| {
            let item = catalog.named_in(q, Section::is_dakentaijutsu)?;
            Some(catalog.format(item, Detail::Full))
        })
    }
}

/// Ukemi and kaiten.
pub struct Taihenjutsu {
    library: Arc<Library>,
}

impl Taihenjutsu {
    pub fn new(library: Arc<Library>) -> Self {
        Self { library }
    }
}

impl Extractor for Taihenjutsu {
    fn name(&self) -> &'static str {
        "taihenjutsu"
    }

    fn try_answer(&self, query: &Query, passages: &[Passage]) -> Option<String> {
        let q = query.folded();
        let want_ukemi = q.contains("ukemi") || q.contains("breakfall") || q.contains("break fall");
        let want_rolls = q.contains("kaiten") || q.contains("roll");
        if !q.contains("taihenjutsu") && !want_ukemi && !want_rolls {
            return None;
        }
        let mut scratch = None;
        let catalog = section_catalog(&self.library, passages, &mut scratch);

        let list_intent = wants_list(q)
            || (q.contains("what") && (q.contains("roll") || q.contains("ukemi") || q.contains("taihenjutsu")));
        if list_intent {
            let answer = want_ukemi
                .then(|| listed("Ukemi (breakfalls)", catalog.names_in(Section::Ukemi)))
                .flatten()
                .or_else(|| want_rolls.then(|| listed("Kaiten (rolls)", catalog.names_in(Section::Kaiten))).flatten())
                .or_else(|| {
                    let all = catalog.list_all().iter().filter(|i| i.section.is_taihenjutsu()).map(|i| i.name.clone());
                    listed("Taihenjutsu skills", all.collect())
                });
            if answer.is_some() {
                return answer;
            }
        }
        let item = catalog.named_in(q, Section::is_taihenjutsu)?;
        Some(catalog.format(item, Detail::Full))
    }
}

pub struct NageWaza {
    library: Arc<Library>,
}

impl NageWaza {
    pub fn new(library: Arc<Library>) -> Self {
        Self { library }
    }

    fn applies(q: &str) -> bool {
        q.contains("nage waza")
            || q.contains("throwing waza")
            || (q.contains("throwing techniques") && ["nage", "bujinkan", "curriculum"].iter().any(|w| q.contains(w)))
            || (q.contains("throws") && q.contains("nage"))
    }
}

impl Extractor for NageWaza {
    fn name(&self) -> &'static str {
        "nage-waza"
    }

    fn try_answer(&self, query: &Query, passages: &[Passage]) -> Option<String> {
        let q = query.folded();
        // Grade-specific throw questions belong to the rank extractor.
        if !Self::applies(q) || is_rank_question(q) {
            return None;
        }
        let mut scratch = None;
        let catalog = section_catalog(&self.library, passages, &mut scratch);
        let list_intent =
            wants_list(q) || (q.contains("what") && (q.contains("throws") || q.contains("nage waza")));
        if list_intent {
            if let Some(ans) = listed("Nage Waza throws", catalog.names_in(Section::NageWaza)) {
                return Some(ans);
            }
        }
        let item = catalog.named_in(q, |s| s == Section::NageWaza)?;
        Some(catalog.format(item, Detail::Full))
    }
}

pub struct JimeWaza {
    library: Arc<Library>,
}

impl JimeWaza {
    pub fn new(library: Arc<Library>) -> Self {
        Self { library }
    }

    fn is_list_query(q: &str) -> bool {
        q.contains("jime waza")
            || q.contains("choking waza")
            || q.contains("what jime")
            || (q.contains("chokes") && ["curriculum", "list", "what are"].iter().any(|w| q.contains(w)))
    }
}

impl Extractor for JimeWaza {
    fn name(&self) -> &'static str {
        "jime-waza"
    }

    fn try_answer(&self, query: &Query, passages: &[Passage]) -> Option<String> {
        let q = query.folded();
        if is_rank_question(q) {
            return None;
        }
        let mut scratch = None;
        let catalog = section_catalog(&self.library, passages, &mut scratch);
        if Self::is_list_query(q) {
            let mut names = catalog.names_in(Section::JimeWaza);
            if !names.is_empty() {
                names.sort();
                return Some(format!("Jime Waza chokes in the curriculum: {}", join_oxford(&names)));
            }
        }
        let item = catalog.in_section(Section::JimeWaza).find(|i| q.contains(&fold(&i.name)))?;
        Some(if item.description.is_empty() {
            format!("{} is one of the Jime Waza choking techniques.", item.name)
        } else {
            format!("{}: {} (Jime Waza choking technique).", item.name, item.description.trim_end_matches('.'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::DocumentSet;
    use nttv_core::types::ChunkRecord;

    const TRAINING: &str = "\
Taihenjutsu- Body Skills
Ukemi- Breakfalls
· Zenpo Ukemi- Forward Breakfall
· Koho Ukemi- Backward Breakfall
Kaiten- Rolls
· Zenpo Kaiten- Forward Roll
Keri- Kicks
· Zenpo Geri- Front Kick
· Sokuho Geri- Side Kick
Hoken Juroppo Ken- The Sixteen Hidden Fists
· Kikaku Ken- Demon Horn Fist
· Shuto Ken- Sword Hand
Nage waza- Throwing Techniques
· Ganseki Nage- Rock Throw
· Osoto Gake- Outer Reap
Jime waza- Choking Techniques
· Sankaku Jime- Triangle Choke
· Gyaku Jime- Reverse Choke
";

    fn library() -> Arc<Library> {
        let records = [ChunkRecord {
            text: TRAINING.into(),
            source: "data/NTTV Training Reference.txt".into(),
            page: None,
            priority: 1,
        }];
        Arc::new(Library::from_documents(DocumentSet::from_records(&records)))
    }

    fn ask(ex: &dyn Extractor, q: &str) -> Option<String> {
        ex.try_answer(&Query::new(q), &[])
    }

    #[test]
    fn dakentaijutsu_lists() {
        let ex = Dakentaijutsu::new(library());
        assert_eq!(
            ask(&ex, "What are the Hoken Juroppo Ken?").as_deref(),
            Some("Hoken Juroppo Ken (The Sixteen Hidden Fists): Kikaku Ken and Shuto Ken")
        );
        assert_eq!(
            ask(&ex, "List the dakentaijutsu kicks").as_deref(),
            Some("Dakentaijutsu kicks (Keri): Zenpo Geri and Sokuho Geri")
        );
        assert_eq!(ask(&ex, "What is Kikaku Ken in dakentaijutsu?").as_deref(), Some("Kikaku Ken (Hoken Juroppo Ken): Demon Horn Fist"));
    }

    #[test]
    fn taihenjutsu_lists_and_items() {
        let ex = Taihenjutsu::new(library());
        assert_eq!(
            ask(&ex, "List the ukemi breakfalls").as_deref(),
            Some("Ukemi (breakfalls): Zenpo Ukemi and Koho Ukemi")
        );
        assert_eq!(ask(&ex, "What rolls are in taihenjutsu?").as_deref(), Some("Kaiten (rolls): Zenpo Kaiten"));
        assert_eq!(ask(&ex, "explain zenpo kaiten").as_deref(), Some("Zenpo Kaiten (Kaiten): Forward Roll"));
    }

    #[test]
    fn nage_waza_defers_rank_questions() {
        let ex = NageWaza::new(library());
        assert_eq!(ask(&ex, "What are the nage waza?").as_deref(), Some("Nage Waza throws: Ganseki Nage and Osoto Gake"));
        assert!(ask(&ex, "What nage waza throws do I learn at 6th kyu?").is_none());
    }

    #[test]
    fn jime_waza_list_is_sorted() {
        let ex = JimeWaza::new(library());
        assert_eq!(
            ask(&ex, "What jime waza do we study?").as_deref(),
            Some("Jime Waza chokes in the curriculum: Gyaku Jime and Sankaku Jime")
        );
        assert_eq!(
            ask(&ex, "Explain Sankaku Jime").as_deref(),
            Some("Sankaku Jime: Triangle Choke (Jime Waza choking technique).")
        );
    }
}
