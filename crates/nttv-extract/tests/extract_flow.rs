mod common;

use proptest::prelude::*;

use nttv_core::types::{DetPath, Passage, Query, SyntheticKind};
use nttv_extract::{PassageInjector, Route};

use common::{ask, library, retrieved};

fn answered(route: Route) -> (String, DetPath, String) {
    match route {
        Route::Answered(a) => (a.text, a.det_path, a.extractor),
        Route::NeedsCompletion(path) => panic!("expected a deterministic answer, got {path}"),
    }
}

#[test]
fn rank_scoped_kicks_exclude_other_grades() {
    let lib = library();
    let (text, path, _) = answered(ask(&lib, "What are the kicks for 8th kyu?"));
    assert_eq!(path, DetPath::RankRequirements);
    for kick in ["Sokuho Geri", "Koho Geri", "Sakui Geri", "Happo Geri"] {
        assert!(text.contains(kick), "missing {kick}: {text}");
    }
    assert!(!text.contains("Zenpo Geri"), "9th kyu item leaked: {text}");
    assert!(!text.contains("Tobi Geri"), "7th kyu item leaked: {text}");
}

#[test]
fn cumulative_kicks_include_lower_grades() {
    let lib = library();
    let (text, path, _) = answered(ask(&lib, "What kicks do I need to know for 8th kyu?"));
    assert_eq!(path, DetPath::RankRequirements);
    assert!(text.contains("Zenpo Geri") && text.contains("Happo Geri"), "{text}");
    assert!(!text.contains("Tobi Geri"), "{text}");
}

#[test]
fn punches_are_split_from_a_shared_striking_line() {
    let lib = library();
    let (text, path, _) = answered(ask(&lib, "What are the punches for 8th kyu?"));
    assert_eq!(path, DetPath::RankRequirements);
    assert_eq!(text, "8th Kyu punches: Kikaku Ken and Shuto Ken.");
    assert!(!text.contains("Geri"), "kick leaked into punches: {text}");
    assert!(!text.contains("Fudo Ken"), "9th kyu item leaked: {text}");

    let (text, _, _) = answered(ask(&lib, "What are the kicks for 8th kyu?"));
    assert!(!text.contains(" Ken"), "punch leaked into kicks: {text}");
}

#[test]
fn omote_and_ura_are_compared_field_by_field() {
    let lib = library();
    let (text, path, extractor) = answered(ask(&lib, "What is the difference between Omote Gyaku and Ura Gyaku?"));
    assert_eq!(path, DetPath::DeterministicCore);
    assert_eq!(extractor, "technique-diff");
    assert!(text.starts_with("Difference between Omote Gyaku and Ura Gyaku:"));
    for section in ["\nTranslation:", "\nType:", "\nDescription:"] {
        assert!(text.contains(section), "missing {section:?}: {text}");
    }
    assert!(text.contains("- Omote Gyaku: Outward wrist twist, taking the balance, then a takedown"));
    assert!(text.contains("- Ura Gyaku: Inward wrist twist, elbow up"));
}

#[test]
fn leadership_wins_over_later_topics() {
    let lib = library();
    let (text, path, _) = answered(ask(&lib, "Who is the soke of Gyokko Ryu, and what is zanshin?"));
    assert_eq!(path, DetPath::LeadershipSoke);
    assert_eq!(text, "Ishizuka Tetsuji is the current sōke of Gyokko Ryū.");
}

#[test]
fn single_technique_takes_the_fast_path() {
    let lib = library();
    let (text, path, _) = answered(ask(&lib, "What is Omote Gyaku?"));
    assert_eq!(path, DetPath::TechniqueSingle);
    assert!(text.starts_with("Omote Gyaku:\n- Translation: Outside reverse"));
    assert!(text.ends_with("- Definition: Outward wrist twist, taking the balance, then a takedown"));
}

#[test]
fn weapon_rank_and_glossary_routes() {
    let lib = library();
    let (text, path, _) = answered(ask(&lib, "At what rank do I learn kusari fundo?"));
    assert_eq!(path, DetPath::WeaponsRank);
    assert_eq!(text, "You first study Kusari Fundo at 4th Kyu.");

    let (text, _, extractor) = answered(ask(&lib, "What is shomen?"));
    assert_eq!(extractor, "glossary");
    assert_eq!(text, "Shomen: Front of the dojo");
}

#[test]
fn school_without_profile_goes_to_completion() {
    let lib = library();
    assert_eq!(ask(&lib, "Tell me about Kukishinden Ryu"), Route::NeedsCompletion(DetPath::SchoolsLlm));
    assert_eq!(ask(&lib, "How long is a typical class?"), Route::NeedsCompletion(DetPath::LlmFallback));
}

const QUERIES: &[&str] = &[
    "What are the kicks for 8th kyu?",
    "Who is the soke of Gyokko Ryu?",
    "What is Omote Gyaku?",
    "At what rank do I learn kusari fundo?",
    "Explain the kihon happo",
    "What is the difference between Omote Gyaku and Ura Gyaku?",
];

proptest! {
    #[test]
    fn injection_is_idempotent(q in prop::sample::select(QUERIES), extra in prop::collection::vec("[a-z ]{0,40}", 0..4)) {
        let lib = library();
        let injector = PassageInjector::new(lib);
        let mut ranked = retrieved();
        ranked.extend(extra.iter().map(|t| Passage::retrieved(&nttv_core::types::ChunkRecord {
            text: t.clone(),
            source: "data/misc.txt".into(),
            page: None,
            priority: 1,
        }, 0.1)));
        let query = Query::new(q);
        let once = injector.inject(&query, &ranked);
        let twice = injector.inject(&query, &once);
        prop_assert_eq!(&once, &twice);

        let kinds: Vec<SyntheticKind> = once.iter().filter_map(Passage::synthetic_kind).collect();
        let mut unique = kinds.clone();
        unique.dedup();
        prop_assert_eq!(kinds, unique);
        prop_assert!(once.iter().skip_while(|p| p.is_synthetic()).all(|p| !p.is_synthetic()));
    }
}
