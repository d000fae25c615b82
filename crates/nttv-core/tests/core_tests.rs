use nttv_core::text::{fold, parse_tagged_row, split_bullet_body};
use nttv_core::types::{ChunkRecord, DetPath, Origin, Passage, Query, SyntheticKind};
use nttv_core::vocab::{asks_soke, find_school, Kyu};

fn record(text: &str, source: &str) -> ChunkRecord {
    ChunkRecord { text: text.to_string(), source: source.to_string(), page: Some(3), priority: 2 }
}

#[test]
fn retrieved_passage_copies_metadata() {
    let rec = record("Kihon Happo text", "data/NTTV Training Reference.txt");
    let p = Passage::retrieved(&rec, 0.42);
    assert_eq!(p.origin, Origin::Retrieved);
    assert_eq!(p.page, Some(3));
    assert_eq!(p.priority, 2);
    assert_eq!(p.source_name(), "NTTV Training Reference.txt");
    assert!((p.rerank_score - 0.42).abs() < f32::EPSILON);
}

#[test]
fn synthetic_scores_outrank_similarity() {
    let kinds = [
        SyntheticKind::TechniqueRow,
        SyntheticKind::Leadership,
        SyntheticKind::RankRequirements,
        SyntheticKind::Weapons,
        SyntheticKind::Schools,
        SyntheticKind::KihonHappo,
        SyntheticKind::TechniqueDescriptions,
    ];
    for pair in kinds.windows(2) {
        assert!(pair[0].score() > pair[1].score(), "fixed order {:?}", pair);
    }
    let p = Passage::synthetic(SyntheticKind::Weapons, "x".into(), "weapons reference.txt".into());
    assert!(p.is_synthetic());
    assert!(p.rerank_score > 1.5);
}

#[test]
fn query_views_are_folded_once() {
    let q = Query::new("Who is the Sōke of Gyokko-Ryū?").with_top_k(Some(0));
    assert_eq!(q.top_k(), None, "zero falls back to the configured default");
    assert_eq!(q.folded(), "who is the soke of gyokko-ryu?");
    assert!(asks_soke(q.folded()));
    assert_eq!(find_school(q.text()).map(|s| s.display), Some("Gyokko Ryū"));
}

#[test]
fn det_paths_serialize_as_dotted_tags() {
    let json = serde_json::to_string(&DetPath::RankRequirements).expect("json");
    assert_eq!(json, "\"rank/requirements\"");
    assert_eq!(DetPath::DeterministicCore.to_string(), "deterministic/core");
    assert!(!DetPath::LlmEmpty.is_deterministic());
}

#[test]
fn fourteen_token_row_preserves_description() {
    let line = "Ura Gyaku,裏逆,Inside Reverse,Joint Lock,8th Kyu,yes,Wrist,Control,yes,no,lock,Twist inward, drop the elbow, finish low";
    let row = parse_tagged_row(line, 12).expect("row");
    assert_eq!(row[0], "Ura Gyaku");
    assert_eq!(row[11], "Twist inward, drop the elbow, finish low");
}

#[test]
fn bullet_and_fold_work_together() {
    let (name, desc) = split_bullet_body("Yoko Nagare – Sideways flow");
    assert_eq!(fold(&name), "yoko nagare");
    assert_eq!(desc, "Sideways flow");
    assert_eq!(Kyu::parse("TENTH? no: 10th Kyu").map(Kyu::number), Some(10));
}
