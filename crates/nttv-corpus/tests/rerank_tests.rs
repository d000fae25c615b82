use nttv_core::types::{ChunkRecord, Passage, Query};
use nttv_corpus::Reranker;
use proptest::prelude::*;

fn passage(text: &str, source: &str, priority: u8, similarity: f32) -> Passage {
    let rec = ChunkRecord { text: text.to_string(), source: source.to_string(), page: None, priority };
    Passage::retrieved(&rec, similarity)
}

#[test]
fn exact_rank_match_beats_higher_similarity() {
    let q = Query::new("What are the kicks for 8th kyu?");
    let hits = vec![
        passage("9th Kyu kicks: Zenpo Geri", "notes.txt", 1, 0.80),
        passage("8th Kyu kicks: Sokuho Geri, Koho Geri", "notes.txt", 1, 0.60),
    ];
    let ranked = Reranker::default().rerank(&q, hits, 6);
    assert!(ranked[0].text.starts_with("8th Kyu"));
    assert!(ranked[0].rerank_score > ranked[1].rerank_score);
}

#[test]
fn breakdown_reports_each_signal() {
    let r = Reranker::default();
    let q = Query::new("Explain kihon happo");
    let p = passage("Kihon Happo and kyusho points of the Bujinkan", "data/nttv training reference.txt", 0, 0.5);
    let b = r.score(&q, &p);
    assert!((b.priority - 0.20).abs() < 1e-6, "filename heuristic for training reference");
    assert!((b.keyword - 0.05).abs() < 1e-6, "bujinkan keyword only");
    assert!((b.topic - 0.60).abs() < 1e-6);
    assert!((b.offtopic_penalty - 0.15).abs() < 1e-6);
    assert!(b.length_penalty > 0.0 && b.length_penalty < 0.05);
    assert!((b.total() - (0.5 + 0.20 + 0.05 + 0.60 - 0.15 - b.length_penalty)).abs() < 1e-5);
}

#[test]
fn leadership_file_gets_extra_boost() {
    let r = Reranker::default();
    let q = Query::new("Who is the sōke of Gyokko-ryū?");
    let lead = passage("Gyokko Ryu | Ishizuka Tetsuji", "Bujinkan Leadership and Wisdom.txt", 2, 0.3);
    let other = passage("Gyokko Ryu focuses on kosshijutsu", "Schools of the Bujinkan Summaries.txt", 2, 0.3);
    let (lb, ob) = (r.score(&q, &lead), r.score(&q, &other));
    assert!((lb.topic - (0.45 + 0.60 + 0.20)).abs() < 1e-5);
    assert!((ob.topic - 0.45).abs() < 1e-5);
}

#[test]
fn lore_and_length_penalties_apply() {
    let r = Reranker::default();
    let q = Query::new("what is taijutsu");
    let long = "legend ".repeat(1000);
    let b = r.score(&q, &passage(&long, "stories.txt", 1, 0.9));
    assert!((b.lore_penalty - 0.10).abs() < 1e-6);
    assert!((b.length_penalty - 0.3).abs() < 1e-6, "length penalty is capped");
}

#[test]
fn ties_keep_similarity_order_and_truncate() {
    let q = Query::new("unrelated words");
    let hits: Vec<Passage> = (0..5).map(|i| passage(&format!("same {i}"), "a.txt", 1, 0.5)).collect();
    let ranked = Reranker::default().rerank(&q, hits, 3);
    let texts: Vec<&str> = ranked.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(texts, vec!["same 0", "same 1", "same 2"]);
}

fn arb_passage() -> impl Strategy<Value = Passage> {
    let words = prop::sample::select(vec![
        "kyusho", "kihon happo", "sanshin", "8th kyu", "9th kyu", "hanbo", "gyokko ryu", "soke", "legend", "geri",
    ]);
    (prop::collection::vec(words, 1..6), 0u8..4, 0.0f32..1.0, prop::bool::ANY).prop_map(|(ws, prio, sim, lead)| {
        let source = if lead { "Bujinkan Leadership and Wisdom.txt" } else { "notes.txt" };
        passage(&ws.join(" "), source, prio, sim)
    })
}

proptest! {
    #[test]
    fn rerank_is_deterministic(
        hits in prop::collection::vec(arb_passage(), 0..12),
        q in "(kicks|soke|hanbo|kihon happo|sanshin) (for )?(8th|9th) kyu",
    ) {
        let r = Reranker::default();
        let query = Query::new(q);
        let a = r.rerank(&query, hits.clone(), 6);
        let b = r.rerank(&query, hits, 6);
        prop_assert_eq!(&a, &b);
        prop_assert!(a.len() <= 6);
        prop_assert!(a.windows(2).all(|w| w[0].rerank_score >= w[1].rerank_score));
    }
}
