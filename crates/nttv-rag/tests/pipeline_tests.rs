use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::future::join_all;
use tempfile::TempDir;

use nttv_core::config::LlmSettings;
use nttv_core::traits::{Completer, Embedder};
use nttv_core::types::{ChunkRecord, Completion, DetPath};
use nttv_core::{Error, Result};
use nttv_corpus::artifacts::{write_index, IndexConfig};
use nttv_corpus::CorpusHandle;
use nttv_embed::HashEmbedder;
use nttv_rag::{HttpCompleter, Pipeline, PipelineOptions, NO_ANSWER};

const DIM: usize = 64;

/// Completer that records prompts and replies with a fixed text.
struct FakeCompleter {
    reply: String,
    calls: AtomicUsize,
    last_prompt: Mutex<String>,
}

impl FakeCompleter {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self { reply: reply.to_string(), calls: AtomicUsize::new(0), last_prompt: Mutex::new(String::new()) })
    }
}

#[async_trait]
impl Completer for FakeCompleter {
    fn model(&self) -> &str {
        "fake"
    }

    async fn complete(&self, _system: &str, user: &str) -> Completion {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = user.to_string();
        Completion { text: self.reply.clone(), raw: "{\"fake\":true}".into() }
    }
}

struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    fn embedder_id(&self) -> &str {
        "failing"
    }

    fn dim(&self) -> usize {
        DIM
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::upstream("embedding", "connection refused"))
    }
}

fn records() -> Vec<ChunkRecord> {
    let rec = |text: &str, source: &str, priority: u8| ChunkRecord {
        text: text.to_string(),
        source: source.to_string(),
        page: None,
        priority,
    };
    vec![
        rec(
            "9th Kyu\nStriking: Zenpo Geri; Fudo Ken\n8th Kyu\nStriking: Sokuho Geri; Koho Geri; Sakui Geri; Happo Geri; Kikaku Ken\n7th Kyu\nStriking: Tobi Geri",
            "data/nttv rank requirements.txt",
            3,
        ),
        rec("Gyokko Ryu Kosshijutsu - Ishizuka Tetsuji", "data/Bujinkan Leadership and Wisdom.txt", 2),
        rec("Classes usually run ninety minutes with a warm up.", "data/dojo notes.txt", 1),
    ]
}

fn build_index() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let embedder = HashEmbedder::new(DIM);
    let recs = records();
    let vectors: Vec<Vec<f32>> = recs.iter().map(|r| embedder.embed_sync(&r.text)).collect();
    let config = IndexConfig { embedding_model: "hash".into(), dim: DIM, top_k: Some(6) };
    write_index(tmp.path(), &config, &recs, &vectors).unwrap();
    tmp
}

fn pipeline(dir: &TempDir, embedder: Arc<dyn Embedder>, completer: Arc<dyn Completer>) -> Pipeline {
    Pipeline::new(CorpusHandle::new(dir.path()), embedder, completer, PipelineOptions::default())
}

#[tokio::test]
async fn rank_question_is_answered_without_the_model() {
    let dir = build_index();
    let completer = FakeCompleter::replying("should not be used");
    let p = pipeline(&dir, Arc::new(HashEmbedder::new(DIM)), completer.clone());

    let resp = p.answer_query("What are the kicks for 8th kyu?", None).await.unwrap();
    assert_eq!(resp.det_path, DetPath::RankRequirements);
    assert_eq!(resp.answer, "8th Kyu kicks: Sokuho Geri, Koho Geri, Sakui Geri, and Happo Geri.");
    assert_eq!(completer.calls.load(Ordering::SeqCst), 0);
    assert!(resp.sources[0].source.contains("rank requirements"));
    assert!(resp.sources.iter().all(|s| s.snippet.chars().count() <= 300));
}

#[tokio::test]
async fn fallback_sends_cited_context() {
    let dir = build_index();
    let completer = FakeCompleter::replying("  About ninety minutes.  ");
    let p = pipeline(&dir, Arc::new(HashEmbedder::new(DIM)), completer.clone());

    let resp = p.answer_query("How long is a typical class?", Some(2)).await.unwrap();
    assert_eq!(resp.det_path, DetPath::LlmFallback);
    assert_eq!(resp.answer, "About ninety minutes.");
    assert_eq!(resp.raw, "{\"fake\":true}");
    assert_eq!(resp.meta.model, "fake");
    let prompt = completer.last_prompt.lock().unwrap().clone();
    assert!(prompt.contains("[1] "), "{prompt}");
    assert!(prompt.ends_with("Question: How long is a typical class?\n\nAnswer:"));
}

#[tokio::test]
async fn empty_completion_becomes_the_sentinel() {
    let dir = build_index();
    let p = pipeline(&dir, Arc::new(HashEmbedder::new(DIM)), FakeCompleter::replying("   "));
    let resp = p.answer_query("How long is a typical class?", None).await.unwrap();
    assert_eq!(resp.det_path, DetPath::LlmEmpty);
    assert_eq!(resp.answer, NO_ANSWER);
}

#[tokio::test]
async fn embedding_failure_still_reaches_the_extractors() {
    let dir = build_index();
    let p = pipeline(&dir, Arc::new(FailingEmbedder), FakeCompleter::replying("unused"));
    let resp = p.answer_query("Who is the soke of Gyokko Ryu?", None).await.unwrap();
    assert_eq!(resp.meta.retrieval_count, 0);
    assert_eq!(resp.det_path, DetPath::LeadershipSoke);
    assert_eq!(resp.answer, "Ishizuka Tetsuji is the current sōke of Gyokko Ryū.");
}

#[tokio::test]
async fn retrieval_count_reports_the_kept_passages() {
    let dir = build_index();
    let p = pipeline(&dir, Arc::new(HashEmbedder::new(DIM)), FakeCompleter::replying("ok"));
    let resp = p.answer_query("How long is a typical class?", Some(1)).await.unwrap();
    assert_eq!(resp.meta.retrieval_count, 1);
}

#[tokio::test]
async fn huge_top_k_does_not_overflow() {
    let dir = build_index();
    let p = pipeline(&dir, Arc::new(HashEmbedder::new(DIM)), FakeCompleter::replying("ok"));
    let resp = p.answer_query("How long is a typical class?", Some(usize::MAX)).await.unwrap();
    assert!(resp.meta.retrieval_count > 0 && resp.meta.retrieval_count <= records().len());
}

#[tokio::test]
async fn missing_index_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let p = pipeline(&tmp, Arc::new(HashEmbedder::new(DIM)), FakeCompleter::replying("x"));
    let err = p.answer_query("anything", None).await.expect_err("no index");
    assert!(matches!(err, Error::CorpusUnavailable { .. }), "got {err:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_queries_load_the_corpus_once() {
    let dir = build_index();
    let p = Arc::new(pipeline(&dir, Arc::new(HashEmbedder::new(DIM)), FakeCompleter::replying("ok")));
    let tasks = (0..8).map(|_| {
        let p = p.clone();
        async move { p.answer_query("What are the kicks for 8th kyu?", None).await }
    });
    let results = join_all(tasks).await;
    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(p.corpus().load_count(), 1);
}

#[tokio::test]
async fn unreachable_completion_service_does_not_throw() {
    let settings = LlmSettings { base_url: "http://127.0.0.1:9".into(), timeout_secs: 2, ..LlmSettings::default() };
    let completer = HttpCompleter::new(&settings).unwrap();
    let out = completer.complete("system", "user").await;
    assert!(out.is_empty());
    let raw: serde_json::Value = serde_json::from_str(&out.raw).unwrap();
    assert!(raw.get("error").is_some() && raw.get("detail").is_some(), "{}", out.raw);
}

#[tokio::test]
async fn http_completer_reads_the_first_choice() {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "Hanbo is a half staff." } }]
        })))
        .mount(&server)
        .await;

    let settings = LlmSettings {
        base_url: format!("{}/v1", server.uri()),
        api_key: Some("test-key".into()),
        ..LlmSettings::default()
    };
    let out = HttpCompleter::new(&settings).unwrap().complete("system", "What is a hanbo?").await;
    assert_eq!(out.text, "Hanbo is a half staff.");
    assert!(out.raw.contains("choices"));
}

#[tokio::test]
async fn http_completer_reports_status_errors() {
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(500)).mount(&server).await;
    let settings = LlmSettings { base_url: server.uri(), ..LlmSettings::default() };
    let out = HttpCompleter::new(&settings).unwrap().complete("s", "u").await;
    assert!(out.is_empty());
    assert!(out.raw.contains("HTTPError"), "{}", out.raw);
}
