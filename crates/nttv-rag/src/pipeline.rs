//! Query orchestration: retrieve, rerank, inject, route, then either
//! compose the deterministic answer or fall back to a completion call.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use nttv_core::config::Settings;
use nttv_core::text::truncate_chars;
use nttv_core::traits::{Completer, Embedder};
use nttv_core::types::{DetPath, OutputFormat, Passage, Query, Tone};
use nttv_core::Result;
use nttv_corpus::{Corpus, CorpusHandle, Reranker};
use nttv_extract::{AnswerComposer, ExtractorRouter, Library, PassageInjector, Route};

use crate::context::{build_context, build_prompt};

/// Answer text when the completion service returns nothing.
pub const NO_ANSWER: &str = "❌ Model returned no text.";

const SNIPPET_CHARS: usize = 300;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub top_k: usize,
    pub overfetch: usize,
    pub max_context_chars: usize,
    pub system_prompt: String,
    pub format: OutputFormat,
    pub tone: Tone,
}

impl PipelineOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            top_k: settings.retrieval.top_k,
            overfetch: settings.retrieval.overfetch,
            max_context_chars: settings.context.max_chars,
            system_prompt: settings.llm.system_prompt.clone(),
            format: settings.output.format,
            tone: settings.output.tone,
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceRef {
    pub source: String,
    pub page: Option<u32>,
    pub snippet: String,
    pub score: f32,
}

impl From<&Passage> for SourceRef {
    fn from(p: &Passage) -> Self {
        Self {
            source: p.source.clone(),
            page: p.page,
            snippet: truncate_chars(&p.text, SNIPPET_CHARS).to_string(),
            score: p.rerank_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseMeta {
    pub model: String,
    pub retrieval_count: usize,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub det_path: DetPath,
    pub meta: ResponseMeta,
    /// Completion diagnostics, or the deterministic route as JSON.
    pub raw: String,
}

/// Per-corpus state built on first use.
struct Engine {
    library: Arc<Library>,
    injector: PassageInjector,
    router: ExtractorRouter,
}

pub struct Pipeline {
    corpus: CorpusHandle,
    embedder: Arc<dyn Embedder>,
    completer: Arc<dyn Completer>,
    reranker: Reranker,
    composer: AnswerComposer,
    options: PipelineOptions,
    engine: OnceCell<Engine>,
}

impl Pipeline {
    pub fn new(
        corpus: CorpusHandle,
        embedder: Arc<dyn Embedder>,
        completer: Arc<dyn Completer>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            corpus,
            embedder,
            completer,
            reranker: Reranker::default(),
            composer: AnswerComposer::new(options.format, options.tone),
            options,
            engine: OnceCell::new(),
        }
    }

    pub fn with_reranker(mut self, reranker: Reranker) -> Self {
        self.reranker = reranker;
        self
    }

    pub fn corpus(&self) -> &CorpusHandle {
        &self.corpus
    }

    /// Parsed catalogs for the loaded corpus.
    pub async fn library(&self) -> Result<Arc<Library>> {
        Ok(self.engine().await?.library.clone())
    }

    async fn engine(&self) -> Result<&Engine> {
        let corpus = self.corpus.get().await?;
        let format = self.options.format;
        Ok(self
            .engine
            .get_or_init(|| async move {
                let library = Arc::new(Library::from_records(corpus.records()));
                Engine {
                    injector: PassageInjector::new(library.clone()),
                    router: ExtractorRouter::new(library.clone(), format),
                    library,
                }
            })
            .await)
    }

    /// Answer one question. Only a corpus that cannot be loaded is an
    /// error; embedding and completion failures degrade in place.
    pub async fn answer_query(&self, text: &str, top_k: Option<usize>) -> Result<QueryResponse> {
        let started = Instant::now();
        let corpus = self.corpus.get().await?;
        let engine = self.engine().await?;

        let query = Query::new(text).with_top_k(top_k);
        let k = query.top_k().unwrap_or(self.options.top_k);
        let hits = self.retrieve(&corpus, &query, k).await;
        let ranked = self.reranker.rerank(&query, hits, k);
        let retrieval_count = ranked.len();
        let passages = engine.injector.inject(&query, &ranked);

        let (answer, det_path, raw) = match engine.router.route(&query, &passages) {
            Route::Answered(a) => {
                let raw = serde_json::json!({ "det_path": a.det_path, "extractor": a.extractor }).to_string();
                (self.composer.compose(&a.text), a.det_path, raw)
            }
            Route::NeedsCompletion(path) => self.complete(&query, &passages, path).await,
        };

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(%det_path, elapsed_ms, retrieval_count, "answered");
        Ok(QueryResponse {
            answer,
            sources: passages.iter().map(SourceRef::from).collect(),
            det_path,
            meta: ResponseMeta { model: self.completer.model().to_string(), retrieval_count, elapsed_ms },
            raw,
        })
    }

    async fn retrieve(&self, corpus: &Corpus, query: &Query, k: usize) -> Vec<Passage> {
        let vector = match self.embedder.embed(query.text()).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "query embedding failed; continuing without retrieval");
                return Vec::new();
            }
        };
        corpus.retrieve(&vector, k.saturating_mul(self.options.overfetch.max(1))).unwrap_or_else(|e| {
            warn!(error = %e, "search failed; continuing without retrieval");
            Vec::new()
        })
    }

    async fn complete(&self, query: &Query, passages: &[Passage], path: DetPath) -> (String, DetPath, String) {
        let context = build_context(passages, self.options.max_context_chars);
        let prompt = build_prompt(&context, query.text());
        let completion = self.completer.complete(&self.options.system_prompt, &prompt).await;
        let raw = if completion.raw.is_empty() { "{}".to_string() } else { completion.raw.clone() };
        if completion.is_empty() {
            warn!(branch = %path, "completion returned no text");
            return (NO_ANSWER.to_string(), DetPath::LlmEmpty, raw);
        }
        (completion.text.trim().to_string(), path, raw)
    }
}
