use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Completion, Passage, Query};

/// Text to fixed-length, L2-normalized vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model, recorded next to an index.
    fn embedder_id(&self) -> &str;
    fn dim(&self) -> usize;
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for t in texts {
            out.push(self.embed(t).await?);
        }
        Ok(out)
    }
}

/// Generative completion backend. Must not fail: errors become an empty
/// `Completion` whose `raw` field carries a diagnostic payload.
#[async_trait]
pub trait Completer: Send + Sync {
    fn model(&self) -> &str;
    async fn complete(&self, system: &str, user: &str) -> Completion;
}

/// One deterministic fact source. `None` means "not mine, try the next".
pub trait Extractor: Send + Sync {
    fn name(&self) -> &'static str;
    fn try_answer(&self, query: &Query, passages: &[Passage]) -> Option<String>;
}
