//! Read-only passage corpus: index artifacts, similarity search, the
//! guarded-once loader and the query-aware reranker.

pub mod artifacts;
pub mod corpus;
pub mod rerank;
pub mod search;

pub use corpus::{Corpus, CorpusHandle};
pub use rerank::{Reranker, RerankWeights, ScoreBreakdown};
pub use search::FlatIndex;
