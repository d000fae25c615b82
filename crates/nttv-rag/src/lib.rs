#![deny(unused_imports)]

//! Retrieval-augmented answering over the curriculum corpus.

pub mod completion;
pub mod context;
pub mod pipeline;

pub use completion::HttpCompleter;
pub use pipeline::{Pipeline, PipelineOptions, QueryResponse, SourceRef, NO_ANSWER};
