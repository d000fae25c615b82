#![deny(unused_imports)]

//! Deterministic answering: corpus documents, structured parsers, topic
//! extractors, passage injection, routing and answer composition.

pub mod compose;
pub mod documents;
pub mod extractors;
pub mod inject;
pub mod library;
pub mod parsers;
pub mod router;

pub use compose::AnswerComposer;
pub use documents::DocumentSet;
pub use inject::PassageInjector;
pub use library::Library;
pub use router::{ExtractorRouter, Route};
