#![deny(unused_imports)]

pub mod config;
pub mod error;
pub mod text;
pub mod traits;
pub mod types;
pub mod vocab;

pub use error::{Error, Result};
