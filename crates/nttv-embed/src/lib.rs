//! Embedding service clients.
//!
//! `HashEmbedder` is a deterministic, offline stand-in used for tests and
//! for building throwaway indexes. `HttpEmbedder` talks to any
//! OpenAI-compatible `/embeddings` endpoint. Both return L2-normalized
//! vectors of a fixed dimensionality.

use std::time::Duration;

use nttv_core::config::{EmbedProvider, EmbedSettings};
use nttv_core::traits::Embedder;
use nttv_core::Result;

mod hash;
mod http;

pub use hash::HashEmbedder;
pub use http::HttpEmbedder;

/// Build the embedder named by configuration.
///
/// `APP_USE_FAKE_EMBEDDINGS=1` forces the hashing embedder regardless of
/// the configured provider.
pub fn get_default_embedder(settings: &EmbedSettings) -> Result<Box<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake || settings.provider == EmbedProvider::Hash {
        tracing::info!(dim = settings.dim, "using hash embedder");
        return Ok(Box::new(HashEmbedder::new(settings.dim)));
    }
    tracing::info!(model = %settings.model, base = %settings.base_url, "using http embedder");
    Ok(Box::new(HttpEmbedder::new(&settings.base_url, &settings.model, settings.dim, Duration::from_secs(30))?))
}

pub(crate) fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
    for x in v.iter_mut() {
        *x /= norm;
    }
}
