//! On-disk layout of a built index.
//!
//! ```text
//! <dir>/config.json   { "embedding_model": ..., "dim": N, "top_k": 6 }
//! <dir>/vectors.bin   b"NTTV" | u32 version | u32 dim | u32 count | count*dim f32 (LE)
//! <dir>/meta.json     [ { "text", "source", "page", "priority" }, ... ]
//! ```
//! Row `i` of `meta.json` describes vector `i`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use nttv_core::types::ChunkRecord;
use nttv_core::{Error, Result};

pub const CONFIG_FILE: &str = "config.json";
pub const VECTORS_FILE: &str = "vectors.bin";
pub const META_FILE: &str = "meta.json";

const MAGIC: &[u8; 4] = b"NTTV";
const VERSION: u32 = 1;
const HEADER_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    pub embedding_model: String,
    pub dim: usize,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct IndexArtifacts {
    pub config: IndexConfig,
    pub dim: usize,
    /// Row-major, `records.len() * dim` values.
    pub vectors: Vec<f32>,
    pub records: Vec<ChunkRecord>,
}

pub fn read_index(dir: &Path) -> Result<IndexArtifacts> {
    if !dir.is_dir() {
        return Err(Error::corpus(dir, "index directory not found"));
    }
    let config_path = dir.join(CONFIG_FILE);
    let config: IndexConfig = serde_json::from_str(&read_text(&config_path)?)
        .map_err(|e| Error::corpus(&config_path, format!("bad config: {e}")))?;

    let meta_path = dir.join(META_FILE);
    let records: Vec<ChunkRecord> = serde_json::from_str(&read_text(&meta_path)?)
        .map_err(|e| Error::corpus(&meta_path, format!("bad metadata: {e}")))?;

    let vectors_path = dir.join(VECTORS_FILE);
    let bytes = fs::read(&vectors_path).map_err(|e| Error::corpus(&vectors_path, e))?;
    let (dim, count, vectors) = decode_vectors(&bytes).map_err(|e| Error::corpus(&vectors_path, e))?;

    if dim != config.dim {
        return Err(Error::corpus(dir, format!("config dim {} != vector dim {}", config.dim, dim)));
    }
    if count != records.len() {
        return Err(Error::corpus(dir, format!("{} vectors but {} metadata records", count, records.len())));
    }
    Ok(IndexArtifacts { config, dim, vectors, records })
}

pub fn write_index(dir: &Path, config: &IndexConfig, records: &[ChunkRecord], vectors: &[Vec<f32>]) -> Result<()> {
    if records.len() != vectors.len() {
        return Err(Error::InvalidArtifact(format!("{} records but {} vectors", records.len(), vectors.len())));
    }
    if let Some(bad) = vectors.iter().position(|v| v.len() != config.dim) {
        return Err(Error::InvalidArtifact(format!("vector {bad} has wrong dimension")));
    }
    fs::create_dir_all(dir).map_err(|e| Error::InvalidArtifact(e.to_string()))?;
    let config_json = serde_json::to_string_pretty(config).map_err(|e| Error::InvalidArtifact(e.to_string()))?;
    let meta_json = serde_json::to_string(records).map_err(|e| Error::InvalidArtifact(e.to_string()))?;
    let write = |name: &str, bytes: &[u8]| fs::write(dir.join(name), bytes).map_err(|e| Error::InvalidArtifact(e.to_string()));
    write(CONFIG_FILE, config_json.as_bytes())?;
    write(META_FILE, meta_json.as_bytes())?;
    write(VECTORS_FILE, &encode_vectors(config.dim, vectors))
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::corpus(path, e))
}

pub fn encode_vectors(dim: usize, vectors: &[Vec<f32>]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + vectors.len() * dim * 4);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&(dim as u32).to_le_bytes());
    out.extend_from_slice(&(vectors.len() as u32).to_le_bytes());
    for v in vectors {
        for x in v {
            out.extend_from_slice(&x.to_le_bytes());
        }
    }
    out
}

/// Returns `(dim, count, flat values)`.
pub fn decode_vectors(bytes: &[u8]) -> std::result::Result<(usize, usize, Vec<f32>), String> {
    if bytes.len() < HEADER_LEN || &bytes[..4] != MAGIC {
        return Err("not a vector file".to_string());
    }
    let word = |at: usize| u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
    let version = word(4);
    if version != VERSION {
        return Err(format!("unsupported version {version}"));
    }
    let dim = word(8) as usize;
    let count = word(12) as usize;
    if dim == 0 {
        return Err("zero dimension".to_string());
    }
    let expected = HEADER_LEN + dim * count * 4;
    if bytes.len() != expected {
        return Err(format!("expected {expected} bytes, found {}", bytes.len()));
    }
    let values = bytes[HEADER_LEN..]
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    Ok((dim, count, values))
}
