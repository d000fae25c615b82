//! Minimal ingestion for `build-index`: walk a directory of text files,
//! cut fixed character windows with overlap and tag each chunk with its
//! document tier.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use nttv_core::types::ChunkRecord;

pub const CHUNK_SIZE: usize = 700;
pub const CHUNK_OVERLAP: usize = 120;

const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "csv"];

const TIER_3: &[&str] = &["nttv rank requirements"];
const TIER_2: &[&str] = &[
    "nttv training reference",
    "technique descriptions",
    "weapons reference",
    "glossary",
    "leadership",
    "schools of the bujinkan",
];

/// Document tier from the file name: 3 for rank requirements, 2 for the
/// reference documents, 1 otherwise.
pub fn priority_for(source: &str) -> u8 {
    let name = source.to_lowercase();
    if TIER_3.iter().any(|t| name.contains(t)) {
        3
    } else if TIER_2.iter().any(|t| name.contains(t)) {
        2
    } else {
        1
    }
}

/// Character windows of `CHUNK_SIZE` overlapping by `CHUNK_OVERLAP`.
pub fn chunk_text(text: &str, source: &str) -> Vec<ChunkRecord> {
    let chars: Vec<char> = text.chars().collect();
    let priority = priority_for(source);
    let mut out = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + CHUNK_SIZE).min(chars.len());
        let window: String = chars[start..end].iter().collect();
        let window = window.trim();
        if !window.is_empty() {
            out.push(ChunkRecord { text: window.to_string(), source: source.to_string(), page: None, priority });
        }
        if end == chars.len() {
            break;
        }
        start = end - CHUNK_OVERLAP;
    }
    out
}

/// Text files under `dir`, sorted for a stable chunk order.
pub fn list_source_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|x| x.to_str())
                .is_some_and(|x| TEXT_EXTENSIONS.contains(&x.to_ascii_lowercase().as_str()))
        })
        .collect();
    files.sort();
    files
}

fn read_text(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(_) => {
            let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            Ok(String::from_utf8_lossy(&bytes).to_string())
        }
    }
}

/// Every chunk of every text file under `dir`. Sources are the file
/// paths with forward slashes.
pub fn collect_chunks(dir: &Path) -> Result<Vec<ChunkRecord>> {
    let mut all = Vec::new();
    for file in list_source_files(dir) {
        let text = read_text(&file)?;
        let source = file.to_string_lossy().replace('\\', "/");
        let chunks = chunk_text(&text, &source);
        tracing::info!(source = %source, chunks = chunks.len(), "chunked");
        all.extend(chunks);
    }
    Ok(all)
}
