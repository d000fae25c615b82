use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::OnceCell;

use nttv_core::types::{ChunkRecord, Passage};
use nttv_core::{Error, Result};

use crate::artifacts::{read_index, IndexConfig};
use crate::search::FlatIndex;

/// Immutable passages plus their similarity index.
#[derive(Debug)]
pub struct Corpus {
    dir: PathBuf,
    config: IndexConfig,
    records: Vec<ChunkRecord>,
    index: FlatIndex,
}

impl Corpus {
    pub fn open(dir: &Path) -> Result<Self> {
        let artifacts = read_index(dir)?;
        let index = FlatIndex::new(artifacts.dim, artifacts.vectors).map_err(|e| Error::corpus(dir, e))?;
        tracing::info!(dir = %dir.display(), passages = artifacts.records.len(), dim = artifacts.dim, "corpus loaded");
        Ok(Self { dir: dir.to_path_buf(), config: artifacts.config, records: artifacts.records, index })
    }

    /// Assemble a corpus in memory (tests, tooling).
    pub fn from_parts(config: IndexConfig, records: Vec<ChunkRecord>, vectors: &[Vec<f32>]) -> Result<Self> {
        if records.len() != vectors.len() {
            return Err(Error::InvalidArtifact(format!("{} records but {} vectors", records.len(), vectors.len())));
        }
        let data: Vec<f32> = vectors.iter().flatten().copied().collect();
        let index = FlatIndex::new(config.dim, data)?;
        if index.len() != records.len() {
            return Err(Error::InvalidArtifact("vector rows do not match records".to_string()));
        }
        Ok(Self { dir: PathBuf::new(), config, records, index })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn records(&self) -> &[ChunkRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        self.index.search(query, k)
    }

    /// `search` resolved to passages carrying their raw similarity.
    pub fn retrieve(&self, query: &[f32], k: usize) -> Result<Vec<Passage>> {
        let hits = self.search(query, k)?;
        Ok(hits
            .into_iter()
            .filter_map(|(i, score)| self.records.get(i).map(|r| Passage::retrieved(r, score)))
            .collect())
    }
}

/// Lazily opened, process-wide corpus.
///
/// The first `get` opens the index; concurrent callers wait on the same
/// load. A failed load is cached and returned to every later caller
/// without touching the disk again.
pub struct CorpusHandle {
    dir: PathBuf,
    cell: OnceCell<std::result::Result<Arc<Corpus>, Error>>,
    loads: AtomicUsize,
}

impl CorpusHandle {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), cell: OnceCell::new(), loads: AtomicUsize::new(0) }
    }

    /// Handle around a corpus that is already in memory.
    pub fn ready(corpus: Corpus) -> Self {
        let dir = corpus.dir.clone();
        Self { dir, cell: OnceCell::new_with(Some(Ok(Arc::new(corpus)))), loads: AtomicUsize::new(0) }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn get(&self) -> Result<Arc<Corpus>> {
        let loaded = self
            .cell
            .get_or_init(|| async {
                self.loads.fetch_add(1, Ordering::SeqCst);
                let dir = self.dir.clone();
                match tokio::task::spawn_blocking(move || Corpus::open(&dir)).await {
                    Ok(Ok(corpus)) => Ok(Arc::new(corpus)),
                    Ok(Err(e)) => {
                        tracing::error!(error = %e, "corpus load failed");
                        Err(e)
                    }
                    Err(join) => Err(Error::corpus(&self.dir, join)),
                }
            })
            .await;
        loaded.clone()
    }

    /// How many times a load actually ran.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}
