use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use nttv_cli::ingest::collect_chunks;
use nttv_core::config::{Config, Settings};
use nttv_corpus::artifacts::{write_index, IndexConfig};
use nttv_corpus::CorpusHandle;
use nttv_embed::get_default_embedder;
use nttv_rag::{HttpCompleter, Pipeline, PipelineOptions};

const EMBED_BATCH: usize = 64;

fn usage(prog: &str) -> ! {
    eprintln!("Usage: {prog} <ask|sources|stats|build-index> [args...]");
    eprintln!("  ask \"<question>\" [--top-k N] [--json]");
    eprintln!("  sources");
    eprintln!("  stats");
    eprintln!("  build-index <data_dir> [--out <index_dir>]");
    std::process::exit(1);
}

const VALUE_FLAGS: &[&str] = &["--top-k", "--out"];

fn flag_value(args: &[String], name: &str) -> Option<String> {
    args.iter().position(|a| a == name).and_then(|i| args.get(i + 1)).cloned()
}

/// First argument that is neither a flag nor a flag's value.
fn positional(args: &[String]) -> Option<&String> {
    let mut skip = false;
    args.iter().find(|a| {
        if std::mem::take(&mut skip) {
            return false;
        }
        if a.starts_with("--") {
            skip = VALUE_FLAGS.contains(&a.as_str());
            return false;
        }
        true
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        usage(&prog);
    }
    let cmd = args.remove(0);

    let config = Config::load().context("loading configuration")?;
    let settings = config.settings().context("reading settings")?;

    match cmd.as_str() {
        "ask" => ask(&settings, &args).await,
        "sources" => sources(&settings).await,
        "stats" => stats(&settings).await,
        "build-index" => build_index(&settings, &args).await,
        _ => {
            eprintln!("Unknown command: {cmd}");
            usage(&prog)
        }
    }
}

fn pipeline(settings: &Settings) -> Result<Pipeline> {
    let embedder = get_default_embedder(&settings.embed).context("creating embedder")?;
    let completer = HttpCompleter::new(&settings.llm).context("creating completion client")?;
    Ok(Pipeline::new(
        CorpusHandle::new(settings.index.path()),
        Arc::from(embedder),
        Arc::new(completer),
        PipelineOptions::from_settings(settings),
    ))
}

async fn ask(settings: &Settings, args: &[String]) -> Result<()> {
    let Some(question) = positional(args) else {
        bail!("ask needs a question");
    };
    let top_k = match flag_value(args, "--top-k") {
        Some(v) => Some(v.parse::<usize>().with_context(|| format!("--top-k expects a number, got {v}"))?),
        None => None,
    };
    let json = args.iter().any(|a| a == "--json");

    let pipeline = pipeline(settings)?;
    let resp = pipeline
        .answer_query(question, top_k)
        .await
        .with_context(|| format!("answering from index at {}", settings.index.path().display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resp)?);
        return Ok(());
    }
    println!("{}\n", resp.answer);
    println!("det_path: {}  ({} ms)", resp.det_path, resp.meta.elapsed_ms);
    for (i, s) in resp.sources.iter().enumerate() {
        let page = s.page.map(|p| format!(" (p. {p})")).unwrap_or_default();
        println!("  [{}] {}{}  score={:.3}", i + 1, s.source, page, s.score);
    }
    Ok(())
}

async fn sources(settings: &Settings) -> Result<()> {
    let handle = CorpusHandle::new(settings.index.path());
    let corpus = handle.get().await.context("loading corpus")?;
    let mut by_source: BTreeMap<&str, (usize, u8)> = BTreeMap::new();
    for r in corpus.records() {
        let entry = by_source.entry(r.source.as_str()).or_insert((0, r.priority));
        entry.0 += 1;
    }
    for (source, (chunks, priority)) in by_source {
        println!("{source}  chunks={chunks}  priority={priority}");
    }
    Ok(())
}

async fn stats(settings: &Settings) -> Result<()> {
    let pipeline = pipeline(settings)?;
    let corpus = pipeline.corpus().get().await.context("loading corpus")?;
    let library = pipeline.library().await?;
    let cfg = corpus.config();
    println!("index:        {}", corpus.dir().display());
    println!("embedding:    {} (dim {})", cfg.embedding_model, cfg.dim);
    println!("chunks:       {}", corpus.len());
    println!("documents:    {}", library.documents.len());
    println!("techniques:   {}", library.techniques.len());
    println!("glossary:     {}", library.glossary.len());
    println!("kyusho:       {}", library.kyusho.len());
    println!("sections:     {}", library.sections.len());
    println!("weapons:      {}", library.weapons.len());
    if cfg.dim != settings.embed.dim {
        println!("⚠️  configured embed.dim {} differs from the index ({})", settings.embed.dim, cfg.dim);
    }
    Ok(())
}

async fn build_index(settings: &Settings, args: &[String]) -> Result<()> {
    let Some(data_dir) = positional(args).map(PathBuf::from) else {
        bail!("build-index needs a data directory");
    };
    let out_dir = flag_value(args, "--out").map(PathBuf::from).unwrap_or_else(|| settings.index.path());

    println!("Data directory: {}", data_dir.display());
    let records = collect_chunks(&data_dir)?;
    if records.is_empty() {
        bail!("no text files found under {}", data_dir.display());
    }

    let embedder = get_default_embedder(&settings.embed).context("creating embedder")?;
    let texts: Vec<String> = records.iter().map(|r| r.text.clone()).collect();
    let mut vectors = Vec::with_capacity(texts.len());
    for batch in texts.chunks(EMBED_BATCH) {
        vectors.extend(embedder.embed_batch(batch).await.context("embedding chunks")?);
    }

    let config = IndexConfig {
        embedding_model: embedder.embedder_id().to_string(),
        dim: embedder.dim(),
        top_k: Some(settings.retrieval.top_k),
    };
    write_index(&out_dir, &config, &records, &vectors)
        .with_context(|| format!("writing index to {}", out_dir.display()))?;
    println!("✅ Indexed {} chunks into {}", records.len(), out_dir.display());
    Ok(())
}
