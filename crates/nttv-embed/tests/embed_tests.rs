use std::time::Duration;

use nttv_core::traits::Embedder;
use nttv_embed::{HashEmbedder, HttpEmbedder};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[tokio::test]
async fn hash_embedder_is_deterministic_and_normalized() {
    let e = HashEmbedder::new(64);
    let a = e.embed("Sokuho Geri; Koho Geri").await.expect("embed");
    let b = e.embed("Sokuho Geri; Koho Geri").await.expect("embed");
    assert_eq!(a, b);
    assert_eq!(a.len(), 64);
    let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-4);
    assert_eq!(e.embedder_id(), "hash:xxh64:d64");
}

#[tokio::test]
async fn hash_embedder_folds_before_hashing() {
    let e = HashEmbedder::new(128);
    let a = e.embed("Sōke of Gyokko Ryū").await.expect("embed");
    let b = e.embed("soke of gyokko ryu").await.expect("embed");
    assert!(cosine(&a, &b) > 0.999);
    let unrelated = e.embed("shuriken throwing spikes").await.expect("embed");
    assert!(cosine(&a, &unrelated) < cosine(&a, &b));
}

#[tokio::test]
async fn http_embedder_orders_and_normalizes_rows() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "index": 1, "embedding": [0.0, 2.0, 0.0] },
                { "index": 0, "embedding": [3.0, 0.0, 4.0] }
            ]
        })))
        .mount(&server)
        .await;

    let e = HttpEmbedder::new(&format!("{}/v1", server.uri()), "mini", 3, Duration::from_secs(5)).expect("client");
    let rows = e.embed_batch(&["a".to_string(), "b".to_string()]).await.expect("rows");
    assert_eq!(rows[0], vec![0.6, 0.0, 0.8]);
    assert_eq!(rows[1], vec![0.0, 1.0, 0.0]);
}

#[tokio::test]
async fn http_embedder_reports_dimension_mismatch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [ { "index": 0, "embedding": [1.0, 0.0] } ]
        })))
        .mount(&server)
        .await;

    let e = HttpEmbedder::new(&server.uri(), "mini", 3, Duration::from_secs(5)).expect("client");
    let err = e.embed("kamae").await.expect_err("mismatch");
    assert!(err.to_string().contains("dimension mismatch"));
}

#[tokio::test]
async fn http_embedder_surfaces_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let e = HttpEmbedder::new(&server.uri(), "mini", 3, Duration::from_secs(5)).expect("client");
    let err = e.embed("kamae").await.expect_err("503");
    assert!(matches!(err, nttv_core::Error::UpstreamServiceFailure { service: "embedding", .. }));
}
