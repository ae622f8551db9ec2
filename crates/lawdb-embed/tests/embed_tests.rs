use lawdb_core::config::{EmbeddingProviderKind, EmbeddingSettings};
use lawdb_embed::{cosine_similarity, get_default_embedder, text_similarity, FakeEmbedder};

#[test]
fn fake_embedder_shapes_and_determinism() {
    let settings = EmbeddingSettings { dimension: 64, ..EmbeddingSettings::default() };
    let embedder = get_default_embedder(&settings).expect("embedder").expect("enabled");
    let texts = vec!["수소충전소 설치 기준".to_string(), "수소충전소 설치 기준".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let (v1, v2) = (&embs[0], &embs[1]);

    assert_eq!(v1.len(), 64);
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");
    for (a, b) in v1.iter().zip(v2.iter()) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[test]
fn shared_compounds_are_closer_than_unrelated_text() {
    let embedder = FakeEmbedder::new(384);
    let query = embedder.embed_text("수소충전소 안전");
    let related = embedder.embed_text("수소충전소 설치 기준");
    let unrelated = embedder.embed_text("도시가스 배관 공사");
    assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
}

#[test]
fn empty_text_embeds_to_zero_vector() {
    let v = FakeEmbedder::new(16).embed_text("   ");
    assert!(v.iter().all(|x| *x == 0.0));
    assert_eq!(cosine_similarity(&v, &v), 0.0);
}

#[test]
fn disabled_provider_yields_no_embedder() {
    let settings = EmbeddingSettings { provider: EmbeddingProviderKind::Disabled, ..EmbeddingSettings::default() };
    assert!(get_default_embedder(&settings).expect("config").is_none());
}

#[test]
fn http_provider_builds_without_contacting_the_server() {
    let settings = EmbeddingSettings {
        provider: EmbeddingProviderKind::Http,
        api_base: "http://127.0.0.1:9/".into(),
        ..EmbeddingSettings::default()
    };
    let embedder = get_default_embedder(&settings).expect("client").expect("enabled");
    assert_eq!(embedder.dim(), 384);
    assert!(embedder.embed_batch(&[]).expect("empty batch").is_empty());
}

#[tokio::test]
async fn http_embedder_is_created_and_dropped_inside_a_runtime() {
    let settings = EmbeddingSettings { provider: EmbeddingProviderKind::Http, ..EmbeddingSettings::default() };
    let embedder = get_default_embedder(&settings).expect("client").expect("enabled");
    assert_eq!(embedder.dim(), 384);
    drop(embedder);
}

#[test]
fn cosine_bounds() {
    assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
}

#[test]
fn text_similarity_of_identical_texts_is_one() {
    let embedder = FakeEmbedder::new(64);
    let same = text_similarity(&embedder, "수소 저장소", "수소 저장소").expect("similarity");
    assert!((same - 1.0).abs() < 1e-4);
}
