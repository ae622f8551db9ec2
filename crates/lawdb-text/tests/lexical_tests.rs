use std::sync::Arc;
use std::thread;

use lawdb_core::error::Error;
use lawdb_core::types::IndexedDocument;
use lawdb_text::{normalize, LexicalIndex, LexicalSnapshot};

fn docs(items: &[(&str, &str)]) -> Vec<IndexedDocument> {
    items.iter().map(|(id, content)| IndexedDocument::new(*id, *content)).collect()
}

fn ids(hits: &[lawdb_core::types::ScoredHit]) -> Vec<&str> {
    hits.iter().map(|h| h.id.as_str()).collect()
}

#[test]
fn normalizer_strips_particles_and_finds_references() {
    let q = normalize("수소충전소의 설치 기준은 제5조제2항 및 제5조제2항");
    assert_eq!(q.raw, "수소충전소의 설치 기준은 제5조제2항 및 제5조제2항");
    assert_eq!(&q.normalized_tokens[..4], ["수소충전소의", "수소충전소", "설치", "기준은"]);
    assert!(q.normalized_tokens.contains(&"기준".to_string()));
    assert_eq!(q.article_references, vec!["제5조제2항"]);
    assert_eq!(q.legal_term_expansions, vec!["설치기준", "수소충전소"]);
}

#[test]
fn normalizer_keywords_drop_standalone_particles() {
    let q = normalize("충전소 의 안전 과 검사");
    assert_eq!(q.keywords, vec!["충전소", "안전", "검사"]);
    assert_eq!(q.legal_term_expansions, vec!["안전검사", "수소충전소"]);
}

#[test]
fn normalizer_handles_blank_input() {
    let q = normalize("   ");
    assert!(q.normalized_tokens.is_empty());
    assert!(q.keywords.is_empty());
    assert!(q.article_references.is_empty());
}

#[test]
fn bm25_hits_rank_by_relevance() {
    let index = LexicalIndex::new();
    index
        .build(docs(&[
            ("a", "수소 안전 관리 기준"),
            ("b", "수소 수소 수소 충전"),
            ("c", "고압가스 용기 검사"),
            ("d", "전기 설비 점검"),
            ("e", "도시가스 배관 공사"),
        ]))
        .expect("build");
    let hits = index.search("수소", 10);
    assert_eq!(ids(&hits)[..2], ["b", "a"]);
    assert!(hits[0].score >= hits[1].score);
}

#[test]
fn substring_fallback_covers_compound_words() {
    let index = LexicalIndex::new();
    index
        .build(docs(&[("doc1", "수소충전소 설치 기준에 관한 규정"), ("doc2", "수소 저장소 안전 관리 기준")]))
        .expect("build");
    let hits = index.search("수소충전소 안전", 10);
    assert_eq!(ids(&hits), vec!["doc1", "doc2"]);
    assert_eq!(hits[0].score, 7.0);
    assert_eq!(hits[1].score, 4.0);
}

#[test]
fn fallback_ties_keep_corpus_order() {
    let index = LexicalIndex::new();
    index
        .build(docs(&[("x", "충전 설비"), ("y", "무관"), ("z", "충전 장치"), ("w", "충전 시설")]))
        .expect("build");
    // not a BM25 token anywhere; only the fragment "충전" matches
    let hits = index.search("충전기준", 10);
    assert_eq!(ids(&hits), vec!["x", "z", "w"]);
    assert!(hits.iter().all(|h| h.score == 1.0));
}

#[test]
fn fallback_fills_up_after_primary_hits() {
    let index = LexicalIndex::new();
    index
        .build(docs(&[
            ("a", "충전소 안전"),
            ("b", "수소충전소 기준"),
            ("c", "전기 설비"),
            ("d", "가스 배관"),
            ("e", "용기 검사"),
        ]))
        .expect("build");
    let hits = index.search("충전소", 10);
    // "충전소" is a BM25 token of "a" only; "b" contains it as a substring.
    assert_eq!(ids(&hits), vec!["a", "b"]);

    let limited = index.search("충전소", 1);
    assert_eq!(ids(&limited), vec!["a"]);
}

#[test]
fn unmatched_query_returns_nothing() {
    let index = LexicalIndex::new();
    index.build(docs(&[("a", "수소 안전"), ("b", "충전 기준")])).expect("build");
    assert!(index.search("고압가스", 10).is_empty());
    assert!(index.search("가", 10).is_empty());
}

#[test]
fn unbuilt_index_is_empty() {
    let index = LexicalIndex::new();
    assert!(index.snapshot().is_none());
    assert!(index.search("수소", 5).is_empty());
}

#[test]
fn malformed_documents_are_skipped_and_counted() {
    let snapshot = LexicalSnapshot::build(docs(&[("a", "수소 안전"), ("", "이름 없음"), ("a", "중복")])).expect("build");
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.report().skipped, 2);
    assert_eq!(snapshot.documents()[0].content, "수소 안전");
}

#[test]
fn failed_rebuild_keeps_previous_snapshot() {
    let index = LexicalIndex::new();
    index.build(docs(&[("a", "수소 안전")])).expect("build");
    let err = index.build(docs(&[("", "id 없음"), (" ", "공백 id")])).unwrap_err();
    assert!(matches!(err, Error::Rebuild(_)));
    assert_eq!(ids(&index.search("수소", 5)), vec!["a"]);
}

#[test]
fn empty_rebuild_publishes_an_empty_index() {
    let index = LexicalIndex::new();
    index.build(docs(&[("a", "수소 안전")])).expect("build");
    let report = index.build(Vec::new()).expect("empty build");
    assert_eq!(report.indexed, 0);
    assert!(index.search("수소", 5).is_empty());
}

#[test]
fn readers_see_whole_snapshots_during_rebuilds() {
    let index = Arc::new(LexicalIndex::new());
    index.build(docs(&[("old1", "수소 안전"), ("old2", "수소 기준")])).expect("build");

    let writer = {
        let index = Arc::clone(&index);
        thread::spawn(move || {
            for round in 0..20 {
                let corpus = if round % 2 == 0 {
                    docs(&[("new1", "수소 충전"), ("new2", "수소 저장")])
                } else {
                    docs(&[("old1", "수소 안전"), ("old2", "수소 기준")])
                };
                index.build(corpus).expect("rebuild");
            }
        })
    };
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let index = Arc::clone(&index);
            thread::spawn(move || {
                for _ in 0..50 {
                    let hits = index.search("수소", 10);
                    let mut got: Vec<String> = hits.into_iter().map(|h| h.id).collect();
                    got.sort();
                    assert!(got == ["new1", "new2"] || got == ["old1", "old2"], "mixed snapshot: {got:?}");
                }
            })
        })
        .collect();
    writer.join().expect("writer");
    for r in readers {
        r.join().expect("reader");
    }
}
