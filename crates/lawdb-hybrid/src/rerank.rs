//! Rule-based bonuses applied on top of the fusion score.
use lawdb_core::types::{meta_flag, meta_str, ChunkType, LawType, Meta, ScoredCandidate};

pub const TITLE_MATCH_BONUS: f64 = 10.0;
pub const DEFINITION_BONUS: f64 = 3.0;

pub fn law_type_bonus(law_type: LawType) -> f64 {
    match law_type {
        LawType::Statute => 5.0,
        LawType::Decree => 3.0,
        LawType::Rule => 2.0,
        LawType::Table => 1.0,
    }
}

/// Table chunks first, since they carry their record's `law_type` label,
/// then that label, then the law-name suffix.
pub fn law_type_of(metadata: &Meta) -> Option<LawType> {
    (meta_str(metadata, "chunk_type") == ChunkType::Table.as_str())
        .then_some(LawType::Table)
        .or_else(|| LawType::from_label(meta_str(metadata, "law_type")))
        .or_else(|| LawType::from_law_name(meta_str(metadata, "law_name")))
}

pub fn bonus(candidate: &ScoredCandidate, query_tokens: &[&str]) -> f64 {
    let title = meta_str(&candidate.metadata, "title");
    let mut bonus = 0.0;
    if query_tokens.iter().any(|t| title.contains(t)) {
        bonus += TITLE_MATCH_BONUS;
    }
    if let Some(law_type) = law_type_of(&candidate.metadata) {
        bonus += law_type_bonus(law_type);
    }
    if meta_flag(&candidate.metadata, "is_definition") {
        bonus += DEFINITION_BONUS;
    }
    bonus
}

/// Sets `final_score = fusion_score + bonus` and stable-sorts descending.
pub fn rerank(candidates: &mut [ScoredCandidate], raw_query: &str) {
    let tokens: Vec<&str> = raw_query.split_whitespace().collect();
    for candidate in candidates.iter_mut() {
        candidate.final_score = candidate.fusion_score + bonus(candidate, &tokens);
    }
    candidates.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
}

#[cfg(test)]
mod tests {
    use super::*;
    use lawdb_core::corpus::{CorpusLoader, LawRecord};
    use serde_json::json;

    fn candidate(id: &str, fusion: f64, metadata: serde_json::Value) -> ScoredCandidate {
        let serde_json::Value::Object(metadata) = metadata else { panic!("object expected") };
        let mut c = ScoredCandidate::new(id.into(), String::new(), metadata);
        c.fusion_score = fusion;
        c
    }

    #[test]
    fn title_match_outweighs_fusion_order() {
        let mut cs = vec![
            candidate("a", 0.02, json!({"title": "벌칙"})),
            candidate("b", 0.01, json!({"title": "수소충전소의 설치"})),
        ];
        rerank(&mut cs, "충전소 설치");
        assert_eq!(cs[0].id, "b");
        assert!((cs[0].final_score - (0.01 + TITLE_MATCH_BONUS)).abs() < 1e-12);
    }

    #[test]
    fn law_type_resolution_order() {
        assert_eq!(law_type_of(json!({"law_type": "시행령", "law_name": "수소법"}).as_object().unwrap()), Some(LawType::Decree));
        assert_eq!(law_type_of(json!({"chunk_type": "table", "law_name": "수소법"}).as_object().unwrap()), Some(LawType::Table));
        assert_eq!(law_type_of(json!({"chunk_type": "table", "law_type": "법률"}).as_object().unwrap()), Some(LawType::Table));
        assert_eq!(law_type_of(json!({"law_name": "수소법 시행규칙"}).as_object().unwrap()), Some(LawType::Rule));
        assert_eq!(law_type_of(&Meta::new()), None);
    }

    #[test]
    fn bonuses_add_up() {
        let c = candidate("a", 0.0, json!({"title": "정의", "law_name": "수소법", "is_definition": true}));
        assert_eq!(bonus(&c, &["정의"]), TITLE_MATCH_BONUS + 5.0 + DEFINITION_BONUS);
        assert_eq!(bonus(&c, &["허가"]), 5.0 + DEFINITION_BONUS);
    }

    #[test]
    fn labelled_record_tables_get_the_table_bonus() {
        let record: LawRecord = serde_json::from_value(json!({
            "law_id": "001", "law_name": "수소법", "law_type": "법률",
            "articles": [{"article_number": "제10조", "title": "설치 기준", "content": "충전소 설치"}],
            "tables": [{"table_number": "1", "title": "안전기준", "content": "표"}]
        }))
        .expect("record");
        let docs = CorpusLoader::default().documents(&[record]);
        let types: Vec<_> = docs.iter().map(|d| law_type_of(&d.metadata)).collect();
        assert_eq!(types, vec![Some(LawType::Statute), Some(LawType::Table)]);

        let mut cs: Vec<_> = docs
            .into_iter()
            .map(|d| ScoredCandidate::new(d.id, d.content, d.metadata))
            .collect();
        rerank(&mut cs, "허가");
        assert_eq!(cs[0].final_score, 5.0);
        assert_eq!(cs[1].final_score, 1.0);
    }

    #[test]
    fn equal_scores_keep_fusion_order() {
        let mut cs = vec![candidate("x", 0.01, json!({})), candidate("y", 0.01, json!({}))];
        rerank(&mut cs, "수소");
        assert_eq!(cs[0].id, "x");
    }
}
