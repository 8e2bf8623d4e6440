mod helpers;

use helpers::*;

use neurovault::error::EngineError;
use neurovault::vault::search::{self, SearchRequest};
use neurovault::vault::store;

fn request(query: &str, user_id: &str) -> SearchRequest {
    SearchRequest {
        query: query.to_string(),
        user_id: user_id.to_string(),
        k: 5,
        min_score: 0.0,
        tier_filter: None,
    }
}

#[test]
fn vocabulary_match_ranks_first() {
    let mut conn = test_db();
    let provider = test_provider();

    insert_text_document(
        &mut conn,
        provider.as_ref(),
        "alice",
        "rust.md",
        "rust borrow checker ownership lifetimes",
    );
    insert_text_document(
        &mut conn,
        provider.as_ref(),
        "alice",
        "taxes.md",
        "quarterly tax filing deadline accounting",
    );

    let resp = search::execute(
        &conn,
        provider.as_ref(),
        &request("rust ownership and lifetimes", "alice"),
        &test_config(),
    )
    .unwrap();

    assert!(resp.total_results >= 1);
    assert_eq!(resp.results[0].filename, "rust.md");
    assert_eq!(resp.results[0].rank, 1);
    assert!(!resp.results[0].content_snippet.is_empty());
    assert!(!resp.results[0].breakdown.explanation.is_empty());
}

#[test]
fn results_are_sorted_and_bounded_by_k() {
    let mut conn = test_db();
    let provider = test_provider();
    for i in 0..8 {
        insert_text_document(
            &mut conn,
            provider.as_ref(),
            "alice",
            &format!("doc{i}.txt"),
            &format!("shared topic words plus unique term{i}"),
        );
    }

    let mut req = request("shared topic words", "alice");
    req.k = 3;
    let resp = search::execute(&conn, provider.as_ref(), &req, &test_config()).unwrap();

    assert!(resp.total_results <= 3);
    assert_eq!(resp.total_results, resp.results.len());
    for pair in resp.results.windows(2) {
        assert!(pair[0].final_score >= pair[1].final_score);
    }
    for (i, r) in resp.results.iter().enumerate() {
        assert_eq!(r.rank, i + 1);
    }
}

#[test]
fn min_score_and_tier_filter_are_honored() {
    let mut conn = test_db();
    let provider = test_provider();
    insert_text_document(
        &mut conn,
        provider.as_ref(),
        "alice",
        "a.txt",
        "alpha beta gamma",
    );

    let mut req = request("alpha beta gamma", "alice");
    req.min_score = 0.99;
    let resp = search::execute(&conn, provider.as_ref(), &req, &test_config()).unwrap();
    assert!(resp.results.iter().all(|r| r.final_score >= 0.99));

    let mut req = request("alpha beta gamma", "alice");
    req.tier_filter = Some("Dormant".to_string());
    let resp = search::execute(&conn, provider.as_ref(), &req, &test_config()).unwrap();
    assert!(resp.results.iter().all(|r| r.tier == "Dormant"));
}

#[test]
fn other_owners_documents_are_invisible() {
    let mut conn = test_db();
    let provider = test_provider();
    insert_text_document(
        &mut conn,
        provider.as_ref(),
        "bob",
        "secret.txt",
        "alpha beta gamma delta",
    );

    let resp = search::execute(
        &conn,
        provider.as_ref(),
        &request("alpha beta gamma", "alice"),
        &test_config(),
    )
    .unwrap();
    assert_eq!(resp.total_results, 0);
}

#[test]
fn deleted_document_disappears_from_results() {
    let mut conn = test_db();
    let provider = test_provider();
    let doc = insert_text_document(
        &mut conn,
        provider.as_ref(),
        "alice",
        "gone.txt",
        "ephemeral content words",
    );

    store::delete_document(&mut conn, &doc.id, Some("alice")).unwrap();

    let resp = search::execute(
        &conn,
        provider.as_ref(),
        &request("ephemeral content words", "alice"),
        &test_config(),
    )
    .unwrap();
    assert_eq!(resp.total_results, 0);
}

#[test]
fn search_never_mutates_stored_state() {
    let mut conn = test_db();
    let provider = test_provider();
    let doc = insert_text_document(
        &mut conn,
        provider.as_ref(),
        "alice",
        "stable.txt",
        "immutable observation words",
    );

    search::execute(
        &conn,
        provider.as_ref(),
        &request("immutable observation words", "alice"),
        &test_config(),
    )
    .unwrap();

    let after = store::get_document(&conn, &doc.id).unwrap();
    assert_eq!(after.access_count, 0);
    assert_eq!(after.last_accessed, None);
    assert_eq!(after.cognitive_score, doc.cognitive_score);
    assert_eq!(after.semantic_score, 0.0);
}

#[test]
fn invalid_requests_are_rejected() {
    let conn = test_db();
    let provider = test_provider();
    let config = test_config();

    let err = search::execute(&conn, provider.as_ref(), &request("   ", "alice"), &config)
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let mut req = request("query", "alice");
    req.k = 0;
    let err = search::execute(&conn, provider.as_ref(), &req, &config).unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let mut req = request("query", "alice");
    req.k = config.retrieval.max_k + 1;
    let err = search::execute(&conn, provider.as_ref(), &req, &config).unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let mut req = request("query", "alice");
    req.tier_filter = Some("Lukewarm".to_string());
    let err = search::execute(&conn, provider.as_ref(), &req, &config).unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}
