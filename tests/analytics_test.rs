mod helpers;

use chrono::Utc;
use helpers::*;

use neurovault::vault::{access, analytics};

#[test]
fn empty_vault_yields_zeros_not_errors() {
    let conn = test_db();
    let config = test_config();

    let overview = analytics::overview(&conn, "alice").unwrap();
    assert_eq!(overview.total_documents, 0);
    assert_eq!(overview.avg_cognitive_score, 0.0);
    assert!(overview.tier_distribution.is_empty());
    assert!(overview.top_documents.is_empty());

    let lifecycle = analytics::lifecycle(&conn, "alice", &config.tiers).unwrap();
    assert!(lifecycle.nodes.is_empty());
    assert_eq!(lifecycle.histogram.len(), 10);
    assert!(lifecycle.histogram.iter().all(|b| b.count == 0));
}

#[test]
fn overview_aggregates_per_tier() {
    let mut conn = test_db();
    let config = test_config();

    // Three fresh docs land in Archived (score 0.3)
    for i in 0..3u8 {
        insert_document(
            &mut conn,
            "alice",
            &format!("doc{i}.txt"),
            "text",
            spike_embedding(i),
        );
    }
    // One heavily-used doc climbs to Active
    let hot = insert_document(&mut conn, "alice", "hot.txt", "text", spike_embedding(10));
    for _ in 0..10 {
        access::record_access(
            &mut conn,
            &hot.id,
            None,
            Some(0.95),
            Utc::now(),
            &config.scoring,
            &config.tiers,
        )
        .unwrap();
    }

    let overview = analytics::overview(&conn, "alice").unwrap();
    assert_eq!(overview.total_documents, 4);
    assert!(overview.avg_cognitive_score > 0.0);

    // Only populated tiers appear, hottest first
    let tiers: Vec<&str> = overview
        .tier_distribution
        .iter()
        .map(|t| t.tier.as_str())
        .collect();
    assert_eq!(tiers, vec!["Active", "Archived"]);

    let active = &overview.tier_distribution[0];
    assert_eq!(active.count, 1);
    assert_eq!(active.color, "#00ff88");
    assert!(active.avg_score >= 0.75);

    assert_eq!(overview.top_documents[0].id, hot.id);
}

#[test]
fn lifecycle_histogram_covers_all_documents() {
    let mut conn = test_db();
    let config = test_config();
    for i in 0..4u8 {
        insert_document(
            &mut conn,
            "alice",
            &format!("doc{i}.txt"),
            "text",
            spike_embedding(i),
        );
    }

    let lifecycle = analytics::lifecycle(&conn, "alice", &config.tiers).unwrap();
    assert_eq!(lifecycle.nodes.len(), 4);
    assert_eq!(lifecycle.histogram.len(), 10);
    assert_eq!(lifecycle.histogram[0].range, "0.0–0.1");
    let total: usize = lifecycle.histogram.iter().map(|b| b.count).sum();
    assert_eq!(total, 4);
    // Fresh docs score 0.3, which in binary floats sits just below 0.3 and
    // buckets into 0.2–0.3
    assert_eq!(lifecycle.histogram[2].count, 4);

    assert_eq!(lifecycle.tier_thresholds.active, 0.75);
    assert_eq!(lifecycle.tier_thresholds.contextual, 0.50);
    assert_eq!(lifecycle.tier_thresholds.archived, 0.25);

    let node = &lifecycle.nodes[0];
    assert_eq!(node.tier, "Archived");
    assert_eq!(node.color, "#ff9500");
    assert_eq!(node.access_count, 0);
}

#[test]
fn tier_report_covers_all_four_tiers() {
    let mut conn = test_db();
    insert_document(&mut conn, "alice", "a.txt", "text", spike_embedding(1));

    let report = analytics::tier_report(&conn, "alice").unwrap();
    assert_eq!(report.len(), 4);

    let names: Vec<&str> = report.iter().map(|(t, _)| t.as_str()).collect();
    assert_eq!(names, vec!["Active", "Contextual", "Archived", "Dormant"]);

    for (tier, detail) in &report {
        assert!(!detail.description.is_empty());
        assert_eq!(detail.color, tier.color());
        if tier.as_str() == "Archived" {
            assert_eq!(detail.count, 1);
            assert!((detail.avg_score - 0.3).abs() < 0.001);
        } else {
            assert_eq!(detail.count, 0);
            assert_eq!(detail.avg_score, 0.0);
        }
    }
}

#[test]
fn analytics_are_owner_scoped() {
    let mut conn = test_db();
    insert_document(&mut conn, "alice", "a.txt", "text", spike_embedding(1));
    insert_document(&mut conn, "bob", "b.txt", "text", spike_embedding(2));

    let overview = analytics::overview(&conn, "alice").unwrap();
    assert_eq!(overview.total_documents, 1);
}
