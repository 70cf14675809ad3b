//! End-to-end pipeline behavior against in-memory seams: retrieval,
//! filtering, re-ranking, degraded mode, and the ingestion surfaces.

use std::sync::atomic::Ordering;

use sift_domain::{filter::ItemAttributes, ranking::Counters};
use sift_service::{
	Error, EventRequest, IngestRequest, SearchRequest, SearchResponse, SignalMode,
};
use sift_testkit::{Harness, attributes, test_config};

fn search_request(query: &str) -> SearchRequest {
	SearchRequest { query: query.to_string(), top_k: None, explain: None }
}

fn shoe(title: &str, color: &str, price: f64) -> ItemAttributes {
	ItemAttributes {
		title: title.to_string(),
		category: "Shoes".to_string(),
		brand: "Stride".to_string(),
		price,
		size: "M".to_string(),
		color: color.to_string(),
		rating: 4.6,
	}
}

#[tokio::test]
async fn behavioral_signals_outrank_raw_similarity() {
	let harness = Harness::new();

	harness.seed_item("a", attributes("Trail Runner", "Shoes", "Stride", 120.0), Counters::default());
	harness.seed_item(
		"b",
		attributes("Road Runner", "Shoes", "Stride", 110.0),
		Counters { purchases: 7, ..Default::default() },
	);
	harness.index.set_results(vec![("a", 0.9), ("b", 0.6)]);

	let response = harness.service.search(search_request("running shoes")).await.unwrap();
	let SearchResponse::Ranked { signal_mode, items } = response else {
		panic!("expected a ranked response");
	};

	assert_eq!(signal_mode, SignalMode::Full);
	assert_eq!(items[0].item_id, "b");
	assert!((items[0].final_score - 0.53).abs() < 1e-6);
	assert_eq!(items[1].item_id, "a");
	assert!((items[1].final_score - 0.495).abs() < 1e-6);
	assert!(items[0].attributes.is_some());
}

#[tokio::test]
async fn empty_retrieval_yields_no_matches() {
	let harness = Harness::new();

	let response = harness.service.search(search_request("anything")).await.unwrap();

	assert!(matches!(response, SearchResponse::NoMatches));
}

#[tokio::test]
async fn filtering_removes_without_reordering() {
	let harness = Harness::new();

	harness.seed_item("i1", shoe("Sprint", "blue", 2_500.0), Counters::default());
	harness.seed_item("i2", shoe("Dash", "red", 2_000.0), Counters::default());
	harness.seed_item("i3", shoe("Glide", "blue", 2_999.0), Counters::default());
	harness.seed_item("i4", shoe("Pace", "blue", 1_500.0), Counters::default());
	harness.seed_item("i5", shoe("Bolt", "blue", 3_500.0), Counters::default());
	harness.index.set_results(vec![
		("i1", 0.95),
		("i2", 0.90),
		("i3", 0.85),
		("i4", 0.80),
		("i5", 0.75),
	]);

	let response =
		harness.service.search(search_request("blue running shoes under 3000")).await.unwrap();
	let SearchResponse::Ranked { items, .. } = response else {
		panic!("expected a ranked response");
	};
	let ids: Vec<&str> = items.iter().map(|item| item.item_id.as_str()).collect();

	// i2 fails the color constraint, i5 the price cap. With all counters at
	// zero the final order is the similarity order of the survivors.
	assert_eq!(ids, ["i1", "i3", "i4"]);
}

#[tokio::test]
async fn fully_filtered_candidates_yield_no_matches() {
	let harness = Harness::new();

	harness.seed_item("i1", shoe("Sprint", "red", 5_000.0), Counters::default());
	harness.index.set_results(vec![("i1", 0.95)]);

	let response =
		harness.service.search(search_request("blue shoes under 3000")).await.unwrap();

	assert!(matches!(response, SearchResponse::NoMatches));
}

#[tokio::test]
async fn store_outage_degrades_to_semantic_only() {
	let harness = Harness::new();

	harness.index.set_results(vec![("a", 0.9), ("b", 0.6)]);
	harness.store.fail_reads.store(true, Ordering::SeqCst);

	let response = harness.service.search(search_request("running shoes")).await.unwrap();
	let SearchResponse::Ranked { signal_mode, items } = response else {
		panic!("expected a ranked response");
	};

	assert_eq!(signal_mode, SignalMode::SemanticOnly);
	assert_eq!(items[0].item_id, "a");
	assert_eq!(items[1].item_id, "b");

	for item in &items {
		assert!(item.attributes.is_none());
		assert_eq!(item.norm_clicks, 0.0);
		assert_eq!(item.norm_purchases, 0.0);
	}
}

#[tokio::test]
async fn store_outage_fails_the_call_when_degradation_is_disabled() {
	let mut cfg = test_config();

	cfg.search.degrade_on_store_error = false;

	let harness = Harness::with_config(cfg);

	harness.index.set_results(vec![("a", 0.9)]);
	harness.store.fail_reads.store(true, Ordering::SeqCst);

	let err = harness.service.search(search_request("running shoes")).await.unwrap_err();

	assert!(matches!(err, Error::StoreUnavailable { .. }));
}

#[tokio::test]
async fn candidates_missing_from_the_store_are_dropped() {
	let harness = Harness::new();

	harness.seed_item("known", shoe("Sprint", "blue", 1_000.0), Counters::default());
	harness.index.set_results(vec![("ghost", 0.99), ("known", 0.80)]);

	let response = harness.service.search(search_request("shoes")).await.unwrap();
	let SearchResponse::Ranked { items, .. } = response else {
		panic!("expected a ranked response");
	};

	assert_eq!(items.len(), 1);
	assert_eq!(items[0].item_id, "known");
}

#[tokio::test]
async fn slow_index_times_out_as_a_retrieval_error() {
	let mut cfg = test_config();

	cfg.search.index_timeout_ms = 20;

	let harness = Harness::with_config(cfg);

	harness.index.set_results(vec![("a", 0.9)]);
	harness.index.search_delay_ms.store(200, Ordering::SeqCst);

	let err = harness.service.search(search_request("shoes")).await.unwrap_err();

	assert!(matches!(err, Error::RetrievalUnavailable { .. }));
}

#[tokio::test]
async fn slow_store_read_degrades_to_semantic_only() {
	let mut cfg = test_config();

	cfg.search.store_timeout_ms = 20;

	let harness = Harness::with_config(cfg);

	harness.seed_item("a", shoe("Sprint", "blue", 1_000.0), Counters::default());
	harness.index.set_results(vec![("a", 0.9)]);
	harness.store.fetch_delay_ms.store(200, Ordering::SeqCst);

	let response = harness.service.search(search_request("shoes")).await.unwrap();
	let SearchResponse::Ranked { signal_mode, items } = response else {
		panic!("expected a ranked response");
	};

	assert_eq!(signal_mode, SignalMode::SemanticOnly);
	assert!(items[0].attributes.is_none());
}

#[tokio::test]
async fn hung_brand_vocabulary_does_not_stall_the_search() {
	let mut cfg = test_config();

	cfg.search.store_timeout_ms = 20;

	let harness = Harness::with_config(cfg);

	harness.seed_item("a", attributes("Sprint", "Shoes", "Stride", 1_000.0), Counters::default());
	harness.seed_item("b", attributes("Glide", "Shoes", "Volt", 1_200.0), Counters::default());
	harness.index.set_results(vec![("a", 0.9), ("b", 0.8)]);
	// Only the vocabulary read hangs; the signal fetch stays fast.
	harness.store.brands_delay_ms.store(200, Ordering::SeqCst);

	let response = harness.service.search(search_request("stride shoes")).await.unwrap();
	let SearchResponse::Ranked { signal_mode, items } = response else {
		panic!("expected a ranked response");
	};

	// The brand constraint is skipped on timeout, so both brands survive.
	assert_eq!(signal_mode, SignalMode::Full);
	assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn index_outage_is_a_retrieval_error() {
	let harness = Harness::new();

	harness.index.unavailable.store(true, Ordering::SeqCst);

	let err = harness.service.search(search_request("shoes")).await.unwrap_err();

	assert!(matches!(err, Error::RetrievalUnavailable { .. }));
}

#[tokio::test]
async fn blank_query_is_rejected() {
	let harness = Harness::new();
	let err = harness.service.search(search_request("   ")).await.unwrap_err();

	assert!(matches!(err, Error::InvalidRequest { .. }));
}

#[tokio::test]
async fn explanations_attach_per_item_when_requested() {
	let harness = Harness::new();

	harness.seed_item("a", shoe("Sprint", "blue", 1_000.0), Counters::default());
	harness.index.set_results(vec![("a", 0.9)]);

	let response = harness
		.service
		.search(SearchRequest { query: "shoes".to_string(), top_k: None, explain: Some(true) })
		.await
		.unwrap();
	let SearchResponse::Ranked { items, .. } = response else {
		panic!("expected a ranked response");
	};

	assert_eq!(items[0].explanation.as_deref(), Some("Sprint matches \"shoes\"."));
}

#[tokio::test]
async fn explanation_failure_leaves_the_ranking_intact() {
	let harness = Harness::new();

	harness.seed_item("a", shoe("Sprint", "blue", 1_000.0), Counters::default());
	harness.seed_item("b", shoe("Glide", "blue", 1_200.0), Counters::default());
	harness.index.set_results(vec![("a", 0.9), ("b", 0.8)]);
	harness.explainer.fail.store(true, Ordering::SeqCst);

	let response = harness
		.service
		.search(SearchRequest { query: "shoes".to_string(), top_k: None, explain: Some(true) })
		.await
		.unwrap();
	let SearchResponse::Ranked { items, .. } = response else {
		panic!("expected a ranked response");
	};

	assert_eq!(items.len(), 2);
	assert_eq!(items[0].item_id, "a");
	assert!(items.iter().all(|item| item.explanation.is_none()));
}

#[tokio::test]
async fn top_k_truncates_after_ranking() {
	let harness = Harness::new();

	for (id, price) in [("i1", 100.0), ("i2", 200.0), ("i3", 300.0)] {
		harness.seed_item(id, shoe(id, "blue", price), Counters::default());
	}

	harness.index.set_results(vec![("i1", 0.9), ("i2", 0.8), ("i3", 0.7)]);

	let response = harness
		.service
		.search(SearchRequest { query: "shoes".to_string(), top_k: Some(2), explain: None })
		.await
		.unwrap();
	let SearchResponse::Ranked { items, .. } = response else {
		panic!("expected a ranked response");
	};

	assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn accepted_event_lands_on_the_stream() {
	let harness = Harness::new();
	let response = harness
		.service
		.record_event(EventRequest {
			item_id: "a".to_string(),
			kind: sift_domain::event::EventKind::Click,
		})
		.await
		.unwrap();

	assert_eq!(response.status, "accepted");
	assert_eq!(harness.stream.len(), 1);
	// Publishing never touches counters; that is the consumer's job.
	assert_eq!(harness.store.applied_count(), 0);
}

#[tokio::test]
async fn publish_failure_surfaces_without_side_effects() {
	let harness = Harness::new();

	harness.stream.fail_publish.store(true, Ordering::SeqCst);

	let err = harness
		.service
		.record_event(EventRequest {
			item_id: "a".to_string(),
			kind: sift_domain::event::EventKind::Purchase,
		})
		.await
		.unwrap_err();

	assert!(matches!(err, Error::PublishFailure { .. }));
	assert!(harness.stream.is_empty());
}

#[tokio::test]
async fn ingest_writes_store_then_index() {
	let harness = Harness::new();
	let response = harness
		.service
		.ingest_catalog(IngestRequest {
			items: vec![sift_service::CatalogItem {
				item_id: "a".to_string(),
				description: "Cushioned daily trainer.".to_string(),
				attributes: shoe("Sprint", "blue", 1_000.0),
			}],
		})
		.await
		.unwrap();

	assert_eq!(response.ingested, 1);
	assert!(harness.store.counters("a").is_some());
	assert_eq!(harness.index.indexed_ids(), ["a"]);
}

#[tokio::test]
async fn ingest_rejects_empty_batches_and_blank_ids() {
	let harness = Harness::new();
	let empty = harness.service.ingest_catalog(IngestRequest { items: Vec::new() }).await;

	assert!(matches!(empty, Err(Error::InvalidRequest { .. })));

	let blank = harness
		.service
		.ingest_catalog(IngestRequest {
			items: vec![sift_service::CatalogItem {
				item_id: "  ".to_string(),
				description: "x".to_string(),
				attributes: shoe("Sprint", "blue", 1_000.0),
			}],
		})
		.await;

	assert!(matches!(blank, Err(Error::InvalidRequest { .. })));
}
