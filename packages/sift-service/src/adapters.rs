//! Production implementations of the service seams: Postgres for signals and
//! the event log, Qdrant for retrieval, HTTP providers for embedding and
//! explanation.

use std::sync::Arc;

use sift_config::{EmbeddingProviderConfig, LlmProviderConfig};
use sift_domain::{
	event::InteractionEvent,
	filter::ItemAttributes,
	ranking::RankedCandidate,
};
use sift_storage::{db::Db, qdrant::QdrantStore, queries};

use crate::{
	BoxFuture, CatalogItem, EmbeddingProvider, EventStream, ExplanationProvider, ItemSignals,
	RetrievedCandidate, SignalStore, StreamEntry, VectorIndex,
};

pub struct PostgresSignalStore {
	pub db: Arc<Db>,
}
impl SignalStore for PostgresSignalStore {
	fn fetch_items<'a>(
		&'a self,
		ids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<ItemSignals>>> {
		Box::pin(async move {
			let rows = queries::fetch_items(&self.db, ids).await?;
			let signals = rows
				.into_iter()
				.map(|row| ItemSignals {
					attributes: row.attributes(),
					counters: row.counters(),
					item_id: row.item_id,
				})
				.collect();

			Ok(signals)
		})
	}

	fn known_brands<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<Vec<String>>> {
		Box::pin(async move { Ok(queries::distinct_brands(&self.db).await?) })
	}

	fn upsert_items<'a>(
		&'a self,
		items: &'a [CatalogItem],
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			for item in items {
				queries::upsert_item(&self.db, &item.item_id, &item.description, &item.attributes)
					.await?;
			}

			Ok(())
		})
	}

	fn apply_event<'a>(
		&'a self,
		event: &'a InteractionEvent,
	) -> BoxFuture<'a, color_eyre::Result<bool>> {
		Box::pin(async move { Ok(queries::apply_event(&self.db, event).await?) })
	}
}

pub struct PostgresEventStream {
	pub db: Arc<Db>,
}
impl EventStream for PostgresEventStream {
	fn publish<'a>(
		&'a self,
		event: &'a InteractionEvent,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move { Ok(queries::publish_event(&self.db, event).await?) })
	}

	fn fetch<'a>(
		&'a self,
		after_offset: i64,
		limit: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<StreamEntry>>> {
		Box::pin(async move {
			let rows = queries::fetch_events_after(&self.db, after_offset, limit).await?;
			let mut entries = Vec::with_capacity(rows.len());

			for row in rows {
				let Some(kind) = sift_domain::event::EventKind::parse(&row.kind) else {
					tracing::warn!(
						event_id = %row.event_id,
						kind = %row.kind,
						"Skipping event with unknown kind."
					);

					continue;
				};

				entries.push(StreamEntry {
					offset: row.event_seq,
					event: InteractionEvent {
						event_id: row.event_id,
						item_id: row.item_id,
						kind,
						occurred_at: row.occurred_at,
					},
				});
			}

			Ok(entries)
		})
	}

	fn committed_offset<'a>(
		&'a self,
		consumer_id: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<i64>> {
		Box::pin(async move { Ok(queries::committed_offset(&self.db, consumer_id).await?) })
	}

	fn commit_offset<'a>(
		&'a self,
		consumer_id: &'a str,
		offset: i64,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move { Ok(queries::commit_offset(&self.db, consumer_id, offset).await?) })
	}
}

pub struct QdrantVectorIndex {
	pub store: Arc<QdrantStore>,
}
impl VectorIndex for QdrantVectorIndex {
	fn search<'a>(
		&'a self,
		vector: &'a [f32],
		limit: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<RetrievedCandidate>>> {
		Box::pin(async move {
			let hits = self.store.search_items(vector.to_vec(), limit).await?;
			let candidates = hits
				.into_iter()
				.map(|(item_id, semantic_score)| RetrievedCandidate { item_id, semantic_score })
				.collect();

			Ok(candidates)
		})
	}

	fn upsert<'a>(
		&'a self,
		points: &'a [(String, Vec<f32>)],
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move { Ok(self.store.upsert_items(points).await?) })
	}
}

pub struct HttpEmbedding;
impl EmbeddingProvider for HttpEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(sift_providers::embedding::embed(cfg, texts))
	}
}

pub struct HttpExplainer;
impl ExplanationProvider for HttpExplainer {
	fn explain<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		query: &'a str,
		attrs: &'a ItemAttributes,
		scores: &'a RankedCandidate,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(sift_providers::explain::explain(cfg, query, attrs, scores))
	}
}
