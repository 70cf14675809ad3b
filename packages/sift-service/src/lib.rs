pub mod adapters;
pub mod consumer;
pub mod events;
pub mod ingest;
pub mod search;

mod error;

pub use error::{Error, Result};

pub use consumer::{BatchReport, EventConsumer};
pub use events::{EventRequest, EventResponse};
pub use ingest::{CatalogItem, IngestRequest, IngestResponse};
pub use search::{SearchItem, SearchRequest, SearchResponse, SignalMode};

use std::{future::Future, pin::Pin, sync::Arc};

use sift_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use sift_domain::{
	event::InteractionEvent,
	filter::ItemAttributes,
	ranking::{Counters, RankedCandidate},
};
use sift_storage::{db::Db, qdrant::QdrantStore};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A retrieval hit: item id plus similarity in the shared embedding space.
/// Candidate sets are call-local and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedCandidate {
	pub item_id: String,
	pub semantic_score: f32,
}

/// An item's structured attributes and current behavioral counters as read
/// from the signal store.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSignals {
	pub item_id: String,
	pub attributes: ItemAttributes,
	pub counters: Counters,
}

/// An event as it sits in the stream, with its channel offset.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamEntry {
	pub offset: i64,
	pub event: InteractionEvent,
}

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

pub trait ExplanationProvider
where
	Self: Send + Sync,
{
	fn explain<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		query: &'a str,
		attrs: &'a ItemAttributes,
		scores: &'a RankedCandidate,
	) -> BoxFuture<'a, color_eyre::Result<String>>;
}

/// The approximate-nearest-neighbor index. `search` returns candidates in
/// descending similarity order.
pub trait VectorIndex
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		vector: &'a [f32],
		limit: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<RetrievedCandidate>>>;

	fn upsert<'a>(
		&'a self,
		points: &'a [(String, Vec<f32>)],
	) -> BoxFuture<'a, color_eyre::Result<()>>;
}

/// The keyed record store holding attributes and counters. The search path
/// only ever reads; counter writes go through `apply_event` on the consumer
/// side and are atomic per item.
pub trait SignalStore
where
	Self: Send + Sync,
{
	fn fetch_items<'a>(
		&'a self,
		ids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<ItemSignals>>>;

	fn known_brands<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<Vec<String>>>;

	fn upsert_items<'a>(&'a self, items: &'a [CatalogItem])
	-> BoxFuture<'a, color_eyre::Result<()>>;

	/// Applies one event's counter mutation idempotently. Returns false when
	/// the event id was already applied (duplicate delivery).
	fn apply_event<'a>(
		&'a self,
		event: &'a InteractionEvent,
	) -> BoxFuture<'a, color_eyre::Result<bool>>;
}

/// The ordered, at-least-once delivery channel. Duplicate suppression is the
/// consumer's job, not the channel's.
pub trait EventStream
where
	Self: Send + Sync,
{
	fn publish<'a>(&'a self, event: &'a InteractionEvent)
	-> BoxFuture<'a, color_eyre::Result<()>>;

	fn fetch<'a>(
		&'a self,
		after_offset: i64,
		limit: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<StreamEntry>>>;

	fn committed_offset<'a>(
		&'a self,
		consumer_id: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<i64>>;

	fn commit_offset<'a>(
		&'a self,
		consumer_id: &'a str,
		offset: i64,
	) -> BoxFuture<'a, color_eyre::Result<()>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub explainer: Arc<dyn ExplanationProvider>,
}

pub struct SearchService {
	pub cfg: Config,
	pub store: Arc<dyn SignalStore>,
	pub index: Arc<dyn VectorIndex>,
	pub stream: Arc<dyn EventStream>,
	pub providers: Providers,
}
impl SearchService {
	/// Production wiring: Postgres signal store and stream, Qdrant index,
	/// HTTP providers.
	pub fn new(cfg: Config, db: Db, qdrant: QdrantStore) -> Self {
		let db = Arc::new(db);
		let store = Arc::new(adapters::PostgresSignalStore { db: db.clone() });
		let stream = Arc::new(adapters::PostgresEventStream { db });
		let index = Arc::new(adapters::QdrantVectorIndex { store: Arc::new(qdrant) });
		let providers = Providers {
			embedding: Arc::new(adapters::HttpEmbedding),
			explainer: Arc::new(adapters::HttpExplainer),
		};

		Self::with_parts(cfg, store, index, stream, providers)
	}

	pub fn with_parts(
		cfg: Config,
		store: Arc<dyn SignalStore>,
		index: Arc<dyn VectorIndex>,
		stream: Arc<dyn EventStream>,
		providers: Providers,
	) -> Self {
		Self { cfg, store, index, stream, providers }
	}
}
