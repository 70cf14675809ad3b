use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub search: Search,
	pub ranking: Ranking,
	pub consumer: Consumer,
	#[serde(default)]
	pub vocabulary: Vocabulary,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub qdrant: Qdrant,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub explainer: LlmProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Search {
	pub top_k: u32,
	/// Retrieval fetches `top_k * over_fetch_factor` candidates so structured
	/// filtering has room to discard without starving the final result count.
	pub over_fetch_factor: u32,
	pub index_timeout_ms: u64,
	pub store_timeout_ms: u64,
	#[serde(default = "default_degrade_on_store_error")]
	pub degrade_on_store_error: bool,
}

#[derive(Debug, Deserialize)]
pub struct Ranking {
	#[serde(default = "default_w_semantic")]
	pub w_semantic: f32,
	#[serde(default = "default_w_purchase")]
	pub w_purchase: f32,
	#[serde(default = "default_w_cart")]
	pub w_cart: f32,
	#[serde(default = "default_w_click")]
	pub w_click: f32,
	#[serde(default = "default_w_bounce")]
	pub w_bounce: f32,
}

#[derive(Debug, Deserialize)]
pub struct Consumer {
	pub consumer_id: String,
	pub batch_size: u32,
	pub poll_interval_ms: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct Vocabulary {
	#[serde(default)]
	pub colors: Vec<String>,
	#[serde(default)]
	pub categories: Vec<String>,
}

fn default_degrade_on_store_error() -> bool {
	true
}

fn default_w_semantic() -> f32 {
	0.55
}

fn default_w_purchase() -> f32 {
	0.20
}

fn default_w_cart() -> f32 {
	0.15
}

fn default_w_click() -> f32 {
	0.10
}

fn default_w_bounce() -> f32 {
	0.10
}
