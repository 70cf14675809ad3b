mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Consumer, EmbeddingProviderConfig, LlmProviderConfig, Postgres, Providers, Qdrant,
	Ranking, Search, Service, Storage, Vocabulary,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::Read { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::Parse { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(invalid("service.http_bind", "must be non-empty."));
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(invalid("storage.postgres.pool_max_conns", "must be greater than zero."));
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(invalid("providers.embedding.dimensions", "must be greater than zero."));
	}
	// Query vectors must live in the same space as ingestion-time vectors. A
	// mismatch silently degrades every downstream ranking, so it is rejected at
	// startup instead of re-checked per query.
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(invalid(
			"providers.embedding.dimensions",
			"must match storage.qdrant.vector_dim.",
		));
	}
	if cfg.search.top_k == 0 {
		return Err(invalid("search.top_k", "must be greater than zero."));
	}
	if cfg.search.over_fetch_factor < 2 {
		return Err(invalid("search.over_fetch_factor", "must be at least 2."));
	}
	if cfg.search.index_timeout_ms == 0 {
		return Err(invalid("search.index_timeout_ms", "must be greater than zero."));
	}
	if cfg.search.store_timeout_ms == 0 {
		return Err(invalid("search.store_timeout_ms", "must be greater than zero."));
	}

	for (field, weight) in [
		("ranking.w_semantic", cfg.ranking.w_semantic),
		("ranking.w_purchase", cfg.ranking.w_purchase),
		("ranking.w_cart", cfg.ranking.w_cart),
		("ranking.w_click", cfg.ranking.w_click),
		("ranking.w_bounce", cfg.ranking.w_bounce),
	] {
		if weight < 0.0 {
			return Err(invalid(field, "must be zero or greater."));
		}
		if !weight.is_finite() {
			return Err(invalid(field, "must be a finite number."));
		}
	}

	if cfg.consumer.consumer_id.trim().is_empty() {
		return Err(invalid("consumer.consumer_id", "must be non-empty."));
	}
	if cfg.consumer.batch_size == 0 {
		return Err(invalid("consumer.batch_size", "must be greater than zero."));
	}
	if cfg.consumer.poll_interval_ms == 0 {
		return Err(invalid("consumer.poll_interval_ms", "must be greater than zero."));
	}

	Ok(())
}

fn invalid(field: &'static str, reason: &'static str) -> Error {
	Error::Invalid { field, reason }
}

// Vocabulary matching is case-insensitive; lowercasing once here keeps the
// intent extractor deterministic for any config spelling.
fn normalize(cfg: &mut Config) {
	for color in &mut cfg.vocabulary.colors {
		*color = color.trim().to_lowercase();
	}
	for category in &mut cfg.vocabulary.categories {
		*category = category.trim().to_lowercase();
	}

	cfg.vocabulary.colors.retain(|color| !color.is_empty());
	cfg.vocabulary.categories.retain(|category| !category.is_empty());
}
