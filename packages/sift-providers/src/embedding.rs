use color_eyre::{Result, eyre};
use serde::Deserialize;
use sift_config::EmbeddingProviderConfig;

use crate::http;

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
	data: Vec<EmbeddingRow>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRow {
	#[serde(default)]
	index: Option<usize>,
	embedding: Vec<f32>,
}

/// Embeds a batch of texts through an OpenAI-compatible embeddings endpoint.
///
/// The response is validated here: one vector per input, each with the
/// configured dimensionality. Callers can rely on every returned vector
/// living in the same space the index was built with.
pub async fn embed(cfg: &EmbeddingProviderConfig, texts: &[String]) -> Result<Vec<Vec<f32>>> {
	let client = http::client(cfg.timeout_ms)?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(url)
		.headers(http::bearer_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let parsed: EmbeddingResponse = res.error_for_status()?.json().await?;

	collect_vectors(parsed, texts.len(), cfg.dimensions as usize)
}

// Providers may return rows out of order; the declared index wins over the
// array position.
fn collect_vectors(
	response: EmbeddingResponse,
	expected_count: usize,
	dimensions: usize,
) -> Result<Vec<Vec<f32>>> {
	if response.data.len() != expected_count {
		return Err(eyre::eyre!(
			"Embedding provider returned {} vectors for {expected_count} inputs.",
			response.data.len()
		));
	}

	let mut rows: Vec<(usize, Vec<f32>)> = response
		.data
		.into_iter()
		.enumerate()
		.map(|(position, row)| (row.index.unwrap_or(position), row.embedding))
		.collect();

	rows.sort_by_key(|(index, _)| *index);

	for (_, vector) in &rows {
		if vector.len() != dimensions {
			return Err(eyre::eyre!(
				"Embedding provider returned a {}-dimensional vector; expected {dimensions}.",
				vector.len()
			));
		}
	}

	Ok(rows.into_iter().map(|(_, vector)| vector).collect())
}
