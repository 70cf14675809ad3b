use sift_domain::filter::ItemAttributes;

use crate::{Error, Result, SearchService};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CatalogItem {
	pub item_id: String,
	pub description: String,
	#[serde(flatten)]
	pub attributes: ItemAttributes,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IngestRequest {
	pub items: Vec<CatalogItem>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IngestResponse {
	pub ingested: usize,
}

impl SearchService {
	/// Writes attributes to the signal store first, then embeds and indexes.
	/// Items are embedded from title plus description, the same text space
	/// queries are embedded into.
	pub async fn ingest_catalog(&self, req: IngestRequest) -> Result<IngestResponse> {
		if req.items.is_empty() {
			return Err(Error::InvalidRequest {
				message: "items must be non-empty.".to_string(),
			});
		}
		if req.items.iter().any(|item| item.item_id.trim().is_empty()) {
			return Err(Error::InvalidRequest {
				message: "every item requires a non-empty item_id.".to_string(),
			});
		}

		self.store
			.upsert_items(&req.items)
			.await
			.map_err(|err| Error::StoreUnavailable { message: err.to_string() })?;

		let texts: Vec<String> = req
			.items
			.iter()
			.map(|item| format!("{} {}", item.attributes.title, item.description))
			.collect();
		let vectors = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, &texts)
			.await
			.map_err(|err| Error::Provider { message: err.to_string() })?;

		// Dimensionality is enforced by the provider; the count check keeps the
		// zip below from silently leaving items unindexed.
		if vectors.len() != req.items.len() {
			return Err(Error::Provider {
				message: "Embedding provider returned a mismatched vector count.".to_string(),
			});
		}

		let points: Vec<(String, Vec<f32>)> = req
			.items
			.iter()
			.map(|item| item.item_id.clone())
			.zip(vectors)
			.collect();

		self.index
			.upsert(&points)
			.await
			.map_err(|err| Error::RetrievalUnavailable { message: err.to_string() })?;

		tracing::info!(count = req.items.len(), "Catalog batch ingested.");

		Ok(IngestResponse { ingested: req.items.len() })
	}
}
