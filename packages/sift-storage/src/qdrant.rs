use std::collections::HashMap;

use qdrant_client::{
	client::Payload,
	qdrant::{
		CreateCollectionBuilder, Distance, PointStruct, Query, QueryPointsBuilder,
		UpsertPointsBuilder, Value, VectorParamsBuilder, value::Kind,
	},
};
use uuid::Uuid;

use crate::Result;

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &sift_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	pub async fn ensure_collection(&self) -> Result<()> {
		if self.client.collection_exists(&self.collection).await? {
			return Ok(());
		}

		let builder = CreateCollectionBuilder::new(self.collection.clone()).vectors_config(
			VectorParamsBuilder::new(self.vector_dim as u64, Distance::Cosine),
		);

		self.client.create_collection(builder).await?;

		Ok(())
	}

	/// Similarity-ordered candidates. Item ids travel in the point payload;
	/// point ids are UUIDv5 digests of the item id so re-ingestion overwrites
	/// in place.
	pub async fn search_items(&self, vector: Vec<f32>, limit: u32) -> Result<Vec<(String, f32)>> {
		let query = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector))
			.with_payload(true)
			.limit(limit as u64);
		let response = self.client.query(query).await?;
		let mut out = Vec::with_capacity(response.result.len());

		for point in response.result {
			let Some(item_id) = payload_string(&point.payload, "item_id") else {
				continue;
			};

			out.push((item_id, point.score));
		}

		Ok(out)
	}

	pub async fn upsert_items(&self, items: &[(String, Vec<f32>)]) -> Result<()> {
		let mut points = Vec::with_capacity(items.len());

		for (item_id, vector) in items {
			let mut payload_map = HashMap::new();

			payload_map.insert("item_id".to_string(), Value::from(item_id.clone()));

			let point = PointStruct::new(
				point_id_for(item_id).to_string(),
				vector.clone(),
				Payload::from(payload_map),
			);

			points.push(point);
		}

		let upsert = UpsertPointsBuilder::new(self.collection.clone(), points).wait(true);

		self.client.upsert_points(upsert).await?;

		Ok(())
	}
}

pub fn point_id_for(item_id: &str) -> Uuid {
	Uuid::new_v5(&Uuid::NAMESPACE_OID, item_id.as_bytes())
}

fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	payload.get(key).and_then(|value| match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.clone()),
		_ => None,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn point_ids_are_stable_per_item() {
		assert_eq!(point_id_for("P100"), point_id_for("P100"));
		assert_ne!(point_id_for("P100"), point_id_for("P101"));
	}
}
