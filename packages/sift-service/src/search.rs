use std::{collections::HashMap, time::Duration};

use sift_domain::{
	filter::{self, ItemAttributes},
	intent::{self, QueryIntent},
	ranking::{self, Counters, RankedCandidate, ScoredCandidate},
};

use crate::{Error, ItemSignals, Result, RetrievedCandidate, SearchService};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchRequest {
	pub query: String,
	pub top_k: Option<u32>,
	pub explain: Option<bool>,
}

/// Whether behavioral counters contributed to the ranking. A store outage
/// after successful retrieval degrades to semantic-only ranking; that state
/// must be distinguishable from a fully-scored result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalMode {
	Full,
	SemanticOnly,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchItem {
	pub item_id: String,
	/// Absent in semantic-only mode, where the store could not be read.
	#[serde(flatten)]
	pub attributes: Option<ItemAttributes>,
	pub semantic_score: f32,
	pub norm_clicks: f32,
	pub norm_carts: f32,
	pub norm_purchases: f32,
	pub norm_bounces: f32,
	pub final_score: f32,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub explanation: Option<String>,
}

/// Empty-after-filtering is a valid terminal state, not an error, and is
/// kept distinct from retrieval failure (which surfaces as `Error`).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchResponse {
	Ranked { signal_mode: SignalMode, items: Vec<SearchItem> },
	NoMatches,
}

impl SearchService {
	/// Retrieval, intent-aware filtering, then behavioral re-ranking.
	/// Read-only; every piece of per-call state lives on this stack frame.
	pub async fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
		let query = req.query.trim();

		if query.is_empty() {
			return Err(Error::InvalidRequest { message: "query must be non-empty.".to_string() });
		}

		let top_k = req.top_k.unwrap_or(self.cfg.search.top_k).max(1) as usize;
		let vector = self.embed_query(query).await?;
		// Over-fetch so filtering can discard without starving the result.
		let fetch_count = (top_k as u32).saturating_mul(self.cfg.search.over_fetch_factor);
		let candidates = self.retrieve(&vector, fetch_count).await?;

		if candidates.is_empty() {
			return Ok(SearchResponse::NoMatches);
		}

		let ids: Vec<String> =
			candidates.iter().map(|candidate| candidate.item_id.clone()).collect();

		match self.load_signals(&ids).await? {
			Some(signals) => {
				self.rank_full(query, top_k, req.explain.unwrap_or(false), candidates, signals)
					.await
			},
			None => Ok(rank_semantic_only(top_k, candidates, &self.cfg.ranking)),
		}
	}

	async fn rank_full(
		&self,
		query: &str,
		top_k: usize,
		explain: bool,
		candidates: Vec<RetrievedCandidate>,
		signals: Vec<ItemSignals>,
	) -> Result<SearchResponse> {
		let intent = self.extract_intent(query).await;
		let by_id: HashMap<String, ItemSignals> =
			signals.into_iter().map(|signal| (signal.item_id.clone(), signal)).collect();
		// Filtering removes, never reorders: survivors keep the similarity
		// order established by retrieval.
		let mut survivors = Vec::with_capacity(candidates.len());

		for candidate in candidates {
			let Some(signal) = by_id.get(&candidate.item_id) else {
				tracing::warn!(
					item_id = %candidate.item_id,
					"Retrieved candidate missing from signal store."
				);

				continue;
			};

			if filter::matches(&intent, &signal.attributes) {
				survivors.push(candidate);
			}
		}

		if survivors.is_empty() {
			return Ok(SearchResponse::NoMatches);
		}

		let scored: Vec<ScoredCandidate> = survivors
			.into_iter()
			.map(|candidate| ScoredCandidate {
				semantic_score: candidate.semantic_score,
				counters: by_id
					.get(&candidate.item_id)
					.map(|signal| signal.counters)
					.unwrap_or_default(),
				item_id: candidate.item_id,
			})
			.collect();
		let mut ranked = ranking::rank(scored, &self.cfg.ranking);

		ranked.truncate(top_k);

		let mut items = Vec::with_capacity(ranked.len());

		for scores in ranked {
			let attributes = by_id.get(&scores.item_id).map(|signal| signal.attributes.clone());
			let explanation = match (&attributes, explain) {
				(Some(attrs), true) => self.explain_item(query, attrs, &scores).await,
				_ => None,
			};

			items.push(to_item(scores, attributes, explanation));
		}

		Ok(SearchResponse::Ranked { signal_mode: SignalMode::Full, items })
	}

	// Dimensionality is enforced by the provider; only presence is checked.
	async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
		let texts = vec![query.to_string()];
		let mut vectors = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, &texts)
			.await
			.map_err(|err| Error::Provider { message: err.to_string() })?;

		vectors.pop().ok_or_else(|| Error::Provider {
			message: "Embedding provider returned no vectors.".to_string(),
		})
	}

	// No fallback to an unranked scan: an unreachable or slow index fails the
	// call instead of silently serving junk.
	async fn retrieve(&self, vector: &[f32], limit: u32) -> Result<Vec<RetrievedCandidate>> {
		let timeout = Duration::from_millis(self.cfg.search.index_timeout_ms);

		match tokio::time::timeout(timeout, self.index.search(vector, limit)).await {
			Ok(Ok(candidates)) => Ok(candidates),
			Ok(Err(err)) => Err(Error::RetrievalUnavailable { message: err.to_string() }),
			Err(_) => Err(Error::RetrievalUnavailable {
				message: "vector index query timed out.".to_string(),
			}),
		}
	}

	/// `Ok(None)` means the store is down and policy says degrade to
	/// semantic-only ranking rather than fail the call.
	async fn load_signals(&self, ids: &[String]) -> Result<Option<Vec<ItemSignals>>> {
		let timeout = Duration::from_millis(self.cfg.search.store_timeout_ms);
		let message = match tokio::time::timeout(timeout, self.store.fetch_items(ids)).await {
			Ok(Ok(signals)) => return Ok(Some(signals)),
			Ok(Err(err)) => err.to_string(),
			Err(_) => "signal store read timed out.".to_string(),
		};

		if self.cfg.search.degrade_on_store_error {
			tracing::warn!(error = %message, "Signal store read failed. Degrading to semantic-only ranking.");

			Ok(None)
		} else {
			Err(Error::StoreUnavailable { message })
		}
	}

	// Brand vocabulary comes from the store, under the same read bound as the
	// signal fetch. Losing it only widens the search (no brand constraint);
	// the extractor itself never fails a call.
	async fn extract_intent(&self, query: &str) -> QueryIntent {
		let timeout = Duration::from_millis(self.cfg.search.store_timeout_ms);
		let brands = match tokio::time::timeout(timeout, self.store.known_brands()).await {
			Ok(Ok(brands)) => brands.into_iter().map(|brand| brand.to_lowercase()).collect(),
			Ok(Err(err)) => {
				tracing::warn!(error = %err, "Brand vocabulary unavailable. Skipping brand constraint.");

				Vec::new()
			},
			Err(_) => {
				tracing::warn!("Brand vocabulary read timed out. Skipping brand constraint.");

				Vec::new()
			},
		};

		intent::extract_intent(query, &self.cfg.vocabulary, &brands)
	}

	// Explanations are downstream of ranking. A provider failure leaves the
	// field empty; it never alters or delays the ranked list.
	async fn explain_item(
		&self,
		query: &str,
		attrs: &ItemAttributes,
		scores: &RankedCandidate,
	) -> Option<String> {
		match self
			.providers
			.explainer
			.explain(&self.cfg.providers.explainer, query, attrs, scores)
			.await
		{
			Ok(text) => Some(text),
			Err(err) => {
				tracing::warn!(item_id = %scores.item_id, error = %err, "Explanation generation failed.");

				None
			},
		}
	}
}

fn rank_semantic_only(
	top_k: usize,
	candidates: Vec<RetrievedCandidate>,
	weights: &sift_config::Ranking,
) -> SearchResponse {
	let scored: Vec<ScoredCandidate> = candidates
		.into_iter()
		.map(|candidate| ScoredCandidate {
			semantic_score: candidate.semantic_score,
			counters: Counters::default(),
			item_id: candidate.item_id,
		})
		.collect();
	let mut ranked = ranking::rank(scored, weights);

	ranked.truncate(top_k);

	let items = ranked.into_iter().map(|scores| to_item(scores, None, None)).collect();

	SearchResponse::Ranked { signal_mode: SignalMode::SemanticOnly, items }
}

fn to_item(
	scores: RankedCandidate,
	attributes: Option<ItemAttributes>,
	explanation: Option<String>,
) -> SearchItem {
	SearchItem {
		item_id: scores.item_id,
		attributes,
		semantic_score: scores.semantic_score,
		norm_clicks: scores.norm_clicks,
		norm_carts: scores.norm_carts,
		norm_purchases: scores.norm_purchases,
		norm_bounces: scores.norm_bounces,
		final_score: scores.final_score,
		explanation,
	}
}
