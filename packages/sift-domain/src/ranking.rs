use std::cmp::Ordering;

use sift_config::Ranking;

/// Behavioral counters as read from the signal store. Non-negative and
/// monotone outside of administrative resets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Counters {
	pub clicks: i64,
	pub carts: i64,
	pub purchases: i64,
	pub bounces: i64,
}

/// A filtered candidate entering the re-ranker: similarity plus its current
/// counters. Call-local, never persisted.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
	pub item_id: String,
	pub semantic_score: f32,
	pub counters: Counters,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RankedCandidate {
	pub item_id: String,
	pub semantic_score: f32,
	pub norm_clicks: f32,
	pub norm_carts: f32,
	pub norm_purchases: f32,
	pub norm_bounces: f32,
	pub final_score: f32,
}

/// Re-ranks the filtered candidate set.
///
/// Counters are min-max normalized against the current candidate population,
/// not against global extremes. Normalizing per call keeps a handful of
/// always-popular items from dominating every query regardless of relevance.
/// An item with zero interactions gets all-zero behavioral terms, so a cold
/// catalog degrades to pure semantic ordering.
pub fn rank(candidates: Vec<ScoredCandidate>, weights: &Ranking) -> Vec<RankedCandidate> {
	let clicks = Extremes::over(&candidates, |c| c.counters.clicks);
	let carts = Extremes::over(&candidates, |c| c.counters.carts);
	let purchases = Extremes::over(&candidates, |c| c.counters.purchases);
	let bounces = Extremes::over(&candidates, |c| c.counters.bounces);

	let mut ranked: Vec<RankedCandidate> = candidates
		.into_iter()
		.map(|candidate| {
			let norm_clicks = clicks.normalize(candidate.counters.clicks);
			let norm_carts = carts.normalize(candidate.counters.carts);
			let norm_purchases = purchases.normalize(candidate.counters.purchases);
			let norm_bounces = bounces.normalize(candidate.counters.bounces);
			// Bounce is a strict penalty. Subtracting it lets a bouncy item
			// fall below an otherwise-tied one instead of being clamped.
			let final_score = weights.w_semantic * candidate.semantic_score
				+ weights.w_purchase * norm_purchases
				+ weights.w_cart * norm_carts
				+ weights.w_click * norm_clicks
				- weights.w_bounce * norm_bounces;

			RankedCandidate {
				item_id: candidate.item_id,
				semantic_score: candidate.semantic_score,
				norm_clicks,
				norm_carts,
				norm_purchases,
				norm_bounces,
				final_score,
			}
		})
		.collect();

	ranked.sort_by(cmp_ranked);

	ranked
}

// Descending final score, ties by descending semantic score, then by item id
// so the ordering is fully deterministic.
fn cmp_ranked(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
	b.final_score
		.total_cmp(&a.final_score)
		.then_with(|| b.semantic_score.total_cmp(&a.semantic_score))
		.then_with(|| a.item_id.cmp(&b.item_id))
}

#[derive(Debug, Clone, Copy)]
struct Extremes {
	min: i64,
	max: i64,
}
impl Extremes {
	fn over(candidates: &[ScoredCandidate], value: impl Fn(&ScoredCandidate) -> i64) -> Self {
		let mut min = i64::MAX;
		let mut max = i64::MIN;

		for candidate in candidates {
			let v = value(candidate);

			min = min.min(v);
			max = max.max(v);
		}

		Self { min, max }
	}

	// The degenerate population (single candidate, or all counters equal)
	// maps to the neutral value 0.
	fn normalize(&self, value: i64) -> f32 {
		if self.max <= self.min {
			return 0.0;
		}

		(value - self.min) as f32 / (self.max - self.min) as f32
	}
}
