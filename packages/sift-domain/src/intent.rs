use regex::Regex;

use sift_config::Vocabulary;

const PRICE_BETWEEN: &str = r"between\s+(\d+(?:\.\d+)?k?)\s+and\s+(\d+(?:\.\d+)?k?)";
const PRICE_MAX: &str = r"(?:under|below|less than|cheaper than)\s+(\d+(?:\.\d+)?k?)";
const PRICE_MIN: &str = r"(?:above|over|more than)\s+(\d+(?:\.\d+)?k?)";
const RATING_BOUNDED: &str = r"(?:above|over|more than|at least)\s+(\d(?:\.\d)?)\s*(?:stars?|rating)";
const RATING_PLAIN: &str = r"(\d(?:\.\d)?)\s*(?:stars?|rating)";
const RATING_SPAN: &str = r"(?:(?:above|over|more than|at least)\s+)?\d(?:\.\d)?\s*(?:stars?|rating)";
const SIZE: &str = r"size\s+([a-z0-9]+)";

/// Structured constraints parsed from free query text. Every field is
/// optional; an absent field leaves that attribute unconstrained.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QueryIntent {
	pub price_min: Option<f64>,
	pub price_max: Option<f64>,
	pub category: Option<String>,
	pub brand: Option<String>,
	pub color: Option<String>,
	pub size: Option<String>,
	pub min_rating: Option<f32>,
}
impl QueryIntent {
	pub fn is_unconstrained(&self) -> bool {
		self.price_min.is_none()
			&& self.price_max.is_none()
			&& self.category.is_none()
			&& self.brand.is_none()
			&& self.color.is_none()
			&& self.size.is_none()
			&& self.min_rating.is_none()
	}
}

/// Rule-based extraction against a known attribute vocabulary. Deterministic:
/// identical input always yields an identical constraint set; anything that
/// does not parse simply leaves the corresponding field unset.
pub fn extract_intent(query: &str, vocabulary: &Vocabulary, brands: &[String]) -> QueryIntent {
	let lowered = query.to_lowercase();
	let min_rating = extract_rating(&lowered);
	// Rating phrases like "above 4.5 rating" would otherwise satisfy the
	// "above N" price pattern, so they are blanked out before price parsing.
	let without_rating = strip_pattern(&lowered, RATING_SPAN);
	let (price_min, price_max) = extract_price_range(&without_rating);

	QueryIntent {
		price_min,
		price_max,
		category: match_vocabulary(&lowered, &vocabulary.categories),
		brand: match_vocabulary(&lowered, brands),
		color: match_vocabulary(&lowered, &vocabulary.colors),
		size: capture_one(&lowered, SIZE),
		min_rating,
	}
}

fn extract_price_range(text: &str) -> (Option<f64>, Option<f64>) {
	if let Some((low, high)) = capture_two(text, PRICE_BETWEEN) {
		return (parse_amount(&low), parse_amount(&high));
	}
	if let Some(raw) = capture_one(text, PRICE_MAX) {
		return (None, parse_amount(&raw));
	}
	if let Some(raw) = capture_one(text, PRICE_MIN) {
		return (parse_amount(&raw), None);
	}

	(None, None)
}

fn extract_rating(text: &str) -> Option<f32> {
	let raw = capture_one(text, RATING_BOUNDED).or_else(|| capture_one(text, RATING_PLAIN))?;

	raw.parse::<f32>().ok().filter(|rating| (0.0..=5.0).contains(rating))
}

/// Converts user-friendly amounts to raw values, e.g. "3k" -> 3000.
fn parse_amount(token: &str) -> Option<f64> {
	if let Some(stripped) = token.strip_suffix('k') {
		return stripped.parse::<f64>().ok().map(|value| value * 1_000.0);
	}

	token.parse::<f64>().ok()
}

/// The vocabulary term matching earliest in the query as a whole word. Ties
/// at the same position prefer the longer term, then lexical order, so the
/// winner never depends on how the vocabulary list happens to be ordered.
/// Terms are expected pre-lowercased.
fn match_vocabulary(text: &str, terms: &[String]) -> Option<String> {
	let mut best: Option<(usize, &String)> = None;

	for term in terms {
		if term.is_empty() {
			continue;
		}

		let pattern = format!(r"\b{}\b", regex::escape(term));
		let Some(found) = Regex::new(&pattern).ok().and_then(|re| re.find(text)) else {
			continue;
		};
		let better = match best {
			None => true,
			Some((start, current)) =>
				found.start() < start
					|| (found.start() == start
						&& (term.len() > current.len()
							|| (term.len() == current.len() && term < current))),
		};

		if better {
			best = Some((found.start(), term));
		}
	}

	best.map(|(_, term)| term.clone())
}

fn capture_one(text: &str, pattern: &str) -> Option<String> {
	let re = Regex::new(pattern).ok()?;
	let caps = re.captures(text)?;

	caps.get(1).map(|m| m.as_str().to_string())
}

fn capture_two(text: &str, pattern: &str) -> Option<(String, String)> {
	let re = Regex::new(pattern).ok()?;
	let caps = re.captures(text)?;

	Some((caps.get(1)?.as_str().to_string(), caps.get(2)?.as_str().to_string()))
}

fn strip_pattern(text: &str, pattern: &str) -> String {
	match Regex::new(pattern) {
		Ok(re) => re.replace_all(text, " ").into_owned(),
		Err(_) => text.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn vocabulary() -> Vocabulary {
		Vocabulary {
			colors: vec!["black".to_string(), "blue".to_string(), "red".to_string()],
			categories: vec!["shoes".to_string(), "shirt".to_string()],
		}
	}

	#[test]
	fn parses_color_category_and_price_cap() {
		let intent = extract_intent("blue running shoes under 3000", &vocabulary(), &[]);

		assert_eq!(intent.color.as_deref(), Some("blue"));
		assert_eq!(intent.category.as_deref(), Some("shoes"));
		assert_eq!(intent.price_max, Some(3_000.0));
		assert_eq!(intent.price_min, None);
	}

	#[test]
	fn parses_price_range_with_k_suffix() {
		let intent = extract_intent("watch between 2k and 6.5k", &vocabulary(), &[]);

		assert_eq!(intent.price_min, Some(2_000.0));
		assert_eq!(intent.price_max, Some(6_500.0));
	}

	#[test]
	fn rating_phrase_is_not_mistaken_for_price_floor() {
		let intent = extract_intent("shoes above 4.5 rating", &vocabulary(), &[]);

		assert_eq!(intent.min_rating, Some(4.5));
		assert_eq!(intent.price_min, None);
	}

	#[test]
	fn parses_brand_from_known_brand_list() {
		let brands = vec!["nike".to_string(), "new balance".to_string()];
		let intent = extract_intent("new balance shoes size m", &vocabulary(), &brands);

		assert_eq!(intent.brand.as_deref(), Some("new balance"));
		assert_eq!(intent.size.as_deref(), Some("m"));
	}

	#[test]
	fn brand_match_is_independent_of_vocabulary_order() {
		let forward = vec!["adidas".to_string(), "nike".to_string()];
		let backward = vec!["nike".to_string(), "adidas".to_string()];
		let first = extract_intent("nike or adidas runners", &vocabulary(), &forward);
		let second = extract_intent("nike or adidas runners", &vocabulary(), &backward);

		assert_eq!(first.brand, second.brand);
		// Earliest mention in the query wins.
		assert_eq!(first.brand.as_deref(), Some("nike"));
	}

	#[test]
	fn overlapping_terms_prefer_the_longer_match() {
		let brands = vec!["new".to_string(), "new balance".to_string()];
		let intent = extract_intent("new balance runners", &vocabulary(), &brands);

		assert_eq!(intent.brand.as_deref(), Some("new balance"));
	}

	#[test]
	fn color_term_must_match_whole_words() {
		let intent = extract_intent("hundred dollar shirt", &vocabulary(), &[]);

		assert_eq!(intent.color, None);
	}

	#[test]
	fn unparseable_query_yields_no_constraints() {
		let intent = extract_intent("comfy things for rainy days", &vocabulary(), &[]);

		assert!(intent.is_unconstrained());
	}

	#[test]
	fn extraction_is_deterministic() {
		let query = "red shirt under 2k above 4 stars";
		let first = extract_intent(query, &vocabulary(), &[]);
		let second = extract_intent(query, &vocabulary(), &[]);

		assert_eq!(first, second);
	}
}
