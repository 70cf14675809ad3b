use crate::intent::QueryIntent;

/// Structured attributes set at ingestion time. Immutable afterwards as far
/// as the search pipeline is concerned.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ItemAttributes {
	pub title: String,
	pub category: String,
	pub brand: String,
	pub price: f64,
	pub size: String,
	pub color: String,
	pub rating: f32,
}

/// Logical AND over every present constraint. No constraint present means
/// every item passes. This stage only removes candidates; callers must keep
/// survivor order unchanged so upstream similarity ordering is preserved.
pub fn matches(intent: &QueryIntent, attrs: &ItemAttributes) -> bool {
	if let Some(min) = intent.price_min
		&& attrs.price < min
	{
		return false;
	}
	if let Some(max) = intent.price_max
		&& attrs.price > max
	{
		return false;
	}
	if let Some(category) = &intent.category
		&& !contains_ignore_case(&attrs.category, category)
	{
		return false;
	}
	if let Some(brand) = &intent.brand
		&& !contains_ignore_case(&attrs.brand, brand)
	{
		return false;
	}
	if let Some(color) = &intent.color
		&& !contains_ignore_case(&attrs.color, color)
	{
		return false;
	}
	if let Some(size) = &intent.size
		&& !attrs.size.eq_ignore_ascii_case(size)
	{
		return false;
	}
	if let Some(min_rating) = intent.min_rating
		&& attrs.rating < min_rating
	{
		return false;
	}

	true
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
	haystack.to_lowercase().contains(&needle.to_lowercase())
}
