use color_eyre::{Result, eyre};
use serde_json::Value;

use sift_domain::{filter::ItemAttributes, ranking::RankedCandidate};

use crate::http;

const SYSTEM_PROMPT: &str =
	"You explain why a product appears in search results in a clear, factual manner.";

/// Generates a 1-2 sentence ranking explanation through a chat-completion
/// endpoint. Called only after the ranked list is final; callers must treat
/// failures as a missing explanation, never as a search failure.
pub async fn explain(
	cfg: &sift_config::LlmProviderConfig,
	query: &str,
	attrs: &ItemAttributes,
	scores: &RankedCandidate,
) -> Result<String> {
	let client = http::client(cfg.timeout_ms)?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"max_tokens": 120,
		"messages": [
			{ "role": "system", "content": SYSTEM_PROMPT },
			{ "role": "user", "content": build_prompt(query, attrs, scores) },
		],
	});
	let res = client
		.post(url)
		.headers(http::bearer_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_explanation(json)
}

fn build_prompt(query: &str, attrs: &ItemAttributes, scores: &RankedCandidate) -> String {
	format!(
		"You are a precise product ranking explanation assistant.\n\n\
		User query:\n\"{query}\"\n\n\
		Product details:\n\
		Title: {title}\n\
		Brand: {brand}\n\
		Category: {category}\n\
		Price: {price}\n\
		Rating: {rating}\n\
		Semantic score: {semantic:.4}\n\
		Click score: {clicks:.4}\n\
		Add-to-cart score: {carts:.4}\n\
		Purchase score: {purchases:.4}\n\n\
		Explain in 1-2 concise sentences why this product matches the query. \
		Mention the most influential score. Use only the given information.",
		title = attrs.title,
		brand = attrs.brand,
		category = attrs.category,
		price = attrs.price,
		rating = attrs.rating,
		semantic = scores.semantic_score,
		clicks = scores.norm_clicks,
		carts = scores.norm_carts,
		purchases = scores.norm_purchases,
	)
}

fn parse_explanation(json: Value) -> Result<String> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| eyre::eyre!("Explanation response is missing message content."))?;
	let trimmed = content.trim();

	if trimmed.is_empty() {
		return Err(eyre::eyre!("Explanation response content is empty."));
	}

	Ok(trimmed.to_string())
}
