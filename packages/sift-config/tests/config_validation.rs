use toml::Value;

use sift_config::{Config, Error};

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn sample_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.")
}

fn sample_with<F>(mutate: F) -> Result<(), Error>
where
	F: FnOnce(&mut toml::map::Map<String, Value>),
{
	let mut value: Value =
		toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let root = value.as_table_mut().expect("Sample config must be a table.");

	mutate(root);

	let rendered = toml::to_string(&value).expect("Failed to render sample config.");
	let cfg: Config = toml::from_str(&rendered).expect("Failed to parse mutated config.");

	sift_config::validate(&cfg)
}

fn table<'a>(root: &'a mut toml::map::Map<String, Value>, key: &str) -> &'a mut toml::map::Map<String, Value> {
	root.get_mut(key)
		.and_then(Value::as_table_mut)
		.unwrap_or_else(|| panic!("Sample config must include [{key}]."))
}

#[test]
fn sample_config_passes_validation() {
	let cfg = sample_config();

	sift_config::validate(&cfg).expect("Sample config must validate.");
}

#[test]
fn ranking_weights_default_to_reference_values() {
	let cfg = sample_config();

	assert_eq!(cfg.ranking.w_semantic, 0.55);
	assert_eq!(cfg.ranking.w_purchase, 0.20);
	assert_eq!(cfg.ranking.w_cart, 0.15);
	assert_eq!(cfg.ranking.w_click, 0.10);
	assert_eq!(cfg.ranking.w_bounce, 0.10);
}

#[test]
fn rejects_embedding_dimension_mismatch() {
	let result = sample_with(|root| {
		let storage = table(root, "storage");
		let qdrant = table(storage, "qdrant");

		qdrant.insert("vector_dim".to_string(), Value::Integer(768));
	});

	assert!(matches!(result, Err(Error::Invalid { .. })));
}

#[test]
fn rejects_over_fetch_factor_below_two() {
	let result = sample_with(|root| {
		let search = table(root, "search");

		search.insert("over_fetch_factor".to_string(), Value::Integer(1));
	});

	assert!(matches!(result, Err(Error::Invalid { .. })));
}

#[test]
fn rejects_negative_ranking_weight() {
	let result = sample_with(|root| {
		let ranking = table(root, "ranking");

		ranking.insert("w_bounce".to_string(), Value::Float(-0.1));
	});

	assert!(matches!(result, Err(Error::Invalid { .. })));
}

#[test]
fn invalid_errors_name_the_offending_field() {
	let result = sample_with(|root| {
		let search = table(root, "search");

		search.insert("top_k".to_string(), Value::Integer(0));
	});

	assert!(matches!(result, Err(Error::Invalid { field: "search.top_k", .. })));
}

#[test]
fn rejects_zero_consumer_batch_size() {
	let result = sample_with(|root| {
		let consumer = table(root, "consumer");

		consumer.insert("batch_size".to_string(), Value::Integer(0));
	});

	assert!(matches!(result, Err(Error::Invalid { .. })));
}

#[test]
fn rejects_blank_http_bind() {
	let result = sample_with(|root| {
		let service = table(root, "service");

		service.insert("http_bind".to_string(), Value::String(" ".to_string()));
	});

	assert!(matches!(result, Err(Error::Invalid { .. })));
}
