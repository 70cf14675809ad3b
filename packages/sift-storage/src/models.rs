use time::OffsetDateTime;
use uuid::Uuid;

use sift_domain::{filter::ItemAttributes, ranking::Counters};

#[derive(Debug, sqlx::FromRow)]
pub struct ItemRow {
	pub item_id: String,
	pub title: String,
	pub description: String,
	pub category: String,
	pub brand: String,
	pub price: f64,
	pub size: String,
	pub color: String,
	pub rating: f32,
	pub clicks: i64,
	pub carts: i64,
	pub purchases: i64,
	pub bounces: i64,
}
impl ItemRow {
	pub fn attributes(&self) -> ItemAttributes {
		ItemAttributes {
			title: self.title.clone(),
			category: self.category.clone(),
			brand: self.brand.clone(),
			price: self.price,
			size: self.size.clone(),
			color: self.color.clone(),
			rating: self.rating,
		}
	}

	pub fn counters(&self) -> Counters {
		Counters {
			clicks: self.clicks,
			carts: self.carts,
			purchases: self.purchases,
			bounces: self.bounces,
		}
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct EventRow {
	pub event_seq: i64,
	pub event_id: Uuid,
	pub item_id: String,
	pub kind: String,
	pub occurred_at: OffsetDateTime,
}
