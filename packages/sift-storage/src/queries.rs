use sqlx::Row;

use sift_domain::{
	event::{EventKind, InteractionEvent},
	filter::ItemAttributes,
};

use crate::{Result, db::Db, models::{EventRow, ItemRow}};

const ITEM_COLUMNS: &str = "\
item_id, title, description, category, brand, price, size, color, rating, \
clicks, carts, purchases, bounces";

pub async fn upsert_item(
	db: &Db,
	item_id: &str,
	description: &str,
	attrs: &ItemAttributes,
) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO catalog_items (item_id, title, description, category, brand, price, size, color, rating)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
ON CONFLICT (item_id) DO UPDATE
SET
	title = EXCLUDED.title,
	description = EXCLUDED.description,
	category = EXCLUDED.category,
	brand = EXCLUDED.brand,
	price = EXCLUDED.price,
	size = EXCLUDED.size,
	color = EXCLUDED.color,
	rating = EXCLUDED.rating,
	updated_at = now()",
	)
	.bind(item_id)
	.bind(attrs.title.as_str())
	.bind(description)
	.bind(attrs.category.as_str())
	.bind(attrs.brand.as_str())
	.bind(attrs.price)
	.bind(attrs.size.as_str())
	.bind(attrs.color.as_str())
	.bind(attrs.rating)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn fetch_items(db: &Db, ids: &[String]) -> Result<Vec<ItemRow>> {
	let sql = format!("SELECT {ITEM_COLUMNS} FROM catalog_items WHERE item_id = ANY($1)");
	let rows = sqlx::query_as::<_, ItemRow>(&sql).bind(ids).fetch_all(&db.pool).await?;

	Ok(rows)
}

// Ordered so the vocabulary handed to intent extraction is stable across
// calls and connections.
pub async fn distinct_brands(db: &Db) -> Result<Vec<String>> {
	let brands: Vec<String> = sqlx::query_scalar(
		"SELECT DISTINCT brand FROM catalog_items WHERE brand <> '' ORDER BY brand",
	)
	.fetch_all(&db.pool)
	.await?;

	Ok(brands)
}

/// Idempotent apply: the dedup mark and the counter mutation commit in one
/// transaction. Returns false when the event id was already applied, so a
/// redelivered batch replays as a no-op. The counter mutation is a single-row
/// UPDATE; same-item events serialize on the row lock and different items
/// never block each other.
pub async fn apply_event(db: &Db, event: &InteractionEvent) -> Result<bool> {
	let mut tx = db.pool.begin().await?;
	let marked = sqlx::query(
		"INSERT INTO applied_events (event_id) VALUES ($1) ON CONFLICT (event_id) DO NOTHING",
	)
	.bind(event.event_id)
	.execute(&mut *tx)
	.await?;

	if marked.rows_affected() == 0 {
		tx.rollback().await?;

		return Ok(false);
	}

	let column = counter_column(event.kind);
	let sql = format!(
		"UPDATE catalog_items SET {column} = {column} + 1, updated_at = now() WHERE item_id = $1"
	);
	let updated = sqlx::query(&sql).bind(event.item_id.as_str()).execute(&mut *tx).await?;

	if updated.rows_affected() == 0 {
		// Unknown item: keep the dedup mark so redeliveries stay no-ops.
		tracing::warn!(item_id = %event.item_id, "Event references an unknown item.");
	}

	tx.commit().await?;

	Ok(true)
}

pub async fn publish_event(db: &Db, event: &InteractionEvent) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO interaction_events (event_id, item_id, kind, occurred_at)
VALUES ($1, $2, $3, $4)",
	)
	.bind(event.event_id)
	.bind(event.item_id.as_str())
	.bind(event.kind.as_str())
	.bind(event.occurred_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn fetch_events_after(db: &Db, after_seq: i64, limit: u32) -> Result<Vec<EventRow>> {
	let rows = sqlx::query_as::<_, EventRow>(
		"\
SELECT event_seq, event_id, item_id, kind, occurred_at
FROM interaction_events
WHERE event_seq > $1
ORDER BY event_seq ASC
LIMIT $2",
	)
	.bind(after_seq)
	.bind(limit as i64)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn committed_offset(db: &Db, consumer_id: &str) -> Result<i64> {
	let row = sqlx::query("SELECT last_seq FROM consumer_cursors WHERE consumer_id = $1")
		.bind(consumer_id)
		.fetch_optional(&db.pool)
		.await?;

	Ok(row.map(|row| row.get::<i64, _>("last_seq")).unwrap_or(0))
}

pub async fn commit_offset(db: &Db, consumer_id: &str, last_seq: i64) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO consumer_cursors (consumer_id, last_seq)
VALUES ($1, $2)
ON CONFLICT (consumer_id) DO UPDATE
SET last_seq = EXCLUDED.last_seq, updated_at = now()",
	)
	.bind(consumer_id)
	.bind(last_seq)
	.execute(&db.pool)
	.await?;

	Ok(())
}

fn counter_column(kind: EventKind) -> &'static str {
	match kind {
		EventKind::Click => "clicks",
		EventKind::AddToCart => "carts",
		EventKind::Purchase => "purchases",
		EventKind::Bounce => "bounces",
	}
}
