use time::OffsetDateTime;
use uuid::Uuid;

use crate::ranking::Counters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
	Click,
	AddToCart,
	Purchase,
	Bounce,
}
impl EventKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Click => "click",
			Self::AddToCart => "add_to_cart",
			Self::Purchase => "purchase",
			Self::Bounce => "bounce",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"click" => Some(Self::Click),
			"add_to_cart" => Some(Self::AddToCart),
			"purchase" => Some(Self::Purchase),
			"bounce" => Some(Self::Bounce),
			_ => None,
		}
	}
}

/// A user interaction. Immutable once published; `event_id` is assigned at
/// ingestion and is the deduplication key for at-least-once delivery.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InteractionEvent {
	pub event_id: Uuid,
	pub item_id: String,
	pub kind: EventKind,
	pub occurred_at: OffsetDateTime,
}

impl Counters {
	/// Each event increments exactly one counter. Bounce is an independent
	/// signal; no exclusivity with clicks is inferred.
	pub fn increment(&mut self, kind: EventKind) {
		match kind {
			EventKind::Click => self.clicks += 1,
			EventKind::AddToCart => self.carts += 1,
			EventKind::Purchase => self.purchases += 1,
			EventKind::Bounce => self.bounces += 1,
		}
	}
}
