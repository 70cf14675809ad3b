use sift_domain::event::{EventKind, InteractionEvent};
use uuid::Uuid;

use crate::{Error, Result, SearchService};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EventRequest {
	pub item_id: String,
	pub kind: EventKind,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EventResponse {
	pub event_id: Uuid,
	pub status: String,
}

impl SearchService {
	/// Fire-and-forget ingestion: the event is acknowledged once it is on the
	/// stream. Counter effects happen later, on the consumer side.
	pub async fn record_event(&self, req: EventRequest) -> Result<EventResponse> {
		let item_id = req.item_id.trim();

		if item_id.is_empty() {
			return Err(Error::InvalidRequest {
				message: "item_id must be non-empty.".to_string(),
			});
		}

		let event = InteractionEvent {
			event_id: Uuid::new_v4(),
			item_id: item_id.to_string(),
			kind: req.kind,
			occurred_at: time::OffsetDateTime::now_utc(),
		};

		self.stream
			.publish(&event)
			.await
			.map_err(|err| Error::PublishFailure { message: err.to_string() })?;

		tracing::debug!(event_id = %event.event_id, kind = %event.kind.as_str(), "Event accepted.");

		Ok(EventResponse { event_id: event.event_id, status: "accepted".to_string() })
	}
}
