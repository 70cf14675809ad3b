use std::{sync::Arc, time::Duration};

use crate::{Error, EventStream, Result, SignalStore};

/// Applies streamed interaction events to the signal store.
///
/// Delivery is at-least-once, so the apply step is idempotent per event id;
/// the offset is committed only after every event in the batch has been
/// applied. A crash between apply and commit replays the batch, and the
/// replayed events are absorbed as duplicates.
pub struct EventConsumer {
	pub cfg: sift_config::Consumer,
	pub store: Arc<dyn SignalStore>,
	pub stream: Arc<dyn EventStream>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
	pub fetched: usize,
	pub applied: usize,
	pub duplicates: usize,
}

impl EventConsumer {
	pub fn new(
		cfg: sift_config::Consumer,
		store: Arc<dyn SignalStore>,
		stream: Arc<dyn EventStream>,
	) -> Self {
		Self { cfg, store, stream }
	}

	/// Fetches and applies one batch. Returns without committing on any store
	/// failure; the whole batch is then retried on the next pass.
	pub async fn drain_once(&self) -> Result<BatchReport> {
		let cursor = self
			.stream
			.committed_offset(&self.cfg.consumer_id)
			.await
			.map_err(|err| Error::StreamUnavailable { message: err.to_string() })?;
		let entries = self
			.stream
			.fetch(cursor, self.cfg.batch_size)
			.await
			.map_err(|err| Error::StreamUnavailable { message: err.to_string() })?;

		if entries.is_empty() {
			return Ok(BatchReport::default());
		}

		let mut report = BatchReport { fetched: entries.len(), ..Default::default() };

		for entry in &entries {
			let applied = self
				.store
				.apply_event(&entry.event)
				.await
				.map_err(|err| Error::StoreUnavailable { message: err.to_string() })?;

			if applied {
				report.applied += 1;
			} else {
				tracing::debug!(
					event_id = %entry.event.event_id,
					"Skipping already-applied event."
				);

				report.duplicates += 1;
			}
		}

		// Last entry's offset; only safe now that the batch is fully applied.
		let committed = entries[entries.len() - 1].offset;

		self.stream
			.commit_offset(&self.cfg.consumer_id, committed)
			.await
			.map_err(|err| Error::StreamUnavailable { message: err.to_string() })?;

		tracing::info!(
			consumer_id = %self.cfg.consumer_id,
			fetched = report.fetched,
			applied = report.applied,
			duplicates = report.duplicates,
			committed,
			"Batch applied."
		);

		Ok(report)
	}

	/// Polls forever. Keeps draining while the stream has backlog, sleeps
	/// between passes otherwise, and logs-and-retries on any failure.
	pub async fn run(&self) {
		let idle = Duration::from_millis(self.cfg.poll_interval_ms);

		loop {
			match self.drain_once().await {
				Ok(report) if report.fetched > 0 => continue,
				Ok(_) => {},
				Err(err) => {
					tracing::error!(error = %err, "Event batch failed. Will retry.");
				},
			}

			tokio::time::sleep(idle).await;
		}
	}
}
