pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Retrieval unavailable: {message}")]
	RetrievalUnavailable { message: String },
	#[error("Signal store unavailable: {message}")]
	StoreUnavailable { message: String },
	#[error("Event stream unavailable: {message}")]
	StreamUnavailable { message: String },
	#[error("Event publish failed: {message}")]
	PublishFailure { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
}
