pub mod event;
pub mod filter;
pub mod intent;
pub mod ranking;
