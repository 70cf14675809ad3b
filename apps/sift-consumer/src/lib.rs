use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use sift_service::{EventConsumer, adapters};
use sift_storage::db::Db;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, rename_all = "kebab")]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = sift_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = Arc::new(Db::connect(&config.storage.postgres).await?);

	db.ensure_schema().await?;

	let store = Arc::new(adapters::PostgresSignalStore { db: db.clone() });
	let stream = Arc::new(adapters::PostgresEventStream { db });
	let consumer = EventConsumer::new(config.consumer, store, stream);

	tracing::info!(consumer_id = %consumer.cfg.consumer_id, "Event consumer started.");

	consumer.run().await;

	Ok(())
}
