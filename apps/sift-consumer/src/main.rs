use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = sift_consumer::Args::parse();

	sift_consumer::run(args).await
}
