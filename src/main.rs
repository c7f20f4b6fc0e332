//! `fatsecret-proxy` server binary.

// self
use fatsecret_proxy::{config::Config, obs, server};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	obs::init_tracing();

	let config = Config::from_env()?;

	server::serve(config).await?;

	Ok(())
}
