use anyhow::Result;
use tracing::info;

use kitchen_ops_engine::{config, feed, monitoring};

#[tokio::main]
async fn main() -> Result<()> {
    // Load local .env if present (no-op in prod/systemd envs)
    let _ = dotenvy::dotenv();

    monitoring::init_tracing();

    let cfg = config::Config::from_env()?;
    info!(
        api = %cfg.api_base_url,
        location = %cfg.location_id,
        tz = %cfg.tz,
        watch = cfg.watch,
        "boot"
    );

    feed::run(cfg).await?;

    Ok(())
}
