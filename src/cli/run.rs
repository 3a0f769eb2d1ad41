//! Run command implementation

use crate::config::Config;
use crate::pipeline::{Pipeline, Session, TracingSink};
use crate::protocol::EnvCredentials;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Stop after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let pipeline =
            Pipeline::from_config(config, Arc::new(TracingSink), Arc::new(TracingSink));
        let session = Session::connect(&config.connection, &EnvCredentials, pipeline).await?;

        let deadline = async {
            match self.timeout {
                Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            _ = session.closed() => tracing::warn!("Session closed by transport"),
            _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted, disconnecting"),
            _ = deadline => tracing::info!("Run timeout reached, disconnecting"),
        }

        let summary = session.history().summary();
        tracing::info!(
            signals = summary.total,
            buys = summary.buys,
            sells = summary.sells,
            average_confidence = summary.average_confidence,
            assets = session.discovery().len(),
            "Session summary"
        );

        session.disconnect().await;
        Ok(())
    }
}
