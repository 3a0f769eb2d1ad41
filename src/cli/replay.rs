//! Replay command implementation
//!
//! Feeds recorded raw frames, one per line, through the session machine and
//! pipeline without a transport.

use crate::config::Config;
use crate::pipeline::{FrameProcessor, Pipeline, TracingSink};
use crate::protocol::{Credentials, SessionState, SessionStateMachine};
use crate::signal::Signal;
use anyhow::Context;
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

/// Frames that bring a fresh machine to `Authenticated`
const HANDSHAKE: [&str; 3] = [r#"0{"sid":"replay"}"#, "40", r#"42["auth/success",{}]"#];

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// File of recorded frames, one per line
    pub file: PathBuf,

    /// Treat the recording as starting mid-session, already authenticated
    #[arg(long)]
    pub authenticated: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

impl ReplayArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let content = tokio::fs::read_to_string(&self.file)
            .await
            .with_context(|| format!("Failed to read {}", self.file.display()))?;

        let (signals, processor) = replay(&content, config, self.authenticated)?;

        for signal in &signals {
            match self.format {
                OutputFormat::Json => println!("{}", serde_json::to_string(signal)?),
                OutputFormat::Table => println!(
                    "{}  {:<12} {:>4}  {:<4}  {:>4}  {}",
                    signal.generated_at.format("%H:%M:%S"),
                    signal.asset,
                    signal.timeframe.as_ref().map(|t| t.as_str()).unwrap_or("-"),
                    signal.direction,
                    signal.confidence.to_string(),
                    signal.source_strategy
                ),
            }
        }

        let summary = processor.pipeline().history().summary();
        let discovery = processor.pipeline().discovery();
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string(&summary)?),
            OutputFormat::Table => {
                println!();
                println!("Replay summary");
                println!("  Final state:    {}", processor.state());
                println!("  Signals:        {}", summary.total);
                println!("  Buys / Sells:   {} / {}", summary.buys, summary.sells);
                println!("  Avg confidence: {:.1}%", summary.average_confidence);
                println!("  Assets seen:    {}", discovery.len());
                println!("  Event names:    {}", discovery.observed_event_names().join(", "));
            }
        }

        Ok(())
    }
}

/// Run every non-empty line through a fresh processor
pub fn replay(
    content: &str,
    config: &Config,
    authenticated: bool,
) -> anyhow::Result<(Vec<Signal>, FrameProcessor)> {
    let pipeline = Pipeline::from_config(config, Arc::new(TracingSink), Arc::new(TracingSink));
    // Nothing is sent during replay; the credentials only satisfy the machine
    let credentials = Credentials::new("replay", "replay")?;
    let machine = SessionStateMachine::new(credentials, config.connection.client_profile());
    let mut processor = FrameProcessor::new(machine, pipeline);

    processor.request_connect();
    if authenticated {
        for frame in HANDSHAKE {
            processor.handle_text(frame);
        }
        if processor.state() != SessionState::Authenticated {
            anyhow::bail!("Replay handshake did not authenticate");
        }
    }

    let mut signals = Vec::new();
    let mut frames = 0usize;
    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        frames += 1;
        if let Some(signal) = processor.handle_text(line).signal {
            signals.push(signal);
        }
    }

    tracing::info!(frames, signals = signals.len(), "Replay finished");
    Ok((signals, processor))
}
