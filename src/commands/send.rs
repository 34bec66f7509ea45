use anyhow::{Context, Result};
use tracing::info;

use crate::commands::utils;
use webpresenter::daemon::{DaemonClient, DaemonRequest, DaemonResponse};
use webpresenter::messaging::Request;
use webpresenter::types::OutputFormat;

/// Parse a raw `{"type", "payload"}` message
pub fn parse_message(raw: &str) -> Result<Request> {
    serde_json::from_str(raw).context("Invalid message")
}

pub fn handle_send(raw: &str, format: OutputFormat) -> Result<()> {
    let request = parse_message(raw)?;
    utils::require_daemon()?;
    info!("Sending {} to daemon", request.kind());

    match DaemonClient::send_request(DaemonRequest::Message(request)) {
        Ok(DaemonResponse::Ack(ack)) => {
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string(&ack)?),
                OutputFormat::Simple => println!("ok"),
            }
            Ok(())
        }
        Ok(DaemonResponse::Error(e)) => Err(anyhow::anyhow!("Daemon rejected message: {}", e)),
        Ok(_) => Err(anyhow::anyhow!("Unexpected response from daemon")),
        Err(e) => Err(anyhow::anyhow!("Failed to communicate with daemon: {}", e)),
    }
}
