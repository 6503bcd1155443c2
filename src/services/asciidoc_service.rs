// ==================== ASCIIDOC CONVERSION ====================
// Pipes source text through the external `asciidoc` tool and reports its
// exit status and output streams verbatim.

use serde::Serialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::AsciiDocSettings;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AsciiDocResponse {
    /// True when the converter exited with status 0
    pub success: bool,
    /// Converter stdout
    pub html: String,
    /// Converter stderr (warnings or errors)
    pub error_message: String,
}

#[derive(Debug, Clone)]
pub struct AsciiDocConverter {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl AsciiDocConverter {
    pub fn new(settings: &AsciiDocSettings) -> Self {
        AsciiDocConverter {
            command: settings.command.clone(),
            args: settings.args.clone(),
            timeout: settings.timeout,
        }
    }

    pub async fn convert(&self, text: &str) -> AsciiDocResponse {
        let mut child = match Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                log::error!("❌ Failed to start {}: {}", self.command, e);
                return failure(format!("Failed to run {}: {}", self.command, e));
            }
        };

        let stdin = child.stdin.take();
        let input = text.as_bytes();

        // Feed stdin while collecting output so large documents can't fill both pipes
        let write_input = async move {
            if let Some(mut stdin) = stdin {
                // The converter may exit without reading everything
                if let Err(e) = stdin.write_all(input).await {
                    log::debug!("asciidoc stdin closed early: {}", e);
                }
            }
        };

        let run = async { tokio::join!(write_input, child.wait_with_output()).1 };

        match tokio::time::timeout(self.timeout, run).await {
            Ok(Ok(output)) => {
                let return_code = output.status.code().unwrap_or(-1);
                if return_code != 0 {
                    log::info!("📄 {} exited with status {}", self.command, return_code);
                }
                AsciiDocResponse {
                    success: return_code == 0,
                    html: String::from_utf8_lossy(&output.stdout).into_owned(),
                    error_message: String::from_utf8_lossy(&output.stderr).into_owned(),
                }
            }
            Ok(Err(e)) => {
                log::error!("❌ Failed to collect {} output: {}", self.command, e);
                failure(format!("Failed to run {}: {}", self.command, e))
            }
            Err(_) => {
                // Dropping the future drops the child, which kills it
                log::warn!("⏱️ {} timed out after {:?}", self.command, self.timeout);
                failure(format!("Conversion timed out after {} seconds", self.timeout.as_secs()))
            }
        }
    }
}

fn failure(error_message: String) -> AsciiDocResponse {
    AsciiDocResponse {
        success: false,
        html: String::new(),
        error_message,
    }
}
