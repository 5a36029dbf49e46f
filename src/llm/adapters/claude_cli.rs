//! Claude CLI adapter
//!
//! Runs `claude -p [--model <model>]`, writes the prompt to stdin and
//! returns stdout. One attempt per call; no timeout.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::llm::adapters::{AdapterError, LlmAdapter};

/// Adapter that shells out to the `claude` executable
#[derive(Debug, Clone)]
pub struct ClaudeCliAdapter {
    program: String,
    model: Option<String>,
}

impl ClaudeCliAdapter {
    /// Create adapter for `program`; `model` of `None` keeps the engine default
    pub fn new(program: impl Into<String>, model: Option<String>) -> Self {
        Self {
            program: program.into(),
            model,
        }
    }

    /// Command-line arguments passed to the engine
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["-p".to_string()];
        if let Some(model) = &self.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }
        args
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }
}

#[async_trait]
impl LlmAdapter for ClaudeCliAdapter {
    async fn generate(&self, prompt: &str) -> Result<String, AdapterError> {
        debug!(
            program = %self.program,
            model = self.model.as_deref().unwrap_or("default"),
            prompt_len = prompt.len(),
            "invoking backend"
        );

        let mut child = Command::new(&self.program)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AdapterError::Spawn {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        // Feed stdin from its own task so output is drained while the prompt is written
        let writer = child.stdin.take().map(|mut stdin| {
            let prompt = prompt.to_string();
            tokio::spawn(async move {
                match stdin.write_all(prompt.as_bytes()).await {
                    Ok(()) => stdin.shutdown().await,
                    Err(e) => Err(e),
                }
            })
        });

        let output = child.wait_with_output().await?;

        if let Some(writer) = writer {
            let written = writer
                .await
                .map_err(|e| AdapterError::Io(e.to_string()))?;
            // An engine that exits before reading is reported by its exit status below
            match written {
                Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e.into()),
                Err(_) => debug!("backend closed stdin before reading the prompt"),
                Ok(()) => {}
            }
        }

        if !output.status.success() {
            return Err(AdapterError::NonZeroExit {
                program: self.program.clone(),
                code: output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn provider_name(&self) -> &str {
        "claude-cli"
    }
}
