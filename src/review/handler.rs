use anyhow::{anyhow, Result};
use async_trait::async_trait;
use colored::Colorize;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use std::io::{self, Write};
use std::sync::Arc;

use super::types::{parse_verdict, ReviewHandler, ReviewOutcome, ReviewRequest};
use crate::generator::MAX_POST_CHARS;

/// Shows posts on the terminal and reads the verdict from stdin
#[derive(Debug, Clone)]
pub struct ConsoleReviewHandler {
    colored_output: bool,

    /// Only one prompt may own the terminal at a time
    access_mutex: Arc<Mutex<()>>,
}

impl Default for ConsoleReviewHandler {
    fn default() -> Self {
        Self {
            colored_output: true,
            access_mutex: Arc::new(Mutex::new(())),
        }
    }
}

impl ConsoleReviewHandler {
    /// Create a new console review handler
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a console review handler with colored output disabled
    pub fn without_color() -> Self {
        Self {
            colored_output: false,
            ..Self::default()
        }
    }

    fn format_prompt(&self, request: &ReviewRequest) -> String {
        let mut text = String::new();

        if self.colored_output {
            text.push_str(&format!("{}\n", "REVIEW NEEDED".bold().blue()));
        } else {
            text.push_str("REVIEW NEEDED\n");
        }
        text.push_str(&format!("{}\n", "─".repeat(50)));

        let chars = request.content.chars().count();
        if self.colored_output {
            text.push_str(&format!(
                "{} {}\n{} {}\n\n",
                "Workflow:".bold(),
                request.workflow_id,
                "Topic:".bold(),
                request.topic
            ));
        } else {
            text.push_str(&format!(
                "Workflow: {}\nTopic: {}\n\n",
                request.workflow_id, request.topic
            ));
        }

        text.push_str(&request.content);
        text.push_str(&format!("\n\n({}/{} characters)", chars, MAX_POST_CHARS));

        if let Some(seconds) = request.timeout_seconds {
            let note = format!("Timeout: {} seconds", seconds);
            if self.colored_output {
                text.push_str(&format!("\n{}", note.yellow()));
            } else {
                text.push_str(&format!("\n{}", note));
            }
        }

        text.push_str("\n\nPublish this post? [y]es / [n]o / [s]kip");
        text
    }

    async fn collect_verdict(&self, request: &ReviewRequest) -> Result<ReviewOutcome> {
        let _lock = self.access_mutex.lock().await;

        println!("\n{}\n", self.format_prompt(request));

        loop {
            if self.colored_output {
                print!("{} ", ">".green().bold());
            } else {
                print!("> ");
            }
            io::stdout().flush()?;

            let line = match request.timeout() {
                Some(limit) => {
                    debug!("Review request with timeout of {:?}", limit);
                    match timeout(limit, read_line()).await {
                        Ok(line) => line?,
                        Err(_) => {
                            if self.colored_output {
                                println!("\n{}", "Timeout waiting for a verdict".red().bold());
                            } else {
                                println!("\nTimeout waiting for a verdict");
                            }
                            return Ok(ReviewOutcome::Skip);
                        }
                    }
                }
                None => read_line().await?,
            };

            match line {
                None => return Err(anyhow!("Input closed before a verdict was given")),
                Some(answer) => match parse_verdict(&answer) {
                    Some(outcome) => return Ok(outcome),
                    None => println!("Please answer y, n or s"),
                },
            }
        }
    }
}

/// Read one line from stdin without blocking the runtime; `None` on end of input
async fn read_line() -> Result<Option<String>> {
    tokio::task::spawn_blocking(|| {
        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(input.trim().to_string())),
            Err(e) => Err(anyhow!("Failed to read input: {}", e)),
        }
    })
    .await?
}

#[async_trait]
impl ReviewHandler for ConsoleReviewHandler {
    async fn review(&self, request: ReviewRequest) -> Result<ReviewOutcome> {
        info!(workflow_id = %request.workflow_id, "Requesting review");

        match self.collect_verdict(&request).await {
            Ok(outcome) => {
                debug!(?outcome, "Received verdict");
                Ok(outcome)
            }
            Err(e) => {
                warn!("Error collecting verdict: {}", e);
                Err(e)
            }
        }
    }
}
