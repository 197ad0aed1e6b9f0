use colored::Colorize;
use content_approval::config::get_settings;
use content_approval::coordinator::{ApproveRequest, GenerateRequest, RequestCoordinator};
use content_approval::review::{review_pending, ConsoleReviewHandler};
use content_approval::telemetry::{init_telemetry, TelemetryConfig};
use rustyline::error::ReadlineError;
use rustyline::Editor;
use tokio::runtime::Runtime;

const HISTORY_FILE: &str = ".review_history";

/// Interactive console running the whole pipeline in-process
fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1);
    let mut settings = get_settings(config_path.as_deref())?;
    settings.apply_env_overrides()?;

    // keep the prompt readable unless the config or RUST_LOG asks for more
    let telemetry = TelemetryConfig::from(&settings.logger).with_default_level("warn");
    if let Err(err) = init_telemetry(telemetry) {
        eprintln!("Failed to initialize telemetry: {}", err);
    }

    let rt = Runtime::new()?;
    let console = Console {
        coordinator: RequestCoordinator::from_settings(&settings)?,
        handler: ConsoleReviewHandler::new(),
    };

    println!("{}", "Content Approval Console".bold());
    println!("Type 'help' for available commands");

    let mut rl = Editor::<()>::new();
    if rl.load_history(HISTORY_FILE).is_err() {
        println!("No previous history");
    }

    loop {
        match rl.readline("approval> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line);

                match rt.block_on(console.execute(line)) {
                    CommandResult::Success(message) => println!("{}", message),
                    CommandResult::Error(message) => println!("{} {}", "Error:".red(), message),
                    CommandResult::Exit => break,
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C received, press CTRL-D to exit");
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D received, exiting");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    if let Err(err) = rl.save_history(HISTORY_FILE) {
        println!("Error saving history: {}", err);
    }

    Ok(())
}

/// Result of a command execution
#[derive(Debug)]
enum CommandResult {
    Success(String),
    Error(String),
    Exit,
}

struct Console {
    coordinator: RequestCoordinator,
    handler: ConsoleReviewHandler,
}

impl Console {
    async fn execute(&self, command_line: &str) -> CommandResult {
        let (command, rest) = command_line
            .split_once(char::is_whitespace)
            .map(|(c, r)| (c, r.trim()))
            .unwrap_or((command_line, ""));

        match command {
            "help" => CommandResult::Success(HELP.to_string()),
            "generate" => self.generate(rest).await,
            "approve" => self.decide(rest, true).await,
            "reject" => self.decide(rest, false).await,
            "status" => self.status(rest).await,
            "pending" => self.pending().await,
            "review" => self.review().await,
            "exit" | "quit" => CommandResult::Exit,
            other => CommandResult::Error(format!(
                "Unknown command: {}. Type 'help' for available commands",
                other
            )),
        }
    }

    async fn generate(&self, topic: &str) -> CommandResult {
        if topic.is_empty() {
            return CommandResult::Error("Usage: generate <topic>".to_string());
        }
        match self.coordinator.generate(GenerateRequest::new(topic)).await {
            Ok(response) => CommandResult::Success(format!(
                "{}\n{}\n\n{} ({} characters)\n{}",
                "Workflow:".bold(),
                response.workflow_id,
                response.content,
                response.chars,
                response.message
            )),
            Err(err) => CommandResult::Error(err.to_string()),
        }
    }

    async fn decide(&self, workflow_id: &str, approved: bool) -> CommandResult {
        if workflow_id.is_empty() {
            let verb = if approved { "approve" } else { "reject" };
            return CommandResult::Error(format!("Usage: {} <workflow_id>", verb));
        }
        match self
            .coordinator
            .approve(ApproveRequest::new(workflow_id, approved))
            .await
        {
            Ok(response) => {
                let mut text = format!("{} [{}]", response.message, response.status);
                if let Some(result) = &response.publish_result {
                    text.push_str(&format!("\n{}", result.summary()));
                }
                CommandResult::Success(text)
            }
            Err(err) => CommandResult::Error(err.to_string()),
        }
    }

    async fn status(&self, workflow_id: &str) -> CommandResult {
        if workflow_id.is_empty() {
            return CommandResult::Error("Usage: status <workflow_id>".to_string());
        }
        match self.coordinator.status(workflow_id).await {
            Ok(view) => match serde_json::to_string_pretty(&view) {
                Ok(json) => CommandResult::Success(json),
                Err(err) => CommandResult::Error(err.to_string()),
            },
            Err(err) => CommandResult::Error(err.to_string()),
        }
    }

    async fn pending(&self) -> CommandResult {
        match self.coordinator.pending().await {
            Ok(pending) if pending.count == 0 => {
                CommandResult::Success("No posts waiting for approval".to_string())
            }
            Ok(pending) => {
                let mut text = format!("{} pending:", pending.count);
                for view in pending.posts.values() {
                    text.push_str(&format!("\n  {}  {}", view.workflow_id.cyan(), view.topic));
                }
                CommandResult::Success(text)
            }
            Err(err) => CommandResult::Error(err.to_string()),
        }
    }

    async fn review(&self) -> CommandResult {
        match review_pending(&self.coordinator, &self.handler).await {
            Ok(summary) => CommandResult::Success(format!(
                "Reviewed {}: {} published, {} failed, {} rejected, {} skipped, {} decided elsewhere",
                summary.total(),
                summary.published,
                summary.failed,
                summary.rejected,
                summary.skipped,
                summary.already_decided
            )),
            Err(err) => CommandResult::Error(err.to_string()),
        }
    }
}

const HELP: &str = r#"
Available commands:
  generate <topic>        - Generate a post and park it for approval
  approve <workflow_id>   - Approve and publish a pending post
  reject <workflow_id>    - Reject a pending post
  status <workflow_id>    - Show a workflow
  pending                 - List posts waiting for approval
  review                  - Review every pending post interactively
  help                    - Show this help message
  exit, quit              - Exit the console
"#;
