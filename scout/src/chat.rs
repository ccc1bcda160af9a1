//! Interactive chat session

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::agent::run_workflow;
use crate::config::Config;

/// Interactive planning session
///
/// Each line of input runs a full planning workflow for the session
/// user. Workflow failures come back as "Error: " strings, so the loop
/// itself only exits on EOF, interrupt, or a quit command.
pub struct ChatSession {
    config: Config,
    user_id: String,
}

impl ChatSession {
    pub fn new(config: Config, user_id: impl Into<String>) -> Self {
        Self {
            config,
            user_id: user_id.into(),
        }
    }

    /// Run the chat main loop
    pub async fn run(&self) -> Result<()> {
        self.print_welcome();

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));
            let line = match readline {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    println!("{}", "Safe travels!".bright_blue());
                    break;
                }
                Err(e) => return Err(eyre::eyre!("Readline error: {}", e)),
            };

            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            if matches!(input, "quit" | "exit" | "q") {
                println!("{}", "Safe travels!".bright_blue());
                break;
            }

            let _ = rl.add_history_entry(input);

            println!("{}", "Planning...".bright_black());
            let response = run_workflow(input, &self.user_id, &self.config).await;
            if response.starts_with("Error:") {
                println!("{}", response.bright_red());
            } else {
                println!("{}", response);
            }
            println!();
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!("{}", "Scout travel planner".bright_blue().bold());
        println!(
            "{}",
            "Describe a trip (destination, dates, budget) and I'll plan it.".bright_black()
        );
        println!("{}", "Type 'quit', 'exit', or 'q' to leave.".bright_black());
        println!();
    }
}
