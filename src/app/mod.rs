//! Application core - owns the session and dispatches user input

mod actions;
pub mod state;

use anyhow::Result;

use crate::ai::ChatClient;
use crate::command::{Input, ParsedCommand, available_commands, parse_input};
use crate::config::Config;
use crate::terminal::prompt_line;
use state::Session;

pub struct App {
    pub(crate) config: Config,
    pub(crate) session: Session,
    pub(crate) chat: ChatClient,
}

/// Whether the loop keeps reading input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Quit,
}

impl App {
    pub fn new(config: Config) -> Self {
        let session = Session::new(config.default_api_token());
        let chat = ChatClient::new(&config.ai);

        Self {
            config,
            session,
            chat,
        }
    }

    /// Read and handle lines until `/quit` or end of input.
    pub async fn run(&mut self) -> Result<()> {
        println!("Chat with your recent emails. Type /help for commands.\n");
        self.print_readiness();

        while let Some(line) = prompt_line("> ")? {
            if self.handle_line(&line).await? == Flow::Quit {
                break;
            }
        }

        tracing::info!("Session ended");
        Ok(())
    }

    async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        match parse_input(line) {
            Input::Empty => {}
            Input::Question(question) => self.ask(&question).await,
            Input::Unknown(input) => {
                println!("Unknown command: {} (try /help)", input);
            }
            Input::Command(cmd) => match cmd {
                ParsedCommand::Connect => self.connect().await?,
                ParsedCommand::Emails => self.show_emails(),
                ParsedCommand::Clear => self.clear_transcript(),
                ParsedCommand::Token => self.enter_token()?,
                ParsedCommand::Status => self.show_status(),
                ParsedCommand::Help => print_help(),
                ParsedCommand::Quit => return Ok(Flow::Quit),
            },
        }
        Ok(Flow::Continue)
    }

    fn print_readiness(&self) {
        if let Err(not_ready) = self.session.ready_token() {
            println!("{}", not_ready.message());
        }
    }
}

fn print_help() {
    println!("Commands:");
    for help in available_commands() {
        println!("  /{:<10} {}", help.name, help.description);
    }
    println!("Anything else is sent as a question about your emails.");
}
