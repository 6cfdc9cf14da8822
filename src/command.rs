//! Slash commands and free-text questions typed at the chat prompt

/// Help information for a command
#[derive(Debug, Clone)]
pub struct CommandHelp {
    pub name: &'static str,
    pub description: &'static str,
}

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(ParsedCommand),
    Question(String),
    Unknown(String),
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedCommand {
    Connect,
    Emails,
    Clear,
    Token,
    Status,
    Help,
    Quit,
}

/// Classify a line: `/name` is a command, anything else non-blank a question.
pub fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Empty;
    }

    let Some(name) = trimmed.strip_prefix('/') else {
        return Input::Question(trimmed.to_string());
    };

    match parse_command(name) {
        Some(cmd) => Input::Command(cmd),
        None => Input::Unknown(trimmed.to_string()),
    }
}

/// Parse a command name (without the leading slash)
pub fn parse_command(input: &str) -> Option<ParsedCommand> {
    match input.trim().to_ascii_lowercase().as_str() {
        "connect" | "c" => Some(ParsedCommand::Connect),
        "emails" | "list" | "e" => Some(ParsedCommand::Emails),
        "clear" => Some(ParsedCommand::Clear),
        "token" => Some(ParsedCommand::Token),
        "status" => Some(ParsedCommand::Status),
        "help" | "h" | "?" => Some(ParsedCommand::Help),
        "q" | "quit" | "exit" => Some(ParsedCommand::Quit),
        _ => None,
    }
}

/// Get all available commands for help display
pub fn available_commands() -> Vec<CommandHelp> {
    vec![
        CommandHelp {
            name: "connect",
            description: "Connect to your inbox and fetch recent emails",
        },
        CommandHelp {
            name: "emails",
            description: "List the fetched emails",
        },
        CommandHelp {
            name: "clear",
            description: "Clear the chat transcript",
        },
        CommandHelp {
            name: "token",
            description: "Enter or replace the API token",
        },
        CommandHelp {
            name: "status",
            description: "Show connection and token status",
        },
        CommandHelp {
            name: "help",
            description: "Show this help message",
        },
        CommandHelp {
            name: "quit",
            description: "Exit",
        },
    ]
}
