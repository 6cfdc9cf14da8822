//! Handlers for connect, question, and transcript commands

use anyhow::Result;

use super::App;
use super::state::ChatMessage;
use crate::ai::summary_lines;
use crate::mail::{ServerAddress, fetch_recent};
use crate::terminal::{prompt_secret, prompt_with_default};

/// Values typed at the connect prompts
struct ConnectForm {
    server: String,
    username: String,
    password: String,
    api_token: String,
}

impl ConnectForm {
    fn is_complete(&self) -> bool {
        [&self.server, &self.username, &self.password, &self.api_token]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

impl App {
    /// Prompt for credentials, then replace the session's records with a fresh fetch.
    pub(crate) async fn connect(&mut self) -> Result<()> {
        let Some(form) = self.read_connect_form()? else {
            return Ok(());
        };

        if !form.is_complete() {
            println!("Please fill all the fields.");
            return Ok(());
        }

        self.session.set_api_token(form.api_token);

        println!("Connecting and fetching emails...");
        let max_count = self.config.limits.max_emails_to_fetch;
        let result = match ServerAddress::parse(&form.server, self.config.imap.port) {
            Ok(server) => fetch_recent(server, &form.username, &form.password, max_count).await,
            Err(e) => Err(e),
        };

        match self.session.apply_fetch(result) {
            Ok(count) => {
                println!("Fetched {} emails successfully!", count);
                println!("Context includes {} emails", count);
                self.print_message(&self.session.transcript[0]);
            }
            Err(message) => {
                tracing::error!("Fetch failed: {}", message);
                println!("Failed: {}", message);
            }
        }

        Ok(())
    }

    fn read_connect_form(&self) -> Result<Option<ConnectForm>> {
        let imap = &self.config.imap;

        let Some(server) = prompt_with_default("IMAP server", imap.server.as_deref())? else {
            return Ok(None);
        };
        let Some(username) = prompt_with_default("Email address", imap.username.as_deref())?
        else {
            return Ok(None);
        };
        let Some(password) = prompt_secret("Password or app password")? else {
            return Ok(None);
        };

        let api_token = match self.session.api_token.clone() {
            Some(token) => token,
            None => match prompt_secret("API token")? {
                Some(token) => token,
                None => return Ok(None),
            },
        };

        Ok(Some(ConnectForm {
            server,
            username,
            password,
            api_token,
        }))
    }

    /// Send one question with the current records as context.
    pub(crate) async fn ask(&mut self, question: &str) {
        let token = match self.session.ready_token() {
            Ok(token) => token.to_string(),
            Err(not_ready) => {
                println!("{}", not_ready.message());
                return;
            }
        };

        println!("Thinking...");
        let result = self
            .chat
            .answer(question, &self.session.emails, &self.config.limits, &token)
            .await;

        match self.session.apply_answer(question, result).cloned() {
            Ok(reply) => self.print_message(&reply),
            Err(e) => {
                tracing::error!("Chat request failed: {}", e);
                println!("Failed to get response: {}", e);
            }
        }
    }

    pub(crate) fn clear_transcript(&mut self) {
        self.session.reset_transcript();
        println!("Chat cleared.");
        self.print_message(&self.session.transcript[0]);
    }

    pub(crate) fn show_emails(&self) {
        if !self.session.connected {
            println!("{}", super::state::NotReady::NotConnected.message());
            return;
        }

        println!("Context includes {} emails", self.session.emails.len());
        for line in summary_lines(&self.session.emails) {
            println!("{}", line);
        }
    }

    pub(crate) fn enter_token(&mut self) -> Result<()> {
        if let Some(token) = prompt_secret("API token")? {
            self.session.set_api_token(token);
        }
        match self.session.api_token {
            Some(_) => println!("API token set."),
            None => println!("API token cleared."),
        }
        Ok(())
    }

    pub(crate) fn show_status(&self) {
        let session = &self.session;
        println!(
            "Mail: {}",
            if session.connected {
                format!("connected, {} emails", session.emails.len())
            } else {
                "not connected".to_string()
            }
        );
        if let Some(ref error) = session.last_error {
            println!("Last connection error: {}", error);
        }
        println!(
            "API token: {}",
            if session.api_token.is_some() { "set" } else { "not set" }
        );
        println!("Transcript: {} messages", session.transcript.len());
    }

    fn print_message(&self, message: &ChatMessage) {
        println!("{}> {}\n", message.role.label(), message.content);
    }
}
