//! Per-session state owned by the interaction loop

use crate::error::{ConnectionError, RequestError};
use crate::mail::EmailRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "you",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Why a question cannot be sent yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotReady {
    MissingToken,
    NotConnected,
}

impl NotReady {
    pub fn message(self) -> &'static str {
        match self {
            NotReady::MissingToken => "Please enter your API token (/token).",
            NotReady::NotConnected => "Please connect to your email account (/connect).",
        }
    }
}

#[derive(Debug, Default)]
pub struct Session {
    pub connected: bool,
    pub last_error: Option<String>,
    pub emails: Vec<EmailRecord>,
    pub api_token: Option<String>,
    /// Visible conversation, oldest first
    pub transcript: Vec<ChatMessage>,
}

impl Session {
    pub fn new(api_token: Option<String>) -> Self {
        Self {
            api_token,
            ..Self::default()
        }
    }

    pub fn set_api_token(&mut self, token: String) {
        let token = token.trim().to_string();
        self.api_token = (!token.is_empty()).then_some(token);
    }

    /// Store a fetch outcome. Success replaces the records and restarts the
    /// transcript; failure only records the error.
    pub fn apply_fetch(
        &mut self,
        result: Result<Vec<EmailRecord>, ConnectionError>,
    ) -> Result<usize, String> {
        match result {
            Ok(emails) => {
                let count = emails.len();
                self.emails = emails;
                self.connected = true;
                self.last_error = None;
                self.reset_transcript();
                Ok(count)
            }
            Err(e) => {
                let message = e.to_string();
                self.last_error = Some(message.clone());
                Err(message)
            }
        }
    }

    pub fn greeting(&self) -> String {
        format!("Ask me anything about the {} emails.", self.emails.len())
    }

    /// Replace the transcript with the greeting alone.
    pub fn reset_transcript(&mut self) {
        self.transcript = vec![ChatMessage::assistant(self.greeting())];
    }

    /// Token to send with a question, once both token and mail are present.
    pub fn ready_token(&self) -> Result<&str, NotReady> {
        let token = self.api_token.as_deref().ok_or(NotReady::MissingToken)?;
        if !self.connected {
            return Err(NotReady::NotConnected);
        }
        Ok(token)
    }

    /// Append the exchange on success. A failed answer leaves the transcript as it was.
    pub fn apply_answer(
        &mut self,
        question: &str,
        result: Result<String, RequestError>,
    ) -> Result<&ChatMessage, RequestError> {
        let reply = result?;
        self.transcript.push(ChatMessage::user(question));
        self.transcript.push(ChatMessage::assistant(reply));
        Ok(&self.transcript[self.transcript.len() - 1])
    }
}
