//! Application-wide constants and configuration defaults
//!
//! Centralizes magic numbers so the limits that bound memory and request size
//! are discoverable in one place.

/// Default number of most recent messages fetched from the inbox.
pub const MAX_EMAILS_TO_FETCH: usize = 50;

/// Default number of fetched messages whose bodies go into the prompt.
pub const MAX_EMAIL_BODIES_IN_PROMPT: usize = 10;

/// Default per-message body cap (in characters) inside the prompt.
pub const MAX_BODY_CHARS_PER_EMAIL: usize = 2000;

/// Suffix appended to a body that was cut at the character cap.
pub const TRUNCATION_MARKER: &str = "...";

/// Implicit-TLS IMAP port.
pub const DEFAULT_IMAP_PORT: u16 = 993;

/// Mailbox searched for recent messages.
pub const INBOX: &str = "INBOX";

/// Chat-completion endpoint used when the config does not name one.
pub const DEFAULT_CHAT_ENDPOINT: &str = "https://api.friendli.ai/dedicated/v1/chat/completions";

/// Model (deployment) id used when the config does not name one.
pub const DEFAULT_CHAT_MODEL: &str = "c6xp7t1pxbvl";

/// Sampling temperature for answers. Kept low so replies stick to the context.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Environment variables consulted, in order, for the API token.
pub const TOKEN_ENV_VARS: &[&str] = &["MAILCHAT_API_TOKEN", "FRIENDLI_TOKEN"];

/// Line width handed to the HTML renderer. Wide enough that wrapping never
/// splits a sentence; whitespace is collapsed afterwards anyway.
pub const HTML_RENDER_WIDTH: usize = 1000;
