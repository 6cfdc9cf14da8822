//! IMAP access for the ingestor.
//!
//! This module is split into:
//! - `mod.rs` - Server address, the `Mailbox` seam, and the client struct
//! - `client.rs` - Connection, select, search, fetch, and logout

mod client;

use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_util::compat::Compat;

use crate::error::ConnectionError;

pub(crate) type ImapSession = async_imap::Session<Compat<TlsStream<TcpStream>>>;

/// Message store the ingestor reads from. Identifiers are IMAP sequence numbers.
pub(crate) trait Mailbox {
    /// Every message identifier in the selected mailbox, in any order.
    async fn search_all(&mut self) -> Result<Vec<u32>, ConnectionError>;

    /// Full RFC 5322 bytes of one message, `None` if the server sent no body.
    async fn fetch_message(&mut self, seq: u32) -> anyhow::Result<Option<Vec<u8>>>;
}

/// `host` or `host:port` as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

impl ServerAddress {
    pub fn parse(input: &str, default_port: u16) -> Result<Self, ConnectionError> {
        let input = input.trim();
        let invalid = || ConnectionError::InvalidAddress(input.to_string());

        let (host, port) = match input.rsplit_once(':') {
            Some((host, port)) => (host, port.parse::<u16>().map_err(|_| invalid())?),
            None => (input, default_port),
        };

        if host.is_empty() || host.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl std::fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

pub struct ImapClient {
    pub(crate) session: ImapSession,
    pub server: ServerAddress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host_only_uses_default_port() {
        let addr = ServerAddress::parse(" imap.gmail.com ", 993).unwrap();
        assert_eq!(addr.host, "imap.gmail.com");
        assert_eq!(addr.port, 993);
        assert_eq!(addr.to_string(), "imap.gmail.com:993");
    }

    #[test]
    fn test_parse_host_and_port() {
        let addr = ServerAddress::parse("mail.example.com:1993", 993).unwrap();
        assert_eq!(addr.host, "mail.example.com");
        assert_eq!(addr.port, 1993);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(ServerAddress::parse("", 993).is_err());
        assert!(ServerAddress::parse(":993", 993).is_err());
        assert!(ServerAddress::parse("host:notaport", 993).is_err());
        assert!(ServerAddress::parse("my host", 993).is_err());
    }
}
