//! IMAP client operations: connection, search, fetch, and logout.

use std::sync::Arc;

use anyhow::Context;
use futures::StreamExt;
use rustls::pki_types::ServerName;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_util::compat::TokioAsyncReadCompatExt;

use super::{ImapClient, Mailbox, ServerAddress};
use crate::constants::INBOX;
use crate::error::ConnectionError;

impl ImapClient {
    //
    // Connection Management
    //

    pub async fn connect(
        server: ServerAddress,
        username: &str,
        password: &str,
    ) -> Result<Self, ConnectionError> {
        let addr = server.to_string();

        let tcp = TcpStream::connect((server.host.as_str(), server.port))
            .await
            .map_err(|source| ConnectionError::Network {
                addr: addr.clone(),
                source,
            })?;

        let tls_error = |source: std::io::Error| ConnectionError::Tls {
            server: server.host.clone(),
            source,
        };

        let connector = tls_connector().map_err(tls_error)?;
        let server_name = ServerName::try_from(server.host.clone())
            .map_err(|_| ConnectionError::InvalidAddress(server.host.clone()))?;

        let tls_stream = connector
            .connect(server_name, tcp)
            .await
            .map_err(tls_error)?;

        // Wrap tokio stream with compat layer for futures-io compatibility
        let client = async_imap::Client::new(tls_stream.compat());

        let session = client
            .login(username, password)
            .await
            .map_err(|(e, _client)| ConnectionError::Login(e.to_string()))?;

        tracing::info!("Connected to IMAP server {}", addr);

        Ok(Self { session, server })
    }

    /// Log out, ignoring a server that has already gone away.
    pub async fn logout(mut self) {
        if let Err(e) = self.session.logout().await {
            tracing::debug!("IMAP logout from {} failed: {}", self.server, e);
        }
    }

    //
    // Folder Operations
    //

    pub async fn select_inbox(&mut self) -> Result<(), ConnectionError> {
        let mailbox = self
            .session
            .select(INBOX)
            .await
            .map_err(|e| ConnectionError::Select {
                mailbox: INBOX.to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!("Selected {} ({} messages)", INBOX, mailbox.exists);
        Ok(())
    }
}

impl Mailbox for ImapClient {
    async fn search_all(&mut self) -> Result<Vec<u32>, ConnectionError> {
        let ids = self
            .session
            .search("ALL")
            .await
            .map_err(|e| ConnectionError::Search(e.to_string()))?;

        Ok(ids.into_iter().collect())
    }

    async fn fetch_message(&mut self, seq: u32) -> anyhow::Result<Option<Vec<u8>>> {
        let mut messages = self
            .session
            .fetch(seq.to_string(), "RFC822")
            .await
            .with_context(|| format!("Failed to fetch message {}", seq))?;

        let mut raw = None;
        while let Some(result) = messages.next().await {
            let fetch = result.with_context(|| format!("Failed to read message {}", seq))?;
            if raw.is_none()
                && let Some(body) = fetch.body()
            {
                raw = Some(body.to_vec());
            }
        }

        Ok(raw)
    }
}

fn tls_connector() -> std::io::Result<TlsConnector> {
    let mut root_store = rustls::RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = rustls::ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(std::io::Error::other)?
    .with_root_certificates(root_store)
    .with_no_client_auth();

    Ok(TlsConnector::from(Arc::new(config)))
}
