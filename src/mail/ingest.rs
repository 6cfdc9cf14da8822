use super::imap::{ImapClient, Mailbox, ServerAddress};
use super::parser::parse_record;
use super::types::EmailRecord;
use crate::error::ConnectionError;

/// Connect, read the newest `max_count` inbox messages, log out.
///
/// Records come back newest-first. Messages that fail to fetch or parse are
/// skipped; only connection, login, select, and search failures abort.
pub async fn fetch_recent(
    server: ServerAddress,
    username: &str,
    password: &str,
    max_count: usize,
) -> Result<Vec<EmailRecord>, ConnectionError> {
    let mut client = ImapClient::connect(server, username, password).await?;
    client.select_inbox().await?;

    let records = collect_recent(&mut client, max_count).await?;

    client.logout().await;
    tracing::info!("Fetched {} emails", records.len());
    Ok(records)
}

/// Newest-first records for the highest `max_count` identifiers in `mailbox`.
pub(crate) async fn collect_recent<M: Mailbox>(
    mailbox: &mut M,
    max_count: usize,
) -> Result<Vec<EmailRecord>, ConnectionError> {
    let mut ids = mailbox.search_all().await?;
    ids.sort_unstable();
    ids.dedup();

    let latest = &ids[ids.len().saturating_sub(max_count)..];
    tracing::debug!(
        "Inbox holds {} messages, fetching {}",
        ids.len(),
        latest.len()
    );

    let mut records = Vec::with_capacity(latest.len());

    for &seq in latest.iter().rev() {
        match mailbox.fetch_message(seq).await {
            Ok(Some(raw)) => match parse_record(&seq.to_string(), &raw) {
                Some(record) => records.push(record),
                None => tracing::warn!("Skipping message {}: not a parseable message", seq),
            },
            Ok(None) => tracing::warn!("Skipping message {}: server returned no body", seq),
            Err(e) => tracing::warn!("Skipping message {}: {:#}", seq, e),
        }
    }

    Ok(records)
}
