/// One fetched message, normalized for display and prompting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailRecord {
    /// IMAP sequence number the message was fetched under
    pub id: String,
    pub subject: String,
    pub from: String,
    /// Date header as sent, not parsed
    pub date: String,
    /// Plain text with whitespace runs collapsed
    pub body: String,
}

impl EmailRecord {
    /// One-line overview, `position` is 1-based.
    pub fn summary_line(&self, position: usize) -> String {
        format!(
            "{}. Subject: {} | From: {} | Date: {}",
            position, self.subject, self.from, self.date
        )
    }
}
