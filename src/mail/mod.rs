pub mod imap;
pub mod ingest;
pub mod parser;
pub mod types;

pub use imap::ServerAddress;
pub use ingest::fetch_recent;
pub use types::EmailRecord;
