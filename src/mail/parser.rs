use html2text::render::TrivialDecorator;
use mail_parser::{Address, HeaderName, Message, MessageParser, MessagePart, MimeHeaders, PartType};

use super::types::EmailRecord;
use crate::constants::HTML_RENDER_WIDTH;

/// Outcome of decoding a single candidate body part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PartText {
    Decoded(String),
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Plain,
    Html,
}

impl BodyKind {
    fn subtype(self) -> &'static str {
        match self {
            BodyKind::Plain => "plain",
            BodyKind::Html => "html",
        }
    }
}

/// Parse a raw RFC 5322 message into a record. Returns `None` when the bytes
/// are not a message at all.
pub fn parse_record(id: &str, raw: &[u8]) -> Option<EmailRecord> {
    let message = MessageParser::default().parse(raw)?;

    // Encoded words are decoded per word by the parser, each with its own charset
    let subject = message.subject().unwrap_or_default().to_string();
    let from = message.from().map(format_address).unwrap_or_default();

    let date = message
        .header_raw(HeaderName::Date)
        .map(normalize_whitespace)
        .unwrap_or_default();

    let body = extract_body(&message);

    Some(EmailRecord {
        id: id.to_string(),
        subject,
        from,
        date,
        body,
    })
}

fn format_address(address: &Address) -> String {
    address
        .iter()
        .filter_map(|addr| match (addr.name(), addr.address()) {
            (Some(name), Some(email)) => Some(format!("{} <{}>", name, email)),
            (Some(name), None) => Some(name.to_string()),
            (None, Some(email)) => Some(email.to_string()),
            (None, None) => None,
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Plain text if any non-attachment text/plain part decodes, otherwise the
/// first decodable text/html part with markup stripped.
pub(crate) fn extract_body(message: &Message) -> String {
    let is_multipart = matches!(
        message.parts.first().map(|part| &part.body),
        Some(PartType::Multipart(_))
    );

    let candidates: Vec<&MessagePart> = if is_multipart {
        message
            .parts
            .iter()
            .filter(|part| !is_attachment(part))
            .collect()
    } else {
        message.parts.first().into_iter().collect()
    };

    let plain = decoded_candidates(&candidates, BodyKind::Plain);
    let html = decoded_candidates(&candidates, BodyKind::Html);

    normalize_whitespace(&choose_body(plain, html))
}

fn decoded_candidates<'a>(
    candidates: &'a [&'a MessagePart<'a>],
    kind: BodyKind,
) -> impl Iterator<Item = PartText> + 'a {
    candidates
        .iter()
        .filter(move |part| is_text_of(part, kind))
        .map(move |part| decode_part(part, kind))
}

/// Plain outcomes win; HTML outcomes are only consumed when no plain text decoded.
fn choose_body(
    plain: impl IntoIterator<Item = PartText>,
    html: impl IntoIterator<Item = PartText>,
) -> String {
    let body = first_text(plain);
    if body.is_empty() {
        first_text(html)
    } else {
        body
    }
}

/// Text of the first `Decoded` outcome, skipping `Skipped` ones.
fn first_text(outcomes: impl IntoIterator<Item = PartText>) -> String {
    outcomes
        .into_iter()
        .find_map(|outcome| match outcome {
            PartText::Decoded(text) => Some(text),
            PartText::Skipped => None,
        })
        .unwrap_or_default()
}

fn is_attachment(part: &MessagePart) -> bool {
    part.content_disposition()
        .is_some_and(|cd| cd.ctype().eq_ignore_ascii_case("attachment"))
}

fn is_text_of(part: &MessagePart, kind: BodyKind) -> bool {
    match part.content_type() {
        Some(ct) => {
            ct.ctype().eq_ignore_ascii_case("text")
                && ct
                    .subtype()
                    .is_some_and(|sub| sub.eq_ignore_ascii_case(kind.subtype()))
        }
        // No Content-Type means text/plain
        None => kind == BodyKind::Plain && !matches!(part.body, PartType::Multipart(_)),
    }
}

fn decode_part(part: &MessagePart, kind: BodyKind) -> PartText {
    let source = match &part.body {
        PartType::Text(text) | PartType::Html(text) => text,
        _ => {
            tracing::warn!("Could not decode {} part: body is not text", kind.subtype());
            return PartText::Skipped;
        }
    };

    match kind {
        BodyKind::Plain => PartText::Decoded(source.to_string()),
        BodyKind::Html => match html_to_text(source) {
            Ok(text) => PartText::Decoded(text),
            Err(e) => {
                tracing::warn!("Could not decode HTML part: {}", e);
                PartText::Skipped
            }
        },
    }
}

/// Text content only: no link footnotes, list bullets, emphasis marks or table borders.
fn html_to_text(html: &str) -> Result<String, html2text::Error> {
    html2text::config::with_decorator(TrivialDecorator::new())
        .raw_mode(true)
        .string_from_read(html.as_bytes(), HTML_RENDER_WIDTH)
}

/// Collapse every whitespace run (newlines included) to one space and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_email() {
        let raw = b"From: sender@example.com\r\n\
                    To: recipient@example.com\r\n\
                    Subject: Test Email\r\n\
                    Date: Mon, 1 Jan 2024 12:00:00 +0000\r\n\
                    Message-ID: <test@example.com>\r\n\
                    \r\n\
                    Hello,\r\n\r\n   this is\ta test email.\r\n";

        let record = parse_record("1", raw).unwrap();
        assert_eq!(record.id, "1");
        assert_eq!(record.subject, "Test Email");
        assert_eq!(record.from, "sender@example.com");
        assert_eq!(record.date, "Mon, 1 Jan 2024 12:00:00 +0000");
        assert_eq!(record.body, "Hello, this is a test email.");
    }

    #[test]
    fn test_mixed_charset_headers() {
        let raw = b"From: =?UTF-8?Q?J=C3=B6rg?= <jorg@example.com>\r\n\
                    Subject: =?ISO-8859-1?Q?Caf=E9?= and =?UTF-8?B?5pel5pys?=\r\n\
                    Date: Tue, 2 Jan 2024 08:30:00 +0100\r\n\
                    \r\n\
                    body\r\n";

        let record = parse_record("2", raw).unwrap();
        assert_eq!(record.subject, "Caf\u{e9} and \u{65e5}\u{672c}");
        assert_eq!(record.from, "J\u{f6}rg <jorg@example.com>");
    }

    #[test]
    fn test_multipart_prefers_plain_text() {
        let raw = b"From: a@example.com\r\n\
                    Subject: Both\r\n\
                    MIME-Version: 1.0\r\n\
                    Content-Type: multipart/alternative; boundary=\"XYZ\"\r\n\
                    \r\n\
                    --XYZ\r\n\
                    Content-Type: text/html; charset=utf-8\r\n\
                    \r\n\
                    <html><body><p>From the <b>HTML</b> part</p></body></html>\r\n\
                    --XYZ\r\n\
                    Content-Type: text/plain; charset=utf-8\r\n\
                    \r\n\
                    From the\r\n  plain part\r\n\
                    --XYZ--\r\n";

        let record = parse_record("3", raw).unwrap();
        assert_eq!(record.body, "From the plain part");
    }

    #[test]
    fn test_html_only_has_no_markup() {
        let raw = b"From: a@example.com\r\n\
                    Subject: Newsletter\r\n\
                    MIME-Version: 1.0\r\n\
                    Content-Type: text/html; charset=utf-8\r\n\
                    \r\n\
                    <h1>Title</h1>\
                    <p>Read <a href=\"https://example.com/very/long/tracking?id=123\">our post</a> now</p>\
                    <ul><li>one</li><li>two</li></ul>\
                    <table><tr><td>A</td><td>B</td></tr></table>\
                    <p><em>emph</em> <strong>bold</strong></p>\r\n";

        let record = parse_record("4", raw).unwrap();
        assert_eq!(record.body, "Title Read our post now one two A B emph bold");
    }

    #[test]
    fn test_plain_attachment_falls_back_to_html() {
        let raw = b"From: a@example.com\r\n\
                    Subject: Report\r\n\
                    MIME-Version: 1.0\r\n\
                    Content-Type: multipart/mixed; boundary=\"B1\"\r\n\
                    \r\n\
                    --B1\r\n\
                    Content-Type: text/plain\r\n\
                    Content-Disposition: attachment; filename=\"notes.txt\"\r\n\
                    \r\n\
                    attached notes\r\n\
                    --B1\r\n\
                    Content-Type: text/html\r\n\
                    \r\n\
                    <p>See the attached notes</p>\r\n\
                    --B1--\r\n";

        let record = parse_record("5", raw).unwrap();
        assert!(record.body.contains("See the attached notes"));
        assert_ne!(record.body, "attached notes");
    }

    #[test]
    fn test_no_text_parts_yields_empty_body() {
        let raw = b"From: a@example.com\r\n\
                    Subject: Picture\r\n\
                    MIME-Version: 1.0\r\n\
                    Content-Type: multipart/mixed; boundary=\"B2\"\r\n\
                    \r\n\
                    --B2\r\n\
                    Content-Type: image/png\r\n\
                    Content-Transfer-Encoding: base64\r\n\
                    Content-Disposition: attachment; filename=\"a.png\"\r\n\
                    \r\n\
                    iVBORw0KGgo=\r\n\
                    --B2--\r\n";

        let record = parse_record("6", raw).unwrap();
        assert_eq!(record.subject, "Picture");
        assert_eq!(record.body, "");
    }

    #[test]
    fn test_missing_headers_are_empty() {
        let raw = b"X-Custom: 1\r\n\r\nJust a body\r\n";

        let record = parse_record("9", raw).unwrap();
        assert_eq!(record.subject, "");
        assert_eq!(record.from, "");
        assert_eq!(record.date, "");
        assert_eq!(record.body, "Just a body");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a\r\n\r\nb \t c  "), "a b c");
        assert_eq!(normalize_whitespace("\n\t "), "");
        assert_eq!(normalize_whitespace("a\u{a0}b"), "a b");
    }

    #[test]
    fn test_folded_date_is_unfolded() {
        let raw = b"From: a@example.com\r\n\
                    Subject: Folded\r\n\
                    Date: Mon, 1 Jan 2024\r\n 12:00:00 +0000\r\n\
                    \r\n\
                    body\r\n";

        let record = parse_record("10", raw).unwrap();
        assert_eq!(record.date, "Mon, 1 Jan 2024 12:00:00 +0000");
        assert!(!record.summary_line(1).contains('\n'));
    }

    #[test]
    fn test_skipped_part_moves_on_to_next_candidate() {
        let outcomes = vec![PartText::Skipped, PartText::Decoded("a".to_string())];
        assert_eq!(first_text(outcomes), "a");
    }

    #[test]
    fn test_all_plain_skipped_falls_back_to_html() {
        let plain = vec![PartText::Skipped, PartText::Skipped];
        let html = vec![PartText::Skipped, PartText::Decoded("from html".to_string())];
        assert_eq!(choose_body(plain, html), "from html");
    }

    #[test]
    fn test_decoded_plain_wins_over_html() {
        let plain = vec![PartText::Skipped, PartText::Decoded("plain".to_string())];
        let html = vec![PartText::Decoded("html".to_string())];
        assert_eq!(choose_body(plain, html), "plain");
    }

    #[test]
    fn test_everything_skipped_is_empty_body() {
        let plain = vec![PartText::Skipped];
        let html = vec![PartText::Skipped, PartText::Skipped];
        assert_eq!(choose_body(plain, html), "");
        assert_eq!(first_text(Vec::new()), "");
    }
}
