//! Truncation of resolver payloads before they reach the logs.

/// Maximum number of bytes of a response body kept in a log line.
const LOG_BODY_LIMIT: usize = 256;

/// Shorten a response body for logging.
///
/// Bodies within [`LOG_BODY_LIMIT`] are returned unchanged. Longer bodies are
/// cut at the last character boundary before the limit and suffixed with the
/// original size.
pub fn truncate_for_log(body: &str) -> String {
    if body.len() <= LOG_BODY_LIMIT {
        return body.to_string();
    }
    let cut = body
        .char_indices()
        .map(|(idx, _)| idx)
        .take_while(|idx| *idx <= LOG_BODY_LIMIT)
        .last()
        .unwrap_or(0);
    format!(
        "{}... [truncated, total {} bytes]",
        &body[..cut],
        body.len()
    )
}
