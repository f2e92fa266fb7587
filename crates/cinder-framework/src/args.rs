//! Argument tokenization for command messages.
//!
//! Message text is split on whitespace upstream (no shell semantics), which
//! destroys arguments that contain spaces. The tokenizer repairs them using
//! a small quoting convention: a span opened with `!"` and closed with a
//! trailing `"` is merged back into a single token, and the marker may also
//! appear embedded after a `key=` prefix:
//!
//! ```text
//! editrole !"my role" name=!"new name heck" color=FFFFFF
//!   → ["editrole", "my role", "name=new name heck", "color=FFFFFF"]
//! ```
//!
//! The `!` in the opening marker exists so that a quoted span cannot be
//! confused with ordinary quoted prose in chat; plain `"…"` text passes
//! through untouched unless it terminates a span.
//!
//! Tokenization is a pure function of its input — it consults no registry or
//! plugin state.

use crate::error::TokenizeError;

/// Merges `!"`-quoted spans in a whitespace-split token sequence.
///
/// The scan runs in reverse over the tokens with a two-state machine:
///
/// - **Normal**: a token ending in `"` opens a capture; any other token is
///   emitted unchanged.
/// - **Capturing**: tokens accumulate until one starts with `!"` or contains
///   `=!"`. The accumulated tokens are then rejoined with single spaces, the
///   first `!"` marker and the trailing `"` are stripped, and the result is
///   emitted as one token.
///
/// Ending the scan while still capturing means the reader-side opening `!"`
/// never appeared; that is an unterminated quote and fails rather than
/// silently dropping the pending tokens.
///
/// # Errors
///
/// Returns [`TokenizeError`] on an unterminated quoted span.
pub fn merge_quoted<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<String>, TokenizeError> {
    let mut merged: Vec<String> = Vec::with_capacity(tokens.len());
    let mut pending: Vec<&str> = Vec::new();
    let mut capturing = false;

    for token in tokens.iter().rev().map(AsRef::as_ref) {
        if capturing {
            pending.push(token);
            if token.starts_with("!\"") || token.contains("=!\"") {
                capturing = false;
                pending.reverse();
                let mut span = pending.join(" ").replacen("!\"", "", 1);
                span.pop();
                merged.push(span);
                pending.clear();
            }
        } else if token.ends_with('"') {
            capturing = true;
            pending.push(token);
        } else {
            merged.push(token.to_string());
        }
    }

    if !pending.is_empty() {
        return Err(TokenizeError);
    }

    merged.reverse();
    Ok(merged)
}

/// Splits `text` on runs of whitespace and merges quoted spans.
///
/// Convenience wrapper over [`merge_quoted`] for callers holding the raw
/// post-prefix message text.
pub fn tokenize(text: &str) -> Result<Vec<String>, TokenizeError> {
    let raw: Vec<&str> = text.split_whitespace().collect();
    merge_quoted(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_tokens_pass_through() {
        let args = tokenize("ban user spam").unwrap();
        assert_eq!(args, vec!["ban", "user", "spam"]);
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert_eq!(tokenize("").unwrap(), Vec::<String>::new());
        assert_eq!(tokenize("   \t ").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn simple_quoted_span_merges() {
        let args = merge_quoted(&["!\"my", "role\""]).unwrap();
        assert_eq!(args, vec!["my role"]);
    }

    #[test]
    fn editrole_example() {
        let args = tokenize(r#"editrole !"my role" name=!"new name heck" color=FFFFFF"#).unwrap();
        assert_eq!(
            args,
            vec!["editrole", "my role", "name=new name heck", "color=FFFFFF"]
        );
    }

    #[test]
    fn key_value_quoted_span() {
        let args = tokenize(r#"set topic=!"general chatter here""#).unwrap();
        assert_eq!(args, vec!["set", "topic=general chatter here"]);
    }

    #[test]
    fn quoted_span_preserves_inner_quotes() {
        // Only the opening marker and the single trailing quote are
        // stripped; interior quote characters survive.
        let args = tokenize(r#"say !"she said "hi" loudly""#).unwrap();
        assert_eq!(args, vec!["say", r#"she said "hi" loudly"#]);
    }

    #[test]
    fn round_trip_reproduces_quoted_content() {
        let original = "one two three four";
        let quoted = format!("!\"{original}\"");
        let raw: Vec<&str> = quoted.split_whitespace().collect();
        let args = merge_quoted(&raw).unwrap();
        assert_eq!(args, vec![original]);
    }

    #[test]
    fn unterminated_span_fails() {
        // A trailing-quote token with no opening marker before it.
        let err = merge_quoted(&["a", "!\"b", "c"]).unwrap_err();
        assert_eq!(err, TokenizeError);
    }

    #[test]
    fn unterminated_span_never_drops_data_silently() {
        assert!(tokenize(r#"editrole stuck" name=red"#).is_err());
    }

    #[test]
    fn multiple_spans_in_one_message() {
        let args = tokenize(r#"alias add !"two words" !"and three more""#).unwrap();
        assert_eq!(args, vec!["alias", "add", "two words", "and three more"]);
    }
}
