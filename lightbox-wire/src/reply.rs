//! Reply lines and the continuation sizing contract.
//!
//! Every reply is an ordered list of lines, each independently
//! checksum-framed and written as its own transport write. A status line
//! (`code != 0`) renders as:
//!
//! ```text
//! <code> <codeText>. <message>.·
//! ```
//!
//! and a continuation line (code 0, bulk payload) as:
//!
//! ```text
//! 000 <message>.·
//! ```
//!
//! (`·` marks the trailing space; the `"000 "` literal is fixed, not a table
//! lookup, since code 0 has no status text on the wire.)
//!
//! The crux of the protocol is that a reader which saw a status line
//! declaring `N` payload bytes must issue a follow-up read of *exactly* the
//! continuation frame's wire size. That size is
//! [`continuation_wire_len`]`(N) = N + 10`: 4 bytes of `"000 "`, the payload,
//! 2 bytes of `". "`, 4 checksum bytes. Host and client both derive their
//! arithmetic from the constants here and nowhere else.

use bytes::Bytes;

use crate::checksum::CHECKSUM_LEN;
use crate::codes::ReplyCode;
use crate::frame::{self, WireError};

/// Literal closing every rendered line (also separates status from message).
pub const LINE_TERMINATOR: &str = ". ";

/// Fixed prefix of a continuation line.
pub const CONTINUATION_PREFIX: &str = "000 ";

/// Wire bytes a continuation frame adds around its payload.
pub const CONTINUATION_OVERHEAD: usize =
    CONTINUATION_PREFIX.len() + LINE_TERMINATOR.len() + CHECKSUM_LEN;

/// Exact wire size of a continuation frame carrying `payload_len` bytes.
///
/// This is the number a client feeds to its second, exact-size read after a
/// status line declared `payload_len`.
#[must_use]
pub const fn continuation_wire_len(payload_len: usize) -> usize {
    payload_len + CONTINUATION_OVERHEAD
}

/// One reply line: a code plus its message (or payload, for code 0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyLine {
    pub code: ReplyCode,
    pub message: String,
}

impl ReplyLine {
    #[must_use]
    pub fn new(code: ReplyCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// A status line with an empty message (the common failure shape).
    #[must_use]
    pub fn status(code: ReplyCode) -> Self {
        Self::new(code, "")
    }

    /// A continuation line carrying bulk payload.
    #[must_use]
    pub fn continuation(payload: impl Into<String>) -> Self {
        Self::new(ReplyCode::Continuation, payload)
    }

    /// Render the line's wire text (the part the checksum covers).
    ///
    /// The separator after the status prefix is always present, even for an
    /// empty message, so every line has the same shape.
    #[must_use]
    pub fn render(&self) -> String {
        match self.code {
            ReplyCode::Continuation => {
                format!("{CONTINUATION_PREFIX}{}{LINE_TERMINATOR}", self.message)
            }
            code => format!(
                "{} {}{LINE_TERMINATOR}{}{LINE_TERMINATOR}",
                code.value(),
                code.text(),
                self.message
            ),
        }
    }

    /// Checksum-framed wire bytes for this line.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        frame::encode_frame(self.render().as_bytes())
    }
}

/// A reply line as seen by the reader, after deframing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Status { code: ReplyCode, message: String },
    Continuation { payload: String },
}

/// Parse verified reply-line text back into its parts.
///
/// # Errors
///
/// `WireError::Malformed` when the text does not match either line shape,
/// including a claimed status code outside the fixed table.
pub fn parse_line(text: &str) -> Result<ParsedLine, WireError> {
    if let Some(rest) = text.strip_prefix(CONTINUATION_PREFIX) {
        let payload = rest
            .strip_suffix(LINE_TERMINATOR)
            .ok_or(WireError::Malformed("continuation line not terminated"))?;
        return Ok(ParsedLine::Continuation {
            payload: payload.to_string(),
        });
    }

    let (head, rest) = text
        .split_once(LINE_TERMINATOR)
        .ok_or(WireError::Malformed("status line missing separator"))?;
    let (value, _code_text) = head
        .split_once(' ')
        .ok_or(WireError::Malformed("status line missing code text"))?;
    let value: u16 = value
        .parse()
        .map_err(|_| WireError::Malformed("status code is not numeric"))?;
    let code = ReplyCode::from_value(value)
        .filter(|code| *code != ReplyCode::Continuation)
        .ok_or(WireError::Malformed("status code outside the table"))?;
    let message = rest
        .strip_suffix(LINE_TERMINATOR)
        .ok_or(WireError::Malformed("status line not terminated"))?;

    Ok(ParsedLine::Status {
        code,
        message: message.to_string(),
    })
}

/// Extract the payload byte count a status message declares.
///
/// Both declaring shapes put the count directly before the word `bytes`:
/// `"<N> bytes"` (ls) and `"File follows - <N> bytes"` (get).
#[must_use]
pub fn declared_bytes(message: &str) -> Option<usize> {
    let tokens: Vec<&str> = message.split_whitespace().collect();
    let at = tokens.iter().position(|t| *t == "bytes")?;
    tokens[at.checked_sub(1)?].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_render_exact() {
        assert_eq!(
            ReplyLine::new(ReplyCode::Ok, "Hello").render(),
            "200 OK. Hello. "
        );
        assert_eq!(
            ReplyLine::new(ReplyCode::Ok, "File follows - 16 bytes").render(),
            "200 OK. File follows - 16 bytes. "
        );
    }

    #[test]
    fn test_empty_message_keeps_separator() {
        assert_eq!(
            ReplyLine::status(ReplyCode::PathNotFound).render(),
            "149 Path not found. . "
        );
        assert_eq!(
            ReplyLine::status(ReplyCode::NotAuthorized).render(),
            "100 User not authorized. . "
        );
    }

    #[test]
    fn test_continuation_render_exact() {
        assert_eq!(
            ReplyLine::continuation("ZmFrZQ==").render(),
            "000 ZmFrZQ==. "
        );
        assert_eq!(ReplyLine::continuation("").render(), "000 . ");
    }

    #[test]
    fn test_continuation_wire_len_matches_encoding() {
        let long = "Q".repeat(57);
        for payload in ["", "x", "d-a f-b.jpg", long.as_str()] {
            let line = ReplyLine::continuation(payload);
            assert_eq!(
                line.encode().len(),
                continuation_wire_len(payload.len()),
                "sizing formula must match the assembler exactly"
            );
        }
    }

    #[test]
    fn test_parse_line_inverts_render() {
        let status = ReplyLine::new(ReplyCode::Ok, "23 bytes");
        assert_eq!(
            parse_line(&status.render()).unwrap(),
            ParsedLine::Status {
                code: ReplyCode::Ok,
                message: "23 bytes".to_string(),
            }
        );

        let cont = ReplyLine::continuation("d-a f-b.jpg");
        assert_eq!(
            parse_line(&cont.render()).unwrap(),
            ParsedLine::Continuation {
                payload: "d-a f-b.jpg".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_line_rejects_junk() {
        assert!(parse_line("garbage").is_err());
        assert!(parse_line("512 Made up. x. ").is_err());
        assert!(parse_line("000 unterminated").is_err());
    }

    #[test]
    fn test_declared_bytes() {
        assert_eq!(declared_bytes("0 bytes"), Some(0));
        assert_eq!(declared_bytes("23 bytes"), Some(23));
        assert_eq!(declared_bytes("File follows - 2480 bytes"), Some(2480));
        assert_eq!(declared_bytes("Goodbye!"), None);
        assert_eq!(declared_bytes("bytes"), None);
    }
}
