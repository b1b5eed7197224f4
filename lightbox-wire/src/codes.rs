//! The fixed reply-code table.
//!
//! The table is process-wide and read-only; encoding it as a closed enum
//! makes it immutable by construction and keeps dispatch a compile-checked
//! match instead of a runtime map.

/// Reply codes (no heap allocation)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyCode {
    /// `0` - continuation line carrying bulk payload, no status text
    Continuation,
    /// `100` - command issued without an authenticated session
    NotAuthorized,
    /// `101` - credentials rejected
    AuthFailed,
    /// `102` - unknown command, bad arity, or malformed request
    InvalidCommand,
    /// `103` - file extension outside the allow-list
    UnsupportedFile,
    /// `104` - file could not be read or encoded
    SendFailed,
    /// `149` - path does not exist under the cursor
    PathNotFound,
    /// `199` - request checksum did not verify
    ChecksumFailed,
    /// `200` - success
    Ok,
}

impl ReplyCode {
    /// Numeric wire value.
    #[must_use]
    pub const fn value(self) -> u16 {
        match self {
            Self::Continuation => 0,
            Self::NotAuthorized => 100,
            Self::AuthFailed => 101,
            Self::InvalidCommand => 102,
            Self::UnsupportedFile => 103,
            Self::SendFailed => 104,
            Self::PathNotFound => 149,
            Self::ChecksumFailed => 199,
            Self::Ok => 200,
        }
    }

    /// Human text transmitted on status lines. Continuation lines carry no
    /// status text; the value here is only for diagnostics.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Continuation => "Part of file",
            Self::NotAuthorized => "User not authorized",
            Self::AuthFailed => "Authorisation error",
            Self::InvalidCommand => "Invalid command format",
            Self::UnsupportedFile => "Unsupported file",
            Self::SendFailed => "File could not be sent",
            Self::PathNotFound => "Path not found",
            Self::ChecksumFailed => "Checksum verification failed",
            Self::Ok => "OK",
        }
    }

    /// Reverse lookup used by the client-side reader.
    #[must_use]
    pub const fn from_value(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::Continuation),
            100 => Some(Self::NotAuthorized),
            101 => Some(Self::AuthFailed),
            102 => Some(Self::InvalidCommand),
            103 => Some(Self::UnsupportedFile),
            104 => Some(Self::SendFailed),
            149 => Some(Self::PathNotFound),
            199 => Some(Self::ChecksumFailed),
            200 => Some(Self::Ok),
            _ => None,
        }
    }
}
