//! Request parsing.
//!
//! A request's command text is split on whitespace; the first token selects
//! the command, the rest are positional arguments. This is a flat lookup
//! with no nested grammar - arguments are never tokenized further, and
//! arity is validated by the handlers, not here, so that the session gate
//! can run between parsing and arity checks.

use crate::frame::WireError;

/// The closed set of protocol commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Hello,
    Auth,
    Pwd,
    Ls,
    Cd,
    Get,
    Quit,
}

impl CommandKind {
    /// Select a command from its wire token (exact, case-sensitive).
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "hello" => Some(Self::Hello),
            "auth" => Some(Self::Auth),
            "pwd" => Some(Self::Pwd),
            "ls" => Some(Self::Ls),
            "cd" => Some(Self::Cd),
            "get" => Some(Self::Get),
            "quit" => Some(Self::Quit),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hello => "hello",
            Self::Auth => "auth",
            Self::Pwd => "pwd",
            Self::Ls => "ls",
            Self::Cd => "cd",
            Self::Get => "get",
            Self::Quit => "quit",
        }
    }

    /// `hello` is the liveness probe and `auth` establishes the session;
    /// everything else is gated behind one.
    #[must_use]
    pub const fn requires_session(self) -> bool {
        !matches!(self, Self::Hello | Self::Auth)
    }
}

/// A parsed request: command kind plus raw positional args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub kind: CommandKind,
    pub args: Vec<String>,
}

impl Request {
    /// Parse verified command text into a request.
    ///
    /// # Errors
    ///
    /// `WireError::UnknownCommand` when the first token (or the whole line)
    /// selects nothing - surfaced to the peer as code 102.
    pub fn parse(text: &str) -> Result<Self, WireError> {
        let mut tokens = text.split_whitespace();
        let first = tokens
            .next()
            .ok_or_else(|| WireError::UnknownCommand(String::new()))?;
        let kind = CommandKind::from_token(first)
            .ok_or_else(|| WireError::UnknownCommand(first.to_string()))?;
        Ok(Self {
            kind,
            args: tokens.map(str::to_string).collect(),
        })
    }
}
