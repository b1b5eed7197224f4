//! Command handlers and dispatch.
//!
//! Each command maps to a pure-ish function `(args, session, vault) ->
//! reply lines`, selected by a closed match on [`CommandKind`]. Ordering of
//! checks is part of the contract: unknown commands fail at parse (102,
//! upstream of here), the session gate runs next (100), and arity is
//! validated inside each handler (102) before it touches anything else.
//!
//! Every path through this module produces at least one well-formed reply
//! line; only `ls` and `get` ever produce two.

use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use smallvec::{smallvec, SmallVec};
use tracing::debug;

use lightbox_wire::auth::{self, CredentialStore};
use lightbox_wire::codes::ReplyCode;
use lightbox_wire::command::{CommandKind, Request};
use lightbox_wire::reply::ReplyLine;
use lightbox_wire::session::{Gate, Session};

use crate::vault::{PhotoVault, VaultError};

/// Ordered reply lines for one request. Two lines is the maximum (status +
/// continuation), so this never allocates.
pub type ReplyLines = SmallVec<[ReplyLine; 2]>;

/// Execute a parsed request against the connection's gate and the vault.
pub async fn dispatch<C>(
    request: &Request,
    gate: &mut Gate,
    vault: &PhotoVault,
    credentials: &C,
) -> ReplyLines
where
    C: CredentialStore + ?Sized,
{
    match request.kind {
        CommandKind::Hello => hello(&request.args),
        CommandKind::Auth => auth_cmd(&request.args, gate, vault, credentials).await,
        CommandKind::Pwd => with_session(gate, |session| pwd(&request.args, session)),
        CommandKind::Ls => with_session(gate, |session| ls(&request.args, session, vault)),
        CommandKind::Cd => with_session(gate, |session| cd(&request.args, session, vault)),
        CommandKind::Get => with_session(gate, |session| get(&request.args, session, vault)),
        CommandKind::Quit => quit(&request.args, gate),
    }
}

/// The session gate: commands that need a session get code 100 without
/// their handler ever running.
fn with_session(
    gate: &mut Gate,
    handler: impl FnOnce(&mut Session) -> ReplyLines,
) -> ReplyLines {
    match gate.session_mut() {
        Some(session) => handler(session),
        None => smallvec![ReplyLine::status(ReplyCode::NotAuthorized)],
    }
}

fn invalid() -> ReplyLines {
    smallvec![ReplyLine::status(ReplyCode::InvalidCommand)]
}

/// `hello` - liveness probe, available to anyone.
fn hello(args: &[String]) -> ReplyLines {
    if !args.is_empty() {
        return invalid();
    }
    smallvec![ReplyLine::new(ReplyCode::Ok, "Hello")]
}

/// `auth <user> <password>` - exact-match lookup, then bind a session.
async fn auth_cmd<C>(
    args: &[String],
    gate: &mut Gate,
    vault: &PhotoVault,
    credentials: &C,
) -> ReplyLines
where
    C: CredentialStore + ?Sized,
{
    // Arity before any lookup.
    let [user, password] = args else {
        return invalid();
    };
    if auth::verify(credentials, user, password).await {
        debug!("[HOST] Authenticated user {}", user);
        gate.authenticate(Session::new(user.clone(), vault.root()));
        smallvec![ReplyLine::status(ReplyCode::Ok)]
    } else {
        debug!("[HOST] Rejected credentials for user {}", user);
        smallvec![ReplyLine::status(ReplyCode::AuthFailed)]
    }
}

/// `pwd` - report the cursor.
fn pwd(args: &[String], session: &mut Session) -> ReplyLines {
    if !args.is_empty() {
        return invalid();
    }
    smallvec![ReplyLine::new(ReplyCode::Ok, session.cursor.display())]
}

/// `cd <path|~>` - move the cursor; the move commits only if the target
/// resolves.
fn cd(args: &[String], session: &mut Session, vault: &PhotoVault) -> ReplyLines {
    let [target] = args else {
        return invalid();
    };
    if target == "~" {
        session.cursor.reset();
        return smallvec![ReplyLine::status(ReplyCode::Ok)];
    }
    let candidate = session.cursor.joined(target);
    match vault.resolve_dir(&candidate) {
        Ok(_) => {
            session.cursor.enter(candidate);
            smallvec![ReplyLine::status(ReplyCode::Ok)]
        }
        Err(_) => smallvec![ReplyLine::status(ReplyCode::PathNotFound)],
    }
}

/// `ls [path]` - status line declaring the listing's byte length, then the
/// listing itself as a continuation.
fn ls(args: &[String], session: &mut Session, vault: &PhotoVault) -> ReplyLines {
    if args.len() > 1 {
        return invalid();
    }
    let target: PathBuf = match args.first() {
        Some(path) => session.cursor.joined(path),
        None => session.cursor.rel_path().to_path_buf(),
    };
    match vault.list(&target) {
        Ok(entries) => {
            let joined = entries.join(" ");
            smallvec![
                ReplyLine::new(ReplyCode::Ok, format!("{} bytes", joined.len())),
                ReplyLine::continuation(joined),
            ]
        }
        Err(_) => smallvec![ReplyLine::status(ReplyCode::PathNotFound)],
    }
}

/// `get <filename>` - status line declaring the encoded length, then the
/// whole file base64-encoded as a continuation. Not chunked.
fn get(args: &[String], session: &mut Session, vault: &PhotoVault) -> ReplyLines {
    let [name] = args else {
        return invalid();
    };
    match vault.read_photo(&session.cursor.joined(name)) {
        Ok(raw) => {
            let encoded = BASE64.encode(&raw);
            smallvec![
                ReplyLine::new(
                    ReplyCode::Ok,
                    format!("File follows - {} bytes", encoded.len())
                ),
                ReplyLine::continuation(encoded),
            ]
        }
        Err(VaultError::NotFound) => smallvec![ReplyLine::status(ReplyCode::PathNotFound)],
        Err(VaultError::Unsupported) => {
            smallvec![ReplyLine::status(ReplyCode::UnsupportedFile)]
        }
        Err(VaultError::ReadFailed) => smallvec![ReplyLine::status(ReplyCode::SendFailed)],
    }
}

/// `quit` - drop the session; the connection itself stays open.
fn quit(args: &[String], gate: &mut Gate) -> ReplyLines {
    if !gate.is_authenticated() {
        return smallvec![ReplyLine::status(ReplyCode::NotAuthorized)];
    }
    if !args.is_empty() {
        return invalid();
    }
    gate.clear();
    smallvec![ReplyLine::new(ReplyCode::Ok, "Goodbye!")]
}
