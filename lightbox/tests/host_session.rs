//! End-to-end protocol tests over loopback TCP.
//!
//! The host is generic over the stream, so loopback TCP stands in for the
//! serial link. Pacing is disabled in most tests to keep the suite fast;
//! the listing test keeps a small delay to exercise the paced path.

use std::fs;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use compio::buf::BufResult;
use compio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use lightbox::client::AlbumClient;
use lightbox::host::AlbumHost;
use lightbox::vault::PhotoVault;
use lightbox_core::error::LightboxError;
use lightbox_core::options::LinkOptions;
use lightbox_core::shutdown::ShutdownToken;
use lightbox_wire::auth::MemoryCredentials;
use lightbox_wire::codes::ReplyCode;
use lightbox_wire::frame;
use lightbox_wire::reply::{continuation_wire_len, declared_bytes, parse_line, ParsedLine};

fn photo_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("photoBase");
    fs::create_dir_all(root.join("holidays")).unwrap();
    fs::create_dir(root.join("empty")).unwrap();
    fs::write(root.join("cat.jpg"), b"raw jpeg bytes").unwrap();
    fs::write(root.join("scan.png"), b"png bytes").unwrap();
    fs::write(root.join("holidays/beach.jpg"), b"sand and sea").unwrap();
    dir
}

fn exts() -> Vec<String> {
    vec!["jpeg".to_string(), "jpg".to_string()]
}

fn credentials() -> MemoryCredentials {
    let mut store = MemoryCredentials::new();
    store.add_user("alice", "hunter2");
    store
}

fn quick_link() -> LinkOptions {
    LinkOptions::default()
        .with_line_pacing(Duration::ZERO)
        .with_recv_timeout(Some(Duration::from_secs(5)))
}

/// Bind a listener, serve exactly one connection on it, and hand the caller
/// the address plus the serving task.
macro_rules! one_shot_server {
    ($vault:expr, $link:expr, $shutdown:expr) => {{
        let listener = compio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let vault = $vault;
        let link = $link;
        let shutdown = $shutdown;
        let creds = credentials();
        let task = compio::runtime::spawn(async move {
            let (stream, _) = listener.accept().await?;
            let mut host = AlbumHost::new(stream, link, shutdown);
            host.serve(&vault, &creds).await
        });
        (addr, task)
    }};
}

#[compio::test]
async fn test_hello_needs_no_session() {
    let dir = photo_tree();
    let vault = PhotoVault::open(&dir.path().join("photoBase"), &exts(), false).unwrap();
    let (addr, server) = one_shot_server!(vault, quick_link(), ShutdownToken::new());

    let stream = compio::net::TcpStream::connect(addr).await.unwrap();
    let mut client = AlbumClient::with_options(stream, quick_link());

    let reply = client.hello().await.unwrap();
    assert_eq!(reply.code, ReplyCode::Ok);
    assert_eq!(reply.message, "Hello");

    drop(client);
    assert!(server.await.is_ok());
}

#[compio::test]
async fn test_session_gate_and_auth() {
    let dir = photo_tree();
    let vault = PhotoVault::open(&dir.path().join("photoBase"), &exts(), false).unwrap();
    let (addr, server) = one_shot_server!(vault, quick_link(), ShutdownToken::new());

    let stream = compio::net::TcpStream::connect(addr).await.unwrap();
    let mut client = AlbumClient::with_options(stream, quick_link());

    // Gated before auth.
    assert_eq!(client.pwd().await.unwrap().code, ReplyCode::NotAuthorized);
    assert_eq!(
        client.ls(None).await.unwrap().status.code,
        ReplyCode::NotAuthorized
    );

    // Bad credentials leave the gate closed.
    assert_eq!(
        client.auth("alice", "wrong").await.unwrap().code,
        ReplyCode::AuthFailed
    );
    assert_eq!(client.pwd().await.unwrap().code, ReplyCode::NotAuthorized);

    // Good credentials open it.
    assert_eq!(
        client.auth("alice", "hunter2").await.unwrap().code,
        ReplyCode::Ok
    );
    let pwd = client.pwd().await.unwrap();
    assert_eq!(pwd.code, ReplyCode::Ok);
    assert_eq!(pwd.message, "photoBase");

    drop(client);
    assert!(server.await.is_ok());
}

#[compio::test]
async fn test_navigation() {
    let dir = photo_tree();
    let vault = PhotoVault::open(&dir.path().join("photoBase"), &exts(), false).unwrap();
    let (addr, server) = one_shot_server!(vault, quick_link(), ShutdownToken::new());

    let stream = compio::net::TcpStream::connect(addr).await.unwrap();
    let mut client = AlbumClient::with_options(stream, quick_link());
    client.auth("alice", "hunter2").await.unwrap();

    assert_eq!(client.cd("holidays").await.unwrap().code, ReplyCode::Ok);
    assert_eq!(client.pwd().await.unwrap().message, "photoBase/holidays");

    // A missing target leaves the cursor where it was.
    assert_eq!(
        client.cd("nowhere").await.unwrap().code,
        ReplyCode::PathNotFound
    );
    assert_eq!(client.pwd().await.unwrap().message, "photoBase/holidays");

    // Home from any depth.
    assert_eq!(client.cd("~").await.unwrap().code, ReplyCode::Ok);
    assert_eq!(client.pwd().await.unwrap().message, "photoBase");

    drop(client);
    assert!(server.await.is_ok());
}

#[compio::test]
async fn test_listing_with_pacing() {
    let dir = photo_tree();
    let vault = PhotoVault::open(&dir.path().join("photoBase"), &exts(), false).unwrap();
    // Keep a short real pacing delay on this one.
    let link = quick_link().with_line_pacing(Duration::from_millis(50));
    let (addr, server) = one_shot_server!(vault, link.clone(), ShutdownToken::new());

    let stream = compio::net::TcpStream::connect(addr).await.unwrap();
    let mut client = AlbumClient::with_options(stream, link);
    client.auth("alice", "hunter2").await.unwrap();

    let listing = client.ls(None).await.unwrap();
    assert_eq!(listing.status.code, ReplyCode::Ok);
    let payload = listing.payload.unwrap();
    assert_eq!(payload, "d-empty d-holidays f-cat.jpg");
    assert_eq!(listing.status.message, format!("{} bytes", payload.len()));

    // Empty directory: "0 bytes" then an empty continuation.
    let empty = client.ls(Some("empty")).await.unwrap();
    assert_eq!(empty.status.message, "0 bytes");
    assert_eq!(empty.payload.unwrap(), "");

    // Missing directory: one line, no continuation.
    let missing = client.ls(Some("nowhere")).await.unwrap();
    assert_eq!(missing.status.code, ReplyCode::PathNotFound);
    assert!(missing.payload.is_none());

    drop(client);
    assert!(server.await.is_ok());
}

#[compio::test]
async fn test_get_round_trip() {
    let dir = photo_tree();
    let vault = PhotoVault::open(&dir.path().join("photoBase"), &exts(), false).unwrap();
    let (addr, server) = one_shot_server!(vault, quick_link(), ShutdownToken::new());

    let stream = compio::net::TcpStream::connect(addr).await.unwrap();
    let mut client = AlbumClient::with_options(stream, quick_link());
    client.auth("alice", "hunter2").await.unwrap();

    let transfer = client.get("cat.jpg").await.unwrap();
    assert_eq!(transfer.status.code, ReplyCode::Ok);
    let encoded = BASE64.encode(b"raw jpeg bytes");
    assert_eq!(
        transfer.status.message,
        format!("File follows - {} bytes", encoded.len())
    );
    assert_eq!(transfer.decode_file().unwrap(), b"raw jpeg bytes");

    // Deeper in the tree after cd.
    client.cd("holidays").await.unwrap();
    let beach = client.get("beach.jpg").await.unwrap();
    assert_eq!(beach.decode_file().unwrap(), b"sand and sea");

    // Outside the allow-list: one line, no continuation.
    client.cd("~").await.unwrap();
    let png = client.get("scan.png").await.unwrap();
    assert_eq!(png.status.code, ReplyCode::UnsupportedFile);
    assert!(png.payload.is_none());

    let ghost = client.get("ghost.jpg").await.unwrap();
    assert_eq!(ghost.status.code, ReplyCode::PathNotFound);

    drop(client);
    assert!(server.await.is_ok());
}

#[compio::test]
async fn test_quit_clears_session_only() {
    let dir = photo_tree();
    let vault = PhotoVault::open(&dir.path().join("photoBase"), &exts(), false).unwrap();
    let (addr, server) = one_shot_server!(vault, quick_link(), ShutdownToken::new());

    let stream = compio::net::TcpStream::connect(addr).await.unwrap();
    let mut client = AlbumClient::with_options(stream, quick_link());
    client.auth("alice", "hunter2").await.unwrap();

    let bye = client.quit().await.unwrap();
    assert_eq!(bye.code, ReplyCode::Ok);
    assert_eq!(bye.message, "Goodbye!");

    // Session gone, connection still serving.
    assert_eq!(client.pwd().await.unwrap().code, ReplyCode::NotAuthorized);
    assert_eq!(
        client.auth("alice", "hunter2").await.unwrap().code,
        ReplyCode::Ok
    );
    assert_eq!(client.pwd().await.unwrap().message, "photoBase");

    drop(client);
    assert!(server.await.is_ok());
}

/// Write raw wire bytes and parse the single reply line that comes back.
async fn raw_exchange<S>(stream: &mut S, wire: &[u8]) -> ParsedLine
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let BufResult(result, _) = stream.write_all(wire.to_vec()).await;
    result.unwrap();

    let buf = vec![0u8; 1024];
    let BufResult(result, buf) = stream.read(buf).await;
    let n = result.unwrap();
    let payload = frame::decode_frame(&buf[..n]).unwrap();
    parse_line(std::str::from_utf8(payload).unwrap()).unwrap()
}

#[compio::test]
async fn test_corrupt_checksum_gets_199_and_link_survives() {
    let dir = photo_tree();
    let vault = PhotoVault::open(&dir.path().join("photoBase"), &exts(), false).unwrap();
    let (addr, server) = one_shot_server!(vault, quick_link(), ShutdownToken::new());

    let mut stream = compio::net::TcpStream::connect(addr).await.unwrap();

    let mut corrupt = frame::encode_request("hello").to_vec();
    let last = corrupt.len() - 1;
    corrupt[last] ^= 0xFF;
    let reply = raw_exchange(&mut stream, &corrupt).await;
    assert_eq!(
        reply,
        ParsedLine::Status {
            code: ReplyCode::ChecksumFailed,
            message: String::new(),
        }
    );

    // The connection stays open; a clean request goes through.
    let reply = raw_exchange(&mut stream, &frame::encode_request("hello")).await;
    assert_eq!(
        reply,
        ParsedLine::Status {
            code: ReplyCode::Ok,
            message: "Hello".to_string(),
        }
    );

    drop(stream);
    assert!(server.await.is_ok());
}

#[compio::test]
async fn test_unknown_command_gets_102() {
    let dir = photo_tree();
    let vault = PhotoVault::open(&dir.path().join("photoBase"), &exts(), false).unwrap();
    let (addr, server) = one_shot_server!(vault, quick_link(), ShutdownToken::new());

    let mut stream = compio::net::TcpStream::connect(addr).await.unwrap();
    let reply = raw_exchange(&mut stream, &frame::encode_request("fetch x")).await;
    assert_eq!(
        reply,
        ParsedLine::Status {
            code: ReplyCode::InvalidCommand,
            message: String::new(),
        }
    );

    drop(stream);
    assert!(server.await.is_ok());
}

#[compio::test]
async fn test_unterminated_flood_gets_102() {
    let dir = photo_tree();
    let vault = PhotoVault::open(&dir.path().join("photoBase"), &exts(), false).unwrap();
    let link = quick_link().with_max_request_len(16);
    let (addr, server) = one_shot_server!(vault, link, ShutdownToken::new());

    let mut stream = compio::net::TcpStream::connect(addr).await.unwrap();
    // 32 bytes, never a terminator: malformed once past the frame limit.
    let reply = raw_exchange(&mut stream, &[b'x'; 32]).await;
    assert_eq!(
        reply,
        ParsedLine::Status {
            code: ReplyCode::InvalidCommand,
            message: String::new(),
        }
    );

    drop(stream);
    assert!(server.await.is_ok());
}

#[compio::test]
async fn test_continuation_sizing_on_the_wire() {
    let dir = photo_tree();
    let vault = PhotoVault::open(&dir.path().join("photoBase"), &exts(), false).unwrap();
    let (addr, server) = one_shot_server!(vault, quick_link(), ShutdownToken::new());

    let mut stream = compio::net::TcpStream::connect(addr).await.unwrap();
    let reply = raw_exchange(&mut stream, &frame::encode_request("auth alice hunter2")).await;
    assert!(matches!(reply, ParsedLine::Status { code: ReplyCode::Ok, .. }));

    // Status line first.
    let reply = raw_exchange(&mut stream, &frame::encode_request("get cat.jpg")).await;
    let ParsedLine::Status { code, message } = reply else {
        panic!("expected a status line");
    };
    assert_eq!(code, ReplyCode::Ok);

    // The declared count alone determines the follow-up read size.
    let declared = declared_bytes(&message).unwrap();
    let follow_up = vec![0u8; continuation_wire_len(declared)];
    let BufResult(result, follow_up) = stream.read_exact(follow_up).await;
    result.unwrap();

    let payload = frame::decode_frame(&follow_up).unwrap();
    let parsed = parse_line(std::str::from_utf8(payload).unwrap()).unwrap();
    let ParsedLine::Continuation { payload } = parsed else {
        panic!("expected a continuation line");
    };
    assert_eq!(payload.len(), declared);
    assert_eq!(BASE64.decode(payload.as_bytes()).unwrap(), b"raw jpeg bytes");

    drop(stream);
    assert!(server.await.is_ok());
}

#[compio::test]
async fn test_confinement_toggle() {
    let dir = photo_tree();
    // A sibling of the sandbox root, reachable only by escaping it.
    fs::create_dir(dir.path().join("outside")).unwrap();

    // Default: raw resolution, the escape resolves.
    let vault = PhotoVault::open(&dir.path().join("photoBase"), &exts(), false).unwrap();
    let (addr, server) = one_shot_server!(vault, quick_link(), ShutdownToken::new());
    let stream = compio::net::TcpStream::connect(addr).await.unwrap();
    let mut client = AlbumClient::with_options(stream, quick_link());
    client.auth("alice", "hunter2").await.unwrap();
    assert_eq!(client.cd("../outside").await.unwrap().code, ReplyCode::Ok);
    drop(client);
    assert!(server.await.is_ok());

    // Confined: the same escape reads as not-found.
    let vault = PhotoVault::open(&dir.path().join("photoBase"), &exts(), true).unwrap();
    let (addr, server) = one_shot_server!(vault, quick_link(), ShutdownToken::new());
    let stream = compio::net::TcpStream::connect(addr).await.unwrap();
    let mut client = AlbumClient::with_options(stream, quick_link());
    client.auth("alice", "hunter2").await.unwrap();
    assert_eq!(
        client.cd("../outside").await.unwrap().code,
        ReplyCode::PathNotFound
    );
    // Inside still works.
    assert_eq!(client.cd("holidays").await.unwrap().code, ReplyCode::Ok);
    drop(client);
    assert!(server.await.is_ok());
}

#[compio::test]
async fn test_idle_read_timeout_ends_connection() {
    let dir = photo_tree();
    let vault = PhotoVault::open(&dir.path().join("photoBase"), &exts(), false).unwrap();
    let link = quick_link().with_recv_timeout(Some(Duration::from_millis(100)));
    let (addr, server) = one_shot_server!(vault, link, ShutdownToken::new());

    // Connect and say nothing.
    let _stream = compio::net::TcpStream::connect(addr).await.unwrap();
    assert!(matches!(server.await, Err(LightboxError::Timeout(_))));
}

#[compio::test]
async fn test_shutdown_token_ends_connection() {
    let dir = photo_tree();
    let vault = PhotoVault::open(&dir.path().join("photoBase"), &exts(), false).unwrap();
    let shutdown = ShutdownToken::new();
    let link = quick_link().with_recv_timeout(Some(Duration::from_millis(100)));
    let (addr, server) = one_shot_server!(vault, link, shutdown.clone());

    let _stream = compio::net::TcpStream::connect(addr).await.unwrap();
    shutdown.trigger();
    assert!(matches!(server.await, Err(LightboxError::Shutdown)));
}
