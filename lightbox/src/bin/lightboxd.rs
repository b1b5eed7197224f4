//! lightboxd - the photo retrieval host daemon.
//!
//! Serves a sandboxed photo tree to protocol clients. TCP endpoints are
//! handled here directly; a serial device is opened by the embedding
//! application, which then drives `AlbumHost::serve` with the stream.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, info, warn};

use lightbox::config::ServerConfig;
use lightbox::host::AlbumHost;
use lightbox_core::endpoint::Endpoint;
use lightbox_core::error::{LightboxError, Result};
use lightbox_core::options::LinkOptions;
use lightbox_core::shutdown::ShutdownToken;
use lightbox_wire::auth::MemoryCredentials;

/// How often the accept loop wakes to poll the shutdown token.
const ACCEPT_POLL: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(
    name = "lightboxd",
    version,
    about = "Photo retrieval host for checksum-framed half-duplex links"
)]
struct Cli {
    /// Sandbox root containing the photo tree
    #[arg(long, default_value = "./photoBase")]
    root: PathBuf,

    /// Transport endpoint: tcp://host:port or serial://device?baud=N
    #[arg(long, default_value = "tcp://127.0.0.1:7878")]
    endpoint: String,

    /// Allowed photo extensions (comma separated)
    #[arg(long, value_delimiter = ',', default_value = "jpeg,jpg")]
    extensions: Vec<String>,

    /// Refuse navigation and reads outside the sandbox root
    #[arg(long)]
    confine: bool,

    /// Listen-read timeout in seconds (0 waits forever)
    #[arg(long, default_value_t = 30)]
    read_timeout: u64,

    /// Pacing delay between response lines, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pacing_ms: u64,

    /// Credential entry as user:password (repeatable)
    #[arg(long = "user")]
    users: Vec<String>,
}

fn parse_credentials(entries: &[String]) -> Result<MemoryCredentials> {
    let mut store = MemoryCredentials::new();
    for entry in entries {
        let Some((user, password)) = entry.split_once(':') else {
            return Err(LightboxError::config(format!(
                "credential entry {entry:?} is not user:password"
            )));
        };
        store.add_user(user, password);
    }
    Ok(store)
}

#[compio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    lightbox::dev_tracing::init_tracing();

    let endpoint = Endpoint::parse(&cli.endpoint)?;
    let link = LinkOptions::default()
        .with_recv_timeout((cli.read_timeout > 0).then(|| Duration::from_secs(cli.read_timeout)))
        .with_line_pacing(Duration::from_millis(cli.pacing_ms));
    let config = ServerConfig::new(&cli.root, endpoint.clone())
        .with_extensions(cli.extensions.clone())
        .with_confinement(cli.confine)
        .with_link(link);

    // Anything wrong here aborts startup, never a running session.
    let vault = config.open_vault()?;
    let credentials = parse_credentials(&cli.users)?;

    let shutdown = ShutdownToken::new();
    let for_signal = shutdown.clone();
    ctrlc::set_handler(move || for_signal.trigger())
        .map_err(|e| LightboxError::config(format!("cannot install signal handler: {e}")))?;

    let Endpoint::Tcp(addr) = endpoint else {
        return Err(LightboxError::endpoint(
            "serial devices are opened by the embedding application; \
             hand the stream to AlbumHost::serve",
        ));
    };

    let listener = compio::net::TcpListener::bind(addr).await?;
    info!(
        "lightboxd listening on tcp://{} serving {}",
        addr,
        vault.root().display()
    );

    while !shutdown.is_triggered() {
        // Bounded accept wait so ctrl-c is honored without a connection.
        let Ok(accepted) = compio::time::timeout(ACCEPT_POLL, listener.accept()).await else {
            continue;
        };
        let (stream, peer) = accepted?;
        debug!("Accepted connection from {}", peer);

        // Strictly serial: one connection at a time owns the vault.
        let mut host = AlbumHost::new(stream, config.link.clone(), shutdown.clone());
        match host.serve(&vault, &credentials).await {
            Ok(()) => debug!("Connection from {} closed", peer),
            Err(err) if err.is_orderly_end() => {
                debug!("Connection from {} ended: {}", peer, err);
            }
            Err(err) => warn!("Connection from {} failed: {}", peer, err),
        }
    }

    info!("lightboxd stopped");
    Ok(())
}
