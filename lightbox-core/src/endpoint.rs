//! Endpoint abstraction for transport-agnostic host addressing.
//!
//! Provides unified addressing for TCP and serial transports with parsing
//! support. The host itself is generic over any byte stream; this type only
//! records *which* transport the operator asked for. Opening a serial device
//! is left to the embedding application - the identifier and baud rate are
//! carried here so configuration can recognize them.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

/// Default serial line rate when the endpoint string does not name one.
pub const DEFAULT_BAUD: u32 = 9600;

/// Transport endpoint address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// TCP transport: `tcp://host:port`
    Tcp(SocketAddr),
    /// Serial transport: `serial://<device>?baud=<rate>`
    Serial {
        /// Device identifier, e.g. `/dev/ttyUSB0` or `COM2`
        device: String,
        /// Line rate in baud
        baud: u32,
    },
}

impl Endpoint {
    /// Parse an endpoint from a string.
    ///
    /// Supported formats:
    /// - `tcp://127.0.0.1:7878`
    /// - `serial:///dev/ttyUSB0?baud=9600`
    /// - `serial://COM2` (baud defaults to [`DEFAULT_BAUD`])
    ///
    /// # Examples
    ///
    /// ```
    /// use lightbox_core::endpoint::Endpoint;
    ///
    /// let endpoint = Endpoint::parse("tcp://127.0.0.1:7878").unwrap();
    /// assert!(matches!(endpoint, Endpoint::Tcp(_)));
    ///
    /// let endpoint = Endpoint::parse("serial://COM2?baud=19200").unwrap();
    /// assert!(matches!(endpoint, Endpoint::Serial { baud: 19200, .. }));
    /// ```
    pub fn parse(s: &str) -> Result<Self, EndpointError> {
        s.parse()
    }

    /// Returns true if this is a TCP endpoint.
    #[must_use]
    pub const fn is_tcp(&self) -> bool {
        matches!(self, Endpoint::Tcp(_))
    }

    /// Returns true if this is a serial endpoint.
    #[must_use]
    pub const fn is_serial(&self) -> bool {
        matches!(self, Endpoint::Serial { .. })
    }
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(addr) = s.strip_prefix("tcp://") {
            let socket_addr = addr
                .parse::<SocketAddr>()
                .map_err(|_| EndpointError::InvalidTcpAddress(addr.to_string()))?;
            Ok(Endpoint::Tcp(socket_addr))
        } else if let Some(rest) = s.strip_prefix("serial://") {
            let (device, query) = match rest.split_once('?') {
                Some((d, q)) => (d, Some(q)),
                None => (rest, None),
            };
            if device.is_empty() {
                return Err(EndpointError::InvalidSerialDevice(
                    "serial device cannot be empty".to_string(),
                ));
            }
            let baud = match query {
                None => DEFAULT_BAUD,
                Some(q) => {
                    let raw = q.strip_prefix("baud=").ok_or_else(|| {
                        EndpointError::InvalidBaud(q.to_string())
                    })?;
                    raw.parse::<u32>()
                        .map_err(|_| EndpointError::InvalidBaud(raw.to_string()))?
                }
            };
            Ok(Endpoint::Serial {
                device: device.to_string(),
                baud,
            })
        } else {
            Err(EndpointError::InvalidScheme(s.to_string()))
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Tcp(addr) => write!(f, "tcp://{}", addr),
            Endpoint::Serial { device, baud } => {
                write!(f, "serial://{}?baud={}", device, baud)
            }
        }
    }
}

impl From<EndpointError> for crate::error::LightboxError {
    fn from(err: EndpointError) -> Self {
        Self::Endpoint(err.to_string())
    }
}

/// Errors that can occur when parsing endpoints.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("Invalid scheme in endpoint: {0} (expected tcp:// or serial://)")]
    InvalidScheme(String),

    #[error("Invalid TCP address: {0}")]
    InvalidTcpAddress(String),

    #[error("Invalid serial device: {0}")]
    InvalidSerialDevice(String),

    #[error("Invalid baud rate: {0}")]
    InvalidBaud(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tcp() {
        let ep = Endpoint::parse("tcp://127.0.0.1:7878").unwrap();
        assert_eq!(ep, Endpoint::Tcp("127.0.0.1:7878".parse().unwrap()));
        assert!(ep.is_tcp());
    }

    #[test]
    fn test_parse_serial_with_baud() {
        let ep = Endpoint::parse("serial:///dev/ttyUSB0?baud=115200").unwrap();
        assert_eq!(
            ep,
            Endpoint::Serial {
                device: "/dev/ttyUSB0".to_string(),
                baud: 115_200,
            }
        );
    }

    #[test]
    fn test_parse_serial_default_baud() {
        let ep = Endpoint::parse("serial://COM2").unwrap();
        assert_eq!(
            ep,
            Endpoint::Serial {
                device: "COM2".to_string(),
                baud: DEFAULT_BAUD,
            }
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Endpoint::parse("udp://127.0.0.1:1").is_err());
        assert!(Endpoint::parse("tcp://not-an-addr").is_err());
        assert!(Endpoint::parse("serial://").is_err());
        assert!(Endpoint::parse("serial://COM2?baud=fast").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for raw in ["tcp://127.0.0.1:7878", "serial://COM2?baud=9600"] {
            let ep = Endpoint::parse(raw).unwrap();
            assert_eq!(Endpoint::parse(&ep.to_string()).unwrap(), ep);
        }
    }
}
