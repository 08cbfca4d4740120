use super::{BuildContext, Property, SinkBuilder, SinkKind, closed_error};
use crate::config::ConfigError;
use crate::record::LogRecord;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};
use std::net::{
    Ipv4Addr, Ipv6Addr, Shutdown, SocketAddr, TcpStream, ToSocketAddrs, UdpSocket,
};

pub const DEFAULT_PROTOCOL: &str = "udp";

/// Validated settings of a `socket` filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocketSinkConfig {
    pub endpoint: String,
    /// Kept as written; only checked when the socket is opened.
    pub protocol: String,
}

impl Default for SocketSinkConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            protocol: DEFAULT_PROTOCOL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketProtocol {
    Udp,
    Tcp,
}

impl SocketProtocol {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "udp" => Some(SocketProtocol::Udp),
            "tcp" => Some(SocketProtocol::Tcp),
            _ => None,
        }
    }
}

impl fmt::Display for SocketProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketProtocol::Udp => write!(f, "udp"),
            SocketProtocol::Tcp => write!(f, "tcp"),
        }
    }
}

#[derive(Debug)]
enum Connection {
    Udp(UdpSocket),
    Tcp(TcpStream),
}

/// Sends each record as a JSON document to a remote collector.
#[derive(Debug)]
pub struct SocketSink {
    config: SocketSinkConfig,
    peer: SocketAddr,
    connection: Option<Connection>,
}

impl SocketSink {
    pub fn config(&self) -> &SocketSinkConfig {
        &self.config
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn is_closed(&self) -> bool {
        self.connection.is_none()
    }

    pub fn write(&mut self, record: &LogRecord) -> io::Result<()> {
        let connection = self.connection.as_mut().ok_or_else(closed_error)?;
        let payload = serde_json::to_vec(record).map_err(io::Error::other)?;
        match connection {
            Connection::Udp(socket) => {
                socket.send(&payload)?;
            }
            Connection::Tcp(stream) => {
                // newline-delimited on stream transports
                stream.write_all(&payload)?;
                stream.write_all(b"\n")?;
                stream.flush()?;
            }
        }
        Ok(())
    }

    pub fn close(&mut self) -> io::Result<()> {
        match self.connection.take() {
            Some(Connection::Tcp(stream)) => match stream.shutdown(Shutdown::Both) {
                Err(err) if err.kind() != io::ErrorKind::NotConnected => Err(err),
                _ => Ok(()),
            },
            Some(Connection::Udp(_)) | None => Ok(()),
        }
    }
}

impl SinkBuilder for SocketSink {
    const KIND: SinkKind = SinkKind::Socket;
    type Config = SocketSinkConfig;

    fn parse_properties(
        ctx: &mut BuildContext<'_>,
        properties: &[Property],
    ) -> Result<Self::Config, ConfigError> {
        let mut config = SocketSinkConfig::default();

        for prop in properties {
            match prop.name.as_str() {
                "endpoint" => config.endpoint = prop.trimmed().to_string(),
                "protocol" => config.protocol = prop.trimmed().to_string(),
                other => ctx.warn_unknown_property(Self::KIND, other),
            }
        }

        ctx.require(Self::KIND, "endpoint", &config.endpoint)?;
        Ok(config)
    }

    fn target(config: &Self::Config) -> String {
        format!("{}://{}", config.protocol, config.endpoint)
    }

    fn open(config: Self::Config) -> io::Result<Self> {
        let protocol = SocketProtocol::parse(&config.protocol).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsupported protocol '{}'", config.protocol),
            )
        })?;
        let peer = config.endpoint.to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("endpoint '{}' did not resolve", config.endpoint),
            )
        })?;

        let connection = match protocol {
            SocketProtocol::Udp => {
                let local = if peer.is_ipv4() {
                    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
                } else {
                    SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
                };
                let socket = UdpSocket::bind(local)?;
                // connect() to a broadcast address is refused without SO_BROADCAST
                if peer.is_ipv4() {
                    socket.set_broadcast(true)?;
                }
                socket.connect(peer)?;
                Connection::Udp(socket)
            }
            SocketProtocol::Tcp => Connection::Tcp(TcpStream::connect(peer)?),
        };

        Ok(SocketSink {
            config,
            peer,
            connection: Some(connection),
        })
    }
}
