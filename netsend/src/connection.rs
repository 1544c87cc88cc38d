use crate::{Endpoint, SendError};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io::{self, ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

/// Hostname lookup.
pub trait Resolve {
  /// Resolve `host` into candidate stream-socket addresses, in the resolver's preference order.
  /// The port of the returned addresses is meaningless.
  fn resolve(&self, host: &str) -> io::Result<Vec<SockAddr>>;
}

/// The platform resolver (`getaddrinfo`): any address family, no service lookup.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl Resolve for SystemResolver {
  fn resolve(&self, host: &str) -> io::Result<Vec<SockAddr>> {
    Ok((host, 0).to_socket_addrs()?.map(SockAddr::from).collect())
  }
}

/// Address families a connection can be made with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
  V4,
  V6,
}

impl TryFrom<Domain> for AddressFamily {
  type Error = SendError;

  fn try_from(value: Domain) -> Result<Self, Self::Error> {
    match value {
      Domain::IPV4 => Ok(AddressFamily::V4),
      Domain::IPV6 => Ok(AddressFamily::V6),
      other => Err(SendError::UnsupportedAddressFamily(other)),
    }
  }
}

impl From<AddressFamily> for Domain {
  fn from(value: AddressFamily) -> Self {
    match value {
      AddressFamily::V4 => Domain::IPV4,
      AddressFamily::V6 => Domain::IPV6,
    }
  }
}

/// One resolver candidate, with the requested port already filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedAddress {
  family: AddressFamily,
  addr: SocketAddr,
}

impl ResolvedAddress {
  /// Classify `candidate` and replace whatever port it carries with `port`.
  pub fn from_candidate(candidate: &SockAddr, port: u16) -> Result<Self, SendError> {
    let family = AddressFamily::try_from(candidate.domain())?;
    let mut addr = candidate
      .as_socket()
      .ok_or_else(|| SendError::UnsupportedAddressFamily(candidate.domain()))?;
    addr.set_port(port);
    Ok(Self { family, addr })
  }

  pub fn family(&self) -> AddressFamily {
    self.family
  }
  pub fn addr(&self) -> SocketAddr {
    self.addr
  }
}

/// Resolve `endpoint` with `resolver`, then open a TCP connection to the first candidate.
///
/// - The socket is created with the family of that candidate.
/// - Only the first candidate is tried: there is no fallback to the others.
/// - The candidate list is released before returning, whatever the outcome.
pub fn establish<R: Resolve + ?Sized>(endpoint: &Endpoint, resolver: &R) -> Result<Connection, SendError> {
  let target = {
    let candidates = resolver
      .resolve(endpoint.host())
      .map_err(|source| SendError::AddressResolution {
        host: endpoint.host().to_string(),
        source,
      })?;
    log::debug!("{} candidate address(es) for {}", candidates.len(), endpoint.host());
    let first = candidates.first().ok_or_else(|| SendError::AddressResolution {
      host: endpoint.host().to_string(),
      source: io::Error::new(ErrorKind::NotFound, "no address associated with hostname"),
    })?;
    ResolvedAddress::from_candidate(first, endpoint.port())?
  };
  log::debug!("{} resolved to {} ({:?})", endpoint, target.addr, target.family);

  let socket =
    Socket::new(target.family.into(), Type::STREAM, Some(Protocol::TCP)).map_err(SendError::SocketCreate)?;
  socket
    .connect(&target.addr.into())
    .map_err(|source| SendError::Connect {
      addr: target.addr,
      source,
    })?;
  log::info!("connected to {}", target.addr);

  Ok(Connection {
    stream: socket.into(),
    peer: target.addr,
  })
}

/// An established TCP connection. The socket is closed when this is dropped.
#[derive(Debug)]
pub struct Connection {
  stream: TcpStream,
  peer: SocketAddr,
}

impl Connection {
  pub fn peer_addr(&self) -> SocketAddr {
    self.peer
  }
}

impl Read for Connection {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    self.stream.read(buf)
  }
}

impl Write for Connection {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.stream.write(buf)
  }

  fn flush(&mut self) -> io::Result<()> {
    self.stream.flush()
  }
}

impl Drop for Connection {
  fn drop(&mut self) {
    log::debug!("closing connection to {}", self.peer);
  }
}
