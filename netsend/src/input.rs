use crate::SendError;
use clap::Parser;
use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Send a local file, byte for byte, to a TCP server.
#[derive(Parser, Debug)]
#[command(name = "netsend", version, about)]
pub struct Cli {
  /// host name or IP address of the receiver
  pub hostname: String,
  /// port of the receiver, 1-65535
  #[arg(allow_hyphen_values = true)]
  pub port: String,
  /// file to send
  pub local_file: PathBuf,
}

/// Parse the process arguments (program name first).
/// Anything but exactly three positional arguments is a [`SendError::Usage`].
pub fn parse_args<I, T>(args: I) -> Result<Cli, SendError>
where
  I: IntoIterator<Item = T>,
  T: Into<OsString> + Clone,
{
  Cli::try_parse_from(args).map_err(SendError::Usage)
}

/// Parse a port number. Zero and anything outside `u16` are rejected.
pub fn parse_port(raw: &str) -> Result<u16, SendError> {
  match raw.trim().parse::<u16>() {
    Ok(port) if port != 0 => Ok(port),
    _ => Err(SendError::PortParse(raw.to_string())),
  }
}

/// Validate the parsed command line and open the file.
/// The port is checked before the file is touched; nothing here goes to the network.
pub fn resolve_input(cli: Cli) -> Result<(Endpoint, Source), SendError> {
  let Cli {
    hostname,
    port,
    local_file,
  } = cli;
  let port = parse_port(&port)?;
  let source = Source::open(&local_file)?;
  Ok((Endpoint::new(hostname, port), source))
}

/// Remote service to connect to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
  host: String,
  port: u16,
}

impl Endpoint {
  pub fn new(host: impl Into<String>, port: u16) -> Self {
    Self {
      host: host.into(),
      port,
    }
  }
  pub fn host(&self) -> &str {
    &self.host
  }
  pub fn port(&self) -> u16 {
    self.port
  }
}

impl fmt::Display for Endpoint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    // bare IPv6 literals need brackets to keep the port readable
    if self.host.contains(':') {
      write!(f, "[{}]:{}", self.host, self.port)
    } else {
      write!(f, "{}:{}", self.host, self.port)
    }
  }
}

/// Local file opened read-only, the bytes to be sent.
/// The handle is closed when the source is dropped.
#[derive(Debug)]
pub struct Source {
  file: File,
  path: PathBuf,
}

impl Source {
  pub fn open(path: &Path) -> Result<Self, SendError> {
    let file = File::open(path).map_err(|source| SendError::FileOpen {
      path: path.to_path_buf(),
      source,
    })?;
    log::debug!("opened {} for reading", path.display());
    Ok(Self {
      file,
      path: path.to_path_buf(),
    })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// size reported by the file system, if it can be queried
  pub fn size(&self) -> Option<u64> {
    self.file.metadata().ok().map(|m| m.len())
  }
}

impl Read for Source {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    self.file.read(buf)
  }
}

impl Drop for Source {
  fn drop(&mut self) {
    log::debug!("closing {}", self.path.display());
  }
}
