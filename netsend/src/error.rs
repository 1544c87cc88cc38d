use crate::common::FAILURE_EXIT_CODE;
use socket2::Domain;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a transfer.
/// None of these is recovered from: the first one reported ends the program.
#[derive(Error, Debug)]
pub enum SendError {
  /// wrong number of command line arguments, or a help/version request
  #[error("expected 3 arguments: hostname port local_file")]
  Usage(#[source] clap::Error),

  #[error("invalid port number {0:?}, expected an integer between 1 and 65535")]
  PortParse(String),

  #[error("failed to open file {} for reading: {source}", .path.display())]
  FileOpen {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to get address for hostname {host}: {source}")]
  AddressResolution {
    host: String,
    #[source]
    source: io::Error,
  },

  #[error("address family {0:?} not recognized")]
  UnsupportedAddressFamily(Domain),

  #[error("failed to create socket for connection: {0}")]
  SocketCreate(#[source] io::Error),

  #[error("connection to {addr} failed: {source}")]
  Connect {
    addr: SocketAddr,
    #[source]
    source: io::Error,
  },

  #[error("error reading from local file: {0}")]
  Read(#[source] io::Error),

  #[error("failed to write to connection: {0}")]
  Write(#[source] io::Error),

  /// the peer went away while part of the file was still unsent.
  /// `sent` counts the bytes the connection accepted before that.
  #[error(
    "connection closed prematurely after {sent} bytes{}",
    describe_cause(.cause)
  )]
  PrematureClose { sent: u64, cause: Option<io::Error> },
}

impl SendError {
  /// process exit status for this error
  pub fn exit_code(&self) -> u8 {
    FAILURE_EXIT_CODE
  }
}

fn describe_cause(cause: &Option<io::Error>) -> String {
  match cause {
    Some(e) => format!(": {e}"),
    None => String::new(),
  }
}
