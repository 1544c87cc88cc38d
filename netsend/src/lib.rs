use std::ffi::OsString;

/// Tunable constants
pub mod common;

/// Error taxonomy shared by every stage
mod error;
pub use error::SendError;

/// Command line validation and the local byte source
pub mod input;
pub use input::{Endpoint, Source};

/// Hostname resolution and TCP connection establishment
pub mod connection;
pub use connection::{AddressFamily, Connection, ResolvedAddress, Resolve, SystemResolver};

/// Copy loop from the source into the connection, tolerant of partial I/O
pub mod forward;
pub use forward::{IoStep, StreamForwarder, TransferBuffer, TransferReport};

/// Utilities for CLI, console text style
pub mod cli_util;

#[cfg(test)]
mod tests;

/// Run one transfer from the process arguments (program name included):
/// validate input and open the file, connect to the endpoint, then send the whole file.
///
/// Whatever was acquired before a failure (the file, the socket) is closed before this returns.
pub fn run<I, T>(args: I) -> Result<TransferReport, SendError>
where
  I: IntoIterator<Item = T>,
  T: Into<OsString> + Clone,
{
  log::debug!("state: init");
  let cli = input::parse_args(args)?;
  let (endpoint, source) = input::resolve_input(cli)?;

  log::debug!("state: resolving {endpoint}");
  let conn = connection::establish(&endpoint, &SystemResolver)?;

  log::debug!(
    "state: connected to {}, forwarding {} ({} bytes)",
    conn.peer_addr(),
    source.path().display(),
    source.size().map_or_else(|| "unknown".to_string(), |n| n.to_string())
  );
  let result = StreamForwarder::default().forward(source, conn);

  match &result {
    Ok(report) => log::debug!("state: closed, {} bytes sent", report.bytes),
    Err(e) => log::debug!("state: closed with error: {e}"),
  }
  result
}
