use crate::common::TRANSFER_BUF_SIZE;
use crate::SendError;
use std::io::{self, ErrorKind, Read, Write};

/// Outcome of one read or write call, classified before anything branches on it.
#[derive(Debug)]
pub enum IoStep {
  /// the call moved this many bytes
  Progress(usize),
  /// interrupted by a signal before any data moved, issue the same call again
  Retry,
  Fatal(io::Error),
}

impl From<io::Result<usize>> for IoStep {
  fn from(result: io::Result<usize>) -> Self {
    match result {
      Ok(n) => IoStep::Progress(n),
      Err(e) if e.kind() == ErrorKind::Interrupted => IoStep::Retry,
      Err(e) => IoStep::Fatal(e),
    }
  }
}

/// write errors meaning the peer has torn the connection down
fn peer_closed(e: &io::Error) -> bool {
  matches!(
    e.kind(),
    ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
  )
}

/// Fixed capacity scratch space reused for every chunk.
pub struct TransferBuffer {
  data: Box<[u8]>,
}

impl TransferBuffer {
  /// A zero capacity is bumped to one byte, otherwise every read would look like end of file.
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      data: vec![0; capacity.max(1)].into_boxed_slice(),
    }
  }

  pub fn capacity(&self) -> usize {
    self.data.len()
  }

  /// One read from `source` into the buffer, interrupts retried.
  /// Returns the number of valid bytes now at the front of the buffer; `0` means end of input.
  fn fill_from<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<usize, SendError> {
    loop {
      match IoStep::from(source.read(&mut self.data)) {
        IoStep::Progress(n) => return Ok(n),
        IoStep::Retry => log::trace!("read interrupted, retrying"),
        IoStep::Fatal(e) => return Err(SendError::Read(e)),
      }
    }
  }

  fn filled(&self, n: usize) -> &[u8] {
    &self.data[..n]
  }
}

impl Default for TransferBuffer {
  fn default() -> Self {
    Self::with_capacity(TRANSFER_BUF_SIZE)
  }
}

/// Summary of a finished transfer
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransferReport {
  /// bytes accepted by the sink
  pub bytes: u64,
  /// non-empty reads taken from the source
  pub chunks: u64,
}

/// Drains a reader into a writer chunk by chunk.
#[derive(Default)]
pub struct StreamForwarder {
  buf: TransferBuffer,
}

impl StreamForwarder {
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      buf: TransferBuffer::with_capacity(capacity),
    }
  }

  pub fn capacity(&self) -> usize {
    self.buf.capacity()
  }

  /// Copy everything `source` yields into `sink`, in order, each byte exactly once.
  ///
  /// - short reads and short writes are continued, interrupted calls are reissued.
  /// - a write that accepts nothing, or fails because the peer reset the connection,
  ///   gives [`SendError::PrematureClose`]; other failures give [`SendError::Read`]/[`SendError::Write`].
  /// - both ends are consumed and closed before this returns, on success and on error.
  pub fn forward<R: Read, W: Write>(&mut self, mut source: R, mut sink: W) -> Result<TransferReport, SendError> {
    let result = self.pump(&mut source, &mut sink);
    drop(source);
    drop(sink);
    result
  }

  fn pump<R: Read, W: Write>(&mut self, source: &mut R, sink: &mut W) -> Result<TransferReport, SendError> {
    let mut report = TransferReport::default();
    loop {
      let n = self.buf.fill_from(source)?;
      if n == 0 {
        break;
      }
      report.chunks += 1;
      write_chunk(sink, self.buf.filled(n), &mut report.bytes)?;
      log::trace!("chunk {}: {} bytes, {} sent so far", report.chunks, n, report.bytes);
    }

    loop {
      match sink.flush() {
        Ok(()) => break,
        Err(e) if e.kind() == ErrorKind::Interrupted => continue,
        Err(e) => return Err(SendError::Write(e)),
      }
    }
    log::info!("sent {} bytes in {} chunk(s)", report.bytes, report.chunks);
    Ok(report)
  }
}

/// Write all of `chunk`, continuing from the unsent tail after every short write.
/// `sent` is advanced by every byte the sink accepts, including on the error paths.
fn write_chunk<W: Write + ?Sized>(sink: &mut W, chunk: &[u8], sent: &mut u64) -> Result<(), SendError> {
  let mut remaining = chunk;
  while !remaining.is_empty() {
    match IoStep::from(sink.write(remaining)) {
      IoStep::Progress(0) => {
        return Err(SendError::PrematureClose {
          sent: *sent,
          cause: None,
        })
      }
      IoStep::Progress(n) => {
        *sent += n as u64;
        remaining = &remaining[n..];
      }
      IoStep::Retry => log::trace!("write interrupted, retrying"),
      IoStep::Fatal(e) if peer_closed(&e) => {
        return Err(SendError::PrematureClose {
          sent: *sent,
          cause: Some(e),
        })
      }
      IoStep::Fatal(e) => return Err(SendError::Write(e)),
    }
  }
  Ok(())
}
