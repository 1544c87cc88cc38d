use netsend::SendError;
use rand::{Rng, SeedableRng};
use std::io::{Read, Write};
use std::net::{Ipv4Addr, TcpListener};
use std::path::Path;
use std::process::Command;
use std::thread;
use tempfile::NamedTempFile;

fn init_logger() {
  let _ = env_logger::builder().is_test(true).try_init();
}

fn payload(len: usize) -> (NamedTempFile, Vec<u8>) {
  let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);
  let data: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
  let mut file = NamedTempFile::new().unwrap();
  file.write_all(&data).unwrap();
  file.flush().unwrap();
  (file, data)
}

/// Loopback listener that swallows everything from one connection.
fn sink_server() -> (u16, thread::JoinHandle<Vec<u8>>) {
  let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
  let port = listener.local_addr().unwrap().port();
  let handle = thread::spawn(move || {
    let (mut stream, _) = listener.accept().unwrap();
    let mut received = Vec::new();
    stream.read_to_end(&mut received).unwrap();
    received
  });
  (port, handle)
}

fn run(host: &str, port: &str, path: &Path) -> Result<netsend::TransferReport, SendError> {
  netsend::run(["netsend", host, port, path.to_str().unwrap()])
}

#[test]
fn sends_file_verbatim() {
  init_logger();
  let (file, data) = payload(10_000);
  let (port, server) = sink_server();

  let report = run("127.0.0.1", &port.to_string(), file.path()).unwrap();

  assert_eq!(report.bytes, 10_000);
  assert_eq!(server.join().unwrap(), data);
}

#[test]
fn sends_empty_file() {
  let (file, _) = payload(0);
  let (port, server) = sink_server();

  let report = run("127.0.0.1", &port.to_string(), file.path()).unwrap();

  assert_eq!(report.bytes, 0);
  assert_eq!(report.chunks, 0);
  assert!(server.join().unwrap().is_empty());
}

#[test]
fn sends_large_file() {
  init_logger();
  let (file, data) = payload(3 * 1024 * 1024 + 17);
  let (port, server) = sink_server();

  let report = run("127.0.0.1", &port.to_string(), file.path()).unwrap();

  assert_eq!(report.bytes, data.len() as u64);
  assert_eq!(server.join().unwrap(), data);
}

#[test]
fn missing_argument() {
  assert!(matches!(
    netsend::run(["netsend", "example.com", "80"]),
    Err(SendError::Usage(_))
  ));
}

#[test]
fn bad_port() {
  let (file, _) = payload(16);
  assert!(matches!(
    run("example.com", "abc", file.path()),
    Err(SendError::PortParse(_))
  ));
}

#[test]
fn missing_file_skips_resolution() {
  let dir = tempfile::tempdir().unwrap();
  // an unresolvable host: getting FileOpen back means no lookup was attempted
  let err = run("no-such-host.invalid", "80", &dir.path().join("missing.bin")).unwrap_err();
  assert!(matches!(err, SendError::FileOpen { .. }));
}

#[test]
fn unresolvable_host() {
  let (file, _) = payload(16);
  let err = run("no-such-host.invalid", "80", file.path()).unwrap_err();
  assert!(matches!(err, SendError::AddressResolution { .. }));
}

#[test]
fn peer_closes_early() {
  init_logger();
  // far more than the loopback socket buffers can absorb
  let (file, data) = payload(32 * 1024 * 1024);
  let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
  let port = listener.local_addr().unwrap().port();
  let server = thread::spawn(move || {
    let (mut stream, _) = listener.accept().unwrap();
    let mut head = vec![0; 4000];
    stream.read_exact(&mut head).unwrap();
    // closing with unread data resets the connection
    head
  });

  let err = run("127.0.0.1", &port.to_string(), file.path()).unwrap_err();

  match err {
    SendError::PrematureClose { sent, .. } => assert!(sent >= 4000 && sent < data.len() as u64),
    e => panic!("unexpected error {e:?}"),
  }
  assert_eq!(server.join().unwrap(), data[..4000]);
}

#[test]
fn exit_codes() {
  let bin = env!("CARGO_BIN_EXE_netsend");

  let status = Command::new(bin).args(["example.com", "80"]).output().unwrap();
  assert_eq!(status.status.code(), Some(1));
  assert!(!status.stderr.is_empty());

  let status = Command::new(bin).args(["example.com", "abc", "payload.bin"]).output().unwrap();
  assert_eq!(status.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&status.stderr).contains("invalid port number"));

  let status = Command::new(bin).arg("--help").output().unwrap();
  assert_eq!(status.status.code(), Some(0));

  let (file, data) = payload(10_000);
  let (port, server) = sink_server();
  let status = Command::new(bin)
    .args(["127.0.0.1", &port.to_string(), file.path().to_str().unwrap()])
    .output()
    .unwrap();
  assert_eq!(status.status.code(), Some(0));
  assert!(status.stdout.is_empty());
  assert_eq!(server.join().unwrap(), data);
}
