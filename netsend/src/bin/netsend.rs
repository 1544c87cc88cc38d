use netsend::{cli_util::report_error, SendError};
use std::process::ExitCode;

fn main() -> ExitCode {
  env_logger::init();

  match netsend::run(std::env::args_os()) {
    Ok(report) => {
      log::debug!("transfer finished: {:?}", report);
      ExitCode::SUCCESS
    }
    // --help and --version land here too, they are not failures
    Err(SendError::Usage(e)) if !e.use_stderr() => {
      let _ = e.print();
      ExitCode::SUCCESS
    }
    Err(e) => {
      report_error(&e);
      ExitCode::from(e.exit_code())
    }
  }
}
