use crate::SendError;
use console::{style, StyledObject};

pub fn error_prompt<D>(prompt: D) -> StyledObject<D> {
  style(prompt).for_stderr().red().bold()
}
pub fn note_prompt<D>(prompt: D) -> StyledObject<D> {
  style(prompt).for_stderr().yellow().dim()
}

/// Print `err` on stderr, once.
/// Usage errors are printed the way clap renders them, usage line included.
pub fn report_error(err: &SendError) {
  match err {
    SendError::Usage(e) => {
      let _ = e.print();
    }
    SendError::PrematureClose { sent, .. } => {
      eprintln!("{} {err}", error_prompt("error:"));
      eprintln!("{}", note_prompt(format!("the peer received at most {sent} bytes")));
    }
    _ => eprintln!("{} {err}", error_prompt("error:")),
  }
}
