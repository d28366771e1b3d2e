//! Interactive master password entry.
//!
//! On a terminal, echo is disabled while the line is read. Otherwise the
//! first line of stdin is taken as-is, which is what scripts and tests use.

use crate::session::MasterPassword;
use std::io::IsTerminal;
use std::io::{self, BufRead, Read, Write};
use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("io error")]
    Io(#[from] io::Error),

    #[error("master password cannot be empty")]
    Empty,
}

pub fn prompt_master_password() -> Result<MasterPassword, PromptError> {
    let mut line = read_secret_line("Master password: ")?;
    if line.is_empty() {
        return Err(PromptError::Empty);
    }
    Ok(MasterPassword::new(std::mem::take(&mut *line)))
}

/// Read whatever is left on stdin after any prompt consumed its line.
pub fn read_remaining_stdin() -> Result<Zeroizing<String>, PromptError> {
    let mut buf = Zeroizing::new(String::new());
    io::stdin().lock().read_to_string(&mut buf)?;
    Ok(buf)
}

fn read_secret_line(prompt: &str) -> Result<Zeroizing<String>, PromptError> {
    eprint!("{prompt}");
    io::stderr().flush()?;

    #[cfg(unix)]
    if io::stdin().is_terminal() {
        return read_line_no_echo_unix();
    }

    read_line_plain()
}

fn read_line_plain() -> Result<Zeroizing<String>, PromptError> {
    let mut line = Zeroizing::new(String::new());
    io::stdin().lock().read_line(&mut line)?;
    let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed_len);
    Ok(line)
}

#[cfg(unix)]
fn read_line_no_echo_unix() -> Result<Zeroizing<String>, PromptError> {
    use std::mem::MaybeUninit;
    use std::os::unix::io::AsRawFd;

    let fd = io::stdin().as_raw_fd();

    // SAFETY: `fd` is stdin for the lifetime of this call and `original` is
    // only read after tcgetattr reports success.
    let original = unsafe {
        let mut original = MaybeUninit::<libc::termios>::uninit();
        if libc::tcgetattr(fd, original.as_mut_ptr()) != 0 {
            return read_line_plain();
        }
        original.assume_init()
    };

    let mut silent = original;
    silent.c_lflag &= !(libc::ECHO | libc::ECHONL);
    // SAFETY: `silent` is a valid termios copied from the current settings.
    let active = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &silent) == 0 };
    let _restore = EchoGuard {
        fd,
        original,
        active,
    };

    let line = read_line_plain()?;
    eprintln!();
    Ok(line)
}

/// Restores terminal echo when dropped, including on early return.
#[cfg(unix)]
struct EchoGuard {
    fd: i32,
    original: libc::termios,
    active: bool,
}

#[cfg(unix)]
impl Drop for EchoGuard {
    fn drop(&mut self) {
        if self.active {
            // SAFETY: restores the settings captured before echo was disabled.
            unsafe {
                let _ = libc::tcsetattr(self.fd, libc::TCSANOW, &self.original);
            }
        }
    }
}
