//! Line-oriented terminal input

use anyhow::{Context, Result};
use std::io::{self, BufRead, IsTerminal, Write};

/// Print `label` and read one line. `None` on end of input.
pub fn prompt_line(label: &str) -> Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;

    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Like `prompt_line`, but blank input keeps `default`.
pub fn prompt_with_default(label: &str, default: Option<&str>) -> Result<Option<String>> {
    let label = match default {
        Some(value) if !value.is_empty() => format!("{} [{}]: ", label, value),
        _ => format!("{}: ", label),
    };

    Ok(prompt_line(&label)?.map(|input| {
        if input.is_empty() {
            default.unwrap_or_default().to_string()
        } else {
            input
        }
    }))
}

/// Read a secret without echoing it when stdin is a terminal.
pub fn prompt_secret(label: &str) -> Result<Option<String>> {
    let _guard = if io::stdin().is_terminal() {
        match DisableEcho::new() {
            Ok(guard) => Some(guard),
            Err(e) => {
                tracing::warn!("Could not disable terminal echo: {}", e);
                None
            }
        }
    } else {
        None
    };

    let secret = prompt_line(&format!("{}: ", label))?;
    println!();
    Ok(secret)
}

struct DisableEcho {
    #[cfg(unix)]
    original: libc::termios,
}

impl DisableEcho {
    #[cfg(unix)]
    fn new() -> Result<Self> {
        use std::mem::MaybeUninit;
        use std::os::unix::io::AsRawFd;

        let fd = io::stdin().as_raw_fd();
        let mut termios = MaybeUninit::<libc::termios>::uninit();

        unsafe {
            if libc::tcgetattr(fd, termios.as_mut_ptr()) != 0 {
                anyhow::bail!("Failed to get terminal attributes");
            }
            let original = termios.assume_init();
            let mut new = original;
            new.c_lflag &= !libc::ECHO;
            if libc::tcsetattr(fd, libc::TCSANOW, &new) != 0 {
                anyhow::bail!("Failed to set terminal attributes");
            }
            Ok(Self { original })
        }
    }

    #[cfg(not(unix))]
    fn new() -> Result<Self> {
        Ok(Self {})
    }
}

#[cfg(unix)]
impl Drop for DisableEcho {
    fn drop(&mut self) {
        use std::os::unix::io::AsRawFd;
        let fd = io::stdin().as_raw_fd();
        unsafe {
            libc::tcsetattr(fd, libc::TCSANOW, &self.original);
        }
    }
}
