use std::io;
use std::process::{Command, Stdio};

/// Platform command used to open a url in the default browser.
#[cfg(target_os = "macos")]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(url);
    cmd
}

// No shell in between: `&` and `^` in the url must reach the handler verbatim
#[cfg(target_os = "windows")]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("rundll32");
    cmd.args(["url.dll,FileProtocolHandler", url]);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(url);
    cmd
}

/// Only web urls are handed to the system opener.
pub fn is_openable(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

/// Launch the system browser on `url` without waiting for it.
pub fn open_url(url: &str) -> io::Result<()> {
    if !is_openable(url) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing to open non-web url {url:?}"),
        ));
    }

    let mut child = opener(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    // Reap the opener so it does not linger as a zombie
    std::thread::spawn(move || {
        if let Err(e) = child.wait() {
            tracing::debug!("Browser opener did not exit cleanly: {e}");
        }
    });
    Ok(())
}

/// Activation handler for the notification tray.
pub fn activate(url: &str) {
    match open_url(url) {
        Ok(()) => tracing::info!(url, "Opened notification"),
        Err(e) => tracing::warn!(url, "Failed to open notification: {e}"),
    }
}
