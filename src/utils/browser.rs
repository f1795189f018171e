//! Launches the default browser for the consent page and the dashboard.
//!
//! Launching can be suppressed with [`NO_BROWSER_ENV`] for headless hosts;
//! callers print the URL instead whenever [`open`] reports it did not
//! launch anything.

use std::io;
use std::process::{Child, Command};

/// Set to any value to suppress browser launching (SSH sessions, CI).
pub const NO_BROWSER_ENV: &str = "VITALS_NO_BROWSER";

/// Open `url` in the default browser.
///
/// Returns `false` when launching was suppressed or the opener could not
/// be spawned; the caller is expected to fall back to printing the URL.
pub fn open(url: &str) -> bool {
    if std::env::var_os(NO_BROWSER_ENV).is_some() {
        return false;
    }
    spawn_opener(url).is_ok()
}

#[cfg(target_os = "windows")]
fn spawn_opener(url: &str) -> io::Result<Child> {
    Command::new("cmd").args(["/C", "start", url]).spawn()
}

#[cfg(target_os = "macos")]
fn spawn_opener(url: &str) -> io::Result<Child> {
    Command::new("open").arg(url).spawn()
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn spawn_opener(url: &str) -> io::Result<Child> {
    Command::new("xdg-open").arg(url).spawn()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suppressed_open_reports_not_launched() {
        // SAFETY: this test is the only writer of this variable.
        unsafe { std::env::set_var(NO_BROWSER_ENV, "1") };
        assert!(!open("http://127.0.0.1:9462"));
        unsafe { std::env::remove_var(NO_BROWSER_ENV) };
    }
}
