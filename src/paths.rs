//! Default filesystem locations.

use std::path::PathBuf;

pub use crate::settings::default_settings_path;

/// Environment variable overriding the daemon socket path.
pub const SOCKET_ENV: &str = "UIBO_SOCKET";

/// Socket path relative to the home directory.
const DEFAULT_SOCKET_PATH: &str = ".uibo/uibo.sock";

/// Returns `~/.uibo/uibo.sock`, or a path under the temp dir when no home
/// directory is known.
pub fn default_socket_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(DEFAULT_SOCKET_PATH)
}

/// Returns `<data dir>/uibo/sounds`, where the alert and ambient sound files
/// live.
pub fn default_sounds_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("uibo").join("sounds"))
}
