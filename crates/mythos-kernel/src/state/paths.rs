//! XDG Base Directory paths for mythOS state.
//!
//! | Purpose | XDG Variable | Default | mythOS Path |
//! |---------|--------------|---------|-------------|
//! | Snapshots | `$XDG_DATA_HOME` | `~/.local/share` | `$XDG_DATA_HOME/mythos/{name}.fs.json` |
//! | History | `$XDG_DATA_HOME` | `~/.local/share` | `$XDG_DATA_HOME/mythos/history.txt` |

use std::path::PathBuf;

use directories::BaseDirs;

/// Get the data directory for persistent state.
///
/// Uses `$XDG_DATA_HOME/mythos` or falls back to `~/.local/share/mythos`.
pub fn data_dir() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| dirs_fallback().join(".local").join("share"))
        .join("mythos")
}

/// Snapshot file for the machine called `name`.
pub fn snapshot_path(name: &str) -> PathBuf {
    data_dir().join(format!("{name}.fs.json"))
}

/// Line-editor history file.
pub fn history_path() -> PathBuf {
    data_dir().join("history.txt")
}

/// Fallback home directory when BaseDirs fails.
fn dirs_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}
