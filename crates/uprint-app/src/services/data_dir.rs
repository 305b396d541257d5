// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data directory resolution.

use std::path::{Path, PathBuf};

use uprint_core::error::Result;

/// Return the application data directory, creating it if needed.
///
/// An explicit `--data-dir` wins; otherwise `$XDG_DATA_HOME/uprint`, then
/// `~/.local/share/uprint`.
pub fn data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    let dir = match explicit {
        Some(path) => path.to_path_buf(),
        None => default_base(|key| std::env::var(key).ok()).join("uprint"),
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Return a subdirectory inside the data dir (e.g. "devices").
pub fn data_subdir(base: &Path, name: &str) -> Result<PathBuf> {
    let dir = base.join(name);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn default_base(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(xdg) = lookup("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg);
    }
    if let Some(home) = lookup("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    // Last resort
    std::env::temp_dir()
}
