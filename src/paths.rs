// src/paths.rs
// Single source of truth for locating the MediaInfo CLI.

use std::path::PathBuf;

/// GUI launches don't inherit a login-shell PATH on every platform, so the
/// usual install locations are checked before falling back to plain `PATH`
/// resolution.
pub fn mediainfo_bin() -> PathBuf {
    #[cfg(target_os = "windows")]
    let candidates = [r"C:\Program Files\MediaInfo\MediaInfo.exe"];
    #[cfg(not(target_os = "windows"))]
    let candidates = [
        "/opt/homebrew/bin/mediainfo", // Apple Silicon
        "/usr/local/bin/mediainfo",    // Intel Mac / manual install
        "/usr/bin/mediainfo",          // distro package
    ];

    for cand in candidates {
        let p = PathBuf::from(cand);
        if p.exists() {
            return p;
        }
    }

    #[cfg(target_os = "windows")]
    let name = "MediaInfo.exe";
    #[cfg(not(target_os = "windows"))]
    let name = "mediainfo";
    PathBuf::from(name)
}
