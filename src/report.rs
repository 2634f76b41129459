// src/report.rs
//
// Frame-rate extraction from a MediaInfo textual report.
//
// The CLI reads the container headers itself (ranged reads, not a whole-file
// load) and prints a `key : value` report per section. The only field
// consumed is the first `Frame rate : <float> FPS` line; everything else in
// the report is ignored.

use std::path::Path;
use std::process::Command;

use anyhow::Context;

use crate::paths::mediainfo_bin;

/// Run the analysis tool on `path` and return its textual report.
pub fn analyze(path: &Path) -> anyhow::Result<String> {
    let out = Command::new(mediainfo_bin())
        .arg(path)
        .output()
        .context("failed to launch the MediaInfo CLI")?;
    if !out.status.success() {
        anyhow::bail!(
            "MediaInfo exited with {}: {}",
            out.status,
            String::from_utf8_lossy(&out.stderr)
                .lines()
                .last()
                .unwrap_or(""),
        );
    }
    String::from_utf8(out.stdout).context("report was not valid UTF-8")
}

/// Value of the first `Frame rate : <digits>.<digits> FPS` line, if any.
///
/// Keys must match exactly: `Frame rate mode : Constant` is a different key,
/// and a value like `23.976 (24000/1001) FPS` or an integer-formatted rate
/// does not fit the grammar — such lines are skipped, not errors.
pub fn frame_rate_from_report(report: &str) -> Option<f64> {
    report.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if key.trim() != "Frame rate" {
            return None;
        }
        let mut parts = value.split_whitespace();
        let number = parts.next()?;
        if parts.next() != Some("FPS") || !number.contains('.') {
            return None;
        }
        number.parse::<f64>().ok().filter(|f| f.is_finite() && *f > 0.0)
    })
}

#[cfg(test)]
mod tests {
    use super::frame_rate_from_report;

    const REPORT: &str = "\
General
Complete name                            : clip.mp4
Format                                   : MPEG-4
Duration                                 : 10 s 0 ms

Video
Format                                   : AVC
Frame rate mode                          : Constant
Frame rate                               : 23.976 FPS
Bit depth                                : 8 bits
";

    #[test]
    fn finds_the_frame_rate_line() {
        assert_eq!(frame_rate_from_report(REPORT), Some(23.976));
    }

    #[test]
    fn missing_line_yields_none() {
        let report = "General\nFormat                : Matroska\n";
        assert_eq!(frame_rate_from_report(report), None);
    }

    #[test]
    fn mode_line_alone_does_not_match() {
        let report = "Video\nFrame rate mode                          : Constant\n";
        assert_eq!(frame_rate_from_report(report), None);
    }

    #[test]
    fn first_matching_line_wins() {
        let report = "\
Frame rate                               : 29.970 FPS
Frame rate                               : 25.000 FPS
";
        assert_eq!(frame_rate_from_report(report), Some(29.97));
    }

    #[test]
    fn parenthesised_rate_is_skipped() {
        let report = "\
Frame rate                               : 23.976 (24000/1001) FPS
Frame rate                               : 24.000 FPS
";
        assert_eq!(frame_rate_from_report(report), Some(24.0));
    }

    #[test]
    fn integer_rate_does_not_match() {
        let report = "Frame rate                               : 25 FPS\n";
        assert_eq!(frame_rate_from_report(report), None);
    }

    #[test]
    fn compact_spacing_matches() {
        assert_eq!(
            frame_rate_from_report("Frame rate : 59.940 FPS"),
            Some(59.94),
        );
    }
}
