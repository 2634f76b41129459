// src/helpers/format.rs
//
// Display-side formatting for the player timecode and the seek readout.

/// Timecode frame rate used before detection has filled the fps field.
pub const TIMECODE_FALLBACK_FPS: f64 = 30.0;

/// Format a position in seconds as `MM:SS:FF` at the given frame rate.
/// A non-positive rate falls back to [`TIMECODE_FALLBACK_FPS`].
pub fn format_timecode(secs: f64, fps: f64) -> String {
    let fps = if fps > 0.0 { fps } else { TIMECODE_FALLBACK_FPS };
    let m  = (secs / 60.0) as u32;
    let sc = (secs % 60.0) as u32;
    let fr = ((secs * fps) as u64 % fps.ceil() as u64) as u32;
    format!("{m:02}:{sc:02}:{fr:02}")
}

/// Seconds with millisecond precision, as shown in the seek readout.
pub fn format_seconds(secs: f64) -> String {
    format!("{secs:.3}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timecode_at_zero() {
        assert_eq!(format_timecode(0.0, 30.0), "00:00:00");
    }

    #[test]
    fn timecode_counts_frames_within_the_second() {
        assert_eq!(format_timecode(61.5, 30.0), "01:01:15");
        assert_eq!(format_timecode(10.04, 25.0), "00:10:01");
    }

    #[test]
    fn timecode_falls_back_without_a_rate() {
        assert_eq!(format_timecode(1.0, 0.0), "00:01:00");
        assert_eq!(format_timecode(1.5, -5.0), "00:01:15");
    }

    #[test]
    fn seconds_keep_three_decimals() {
        assert_eq!(format_seconds(3.0), "3.000");
        assert_eq!(format_seconds(2.99), "2.990");
        assert_eq!(format_seconds(0.0), "0.000");
    }
}
