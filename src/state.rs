// src/state.rs
//
// Session state plus the pure frame/time math. No egui and no ffmpeg here —
// panels read this through &SessionState and app.rs mutates it when
// processing commands, so every calculation below is testable on its own.

use std::path::PathBuf;
use uuid::Uuid;

use crate::helpers::format::format_seconds;

/// Fixed back-off subtracted from every computed seek target so the landing
/// position sits just before the frame boundary instead of rounding into the
/// next frame.
pub const SEEK_EPSILON: f64 = 0.01;

/// Inline error for a frame-rate / frame-number pair that fails validation.
pub const INVALID_INPUT_MSG: &str =
    "Invalid input. Please enter valid numbers for FPS and Frame #.";

/// The currently opened file. `duration` stays 0 until the probe returns.
pub struct LoadedVideo {
    pub id:           Uuid,
    pub path:         PathBuf,
    pub name:         String,
    pub duration:     f64,
    pub picture_size: Option<(u32, u32)>,
}

/// A validated "go to frame" request, ready for the player to execute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekPlan {
    pub frame:   u64,
    pub total:   u64,
    /// Exact frame timestamp, `frame / fps`.
    pub seconds: f64,
    /// Where the player actually lands: `seconds` minus [`SEEK_EPSILON`],
    /// clamped at zero.
    pub target:  f64,
}

#[derive(Default)]
pub struct SessionState {
    pub video:            Option<LoadedVideo>,
    /// Frame-rate field. Auto-filled by analysis, freely editable by the user.
    pub fps_text:         String,
    /// Frame-number field.
    pub frame_text:       String,
    /// Readout for the last successful seek. Cleared on import.
    pub time_display:     Option<String>,
    /// Inline validation error. Shown instead of `time_display` when set.
    pub seek_error:       Option<String>,
    /// One-line status for the top bar ("No file selected").
    pub status:           Option<String>,
    pub current_time:     f64,
    pub is_playing:       bool,
    pub show_help:        bool,
    /// Imports waiting for app.rs to hand them to the media worker.
    pub pending_probes:   Vec<(Uuid, PathBuf)>,
    pub pending_analyses: Vec<(Uuid, PathBuf)>,
}

impl SessionState {
    /// Open `path`: clear every field derived from the previous file and
    /// queue a probe + a frame-rate analysis under a fresh generation token.
    pub fn load_file(&mut self, path: PathBuf) -> Uuid {
        self.fps_text.clear();
        self.frame_text.clear();
        self.time_display = None;
        self.seek_error   = None;
        self.status       = None;
        self.current_time = 0.0;
        self.is_playing   = false;

        let id = Uuid::new_v4();
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        self.video = Some(LoadedVideo {
            id,
            path: path.clone(),
            name,
            duration:     0.0,
            picture_size: None,
        });
        self.pending_probes.push((id, path.clone()));
        self.pending_analyses.push((id, path));
        id
    }

    /// The file dialog was dismissed without a pick. Status only — the
    /// previously loaded file (if any) stays bound.
    pub fn file_cancelled(&mut self) {
        self.status = Some("No file selected".into());
    }

    /// Does `id` belong to the currently loaded video? Worker results from a
    /// superseded import fail this check and are dropped.
    pub fn is_current(&self, id: Uuid) -> bool {
        self.video.as_ref().map(|v| v.id) == Some(id)
    }

    /// Probed duration arrived. Returns whether it applied to the current file.
    pub fn set_duration(&mut self, id: Uuid, seconds: f64) -> bool {
        match &mut self.video {
            Some(v) if v.id == id => {
                v.duration = seconds;
                true
            }
            _ => false,
        }
    }

    pub fn set_picture_size(&mut self, id: Uuid, width: u32, height: u32) -> bool {
        match &mut self.video {
            Some(v) if v.id == id => {
                v.picture_size = Some((width, height));
                true
            }
            _ => false,
        }
    }

    /// Analysis found a frame rate: round to two decimals and fill the field.
    /// Returns whether it applied to the current file.
    pub fn set_detected_fps(&mut self, id: Uuid, raw: f64) -> bool {
        if !self.is_current(id) {
            return false;
        }
        self.fps_text = format!("{}", round_fps(raw));
        true
    }

    pub fn duration(&self) -> f64 {
        self.video.as_ref().map(|v| v.duration).unwrap_or(0.0)
    }

    /// The frame-rate field as a number, if it parses at all.
    pub fn parsed_fps(&self) -> Option<f64> {
        self.fps_text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
    }

    /// Frame count to display, recomputed from the live inputs on every call.
    pub fn current_total_frames(&self) -> Option<u64> {
        total_frames(self.parsed_fps()?, self.duration())
    }

    /// Frame number after an "advance" press, or `None` when the step is not
    /// allowed (invalid rate, unknown duration, already at the last frame).
    /// An empty frame field counts as frame 0.
    pub fn advance_frame(&self) -> Option<u64> {
        let total   = self.current_total_frames()?;
        let current = self.frame_text.trim().parse::<u64>().unwrap_or(0);
        (total > current).then_some(current + 1)
    }

    /// Validate the fields and produce a seek plan.
    pub fn plan_seek(&self) -> Result<SeekPlan, &'static str> {
        let fps = self
            .parsed_fps()
            .filter(|f| *f > 0.0)
            .ok_or(INVALID_INPUT_MSG)?;
        let frame = self
            .frame_text
            .trim()
            .parse::<u64>()
            .map_err(|_| INVALID_INPUT_MSG)?;
        let total = total_frames(fps, self.duration()).ok_or(INVALID_INPUT_MSG)?;
        if frame > total {
            return Err(INVALID_INPUT_MSG);
        }
        let seconds = frame_to_seconds(frame, fps);
        Ok(SeekPlan {
            frame,
            total,
            seconds,
            target: (seconds - SEEK_EPSILON).max(0.0),
        })
    }

    /// Record a successful seek: time readout replaces any prior error and
    /// the playhead moves to the plan's target.
    pub fn apply_seek(&mut self, plan: &SeekPlan) {
        self.time_display = Some(format!(
            "Time at frame #{} (of {}): {} s",
            plan.frame,
            plan.total,
            format_seconds(plan.seconds),
        ));
        self.seek_error   = None;
        self.current_time = plan.target;
    }

    /// Record a failed seek: the error replaces the time readout.
    pub fn seek_failed(&mut self, msg: &'static str) {
        self.seek_error   = Some(msg.to_string());
        self.time_display = None;
    }
}

// ── Pure math ────────────────────────────────────────────────────────────────

/// `ceil(duration × fps)` when both inputs are usable, otherwise `None`
/// (the total-frames display is cleared rather than showing a guess).
pub fn total_frames(fps: f64, duration: f64) -> Option<u64> {
    (fps.is_finite() && fps > 0.0 && duration > 0.0)
        .then(|| (duration * fps).ceil() as u64)
}

pub fn frame_to_seconds(frame: u64, fps: f64) -> f64 {
    frame as f64 / fps
}

/// Detected rates are shown at two-decimal precision (23.976 → 23.98).
pub fn round_fps(raw: f64) -> f64 {
    (raw * 100.0).round() / 100.0
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// State with a probed 10-second video and the given field contents.
    fn loaded(fps: &str, frame: &str) -> SessionState {
        let mut state = SessionState::default();
        let id = state.load_file(PathBuf::from("/videos/clip.mp4"));
        state.set_duration(id, 10.0);
        state.fps_text   = fps.to_string();
        state.frame_text = frame.to_string();
        state
    }

    #[test]
    fn total_frames_matches_ceiling() {
        assert_eq!(total_frames(29.97, 10.0), Some(300));
        assert_eq!(total_frames(30.0, 10.0), Some(300));
        assert_eq!(total_frames(24.0, 0.5), Some(12));
    }

    #[test]
    fn total_frames_requires_positive_inputs() {
        assert_eq!(total_frames(0.0, 10.0), None);
        assert_eq!(total_frames(-24.0, 10.0), None);
        assert_eq!(total_frames(30.0, 0.0), None);
        assert_eq!(total_frames(f64::NAN, 10.0), None);
    }

    #[test]
    fn advance_steps_until_the_last_frame() {
        assert_eq!(loaded("30", "299").advance_frame(), Some(300));
        assert_eq!(loaded("30", "300").advance_frame(), None);
    }

    #[test]
    fn advance_from_empty_field_starts_at_one() {
        assert_eq!(loaded("30", "").advance_frame(), Some(1));
    }

    #[test]
    fn advance_needs_a_valid_rate() {
        assert_eq!(loaded("abc", "5").advance_frame(), None);
        assert_eq!(loaded("0", "5").advance_frame(), None);
    }

    #[test]
    fn seek_plan_computes_time_and_target() {
        let plan = loaded("30", "90").plan_seek().unwrap();
        assert_eq!(plan.frame, 90);
        assert_eq!(plan.total, 300);
        assert!((plan.seconds - 3.0).abs() < 1e-12);
        assert!((plan.target - 2.99).abs() < 1e-9);
    }

    #[test]
    fn seek_readout_shows_three_decimals() {
        let mut state = loaded("30", "90");
        let plan = state.plan_seek().unwrap();
        state.apply_seek(&plan);
        let text = state.time_display.unwrap();
        assert!(text.contains("3.000"), "unexpected readout: {text}");
        assert!(text.contains("#90"));
        assert!((state.current_time - 2.99).abs() < 1e-9);
    }

    #[test]
    fn seek_target_is_clamped_at_zero() {
        let plan = loaded("30", "0").plan_seek().unwrap();
        assert_eq!(plan.target, 0.0);
    }

    #[test]
    fn seek_rejects_non_numeric_rate() {
        assert_eq!(loaded("abc", "90").plan_seek(), Err(INVALID_INPUT_MSG));
    }

    #[test]
    fn seek_rejects_frame_past_total() {
        assert_eq!(loaded("30", "301").plan_seek(), Err(INVALID_INPUT_MSG));
        assert!(loaded("30", "300").plan_seek().is_ok());
    }

    #[test]
    fn seek_rejects_fractional_and_negative_frames() {
        assert_eq!(loaded("30", "90.5").plan_seek(), Err(INVALID_INPUT_MSG));
        assert_eq!(loaded("30", "-1").plan_seek(), Err(INVALID_INPUT_MSG));
    }

    #[test]
    fn seek_requires_a_probed_duration() {
        let mut state = SessionState::default();
        state.load_file(PathBuf::from("/videos/clip.mp4"));
        state.fps_text   = "30".into();
        state.frame_text = "1".into();
        assert_eq!(state.plan_seek(), Err(INVALID_INPUT_MSG));
    }

    #[test]
    fn error_and_readout_displace_each_other() {
        let mut state = loaded("30", "90");
        let plan = state.plan_seek().unwrap();
        state.apply_seek(&plan);
        state.seek_failed(INVALID_INPUT_MSG);
        assert!(state.time_display.is_none());
        assert_eq!(state.seek_error.as_deref(), Some(INVALID_INPUT_MSG));
    }

    #[test]
    fn recomputation_is_idempotent() {
        let state = loaded("29.97", "0");
        assert_eq!(state.current_total_frames(), state.current_total_frames());
        assert_eq!(state.current_total_frames(), Some(300));
    }

    #[test]
    fn detected_fps_rounds_to_two_decimals() {
        let mut state = SessionState::default();
        let id = state.load_file(PathBuf::from("/videos/clip.mp4"));
        assert!(state.set_detected_fps(id, 23.976));
        assert_eq!(state.fps_text, "23.98");
        assert!(state.set_detected_fps(id, 29.97));
        assert_eq!(state.fps_text, "29.97");
        assert!(state.set_detected_fps(id, 30.0));
        assert_eq!(state.fps_text, "30");
    }

    #[test]
    fn stale_results_are_dropped() {
        let mut state = loaded("25", "0");
        let stale = Uuid::new_v4();
        assert!(!state.set_duration(stale, 99.0));
        assert!(!state.set_detected_fps(stale, 60.0));
        assert!(!state.set_picture_size(stale, 640, 480));
        assert_eq!(state.duration(), 10.0);
        assert_eq!(state.fps_text, "25");
    }

    #[test]
    fn loading_resets_dependent_fields() {
        let mut state = loaded("30", "90");
        let plan = state.plan_seek().unwrap();
        state.apply_seek(&plan);
        state.file_cancelled();

        state.load_file(PathBuf::from("/videos/other.mkv"));
        assert!(state.fps_text.is_empty());
        assert!(state.frame_text.is_empty());
        assert!(state.time_display.is_none());
        assert!(state.status.is_none());
        assert_eq!(state.current_time, 0.0);
        // One probe + one analysis queued per import.
        assert_eq!(state.pending_probes.len(), 2);
        assert_eq!(state.pending_analyses.len(), 2);
    }

    #[test]
    fn cancelled_pick_only_sets_status() {
        let mut state = loaded("30", "90");
        state.file_cancelled();
        assert_eq!(state.status.as_deref(), Some("No file selected"));
        assert_eq!(state.fps_text, "30");
        assert!(state.video.is_some());
    }
}
