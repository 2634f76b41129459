// src/commands.rs
//
// Every user action in FrameSeek is expressed as a NavCommand.
// Panels emit these; app.rs processes them after the UI pass.
// Adding a feature = add a variant here + one match arm in app.rs.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum NavCommand {
    // ── File intake ──────────────────────────────────────────────────────────
    /// Bind `path`: reset dependent fields, start probing and analysis.
    ImportFile(PathBuf),
    /// The file dialog was dismissed without a pick.
    ImportCancelled,

    // ── Calculator ───────────────────────────────────────────────────────────
    SetFpsText(String),
    SetFrameText(String),
    /// Step the frame field forward by one (clamped to total frames), then seek.
    AdvanceFrame,
    /// Validate the fields and move the player to the computed timestamp.
    SeekToFrame,

    // ── Transport ────────────────────────────────────────────────────────────
    TogglePlayback,
    /// Pause and return to the start of the file.
    Rewind,
    ScrubTo(f64),

    // ── Help ─────────────────────────────────────────────────────────────────
    ToggleHelp,
}
