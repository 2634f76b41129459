// src/modules/navigator.rs
use super::{FrameCache, PanelModule};
use crate::commands::NavCommand;
use crate::state::SessionState;
use crate::theme::{ACCENT, DARK_BG_2, DARK_TEXT_DIM, ERROR_RED};
use egui::{RichText, TextEdit, Ui};
use rfd::FileDialog;

const HELP_TEXT: &str = "Open a video and FrameSeek reads its frame rate from \
the container metadata. Type a frame number and press Go to jump the player \
to that frame's exact timestamp. If detection fails, type the rate yourself.";

pub struct NavigatorModule;

impl PanelModule for NavigatorModule {
    fn name(&self) -> &str {
        "Navigator"
    }

    fn ui(&mut self, ui: &mut Ui, state: &SessionState, _frames: &mut FrameCache, cmd: &mut Vec<NavCommand>) {
        // ── Hotkeys ──────────────────────────────────────────────────────────
        // Right-arrow steps a frame, but only when no field owns the cursor.
        if !ui.ctx().wants_keyboard_input()
            && ui.input(|i| i.key_pressed(egui::Key::ArrowRight))
        {
            cmd.push(NavCommand::AdvanceFrame);
        }

        ui.vertical(|ui| {
            // ── Header ───────────────────────────────────────────────────────
            egui::Frame::new()
                .fill(DARK_BG_2)
                .inner_margin(egui::Margin { left: 8, right: 8, top: 5, bottom: 5 })
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new("🎯 Frame Navigator").size(12.0).strong());
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            let help = ui
                                .button(RichText::new("ℹ").size(12.0))
                                .on_hover_text(HELP_TEXT);
                            if help.clicked() {
                                cmd.push(NavCommand::ToggleHelp);
                            }
                        });
                    });
                });

            // Pinned copy of the tooltip for touch/click interaction.
            if state.show_help {
                egui::Window::new("How it works")
                    .collapsible(false)
                    .resizable(false)
                    .default_width(260.0)
                    .show(ui.ctx(), |ui| {
                        ui.label(RichText::new(HELP_TEXT).size(11.0));
                        ui.add_space(4.0);
                        if ui.button("Close").clicked() {
                            cmd.push(NavCommand::ToggleHelp);
                        }
                    });
            }

            ui.add_space(8.0);

            // ── File intake ──────────────────────────────────────────────────
            if ui.button(RichText::new("📂 Open Video…").size(12.0)).clicked() {
                match FileDialog::new()
                    .add_filter(
                        "Video",
                        &["mp4", "mov", "mkv", "avi", "webm", "m4v", "mpg", "ts"],
                    )
                    .pick_file()
                {
                    Some(path) => cmd.push(NavCommand::ImportFile(path)),
                    None       => cmd.push(NavCommand::ImportCancelled),
                }
            }

            ui.add_space(8.0);

            // ── Calculator fields ────────────────────────────────────────────
            egui::Frame::new()
                .fill(DARK_BG_2)
                .inner_margin(egui::Margin::same(8))
                .corner_radius(egui::CornerRadius::same(5))
                .show(ui, |ui| {
                    egui::Grid::new("nav_fields")
                        .num_columns(2)
                        .spacing([8.0, 6.0])
                        .show(ui, |ui| {
                            ui.label(RichText::new("Frame rate (FPS)").size(11.0));
                            let mut fps_text = state.fps_text.clone();
                            if ui
                                .add(
                                    TextEdit::singleline(&mut fps_text)
                                        .hint_text("auto-detected")
                                        .desired_width(90.0),
                                )
                                .changed()
                            {
                                cmd.push(NavCommand::SetFpsText(fps_text));
                            }
                            ui.end_row();

                            ui.label(RichText::new("Frame #").size(11.0));
                            let mut frame_text = state.frame_text.clone();
                            let resp = ui.add(
                                TextEdit::singleline(&mut frame_text).desired_width(90.0),
                            );
                            if resp.changed() {
                                cmd.push(NavCommand::SetFrameText(frame_text));
                            }
                            if resp.lost_focus()
                                && ui.input(|i| i.key_pressed(egui::Key::Enter))
                            {
                                cmd.push(NavCommand::SeekToFrame);
                            }
                            ui.end_row();
                        });

                    ui.add_space(6.0);
                    ui.horizontal(|ui| {
                        if ui
                            .button(RichText::new("Go to Frame").size(12.0).strong())
                            .clicked()
                        {
                            cmd.push(NavCommand::SeekToFrame);
                        }
                        if ui.button(RichText::new("Next ▶").size(12.0)).clicked() {
                            cmd.push(NavCommand::AdvanceFrame);
                        }
                    });
                });

            ui.add_space(8.0);

            // ── Readouts ─────────────────────────────────────────────────────
            // Recomputed from the live fields every paint, so the display can
            // never lag the inputs.
            if let Some(total) = state.current_total_frames() {
                ui.label(RichText::new(format!("Total Frames: {total}")).size(12.0).monospace());
            }

            ui.add_space(4.0);
            if let Some(err) = &state.seek_error {
                ui.colored_label(ERROR_RED, RichText::new(err).size(11.0));
            } else if let Some(text) = &state.time_display {
                ui.label(RichText::new(text).size(12.0).color(ACCENT));
            }

            ui.add_space(8.0);
            ui.label(
                RichText::new("→ steps one frame when no field is focused")
                    .size(9.0)
                    .color(DARK_TEXT_DIM),
            );
        });
    }
}
