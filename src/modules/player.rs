// src/modules/player.rs
use super::{FrameCache, PanelModule};
use crate::commands::NavCommand;
use crate::helpers::format::format_timecode;
use crate::state::SessionState;
use crate::theme::{ACCENT, DARK_BG_2, DARK_BORDER, DARK_TEXT_DIM};
use egui::{Color32, Pos2, Rect, RichText, Sense, Stroke, Ui, Vec2};
use uuid::Uuid;

// Height reserved below the canvas for the transport row and link row.
const BAR_H:  f32 = 30.0;
const LINK_H: f32 = 22.0;

pub struct PlayerModule {
    /// Last decoded frame, keyed by the video it belongs to. Held across
    /// ticks so decode latency never flashes the empty canvas; dropped the
    /// moment a different file is bound.
    held_frame: Option<(Uuid, egui::TextureHandle)>,
}

impl PlayerModule {
    pub fn new() -> Self {
        Self { held_frame: None }
    }
}

impl PanelModule for PlayerModule {
    fn name(&self) -> &str {
        "Player"
    }

    fn ui(&mut self, ui: &mut Ui, state: &SessionState, frames: &mut FrameCache, cmd: &mut Vec<NavCommand>) {
        ui.vertical(|ui| {
            // ── Header ───────────────────────────────────────────────────────
            egui::Frame::new()
                .fill(DARK_BG_2)
                .inner_margin(egui::Margin { left: 8, right: 8, top: 5, bottom: 5 })
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new("📺 Player").size(12.0).strong());
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if let Some(video) = &state.video {
                                let mut info = String::new();
                                if let Some((w, h)) = video.picture_size {
                                    info.push_str(&format!("{w}x{h}"));
                                }
                                if video.duration > 0.0 {
                                    if !info.is_empty() {
                                        info.push_str("  ·  ");
                                    }
                                    info.push_str(&format!("{:.1}s", video.duration));
                                }
                                ui.label(RichText::new(info).size(10.0).color(DARK_TEXT_DIM));
                            }
                        });
                    });
                });

            ui.add_space(4.0);

            // ── Canvas ───────────────────────────────────────────────────────
            // Full width allocated, canvas drawn centered inside it at the
            // probed picture ratio (16:9 before the probe lands).
            let ratio = state
                .video
                .as_ref()
                .and_then(|v| v.picture_size)
                .map(|(w, h)| w as f32 / h.max(1) as f32)
                .unwrap_or(16.0 / 9.0);
            let panel_w = ui.available_width();
            let panel_h = (ui.available_height() - BAR_H - LINK_H - 16.0).max(80.0);

            let (canvas_w, canvas_h) = {
                let h = panel_w / ratio;
                if h <= panel_h { (panel_w, h) } else { (panel_h * ratio, panel_h) }
            };

            let (outer_rect, _) =
                ui.allocate_exact_size(Vec2::new(panel_w, canvas_h), Sense::hover());
            let canvas =
                Rect::from_center_size(outer_rect.center(), Vec2::new(canvas_w, canvas_h));
            let painter = ui.painter();

            painter.rect_stroke(
                canvas.expand(1.0), 4.0,
                Stroke::new(1.0, DARK_BORDER),
                egui::StrokeKind::Outside,
            );
            painter.rect_filled(canvas, 3.0, Color32::BLACK);

            if let Some(video) = &state.video {
                if let Some(tex) = frames.get(&video.id) {
                    self.held_frame = Some((video.id, tex.clone()));
                } else if self.held_frame.as_ref().map(|(id, _)| *id) != Some(video.id) {
                    self.held_frame = None;
                }

                if let Some((_, tex)) = &self.held_frame {
                    painter.image(
                        tex.id(), canvas,
                        Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                        Color32::WHITE,
                    );
                } else {
                    // First frame not decoded yet — name + spinner.
                    painter.text(
                        canvas.center() - egui::vec2(0.0, 20.0),
                        egui::Align2::CENTER_CENTER,
                        &video.name,
                        egui::FontId::proportional(13.0),
                        Color32::from_gray(70),
                    );
                    let t  = ui.input(|i| i.time) as f32;
                    let cx = canvas.center() + egui::vec2(0.0, 20.0);
                    let r  = 12.0_f32;
                    painter.circle_stroke(cx, r, Stroke::new(1.5, Color32::from_gray(35)));
                    let a = t * 3.5;
                    painter.line_segment(
                        [cx, cx + egui::vec2(a.cos() * r, a.sin() * r)],
                        Stroke::new(2.0, ACCENT),
                    );
                    ui.ctx().request_repaint();
                }
            } else {
                self.held_frame = None;
                painter.text(
                    canvas.center(),
                    egui::Align2::CENTER_CENTER,
                    "NO VIDEO",
                    egui::FontId::monospace(14.0),
                    Color32::from_gray(40),
                );
                painter.text(
                    canvas.center() + egui::vec2(0.0, 24.0),
                    egui::Align2::CENTER_CENTER,
                    "Open a file or drop one anywhere",
                    egui::FontId::proportional(11.0),
                    Color32::from_gray(60),
                );
            }

            ui.add_space(6.0);

            // ── Transport ────────────────────────────────────────────────────
            ui.horizontal(|ui| {
                let has_video = state.video.is_some();

                if ui
                    .add_enabled(has_video, egui::Button::new(RichText::new("⏮").size(14.0)))
                    .clicked()
                {
                    cmd.push(NavCommand::Rewind);
                }
                let play_icon = if state.is_playing { "⏸" } else { "▶" };
                if ui
                    .add_enabled(has_video, egui::Button::new(RichText::new(play_icon).size(14.0)))
                    .clicked()
                {
                    cmd.push(NavCommand::TogglePlayback);
                }

                ui.label(
                    RichText::new(format_timecode(
                        state.current_time,
                        state.parsed_fps().unwrap_or(0.0),
                    ))
                    .monospace()
                    .size(12.0)
                    .color(ACCENT),
                );

                let duration = state.duration();
                if duration > 0.0 {
                    ui.spacing_mut().slider_width = (ui.available_width() - 16.0).max(60.0);
                    let mut t = state.current_time;
                    if ui
                        .add(
                            egui::Slider::new(&mut t, 0.0..=duration)
                                .show_value(false)
                                .trailing_fill(true),
                        )
                        .changed()
                    {
                        cmd.push(NavCommand::ScrubTo(t));
                    }
                }
            });

            // ── Link row ─────────────────────────────────────────────────────
            // Revealed once a file is bound, like the player itself.
            if let Some(video) = &state.video {
                ui.add_space(2.0);
                ui.horizontal(|ui| {
                    ui.hyperlink_to(
                        RichText::new(format!("🔗 {}", video.name)).size(11.0),
                        format!("file://{}", video.path.display()),
                    );
                    ui.label(
                        RichText::new(video.path.display().to_string())
                            .size(10.0)
                            .color(DARK_TEXT_DIM),
                    );
                });
            }
        });
    }
}
