// src/app.rs
use crate::commands::NavCommand;
use crate::media::{MediaResult, MediaWorker};
use crate::modules::{navigator::NavigatorModule, player::PlayerModule, FrameCache, PanelModule};
use crate::state::SessionState;
use crate::theme::{configure_style, ACCENT};
use eframe::egui;
use uuid::Uuid;

// ── App ───────────────────────────────────────────────────────────────────────

pub struct FrameSeekApp {
    state:          SessionState,
    player:         PlayerModule,
    navigator:      NavigatorModule,
    frame_cache:    FrameCache,
    media_worker:   MediaWorker,
    /// (video token, fps-granular bucket) of the last requested preview frame.
    last_frame_req: Option<(Uuid, u32)>,
    /// Commands emitted by panels each frame, processed after the UI pass.
    pending_cmds:   Vec<NavCommand>,
}

impl FrameSeekApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        configure_style(&cc.egui_ctx);
        // Pin to dark mode — prevents egui overwriting our theme on OS
        // light/dark changes.
        cc.egui_ctx.options_mut(|o| {
            o.theme_preference = egui::ThemePreference::Dark;
        });

        Self {
            state:          SessionState::default(),
            player:         PlayerModule::new(),
            navigator:      NavigatorModule,
            frame_cache:    FrameCache::new(),
            media_worker:   MediaWorker::new(),
            last_frame_req: None,
            pending_cmds:   Vec::new(),
        }
    }

    fn process_command(&mut self, cmd: NavCommand) {
        match cmd {
            // ── File intake ──────────────────────────────────────────────────
            NavCommand::ImportFile(path) => {
                eprintln!("[app] open {}", path.display());
                self.frame_cache.clear();
                self.last_frame_req = None;
                self.state.load_file(path);
            }
            NavCommand::ImportCancelled => {
                self.state.file_cancelled();
            }

            // ── Calculator ───────────────────────────────────────────────────
            NavCommand::SetFpsText(s)   => self.state.fps_text = s,
            NavCommand::SetFrameText(s) => self.state.frame_text = s,
            NavCommand::AdvanceFrame => {
                if let Some(next) = self.state.advance_frame() {
                    self.state.frame_text = next.to_string();
                    self.seek_to_frame();
                }
            }
            NavCommand::SeekToFrame => self.seek_to_frame(),

            // ── Transport ────────────────────────────────────────────────────
            NavCommand::TogglePlayback => {
                if self.state.video.is_some() {
                    let total = self.state.duration();
                    if !self.state.is_playing
                        && total > 0.0
                        && self.state.current_time >= total - 0.1
                    {
                        self.state.current_time = 0.0;
                    }
                    self.state.is_playing = !self.state.is_playing;
                }
            }
            NavCommand::Rewind => {
                self.state.is_playing   = false;
                self.state.current_time = 0.0;
                self.request_frame_at(0.0);
            }
            NavCommand::ScrubTo(t) => {
                self.state.current_time = t;
                self.request_frame_at(t);
            }

            // ── Help ─────────────────────────────────────────────────────────
            NavCommand::ToggleHelp => self.state.show_help = !self.state.show_help,
        }
    }

    fn seek_to_frame(&mut self) {
        match self.state.plan_seek() {
            Ok(plan) => {
                eprintln!(
                    "[app] frame {} → {:.3}s (target {:.3}s)",
                    plan.frame, plan.seconds, plan.target
                );
                self.state.apply_seek(&plan);
                self.request_frame_at(plan.target);
            }
            Err(msg) => self.state.seek_failed(msg),
        }
    }

    /// Ask the decode worker for the frame at `t`. Every seek renders
    /// explicitly, so the player always shows the position it sits at.
    fn request_frame_at(&mut self, t: f64) {
        let fps = self.display_fps();
        if let Some(video) = &self.state.video {
            self.last_frame_req = Some((video.id, bucket_of(t, fps)));
            self.media_worker.request_frame(video.id, video.path.clone(), t);
        }
    }

    /// Frame rate driving preview granularity; 30 until a real rate is known.
    fn display_fps(&self) -> f64 {
        self.state.parsed_fps().filter(|f| *f > 0.0).unwrap_or(30.0)
    }

    fn poll_media(&mut self, ctx: &egui::Context) {
        // Hand queued imports to the worker threads.
        let probes: Vec<_> = self.state.pending_probes.drain(..).collect();
        for (id, path) in probes {
            self.media_worker.probe_file(id, path);
        }
        let analyses: Vec<_> = self.state.pending_analyses.drain(..).collect();
        for (id, path) in analyses {
            self.media_worker.analyze_file(id, path);
        }

        // Results from a superseded import carry a stale token and are
        // dropped by the state setters / the is_current check below.
        while let Ok(result) = self.media_worker.rx.try_recv() {
            match result {
                MediaResult::Duration { id, seconds } => {
                    if self.state.set_duration(id, seconds) {
                        // First sight of the file — render its opening frame.
                        self.request_frame_at(self.state.current_time);
                        ctx.request_repaint();
                    }
                }
                MediaResult::PictureSize { id, width, height } => {
                    if self.state.set_picture_size(id, width, height) {
                        ctx.request_repaint();
                    }
                }
                MediaResult::FrameRate { id, fps } => {
                    if self.state.set_detected_fps(id, fps) {
                        eprintln!("[app] fps field ← {} (raw {fps})", self.state.fps_text);
                        ctx.request_repaint();
                    }
                }
                MediaResult::Frame { id, width, height, data } => {
                    if !self.state.is_current(id) {
                        continue;
                    }
                    let tex = ctx.load_texture(
                        format!("frame-{id}"),
                        egui::ColorImage::from_rgba_unmultiplied(
                            [width as usize, height as usize],
                            &data,
                        ),
                        egui::TextureOptions::LINEAR,
                    );
                    self.frame_cache.insert(id, tex);
                    ctx.request_repaint();
                }
                MediaResult::Error { id, msg } => {
                    // Log-only: a failed probe or decode never resets UI state.
                    eprintln!("[media] {id}: {msg}");
                }
            }
        }
    }

    fn tick_playback(&mut self, ctx: &egui::Context) {
        if !self.state.is_playing {
            return;
        }

        let dt = ctx.input(|i| i.stable_dt as f64);
        self.state.current_time += dt;
        let total = self.state.duration();
        if total > 0.0 && self.state.current_time >= total {
            self.state.current_time = total - 0.001;
            self.state.is_playing   = false;
        }

        // Preview frames at frame-rate granularity; the bucket dedup keeps
        // the decode slot from being rewritten every paint.
        let fps = self.display_fps();
        if let Some(video) = &self.state.video {
            let bucket = bucket_of(self.state.current_time, fps);
            let key    = (video.id, bucket);
            if self.last_frame_req != Some(key) {
                self.last_frame_req = Some(key);
                self.media_worker
                    .request_frame(video.id, video.path.clone(), bucket as f64 / fps);
            }
        }
        ctx.request_repaint();
    }

    fn handle_drag_and_drop(&mut self, ctx: &egui::Context) {
        let files = ctx.input(|i| i.raw.dropped_files.clone());
        for file in files {
            if let Some(path) = file.path {
                self.pending_cmds.push(NavCommand::ImportFile(path));
            }
        }
    }
}

/// Index of the preview frame containing `t` at the given rate.
fn bucket_of(t: f64, fps: f64) -> u32 {
    (t * fps) as u32
}

// ── eframe::App ───────────────────────────────────────────────────────────────

impl eframe::App for FrameSeekApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.media_worker.shutdown();
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_drag_and_drop(ctx);
        self.poll_media(ctx);

        egui::TopBottomPanel::top("top_panel")
            .exact_height(34.0)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new("🎯 FrameSeek")
                            .strong()
                            .size(15.0)
                            .color(ACCENT),
                    );
                    ui.separator();
                    let line = if let Some(video) = &self.state.video {
                        format!("Selected: {}", video.name)
                    } else if let Some(status) = &self.state.status {
                        status.clone()
                    } else {
                        "Open a video or drop it anywhere".into()
                    };
                    ui.label(egui::RichText::new(line).size(12.0).weak());
                });
            });

        egui::SidePanel::right("navigator_panel")
            .resizable(true)
            .default_width(280.0)
            .min_width(230.0)
            .show(ctx, |ui| {
                self.navigator
                    .ui(ui, &self.state, &mut self.frame_cache, &mut self.pending_cmds);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.player
                .ui(ui, &self.state, &mut self.frame_cache, &mut self.pending_cmds);
        });

        // ── Process commands emitted by panels this frame ─────────────────────
        let cmds: Vec<NavCommand> = self.pending_cmds.drain(..).collect();
        for cmd in cmds {
            self.process_command(cmd);
        }

        self.tick_playback(ctx);
    }
}
