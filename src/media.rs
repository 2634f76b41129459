// src/media.rs
//
// Background media work: in-process probing, frame-rate analysis, and
// seek-frame decoding. No egui here — results travel to the UI over a
// channel, tagged with the generation token of the import that started them.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Condvar, Mutex,
};
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use uuid::Uuid;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::{input, Pixel};
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{context::Context as SwsContext, flag::Flags};

use crate::report;

// ── Result types ─────────────────────────────────────────────────────────────

/// Results sent from the worker threads to the UI.
pub enum MediaResult {
    Duration    { id: Uuid, seconds: f64 },
    PictureSize { id: Uuid, width: u32, height: u32 },
    /// Raw frame rate pulled out of the analysis report (not yet rounded).
    FrameRate   { id: Uuid, fps: f64 },
    /// Decoded RGBA preview frame for the player surface.
    Frame       { id: Uuid, width: u32, height: u32, data: Vec<u8> },
    Error       { id: Uuid, msg: String },
}

// ── Frame request (latest-wins) ──────────────────────────────────────────────

struct FrameRequest {
    id:        Uuid,
    path:      PathBuf,
    timestamp: f64,
}

// ── Stateful seek decoder ────────────────────────────────────────────────────

/// Kept open across forward seeks within the same file; reopened on a new
/// file, any backward movement, or a forward jump too large to decode through.
struct SeekDecoder {
    path:      PathBuf,
    ictx:      ffmpeg::format::context::Input,
    decoder:   ffmpeg::decoder::video::Video,
    video_idx: usize,
    last_pts:  i64,
    tb_num:    i32,
    tb_den:    i32,
    out_w:     u32,
    out_h:     u32,
    scaler:    SwsContext,
}

impl SeekDecoder {
    fn open(path: &PathBuf, timestamp: f64) -> anyhow::Result<Self> {
        let mut ictx = input(path)?;
        let video_idx = ictx
            .streams()
            .best(Type::Video)
            .ok_or_else(|| anyhow::anyhow!("no video stream"))?
            .index();

        let (tb_num, tb_den, seek_ts, raw_w, raw_h) = {
            let stream = ictx.stream(video_idx).unwrap();
            let tb = stream.time_base();
            let seek_ts =
                (timestamp * tb.denominator() as f64 / tb.numerator() as f64) as i64;
            let (w, h) = unsafe {
                let p = stream.parameters().as_ptr();
                ((*p).width as u32, (*p).height as u32)
            };
            (tb.numerator(), tb.denominator(), seek_ts, w, h)
        };

        let _ = ictx.seek(seek_ts, ..=seek_ts);

        // Decoder params come from a second open — Parameters borrows from ictx.
        let ictx2 = input(path)?;
        let stream2 = ictx2
            .stream(video_idx)
            .ok_or_else(|| anyhow::anyhow!("video stream vanished on reopen"))?;
        let dec_ctx = ffmpeg::codec::context::Context::from_parameters(stream2.parameters())?;
        let decoder = dec_ctx.decoder().video()?;

        let (out_w, out_h) = preview_size(raw_w, raw_h);

        let scaler = SwsContext::get(
            decoder.format(), decoder.width(), decoder.height(),
            Pixel::RGBA, out_w, out_h, Flags::BILINEAR,
        )?;

        Ok(Self {
            path: path.clone(),
            ictx,
            decoder,
            video_idx,
            last_pts: seek_ts,
            tb_num,
            tb_den,
            out_w,
            out_h,
            scaler,
        })
    }

    fn ts_to_pts(&self, t: f64) -> i64 {
        (t * self.tb_den as f64 / self.tb_num as f64) as i64
    }

    /// Decode forward to the first frame at or past `target_pts`. RGBA pixels.
    fn advance_to(&mut self, target_pts: i64) -> Option<(Vec<u8>, u32, u32)> {
        for (stream, packet) in self.ictx.packets().flatten() {
            if stream.index() != self.video_idx {
                continue;
            }
            if self.decoder.send_packet(&packet).is_err() {
                continue;
            }
            let mut decoded = ffmpeg::util::frame::video::Video::empty();
            while self.decoder.receive_frame(&mut decoded).is_ok() {
                let pts = decoded.pts().unwrap_or(self.last_pts + 1);
                self.last_pts = pts;
                if pts < target_pts {
                    continue;
                }
                let mut rgba = ffmpeg::util::frame::video::Video::empty();
                if self.scaler.run(&decoded, &mut rgba).is_err() {
                    return None;
                }
                return Some((destripe(&rgba, self.out_w, self.out_h), self.out_w, self.out_h));
            }
        }
        None
    }
}

/// Native size capped at 960 px wide; height proportional and even.
fn preview_size(raw_w: u32, raw_h: u32) -> (u32, u32) {
    let w = raw_w.clamp(2, 960);
    let h = ((w as f64 * raw_h as f64 / raw_w.max(1) as f64) as u32).max(2) & !1;
    (w, h)
}

/// Copy visible pixels row by row, dropping the stride padding.
fn destripe(frame: &ffmpeg::util::frame::video::Video, w: u32, h: u32) -> Vec<u8> {
    let stride = frame.stride(0);
    let raw = frame.data(0);
    let row_bytes = w as usize * 4;
    (0..h as usize)
        .flat_map(|row| &raw[row * stride..row * stride + row_bytes])
        .copied()
        .collect()
}

// ── Worker ───────────────────────────────────────────────────────────────────

pub struct MediaWorker {
    pub rx:    Receiver<MediaResult>,
    tx:        Sender<MediaResult>,
    /// Latest-wins slot: the UI always overwrites, the decode thread always
    /// takes the newest request.
    frame_req: Arc<(Mutex<Option<FrameRequest>>, Condvar)>,
    shutdown:  Arc<AtomicBool>,
}

impl MediaWorker {
    pub fn new() -> Self {
        let (tx, rx) = bounded(64);
        let frame_req: Arc<(Mutex<Option<FrameRequest>>, Condvar)> =
            Arc::new((Mutex::new(None), Condvar::new()));

        let result_tx = tx.clone();
        let slot = Arc::clone(&frame_req);
        thread::spawn(move || {
            let mut live: Option<SeekDecoder> = None;
            loop {
                // Block until a request is available.
                let req = {
                    let (lock, cvar) = &*slot;
                    let mut guard = lock.lock().unwrap();
                    while guard.is_none() {
                        guard = cvar.wait(guard).unwrap();
                    }
                    guard.take().unwrap()
                };

                // Poison-pill: a nil token signals shutdown.
                if req.id == Uuid::nil() {
                    return;
                }

                // Reopen when the file changed, the target moved backward
                // (advance_to can only walk forward), or the forward jump is
                // large enough that a seek beats decoding through it.
                let needs_reset = live
                    .as_ref()
                    .map(|d| {
                        let tpts = d.ts_to_pts(req.timestamp);
                        let jump = d.ts_to_pts(2.0);
                        d.path != req.path
                            || tpts <= d.last_pts
                            || tpts > d.last_pts + jump
                    })
                    .unwrap_or(true);

                if needs_reset {
                    match SeekDecoder::open(&req.path, req.timestamp) {
                        Ok(mut d) => {
                            let tpts = d.ts_to_pts(req.timestamp);
                            if let Some((data, w, h)) = d.advance_to(tpts) {
                                let _ = result_tx.send(MediaResult::Frame {
                                    id: req.id, width: w, height: h, data,
                                });
                            }
                            live = Some(d);
                        }
                        Err(e) => eprintln!("[media] SeekDecoder::open: {e:#}"),
                    }
                } else if let Some(d) = &mut live {
                    let tpts = d.ts_to_pts(req.timestamp);
                    if let Some((data, w, h)) = d.advance_to(tpts) {
                        let _ = result_tx.send(MediaResult::Frame {
                            id: req.id, width: w, height: h, data,
                        });
                    }
                }
            }
        });

        Self {
            rx,
            tx,
            frame_req,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // Wake the decode thread with a poison-pill so it exits instead of
        // blocking forever on the condvar.
        let (lock, cvar) = &*self.frame_req;
        *lock.lock().unwrap() = Some(FrameRequest {
            id:        Uuid::nil(),
            path:      PathBuf::new(),
            timestamp: 0.0,
        });
        cvar.notify_one();
    }

    /// Probe duration and picture size on a background thread.
    pub fn probe_file(&self, id: Uuid, path: PathBuf) {
        let tx = self.tx.clone();
        let sd = self.shutdown.clone();
        thread::spawn(move || {
            if sd.load(Ordering::Relaxed) {
                return;
            }
            probe_duration(&path, id, &tx);
            if sd.load(Ordering::Relaxed) {
                return;
            }
            probe_picture_size(&path, id, &tx);
        });
    }

    /// Run the metadata-analysis tool and scan its report for the frame rate.
    /// A report without the frame-rate line is not an error: the field stays
    /// unset and the user can type a rate by hand.
    pub fn analyze_file(&self, id: Uuid, path: PathBuf) {
        let tx = self.tx.clone();
        let sd = self.shutdown.clone();
        thread::spawn(move || {
            if sd.load(Ordering::Relaxed) {
                return;
            }
            match report::analyze(&path) {
                Ok(text) => match report::frame_rate_from_report(&text) {
                    Some(fps) => {
                        eprintln!("[report] frame rate {fps} FPS ← {}", path.display());
                        let _ = tx.send(MediaResult::FrameRate { id, fps });
                    }
                    None => eprintln!(
                        "[report] no frame-rate line in report for {}",
                        path.display()
                    ),
                },
                Err(e) => eprintln!("[report] analysis failed for {}: {e:#}", path.display()),
            }
        });
    }

    pub fn request_frame(&self, id: Uuid, path: PathBuf, timestamp: f64) {
        // Overwrite any pending request — the decode thread always gets the
        // freshest one.
        let (lock, cvar) = &*self.frame_req;
        *lock.lock().unwrap() = Some(FrameRequest { id, path, timestamp });
        cvar.notify_one();
    }
}

// ── In-process probing ───────────────────────────────────────────────────────

fn probe_duration(path: &PathBuf, id: Uuid, tx: &Sender<MediaResult>) {
    match input(path) {
        Ok(ctx) => {
            let dur = ctx.duration() as f64 / ffmpeg::ffi::AV_TIME_BASE as f64;
            if dur > 0.0 {
                eprintln!("[media] duration {dur:.3}s ← {}", path.display());
                let _ = tx.send(MediaResult::Duration { id, seconds: dur });
                return;
            }
            // Container didn't know — fall back to the best stream's duration.
            if let Some(stream) = ctx
                .streams()
                .best(Type::Video)
                .or_else(|| ctx.streams().best(Type::Audio))
            {
                let tb = stream.time_base();
                let d = stream.duration() as f64 * tb.numerator() as f64
                    / tb.denominator() as f64;
                if d > 0.0 {
                    let _ = tx.send(MediaResult::Duration { id, seconds: d });
                    return;
                }
            }
            let _ = tx.send(MediaResult::Error { id, msg: "duration unknown".into() });
        }
        Err(e) => {
            eprintln!("[media] probe open failed: {e}");
            let _ = tx.send(MediaResult::Error { id, msg: e.to_string() });
        }
    }
}

fn probe_picture_size(path: &PathBuf, id: Uuid, tx: &Sender<MediaResult>) {
    let Ok(ictx) = input(path) else { return };
    let Some(stream) = ictx.streams().best(Type::Video) else { return };
    let (w, h) = unsafe {
        let p = stream.parameters().as_ptr();
        ((*p).width as u32, (*p).height as u32)
    };
    if w > 0 && h > 0 {
        eprintln!("[media] picture size {w}x{h} ← {}", path.display());
        let _ = tx.send(MediaResult::PictureSize { id, width: w, height: h });
    }
}

#[cfg(test)]
mod tests {
    use super::preview_size;

    #[test]
    fn preview_keeps_small_frames_native() {
        assert_eq!(preview_size(640, 360), (640, 360));
    }

    #[test]
    fn preview_caps_width_and_keeps_height_even() {
        let (w, h) = preview_size(3840, 2160);
        assert_eq!(w, 960);
        assert_eq!(h, 540);
        let (_, h) = preview_size(1920, 817);
        assert_eq!(h % 2, 0);
    }

    #[test]
    fn preview_survives_degenerate_sizes() {
        let (w, h) = preview_size(0, 0);
        assert!(w >= 2 && h >= 2);
    }
}
