//! Top-level application state and the frame loop.
//!
//! `AppState` owns the skin model, the segmenter/classifier pair, the
//! trigger gate, and the clipboard relay.  The loop is single-threaded and
//! frame-driven: capture → segment → classify → gate → (maybe) dispatch →
//! render, with a short input-poll pause between iterations.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use image::RgbImage;
use serde::Deserialize;

use clip_relay::{Relay, RelayConfig, RelayOutcome};
use hand_vision::{
    ClassifierConfig, Detection, FistClassifier, HandSegmenter, SegmenterConfig, SkinColorModel,
};

use crate::camera::{CameraSource, FrameSource};
use crate::overlay::{Hud, Overlay, CALIB_BOX, FIST, WAITING};
use crate::trigger::{GateDecision, GatePhase, TriggerConfig, TriggerGate};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.  Every heuristic threshold in
/// the pipeline is a named field here; a JSON file can override any subset.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub camera_index: u32,
    pub segmenter:    SegmenterConfig,
    pub classifier:   ClassifierConfig,
    pub trigger:      TriggerConfig,
    pub relay:        RelayConfig,
    /// Contour/hull overlay; off by default for a cleaner UI.
    pub show_debug:   bool,
    /// How long the "SENT" confirmation stays on screen.
    pub sent_flash_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            camera_index:  0,
            segmenter:     SegmenterConfig::default(),
            classifier:    ClassifierConfig::default(),
            trigger:       TriggerConfig::default(),
            relay:         RelayConfig::default(),
            show_debug:    false,
            sent_flash_ms: 500,
        }
    }
}

impl AppConfig {
    /// Load overrides from a JSON file on top of the defaults.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TriggerResult
// ════════════════════════════════════════════════════════════════════════════

/// What happened when the loop consulted the gate this frame.
#[derive(Debug, PartialEq, Eq)]
pub enum TriggerResult {
    /// Gate not armed; nothing attempted.
    NotReady,
    /// Armed but inside the cooldown window; suppressed.
    Suppressed,
    /// A dispatch was attempted; the outcome says how it went.
    Attempted(RelayOutcome),
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    model:      SkinColorModel,
    segmenter:  HandSegmenter,
    classifier: FistClassifier,
    gate:       TriggerGate,
    relay:      Relay,
    show_debug: bool,
}

impl AppState {
    pub fn new(config: &AppConfig, relay: Relay) -> Self {
        AppState {
            model:      SkinColorModel::default(),
            segmenter:  HandSegmenter::new(config.segmenter),
            classifier: FistClassifier::new(config.classifier),
            gate:       TriggerGate::new(config.trigger),
            relay,
            show_debug: config.show_debug,
        }
    }

    // ── Per-frame pipeline ────────────────────────────────────────────────

    /// Segment and classify one frame, then feed the gate.  Returns the
    /// detection so the overlay can draw it.
    pub fn process_frame(&mut self, frame: &RgbImage) -> Option<Detection> {
        let detection = self
            .segmenter
            .largest_hand_contour(frame, &self.model)
            .map(|contour| self.classifier.classify(contour));

        let is_fist = detection.as_ref().map_or(false, |d| d.shape.is_fist());
        self.gate.observe(is_fist);
        detection
    }

    /// Consult the gate and, if it fires, relay the clipboard.  Only a
    /// confirmed send resets the streak and restarts the cooldown.
    pub fn try_trigger(&mut self, manual: bool, now: Instant) -> TriggerResult {
        match self.gate.decide(manual, now) {
            GateDecision::NotReady => TriggerResult::NotReady,
            GateDecision::Cooling => TriggerResult::Suppressed,
            GateDecision::Fire => {
                log::info!("trigger fired (manual={})", manual);
                let outcome = self.relay.send_clipboard();
                if outcome.is_sent() {
                    self.gate.confirm(now);
                }
                TriggerResult::Attempted(outcome)
            }
        }
    }

    // ── UI-driven side channels ───────────────────────────────────────────

    /// Recalibrate the skin model from the centered guide-box region.
    pub fn calibrate_from(&mut self, frame: &RgbImage) {
        let box_px = CALIB_BOX as u32;
        if frame.width() < box_px || frame.height() < box_px {
            log::warn!("frame smaller than the calibration box; skipping");
            return;
        }
        let x = frame.width() / 2 - box_px / 2;
        let y = frame.height() / 2 - box_px / 2;
        let sample = image::imageops::crop_imm(frame, x, y, box_px, box_px).to_image();
        self.model.calibrate(&sample);
    }

    pub fn toggle_debug(&mut self) {
        self.show_debug = !self.show_debug;
        log::info!("debug overlay {}", if self.show_debug { "on" } else { "off" });
    }

    // ── Accessors for the loop and tests ──────────────────────────────────

    pub fn calibrated(&self) -> bool {
        self.model.calibrated
    }

    pub fn show_debug(&self) -> bool {
        self.show_debug
    }

    pub fn gate(&self) -> &TriggerGate {
        &self.gate
    }

    /// Status text + color for the bar, from the gate phase.
    pub fn status_line(&self, now: Instant) -> (String, u32) {
        match self.gate.phase(now) {
            GatePhase::Triggered => ("Fist detected!".to_string(), FIST),
            GatePhase::Cooling => ("Sent - cooling down".to_string(), WAITING),
            GatePhase::Accumulating => {
                (format!("Waiting... fist x{}", self.gate.fist_frames()), WAITING)
            }
            GatePhase::Idle => ("Waiting...".to_string(), WAITING),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application: open the camera and the window, then drive
/// the pipeline once per frame until quit.
pub fn run(config: AppConfig) -> anyhow::Result<()> {
    let mut camera =
        CameraSource::open(config.camera_index).context("cannot open the capture device")?;
    let (width, height) = camera.resolution();

    let mut overlay = Overlay::new(width, height)
        .map_err(|e| anyhow::anyhow!("cannot open the display window: {}", e))?;

    let relay = Relay::new(&config.relay);
    let sent_flash = Duration::from_millis(config.sent_flash_ms);
    let mut app = AppState::new(&config, relay);

    while overlay.is_open() {
        // ── 1. Capture ────────────────────────────────────────────────────
        let frame = match camera.next_frame() {
            Ok(f) => f,
            Err(e) => {
                // Transient: pause briefly and try the next frame.
                log::warn!("{}", e);
                thread::sleep(Duration::from_millis(100));
                continue;
            }
        };

        // ── 2. Vision pipeline + gate ─────────────────────────────────────
        let detection = app.process_frame(&frame);

        // ── 3. Input ──────────────────────────────────────────────────────
        let input = overlay.poll_input();
        if input.quit {
            break;
        }
        if input.calibrate {
            app.calibrate_from(&frame);
        }
        if input.toggle_debug {
            app.toggle_debug();
        }

        // ── 4. Trigger ────────────────────────────────────────────────────
        let result = app.try_trigger(input.manual_trigger, Instant::now());
        let sent = matches!(result, TriggerResult::Attempted(RelayOutcome::Sent));

        // ── 5. Render ─────────────────────────────────────────────────────
        let (status, status_color) = app.status_line(Instant::now());
        let hud = Hud {
            status: &status,
            status_color,
            show_guide: !app.calibrated(),
            detection: if app.show_debug() { detection.as_ref() } else { None },
            sent,
        };
        overlay.render(&frame, &hud);

        if sent {
            // Hold the confirmation on screen briefly before resuming.
            thread::sleep(sent_flash);
        }
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use clip_relay::{ClipboardSource, DispatchError, Transport};
    use serde_json::Value;

    struct StubTransport {
        calls:  Rc<RefCell<usize>>,
        status: u16,
    }

    impl Transport for StubTransport {
        fn post_json(&self, _url: &str, _body: &Value) -> Result<u16, DispatchError> {
            *self.calls.borrow_mut() += 1;
            Ok(self.status)
        }
    }

    struct StubClipboard(Option<String>);

    impl ClipboardSource for StubClipboard {
        fn text(&mut self) -> Option<String> {
            self.0.clone()
        }
    }

    fn make_app(status: u16, clip: Option<&str>) -> (AppState, Rc<RefCell<usize>>) {
        let calls = Rc::new(RefCell::new(0));
        let relay = Relay::with_backends(
            "http://127.0.0.1:5000/save",
            Box::new(StubTransport { calls: Rc::clone(&calls), status }),
            Box::new(StubClipboard(clip.map(String::from))),
        );
        (AppState::new(&AppConfig::default(), relay), calls)
    }

    /// Frame holding a fist-sized, fist-shaped (convex) skin blob.
    fn fist_frame() -> RgbImage {
        let mut frame = RgbImage::new(640, 480);
        for y in 150..330 {
            for x in 200..380 {
                frame.put_pixel(x, y, image::Rgb([205, 150, 120]));
            }
        }
        frame
    }

    #[test]
    fn fist_streak_arms_after_eleven_frames() {
        let (mut app, _) = make_app(200, Some("hello"));
        let frame = fist_frame();
        for _ in 0..10 {
            app.process_frame(&frame);
        }
        assert!(!app.gate().armed());
        app.process_frame(&frame);
        assert!(app.gate().armed());
    }

    #[test]
    fn empty_frame_resets_the_streak() {
        let (mut app, _) = make_app(200, Some("hello"));
        let frame = fist_frame();
        for _ in 0..11 {
            app.process_frame(&frame);
        }
        app.process_frame(&RgbImage::new(640, 480));
        assert_eq!(app.gate().fist_frames(), 0);
    }

    #[test]
    fn armed_gate_dispatches_and_confirms() {
        let (mut app, calls) = make_app(200, Some("hello"));
        let frame = fist_frame();
        for _ in 0..11 {
            app.process_frame(&frame);
        }

        let result = app.try_trigger(false, Instant::now());
        assert_eq!(result, TriggerResult::Attempted(RelayOutcome::Sent));
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(app.gate().fist_frames(), 0, "confirmed send resets the streak");
    }

    #[test]
    fn cooldown_suppresses_a_second_trigger() {
        let (mut app, calls) = make_app(200, Some("hello"));
        let frame = fist_frame();
        let t0 = Instant::now();

        for _ in 0..11 {
            app.process_frame(&frame);
        }
        app.try_trigger(false, t0);

        // Hand still held: re-arm inside the cooldown window.
        for _ in 0..11 {
            app.process_frame(&frame);
        }
        let again = app.try_trigger(false, t0 + Duration::from_millis(1000));
        assert_eq!(again, TriggerResult::Suppressed);
        assert_eq!(*calls.borrow(), 1, "exactly one dispatch inside the window");

        let later = app.try_trigger(false, t0 + Duration::from_millis(3500));
        assert_eq!(later, TriggerResult::Attempted(RelayOutcome::Sent));
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn failed_dispatch_retries_immediately() {
        let (mut app, calls) = make_app(500, Some("hello"));
        let frame = fist_frame();
        let t0 = Instant::now();

        for _ in 0..11 {
            app.process_frame(&frame);
        }

        let first = app.try_trigger(false, t0);
        assert!(matches!(
            first,
            TriggerResult::Attempted(RelayOutcome::Failed(DispatchError::Status(500)))
        ));

        // No confirm happened: the very next frame may attempt again.
        let second = app.try_trigger(false, t0 + Duration::from_millis(1));
        assert!(matches!(second, TriggerResult::Attempted(RelayOutcome::Failed(_))));
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn empty_clipboard_skips_without_confirming() {
        let (mut app, calls) = make_app(200, Some("   "));
        let frame = fist_frame();
        for _ in 0..11 {
            app.process_frame(&frame);
        }

        let result = app.try_trigger(false, Instant::now());
        assert_eq!(result, TriggerResult::Attempted(RelayOutcome::SkippedEmpty));
        assert_eq!(*calls.borrow(), 0, "no network call for empty text");
        assert!(app.gate().armed(), "skip is not a success; the gate stays armed");
    }

    #[test]
    fn manual_override_needs_no_fist_frames() {
        let (mut app, calls) = make_app(200, Some("hello"));
        let result = app.try_trigger(true, Instant::now());
        assert_eq!(result, TriggerResult::Attempted(RelayOutcome::Sent));
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn idle_gate_is_not_ready() {
        let (mut app, calls) = make_app(200, Some("hello"));
        assert_eq!(app.try_trigger(false, Instant::now()), TriggerResult::NotReady);
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn calibrate_from_frame_center_marks_model() {
        let (mut app, _) = make_app(200, Some("hello"));
        assert!(!app.calibrated());
        app.calibrate_from(&fist_frame());
        assert!(app.calibrated());
    }

    #[test]
    fn debug_overlay_toggles() {
        let (mut app, _) = make_app(200, Some("hello"));
        assert!(!app.show_debug());
        app.toggle_debug();
        assert!(app.show_debug());
        app.toggle_debug();
        assert!(!app.show_debug());
    }

    #[test]
    fn status_line_follows_the_gate() {
        let (mut app, _) = make_app(200, Some("hello"));
        let t0 = Instant::now();
        assert_eq!(app.status_line(t0).0, "Waiting...");

        let frame = fist_frame();
        for _ in 0..11 {
            app.process_frame(&frame);
        }
        let (text, color) = app.status_line(t0);
        assert_eq!(text, "Fist detected!");
        assert_eq!(color, FIST);
    }
}
