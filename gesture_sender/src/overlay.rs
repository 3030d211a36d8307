//! Software-rendered window using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ status bar (state text, color-coded)        │
//! │                                             │
//! │        mirrored camera frame                │
//! │        [calibration guide box when          │
//! │         uncalibrated; contour/hull          │
//! │         overlays when debug is on]          │
//! │                                             │
//! │ key legend                                  │
//! └─────────────────────────────────────────────┘
//! ```

use image::RgbImage;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use hand_vision::Detection;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

const STATUS_H:      usize = 40;
/// Side length of the centered calibration sample box, in pixels.
pub const CALIB_BOX: usize = 40;

const STATUS_BG:     u32 = 0xFF000000;
pub const WAITING:   u32 = 0xFF00FFFF;  // cyan
pub const FIST:      u32 = 0xFF00FF00;  // green
const GUIDE_COLOR:   u32 = 0xFFFF0000;  // red
const CONTOUR_COLOR: u32 = 0xFF00FF00;
const HULL_COLOR:    u32 = 0xFFFF0000;
const SENT_COLOR:    u32 = 0xFF00FF00;
const LEGEND_COLOR:  u32 = 0xFF888888;

// ════════════════════════════════════════════════════════════════════════════
// Input
// ════════════════════════════════════════════════════════════════════════════

/// One poll's worth of key presses.
#[derive(Clone, Copy, Debug, Default)]
pub struct Input {
    pub quit:           bool,
    pub manual_trigger: bool,
    pub calibrate:      bool,
    pub toggle_debug:   bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Hud — per-frame overlay state
// ════════════════════════════════════════════════════════════════════════════

/// Everything the overlay needs beyond the raw frame.
pub struct Hud<'a> {
    pub status:       &'a str,
    pub status_color: u32,
    /// Draw the calibration guide box + hint (while uncalibrated).
    pub show_guide:   bool,
    /// Contour + hull to plot when the debug overlay is on.
    pub detection:    Option<&'a Detection>,
    /// Flash the big confirmation text over the frame.
    pub sent:         bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Overlay
// ════════════════════════════════════════════════════════════════════════════

pub struct Overlay {
    window: Window,
    buf:    Vec<u32>,
    w:      usize,
    h:      usize,
}

impl Overlay {
    pub fn new(width: u32, height: u32) -> Result<Self, String> {
        let (w, h) = (width as usize, height as usize);
        let mut window = Window::new(
            "Gesture Sender",
            w,
            h,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| e.to_string())?;

        // Brief pause between iterations; keyboard polling rides on it.
        window.limit_update_rate(Some(std::time::Duration::from_millis(5)));

        Ok(Overlay {
            window,
            buf: vec![STATUS_BG; w * h],
            w,
            h,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Poll keyboard input.  All commands are one-shot presses.
    pub fn poll_input(&mut self) -> Input {
        let mut input = Input::default();
        if !self.window.is_open() {
            input.quit = true;
            return input;
        }

        let one_shot = |w: &Window, k: Key| w.is_key_pressed(k, KeyRepeat::No);

        input.quit           = one_shot(&self.window, Key::Escape);
        input.manual_trigger = one_shot(&self.window, Key::F);
        input.calibrate      = one_shot(&self.window, Key::C);
        input.toggle_debug   = one_shot(&self.window, Key::D);
        input
    }

    /// Render one frame plus overlays.
    pub fn render(&mut self, frame: &RgbImage, hud: &Hud) {
        self.blit_frame(frame);

        if hud.show_guide {
            self.draw_guide_box();
        }
        if let Some(det) = hud.detection {
            self.draw_detection(det);
        }

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, 0, self.w, STATUS_H, STATUS_BG);
        self.draw_label_scaled(hud.status, 10, 12, hud.status_color, 3);

        // ── Key legend ────────────────────────────────────────────────────
        self.draw_label_scaled(
            "C=calibrate  F=send  D=debug  Esc=quit",
            10,
            self.h - 14,
            LEGEND_COLOR,
            2,
        );

        if hud.sent {
            self.draw_sent_banner();
        }

        self.window.update_with_buffer(&self.buf, self.w, self.h).ok();
    }

    // ── Frame blit ────────────────────────────────────────────────────────

    fn blit_frame(&mut self, frame: &RgbImage) {
        for (y, row) in frame.rows().enumerate() {
            if y >= self.h {
                break;
            }
            for (x, px) in row.enumerate() {
                if x >= self.w {
                    break;
                }
                let [r, g, b] = px.0;
                self.buf[y * self.w + x] =
                    0xFF000000 | ((r as u32) << 16) | ((g as u32) << 8) | b as u32;
            }
        }
    }

    // ── Calibration guide ─────────────────────────────────────────────────

    fn draw_guide_box(&mut self) {
        let x0 = self.w / 2 - CALIB_BOX / 2;
        let y0 = self.h / 2 - CALIB_BOX / 2;
        self.draw_border(x0, y0, CALIB_BOX, CALIB_BOX, GUIDE_COLOR);
        self.draw_label_scaled(
            "Place hand in box and press C",
            10,
            self.h - 40,
            GUIDE_COLOR,
            3,
        );
    }

    // ── Debug contour / hull ──────────────────────────────────────────────

    fn draw_detection(&mut self, det: &Detection) {
        for w in det.contour.windows(2) {
            self.draw_line(w[0].x, w[0].y, w[1].x, w[1].y, CONTOUR_COLOR);
        }
        if let (Some(first), Some(last)) = (det.contour.first(), det.contour.last()) {
            self.draw_line(last.x, last.y, first.x, first.y, CONTOUR_COLOR);
        }

        for w in det.hull.windows(2) {
            self.draw_line(w[0].x, w[0].y, w[1].x, w[1].y, HULL_COLOR);
        }
        if let (Some(first), Some(last)) = (det.hull.first(), det.hull.last()) {
            self.draw_line(last.x, last.y, first.x, first.y, HULL_COLOR);
        }
    }

    // ── Sent banner ───────────────────────────────────────────────────────

    fn draw_sent_banner(&mut self) {
        // 4 glyphs * (3+1) columns * scale, roughly centered.
        let scale = 10;
        let text = "SENT";
        let width = text.len() * 4 * scale;
        let x = self.w.saturating_sub(width) / 2;
        let y = self.h / 2 - (5 * scale) / 2;
        self.draw_label_scaled(text, x, y, SENT_COLOR, scale);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.h) {
            for col in x..(x + w).min(self.w) {
                self.buf[row * self.w + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for col in x..(x + w).min(self.w) {
            if y < self.h {
                self.buf[y * self.w + col] = color;
            }
            if y + h - 1 < self.h {
                self.buf[(y + h - 1) * self.w + col] = color;
            }
        }
        for row in y..(y + h).min(self.h) {
            if x < self.w {
                self.buf[row * self.w + x] = color;
            }
            if x + w - 1 < self.w {
                self.buf[row * self.w + x + w - 1] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.buf[y as usize * self.w + x as usize] = color;
        }
    }

    /// Bresenham segment between two contour points.
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y) = (x0, y0);
        let mut err = dx + dy;
        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Scaled 3×5 bitmap text.
    fn draw_label_scaled(&mut self, text: &str, x: usize, y: usize, color: u32, scale: usize) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > self.w {
                break;
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}
