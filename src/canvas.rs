use crate::geometry::Vec2;

/// Opaque colour; alpha is supplied per draw call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    pub const fn from_hex(hex: u32) -> Self {
        Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    pub fn to_u32(self) -> u32 {
        ((self.0 as u32) << 16) | ((self.1 as u32) << 8) | self.2 as u32
    }

    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

/// ARGB layer an engine renders into. Starts transparent and is composited
/// over the window buffer once per frame.
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn clear(&mut self) {
        self.pixels.iter_mut().for_each(|p| *p = 0);
    }

    /// Reallocate the pixel buffer. Callers keep their entity positions as-is.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0; width * height];
    }

    pub fn alpha_at(&self, x: usize, y: usize) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        (self.pixels[y * self.width + x] >> 24) as u8
    }

    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Rgb, alpha: f64) {
        if alpha <= 0.0 || x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let a = alpha.min(1.0);
        let idx = y as usize * self.width + x as usize;
        let dst = self.pixels[idx];
        let da = ((dst >> 24) & 0xff) as f64 / 255.0;
        let out_a = a + da * (1.0 - a);

        let channel = |s: u8, shift: u32| -> u32 {
            let d = ((dst >> shift) & 0xff) as f64;
            ((s as f64 * a + d * da * (1.0 - a)) / out_a).round().min(255.0) as u32
        };

        let r = channel(color.0, 16);
        let g = channel(color.1, 8);
        let b = channel(color.2, 0);
        let alpha_byte = (out_a * 255.0).round().min(255.0) as u32;
        self.pixels[idx] = (alpha_byte << 24) | (r << 16) | (g << 8) | b;
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f64, color: Rgb, alpha: f64) {
        if radius < 0.75 {
            self.blend_pixel(center.x.floor() as i64, center.y.floor() as i64, color, alpha);
            return;
        }
        let r2 = radius * radius;
        self.for_each_in_disc(center, radius, |canvas, x, y, d2| {
            if d2 <= r2 {
                canvas.blend_pixel(x, y, color, alpha);
            }
        });
    }

    /// Disc whose alpha falls linearly from `inner_alpha` at the centre to
    /// `outer_alpha` at the rim.
    pub fn radial_glow(&mut self, center: Vec2, radius: f64, color: Rgb, inner_alpha: f64, outer_alpha: f64) {
        if radius <= 0.0 {
            return;
        }
        self.for_each_in_disc(center, radius, |canvas, x, y, d2| {
            let t = d2.sqrt() / radius;
            if t <= 1.0 {
                let a = inner_alpha + (outer_alpha - inner_alpha) * t;
                canvas.blend_pixel(x, y, color, a);
            }
        });
    }

    fn for_each_in_disc(&mut self, center: Vec2, radius: f64, mut f: impl FnMut(&mut Canvas, i64, i64, f64)) {
        let x0 = (center.x - radius).floor() as i64;
        let x1 = (center.x + radius).ceil() as i64;
        let y0 = (center.y - radius).floor() as i64;
        let y1 = (center.y + radius).ceil() as i64;

        for y in y0.max(0)..=y1.min(self.height as i64 - 1) {
            for x in x0.max(0)..=x1.min(self.width as i64 - 1) {
                let dx = x as f64 + 0.5 - center.x;
                let dy = y as f64 + 0.5 - center.y;
                f(self, x, y, dx * dx + dy * dy);
            }
        }
    }

    pub fn stroke_circle(&mut self, center: Vec2, radius: f64, color: Rgb, alpha: f64) {
        let steps = ((2.0 * std::f64::consts::PI * radius).ceil() as usize).max(16);
        for i in 0..steps {
            let angle = i as f64 / steps as f64 * 2.0 * std::f64::consts::PI;
            let x = center.x + angle.cos() * radius;
            let y = center.y + angle.sin() * radius;
            self.blend_pixel(x.floor() as i64, y.floor() as i64, color, alpha);
        }
    }

    pub fn line(&mut self, a: Vec2, b: Vec2, color: Rgb, alpha: f64) {
        self.walk_segment(a, b, |canvas, p, _| {
            canvas.blend_pixel(p.x.floor() as i64, p.y.floor() as i64, color, alpha);
        });
    }

    /// Line whose colour runs `from` → `to` and whose alpha follows three stops
    /// at the start, middle and end of the segment.
    pub fn gradient_line(&mut self, a: Vec2, b: Vec2, from: Rgb, to: Rgb, stops: [f64; 3]) {
        self.walk_segment(a, b, |canvas, p, t| {
            let alpha = if t < 0.5 {
                stops[0] + (stops[1] - stops[0]) * (t * 2.0)
            } else {
                stops[1] + (stops[2] - stops[1]) * ((t - 0.5) * 2.0)
            };
            canvas.blend_pixel(p.x.floor() as i64, p.y.floor() as i64, from.lerp(to, t), alpha);
        });
    }

    pub fn dashed_line(&mut self, a: Vec2, b: Vec2, dash: f64, gap: f64, color: Rgb, alpha: f64) {
        let length = crate::geometry::distance(a, b);
        let period = dash + gap;
        self.walk_segment(a, b, |canvas, p, t| {
            if period <= 0.0 || (t * length) % period < dash {
                canvas.blend_pixel(p.x.floor() as i64, p.y.floor() as i64, color, alpha);
            }
        });
    }

    fn walk_segment(&mut self, a: Vec2, b: Vec2, mut plot: impl FnMut(&mut Canvas, Vec2, f64)) {
        let steps = (b.x - a.x).abs().max((b.y - a.y).abs()).ceil() as usize;
        if steps == 0 {
            plot(self, a, 0.0);
            return;
        }
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            plot(self, a.lerp(b, t), t);
        }
    }

    pub fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: Rgb, alpha: f64) {
        for py in y.max(0)..(y + h).min(self.height as i64) {
            for px in x.max(0)..(x + w).min(self.width as i64) {
                self.blend_pixel(px, py, color, alpha);
            }
        }
    }

    pub fn stroke_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: Rgb, alpha: f64) {
        if w <= 0 || h <= 0 {
            return;
        }
        for px in x..x + w {
            self.blend_pixel(px, y, color, alpha);
            self.blend_pixel(px, y + h - 1, color, alpha);
        }
        for py in y + 1..y + h - 1 {
            self.blend_pixel(x, py, color, alpha);
            self.blend_pixel(x + w - 1, py, color, alpha);
        }
    }

    pub fn draw_text(&mut self, x: i64, y: i64, text: &str, color: Rgb, alpha: f64, scale: i64) {
        let scale = scale.max(1);
        let mut offset_x = x;
        for ch in text.chars() {
            if offset_x >= self.width as i64 {
                break;
            }
            self.draw_char(offset_x, y, ch, color, alpha, scale);
            offset_x += GLYPH_ADVANCE * scale;
        }
    }

    fn draw_char(&mut self, x: i64, y: i64, ch: char, color: Rgb, alpha: f64, scale: i64) {
        for (dy, &row) in glyph(ch).iter().enumerate() {
            for dx in 0..3 {
                if row & (1 << (2 - dx)) == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        self.blend_pixel(x + dx * scale + sx, y + dy as i64 * scale + sy, color, alpha);
                    }
                }
            }
        }
    }

    /// Alpha-composite this layer over an opaque `0x00RRGGBB` window buffer of
    /// the same width.
    pub fn composite_onto(&self, frame: &mut [u32], frame_width: usize) {
        if frame_width == 0 {
            return;
        }
        let frame_height = frame.len() / frame_width;
        for y in 0..self.height.min(frame_height) {
            for x in 0..self.width.min(frame_width) {
                let src = self.pixels[y * self.width + x];
                let a = (src >> 24) & 0xff;
                if a == 0 {
                    continue;
                }
                let idx = y * frame_width + x;
                let dst = frame[idx];
                let mix = |shift: u32| -> u32 {
                    let s = (src >> shift) & 0xff;
                    let d = (dst >> shift) & 0xff;
                    (s * a + d * (255 - a) + 127) / 255
                };
                frame[idx] = (mix(16) << 16) | (mix(8) << 8) | mix(0);
            }
        }
    }
}

pub const GLYPH_ADVANCE: i64 = 4;
pub const GLYPH_HEIGHT: i64 = 5;

pub fn text_width(text: &str, scale: i64) -> i64 {
    text.chars().count() as i64 * GLYPH_ADVANCE * scale.max(1)
}

// 3x5 pixel font, upper-case only
fn glyph(ch: char) -> &'static [u8; 5] {
    match ch.to_ascii_uppercase() {
        '0' => &[0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => &[0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => &[0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => &[0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => &[0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => &[0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => &[0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => &[0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => &[0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => &[0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => &[0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => &[0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => &[0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => &[0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => &[0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => &[0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => &[0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => &[0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => &[0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => &[0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => &[0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => &[0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => &[0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => &[0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => &[0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => &[0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => &[0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => &[0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => &[0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => &[0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => &[0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => &[0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => &[0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => &[0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => &[0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => &[0b111, 0b001, 0b010, 0b100, 0b111],
        '.' => &[0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => &[0b000, 0b000, 0b000, 0b010, 0b100],
        '-' => &[0b000, 0b000, 0b111, 0b000, 0b000],
        ':' => &[0b000, 0b010, 0b000, 0b010, 0b000],
        '\'' => &[0b010, 0b010, 0b000, 0b000, 0b000],
        '"' => &[0b101, 0b101, 0b000, 0b000, 0b000],
        '?' => &[0b110, 0b001, 0b010, 0b000, 0b010],
        '!' => &[0b010, 0b010, 0b010, 0b000, 0b010],
        '/' => &[0b001, 0b001, 0b010, 0b100, 0b100],
        '>' => &[0b100, 0b010, 0b001, 0b010, 0b100],
        '<' => &[0b001, 0b010, 0b100, 0b010, 0b001],
        '(' => &[0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => &[0b010, 0b001, 0b001, 0b001, 0b010],
        '[' => &[0b110, 0b100, 0b100, 0b100, 0b110],
        ']' => &[0b011, 0b001, 0b001, 0b001, 0b011],
        '+' => &[0b000, 0b010, 0b111, 0b010, 0b000],
        '=' => &[0b000, 0b111, 0b000, 0b111, 0b000],
        '_' => &[0b000, 0b000, 0b000, 0b000, 0b111],
        '%' => &[0b101, 0b001, 0b010, 0b100, 0b101],
        '#' => &[0b101, 0b111, 0b101, 0b111, 0b101],
        '*' => &[0b000, 0b101, 0b010, 0b101, 0b000],
        '&' => &[0b010, 0b101, 0b010, 0b101, 0b011],
        _ => &[0b000, 0b000, 0b000, 0b000, 0b000],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_over_transparent_keeps_source_colour() {
        let mut canvas = Canvas::new(4, 4);
        canvas.blend_pixel(1, 1, Rgb(200, 100, 50), 0.5);
        let px = canvas.pixels()[5];
        assert_eq!(px & 0x00ff_ffff, Rgb(200, 100, 50).to_u32());
        assert_eq!(canvas.alpha_at(1, 1), 128);
    }

    #[test]
    fn out_of_bounds_draws_are_ignored() {
        let mut canvas = Canvas::new(4, 4);
        canvas.blend_pixel(-1, 0, Rgb::WHITE, 1.0);
        canvas.blend_pixel(4, 0, Rgb::WHITE, 1.0);
        canvas.line(Vec2::new(-50.0, -50.0), Vec2::new(-10.0, -10.0), Rgb::WHITE, 1.0);
        assert!(canvas.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn composite_full_alpha_replaces_frame() {
        let mut canvas = Canvas::new(2, 1);
        canvas.blend_pixel(0, 0, Rgb(10, 20, 30), 1.0);
        let mut frame = vec![0x00ff_ffff; 2];
        canvas.composite_onto(&mut frame, 2);
        assert_eq!(frame[0], Rgb(10, 20, 30).to_u32());
        assert_eq!(frame[1], 0x00ff_ffff);
    }

    #[test]
    fn resize_reallocates_transparent_buffer() {
        let mut canvas = Canvas::new(2, 2);
        canvas.fill_rect(0, 0, 2, 2, Rgb::WHITE, 1.0);
        canvas.resize(3, 5);
        assert_eq!(canvas.pixels().len(), 15);
        assert!(canvas.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn text_width_counts_glyph_advance() {
        assert_eq!(text_width("HELP", 1), 16);
        assert_eq!(text_width("HELP", 2), 32);
    }

    #[test]
    fn dashed_line_leaves_gaps() {
        let mut canvas = Canvas::new(40, 1);
        canvas.dashed_line(Vec2::new(0.0, 0.5), Vec2::new(39.0, 0.5), 5.0, 10.0, Rgb::WHITE, 1.0);
        let lit = (0..40).filter(|&x| canvas.alpha_at(x, 0) > 0).count();
        assert!(lit > 0 && lit < 40);
    }
}
