use crate::snow::atlas::Sprite;

/// Hard cap on either backing dimension.
const MAX_BACKING_SIDE: usize = 16_384;

/// Layout rectangle of the host viewport in logical pixels, plus the host's
/// device pixel density.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub device_scale: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, device_scale: f32) -> Self {
        Self {
            width,
            height,
            device_scale,
        }
    }

    pub fn area(&self) -> f32 {
        if self.width.is_finite() && self.height.is_finite() {
            self.width.max(0.0) * self.height.max(0.0)
        } else {
            0.0
        }
    }
}

/// Device density clamped to `max`; unknown or nonsense densities count as 1.
pub fn effective_scale(device_scale: f32, max: f32) -> f32 {
    let s = if device_scale.is_finite() && device_scale > 0.0 {
        device_scale
    } else {
        1.0
    };
    s.min(max.max(f32::MIN_POSITIVE))
}

/// Software canvas. Drawing calls take logical coordinates; the backing store
/// holds `logical * scale` premultiplied RGBA pixels.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    rgba: Vec<u8>,
    width: usize,
    height: usize,
    scale: f32,
    active: bool,
}

impl Default for PixelSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelSurface {
    pub fn new() -> Self {
        Self {
            rgba: Vec::new(),
            width: 0,
            height: 0,
            scale: 1.0,
            active: false,
        }
    }

    pub fn with_viewport(viewport: Viewport, max_scale: f32) -> Self {
        let mut s = Self::new();
        s.resize(viewport, max_scale);
        s
    }

    /// Recompute the backing resolution from the layout rect and the capped
    /// density. Contents are discarded. A layout too large for the backing
    /// cap keeps its full logical extent at a lower density.
    pub fn resize(&mut self, viewport: Viewport, max_scale: f32) {
        self.scale = backing_scale(viewport, max_scale);
        self.width = backing_len(viewport.width, self.scale);
        self.height = backing_len(viewport.height, self.scale);
        self.rgba.clear();
        self.rgba.resize(self.width * self.height * 4, 0);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn logical_width(&self) -> f32 {
        self.width as f32 / self.scale
    }

    pub fn logical_height(&self) -> f32 {
        self.height as f32 / self.scale
    }

    pub fn pixels(&self) -> &[u8] {
        &self.rgba
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn clear(&mut self) {
        self.rgba.fill(0);
    }

    pub fn is_blank(&self) -> bool {
        self.rgba.iter().all(|&b| b == 0)
    }

    /// Stamp `sprite` into the logical rect `(x, y, w, h)` with source-over
    /// blending. Partially covered device pixels are weighted by coverage so
    /// sub-pixel flakes still leave a faint mark.
    pub fn draw_image(&mut self, sprite: &Sprite, x: f32, y: f32, w: f32, h: f32) {
        if !(w > 0.0 && h > 0.0) || self.width == 0 || self.height == 0 {
            return;
        }
        let s = self.scale;
        let (x0, y0) = (x * s, y * s);
        let (x1, y1) = ((x + w) * s, (y + h) * s);
        let (bw, bh) = (self.width as f32, self.height as f32);
        if !(x1 > 0.0 && y1 > 0.0 && x0 < bw && y0 < bh) {
            return;
        }

        let px0 = x0.floor().max(0.0) as usize;
        let py0 = y0.floor().max(0.0) as usize;
        let px1 = (x1.ceil().min(bw) as usize).min(self.width);
        let py1 = (y1.ceil().min(bh) as usize).min(self.height);

        let side = sprite.side() as f32;
        let u_per_px = side / (x1 - x0);
        let v_per_px = side / (y1 - y0);

        for py in py0..py1 {
            let top = (py as f32).max(y0);
            let bottom = (py as f32 + 1.0).min(y1);
            let cov_y = bottom - top;
            if cov_y <= 0.0 {
                continue;
            }
            let v = ((top + bottom) * 0.5 - y0) * v_per_px;
            let row = py * self.width;
            for px in px0..px1 {
                let left = (px as f32).max(x0);
                let right = (px as f32 + 1.0).min(x1);
                let cov_x = right - left;
                if cov_x <= 0.0 {
                    continue;
                }
                let u = ((left + right) * 0.5 - x0) * u_per_px;
                let texel = sprite.texel(u.max(0.0) as usize, v.max(0.0) as usize);
                let i = (row + px) * 4;
                blend_over(&mut self.rgba[i..i + 4], texel, cov_x * cov_y);
            }
        }
    }
}

fn backing_scale(viewport: Viewport, max_scale: f32) -> f32 {
    let scale = effective_scale(viewport.device_scale, max_scale);
    let longest = viewport.width.max(viewport.height);
    let cap = MAX_BACKING_SIDE as f32;
    if longest.is_finite() && longest * scale > cap {
        cap / longest
    } else {
        scale
    }
}

fn backing_len(logical: f32, scale: f32) -> usize {
    if !logical.is_finite() || logical <= 0.0 {
        return 0;
    }
    ((logical * scale).floor() as usize).min(MAX_BACKING_SIDE)
}

/// Premultiplied source-over with `src` weighted by `coverage`.
#[inline]
fn blend_over(dst: &mut [u8], src: [u8; 4], coverage: f32) {
    let a = src[3] as f32 * coverage / 255.0;
    if a <= 0.0 {
        return;
    }
    let keep = 1.0 - a;
    for c in 0..4 {
        let v = src[c] as f32 * coverage + dst[c] as f32 * keep;
        dst[c] = v.round().clamp(0.0, 255.0) as u8;
    }
}
