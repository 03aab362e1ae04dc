use crate::snow::layers::{LayerTable, LAYER_COUNT};
use std::f32::consts::TAU;

pub const REFERENCE_AREA: f32 = 1920.0 * 1080.0;
pub const MAX_DENSITY_SCALE: f32 = 1.5;

/// Population for a viewport: `floor(base * min(area / 1920x1080, 1.5))`.
pub fn particle_count(base_count: usize, width: f32, height: f32) -> usize {
    if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
        return 0;
    }
    let area = width as f64 * height as f64;
    let scale = (area / REFERENCE_AREA as f64).min(MAX_DENSITY_SCALE as f64);
    (base_count as f64 * scale).floor() as usize
}

/// One row of the field, used to seed or inspect a single flake.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Flake {
    pub x: f32,
    pub y: f32,
    pub speed_y: f32,
    pub base_size: f32,
    pub time: f32,
    pub wobble_speed: f32,
    pub wobble_amp: f32,
    pub wobble_phase: f32,
    pub wobble_speed2: f32,
    pub wobble_amp2: f32,
    pub wobble_phase2: f32,
    pub layer: u8,
}

/// Struct-of-arrays particle store. Every column has the same length and
/// index `i` across columns is one flake.
#[derive(Clone, Debug, Default)]
pub struct ParticleField {
    pub(crate) x: Vec<f32>,
    pub(crate) y: Vec<f32>,
    pub(crate) speed_y: Vec<f32>,
    pub(crate) base_size: Vec<f32>,
    pub(crate) time: Vec<f32>,
    pub(crate) wobble_speed: Vec<f32>,
    pub(crate) wobble_amp: Vec<f32>,
    pub(crate) wobble_phase: Vec<f32>,
    pub(crate) wobble_speed2: Vec<f32>,
    pub(crate) wobble_amp2: Vec<f32>,
    pub(crate) wobble_phase2: Vec<f32>,
    pub(crate) layer: Vec<u8>,
}

impl ParticleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
            speed_y: Vec::with_capacity(n),
            base_size: Vec::with_capacity(n),
            time: Vec::with_capacity(n),
            wobble_speed: Vec::with_capacity(n),
            wobble_amp: Vec::with_capacity(n),
            wobble_phase: Vec::with_capacity(n),
            wobble_speed2: Vec::with_capacity(n),
            wobble_amp2: Vec::with_capacity(n),
            wobble_phase2: Vec::with_capacity(n),
            layer: Vec::with_capacity(n),
        }
    }

    /// Fresh field for a `width x height` logical surface, sized by
    /// [`particle_count`].
    pub fn generate(
        base_count: usize,
        width: f32,
        height: f32,
        table: &LayerTable,
        rng: &mut fastrand::Rng,
    ) -> Self {
        Self::populate(particle_count(base_count, width, height), width, height, table, rng)
    }

    /// `count` flakes scattered over `width x height`. Layers are laid out far
    /// to near in contiguous index ranges.
    pub fn populate(
        count: usize,
        width: f32,
        height: f32,
        table: &LayerTable,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let mut field = Self::with_capacity(count);

        for (layer, range) in table.partition(count).into_iter().enumerate() {
            let spec = &table.layers[layer];
            let band = table.band(layer);
            for _ in range {
                let x = rng.f32() * width;
                let y = rng.f32() * height;
                let base_size = spec.size.sample(rng);
                let speed_y = spec.speed.sample(rng);
                let wobble_phase = rng.f32() * TAU;
                let wobble_phase2 = rng.f32() * TAU;
                let time = rng.f32() * 1000.0;
                field.push(Flake {
                    x,
                    y,
                    speed_y,
                    base_size,
                    time,
                    wobble_speed: band.speed.sample(rng),
                    wobble_amp: band.amplitude.sample(rng),
                    wobble_phase,
                    wobble_speed2: band.speed2.sample(rng),
                    wobble_amp2: band.amplitude2.sample(rng),
                    wobble_phase2,
                    layer: layer as u8,
                });
            }
        }

        log::info!(
            "generated {} flakes for {:.0}x{:.0} logical px",
            field.len(),
            width,
            height
        );
        field
    }

    pub fn push(&mut self, f: Flake) {
        debug_assert!((f.layer as usize) < LAYER_COUNT);
        self.x.push(f.x);
        self.y.push(f.y);
        self.speed_y.push(f.speed_y);
        self.base_size.push(f.base_size);
        self.time.push(f.time);
        self.wobble_speed.push(f.wobble_speed);
        self.wobble_amp.push(f.wobble_amp);
        self.wobble_phase.push(f.wobble_phase);
        self.wobble_speed2.push(f.wobble_speed2);
        self.wobble_amp2.push(f.wobble_amp2);
        self.wobble_phase2.push(f.wobble_phase2);
        self.layer.push(f.layer);
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<Flake> {
        if i >= self.len() {
            return None;
        }
        Some(Flake {
            x: self.x[i],
            y: self.y[i],
            speed_y: self.speed_y[i],
            base_size: self.base_size[i],
            time: self.time[i],
            wobble_speed: self.wobble_speed[i],
            wobble_amp: self.wobble_amp[i],
            wobble_phase: self.wobble_phase[i],
            wobble_speed2: self.wobble_speed2[i],
            wobble_amp2: self.wobble_amp2[i],
            wobble_phase2: self.wobble_phase2[i],
            layer: self.layer[i],
        })
    }

    pub fn xs(&self) -> &[f32] {
        &self.x
    }

    pub fn ys(&self) -> &[f32] {
        &self.y
    }

    pub fn layers(&self) -> &[u8] {
        &self.layer
    }

    /// Number of flakes on each layer.
    pub fn layer_counts(&self) -> [usize; LAYER_COUNT] {
        let mut counts = [0usize; LAYER_COUNT];
        for &l in &self.layer {
            counts[(l as usize).min(LAYER_COUNT - 1)] += 1;
        }
        counts
    }
}
