use std::ops::Range;

pub const LAYER_COUNT: usize = 7;

/// Uniform draw over `[min, min + span)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spread {
    pub min: f32,
    pub span: f32,
}

impl Spread {
    pub const fn new(min: f32, span: f32) -> Self {
        Self { min, span }
    }

    #[inline]
    pub fn sample(self, rng: &mut fastrand::Rng) -> f32 {
        self.min + rng.f32() * self.span
    }

    /// Inclusive at the top: `min + f32 * span` can round up to the bound.
    pub fn contains(self, v: f32) -> bool {
        v >= self.min && v <= self.min + self.span
    }
}

/// Sway parameters shared by a group of depth layers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WobbleBand {
    pub speed: Spread,
    pub amplitude: Spread,
    pub speed2: Spread,
    pub amplitude2: Spread,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Depth {
    Far,
    Mid,
    Near,
}

impl Depth {
    pub fn of_layer(layer: usize) -> Self {
        match layer {
            0..=2 => Self::Far,
            3..=4 => Self::Mid,
            _ => Self::Near,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerSpec {
    /// Fraction of the population living on this layer.
    pub share: f64,
    /// Peak alpha of the layer's sprite.
    pub opacity: f32,
    pub size: Spread,
    pub speed: Spread,
}

/// Hand-tuned depth tables, far layer first.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerTable {
    pub layers: [LayerSpec; LAYER_COUNT],
    pub far: WobbleBand,
    pub mid: WobbleBand,
    pub near: WobbleBand,
}

impl Default for LayerTable {
    fn default() -> Self {
        const fn layer(share: f64, opacity: f32, size: (f32, f32), speed: (f32, f32)) -> LayerSpec {
            LayerSpec {
                share,
                opacity,
                size: Spread::new(size.0, size.1),
                speed: Spread::new(speed.0, speed.1),
            }
        }

        Self {
            layers: [
                layer(0.35, 0.15, (0.2, 0.1), (0.5, 4.0)),
                layer(0.25, 0.25, (0.3, 0.15), (0.4, 3.5)),
                layer(0.15, 0.35, (0.4, 0.2), (0.4, 3.0)),
                layer(0.10, 0.45, (0.6, 0.25), (0.6, 2.5)),
                layer(0.08, 0.55, (0.85, 0.35), (0.8, 2.0)),
                layer(0.04, 0.70, (1.2, 0.45), (0.7, 1.5)),
                layer(0.03, 0.85, (1.5, 0.6), (0.5, 1.2)),
            ],
            far: WobbleBand {
                speed: Spread::new(0.02, 0.05),
                amplitude: Spread::new(20.0, 40.0),
                speed2: Spread::new(0.01, 0.03),
                amplitude2: Spread::new(10.0, 25.0),
            },
            mid: WobbleBand {
                speed: Spread::new(0.015, 0.025),
                amplitude: Spread::new(10.0, 20.0),
                speed2: Spread::new(0.008, 0.015),
                amplitude2: Spread::new(5.0, 12.0),
            },
            near: WobbleBand {
                speed: Spread::new(0.005, 0.01),
                amplitude: Spread::new(1.0, 5.0),
                speed2: Spread::new(0.002, 0.005),
                amplitude2: Spread::new(0.5, 3.0),
            },
        }
    }
}

impl LayerTable {
    pub fn band(&self, layer: usize) -> &WobbleBand {
        match Depth::of_layer(layer) {
            Depth::Far => &self.far,
            Depth::Mid => &self.mid,
            Depth::Near => &self.near,
        }
    }

    pub fn opacities(&self) -> [f32; LAYER_COUNT] {
        self.layers.map(|l| l.opacity)
    }

    /// Contiguous index ranges per layer. Each layer gets `floor(count * share)`
    /// slots; the nearest layer takes whatever is left so the ranges tile
    /// `0..count` exactly.
    pub fn partition(&self, count: usize) -> [Range<usize>; LAYER_COUNT] {
        let mut ranges: [Range<usize>; LAYER_COUNT] = Default::default();
        let mut start = 0usize;
        for (layer, spec) in self.layers.iter().enumerate() {
            let end = if layer == LAYER_COUNT - 1 {
                count
            } else {
                let n = (count as f64 * spec.share).floor() as usize;
                (start + n).min(count)
            };
            ranges[layer] = start..end;
            start = end;
        }
        ranges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shares_sum_to_one() {
        let sum: f64 = LayerTable::default().layers.iter().map(|l| l.share).sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum={sum}");
    }

    #[test]
    fn depth_bands_follow_layer_index() {
        assert_eq!(Depth::of_layer(0), Depth::Far);
        assert_eq!(Depth::of_layer(2), Depth::Far);
        assert_eq!(Depth::of_layer(3), Depth::Mid);
        assert_eq!(Depth::of_layer(4), Depth::Mid);
        assert_eq!(Depth::of_layer(5), Depth::Near);
        assert_eq!(Depth::of_layer(6), Depth::Near);
    }

    #[test]
    fn partition_of_reference_count() {
        let ranges = LayerTable::default().partition(5000);
        let sizes = ranges.iter().map(|r| r.len()).collect::<Vec<_>>();
        assert_eq!(sizes, vec![1750, 1250, 750, 500, 400, 200, 150]);
    }
}
