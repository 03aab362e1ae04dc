use std::fmt;

/// Largest stamp radius we agree to rasterize.
pub const MAX_SPRITE_RADIUS: u32 = 1024;

#[derive(Debug, Clone, PartialEq)]
pub enum SpriteError {
    NoTiers,
    ZeroRadius,
    RadiusTooLarge(u32),
    BadOpacity { tier: usize, value: f32 },
}

impl fmt::Display for SpriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTiers => write!(f, "sprite atlas needs at least one opacity tier"),
            Self::ZeroRadius => write!(f, "sprite radius must be positive"),
            Self::RadiusTooLarge(r) => {
                write!(f, "sprite radius {r} exceeds limit {MAX_SPRITE_RADIUS}")
            }
            Self::BadOpacity { tier, value } => {
                write!(f, "opacity {value} for tier {tier} is outside 0..=1")
            }
        }
    }
}

impl std::error::Error for SpriteError {}

/// Square premultiplied-RGBA stamp.
#[derive(Debug, Clone)]
pub struct Sprite {
    side: usize,
    rgba: Vec<u8>,
}

impl Sprite {
    /// Soft white disc: `opacity` at the centre, half of it at mid-radius,
    /// transparent at the rim.
    pub fn radial(radius: u32, opacity: f32) -> Result<Self, SpriteError> {
        if radius == 0 {
            return Err(SpriteError::ZeroRadius);
        }
        if radius > MAX_SPRITE_RADIUS {
            return Err(SpriteError::RadiusTooLarge(radius));
        }
        if !opacity.is_finite() || !(0.0..=1.0).contains(&opacity) {
            return Err(SpriteError::BadOpacity {
                tier: 0,
                value: opacity,
            });
        }

        let r = radius as f32;
        let side = radius as usize * 2;
        let mut rgba = vec![0u8; side * side * 4];
        for py in 0..side {
            for px in 0..side {
                let dx = px as f32 + 0.5 - r;
                let dy = py as f32 + 0.5 - r;
                let t = (dx * dx + dy * dy).sqrt() / r;
                let a = (gradient_alpha(opacity, t) * 255.0).round() as u8;
                let i = (py * side + px) * 4;
                rgba[i..i + 4].copy_from_slice(&[a, a, a, a]);
            }
        }

        Ok(Self { side, rgba })
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn pixels(&self) -> &[u8] {
        &self.rgba
    }

    #[inline]
    pub fn alpha_at(&self, x: usize, y: usize) -> u8 {
        self.rgba[(y * self.side + x) * 4 + 3]
    }

    /// Premultiplied texel, clamped to the edge.
    #[inline]
    pub(crate) fn texel(&self, x: usize, y: usize) -> [u8; 4] {
        let x = x.min(self.side - 1);
        let y = y.min(self.side - 1);
        let i = (y * self.side + x) * 4;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }
}

/// Three-stop radial falloff, `t` is distance over radius.
fn gradient_alpha(opacity: f32, t: f32) -> f32 {
    if t >= 1.0 {
        0.0
    } else if t <= 0.5 {
        let k = t / 0.5;
        opacity + (opacity * 0.5 - opacity) * k
    } else {
        let k = (t - 0.5) / 0.5;
        opacity * 0.5 * (1.0 - k)
    }
}

/// One pre-rendered stamp per depth tier, indexed by layer.
#[derive(Debug, Clone)]
pub struct SpriteAtlas {
    radius: u32,
    sprites: Vec<Sprite>,
}

impl SpriteAtlas {
    pub fn build(opacities: &[f32], radius: u32) -> Result<Self, SpriteError> {
        if opacities.is_empty() {
            return Err(SpriteError::NoTiers);
        }
        let sprites = opacities
            .iter()
            .enumerate()
            .map(|(tier, &op)| {
                Sprite::radial(radius, op).map_err(|err| match err {
                    SpriteError::BadOpacity { value, .. } => SpriteError::BadOpacity { tier, value },
                    other => other,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { radius, sprites })
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn get(&self, tier: usize) -> Option<&Sprite> {
        self.sprites.get(tier)
    }
}

impl std::ops::Index<usize> for SpriteAtlas {
    type Output = Sprite;

    fn index(&self, tier: usize) -> &Sprite {
        &self.sprites[tier]
    }
}
