use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError(pub String);

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected RRGGBB hex colour, got {:?}", self.0)
    }
}

impl std::error::Error for ColorParseError {}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(ColorParseError(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ColorParseError(s.to_string()))
        };
        Ok(Self(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Box-filter a premultiplied `sw x sh` surface down (or up) to `dw x dh`
/// and flatten it over `bg`. `out` is resized to `dw * dh * 4` opaque RGBA.
/// An empty source yields a solid background.
pub fn compose_over(src: &[u8], sw: usize, sh: usize, dw: usize, dh: usize, bg: Rgb, out: &mut Vec<u8>) {
    out.clear();
    out.resize(dw * dh * 4, 255);
    if dw == 0 || dh == 0 {
        return;
    }

    let usable = sw > 0 && sh > 0 && src.len() >= sw * sh * 4;
    for dy in 0..dh {
        let (sy0, sy1) = span(dy, dh, sh);
        for dx in 0..dw {
            let o = (dy * dw + dx) * 4;
            if !usable {
                out[o..o + 3].copy_from_slice(&[bg.0, bg.1, bg.2]);
                continue;
            }

            let (sx0, sx1) = span(dx, dw, sw);
            let mut acc = [0u32; 4];
            for sy in sy0..sy1 {
                let row = sy * sw;
                for sx in sx0..sx1 {
                    let i = (row + sx) * 4;
                    acc[0] += src[i] as u32;
                    acc[1] += src[i + 1] as u32;
                    acc[2] += src[i + 2] as u32;
                    acc[3] += src[i + 3] as u32;
                }
            }
            let n = ((sy1 - sy0) * (sx1 - sx0)).max(1) as u32;
            let a = acc[3] / n;
            let keep = 255 - a.min(255);
            let mix = |c: u32, b: u8| ((c / n + (b as u32 * keep) / 255).min(255)) as u8;
            out[o] = mix(acc[0], bg.0);
            out[o + 1] = mix(acc[1], bg.1);
            out[o + 2] = mix(acc[2], bg.2);
        }
    }
}

/// Source index range covered by destination cell `d` (never empty).
fn span(d: usize, dn: usize, sn: usize) -> (usize, usize) {
    let lo = d * sn / dn;
    let hi = ((d + 1) * sn / dn).max(lo + 1).min(sn);
    (lo.min(sn - 1), hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_covers_source_without_gaps() {
        let mut next = 0;
        for d in 0..7 {
            let (lo, hi) = span(d, 7, 30);
            assert_eq!(lo, next);
            assert!(hi > lo);
            next = hi;
        }
        assert_eq!(next, 30);
    }

    #[test]
    fn upscale_repeats_source_pixels() {
        for d in 0..8 {
            let (lo, hi) = span(d, 8, 2);
            assert_eq!(hi - lo, 1);
            assert_eq!(lo, d / 4);
        }
    }
}
