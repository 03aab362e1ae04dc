use crate::snow::field::ParticleField;

/// Where a flake re-enters after falling off the bottom.
pub const RECYCLE_Y: f32 = -10.0;

/// Frequency ratio of the secondary sway harmonic.
pub const SECOND_HARMONIC: f32 = 0.8;

/// Horizontal sway for a flake: a sine and a slower cosine summed.
#[inline]
pub fn wobble_offset(time: f32, amp: f32, phase: f32, amp2: f32, phase2: f32) -> f32 {
    amp * (time + phase).sin() + amp2 * (SECOND_HARMONIC * time + phase2).cos()
}

#[inline]
pub fn render_x(x: f32, time: f32, amp: f32, phase: f32, amp2: f32, phase2: f32) -> f32 {
    x + wobble_offset(time, amp, phase, amp2, phase2)
}

/// Advance every flake by one frame. Flakes that fall below `height` are
/// sent back above the top edge at a new random column.
pub fn step(field: &mut ParticleField, width: f32, height: f32, rng: &mut fastrand::Rng) {
    let n = field.len();
    let ParticleField {
        x,
        y,
        speed_y,
        time,
        wobble_speed,
        ..
    } = field;

    for i in 0..n {
        y[i] += speed_y[i];
        time[i] += wobble_speed[i];
        if y[i] > height {
            y[i] = RECYCLE_Y;
            x[i] = rng.f32() * width;
        }
    }
}

impl ParticleField {
    /// Drawn position of flake `i`; `x`/`y` themselves hold the unwobbled path.
    #[inline]
    pub fn render_pos(&self, i: usize) -> (f32, f32) {
        let rx = render_x(
            self.x[i],
            self.time[i],
            self.wobble_amp[i],
            self.wobble_phase[i],
            self.wobble_amp2[i],
            self.wobble_phase2[i],
        );
        (rx, self.y[i])
    }
}
