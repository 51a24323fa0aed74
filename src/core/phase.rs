use std::f64::consts::TAU;

/// Reduce an angle into `[0, TAU)`. Non-finite input maps to 0.
#[inline]
pub fn wrap_0_tau(x: f64) -> f64 {
    if !x.is_finite() {
        return 0.0;
    }
    let w = x.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to exactly TAU.
    if w >= TAU { 0.0 } else { w }
}

/// Magnitude of the mean unit phasor `exp(i * phase)`.
///
/// 1.0 when every phase is identical, near 0.0 when the phases are spread
/// evenly around the circle. Returns 0.0 for an empty input.
pub fn phase_coherence<I>(phases: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut re = 0.0;
    let mut im = 0.0;
    let mut n = 0usize;
    for phase in phases {
        re += phase.cos();
        im += phase.sin();
        n += 1;
    }
    if n == 0 {
        return 0.0;
    }
    let inv = 1.0 / n as f64;
    (re * inv).hypot(im * inv)
}
