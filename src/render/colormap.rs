/// Magma-style ramp sampled at nine evenly spaced stops, dark to light.
const MAGMA: [[u8; 3]; 9] = [
    [0, 0, 4],
    [28, 16, 68],
    [79, 18, 123],
    [129, 37, 129],
    [181, 54, 122],
    [229, 80, 100],
    [251, 135, 97],
    [254, 194, 135],
    [252, 253, 191],
];

/// Map `t` in `[0, 1]` to an RGB color. Out-of-range input is clamped.
pub fn magma(t: f32) -> [u8; 3] {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let pos = t * (MAGMA.len() - 1) as f32;
    let lo = (pos.floor() as usize).min(MAGMA.len() - 2);
    let frac = pos - lo as f32;

    let a = MAGMA[lo];
    let b = MAGMA[lo + 1];
    let mut out = [0u8; 3];
    for c in 0..3 {
        out[c] = (a[c] as f32 + (b[c] as f32 - a[c] as f32) * frac).round() as u8;
    }
    out
}

/// Position of `value` within `(min, max)`. A flat range maps to the middle.
pub fn normalize(value: f32, (min, max): (f32, f32)) -> f32 {
    let span = max - min;
    if span <= f32::EPSILON || !span.is_finite() {
        return 0.5;
    }
    ((value - min) / span).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_match_ramp() {
        assert_eq!(magma(0.0), MAGMA[0]);
        assert_eq!(magma(1.0), MAGMA[8]);
        assert_eq!(magma(0.5), MAGMA[4]);
    }

    #[test]
    fn clamps_out_of_range() {
        assert_eq!(magma(-3.0), MAGMA[0]);
        assert_eq!(magma(7.0), MAGMA[8]);
        assert_eq!(magma(f32::NAN), MAGMA[0]);
    }

    #[test]
    fn normalize_handles_flat_range() {
        assert_eq!(normalize(-120.0, (-120.0, -120.0)), 0.5);
        assert_eq!(normalize(-60.0, (-120.0, 0.0)), 0.5);
        assert_eq!(normalize(10.0, (-120.0, 0.0)), 1.0);
    }
}
