/// Added to the norm so an all-zero vector stays finite.
pub const NORM_EPS: f32 = 1e-12;

pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scale `v` in place to unit L2 length (`v / (‖v‖ + eps)`).
pub fn normalize_l2(v: &mut [f32]) {
    let norm = l2_norm(v) + NORM_EPS;
    for x in v.iter_mut() {
        *x /= norm;
    }
}
