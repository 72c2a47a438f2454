//! Confidence threshold helpers.

/// Clamp a slider value into `[0.0, 1.0]`.
///
/// The input control is the only place the threshold is bounded; commits
/// send whatever the slider holds.
pub fn clamp_threshold(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
