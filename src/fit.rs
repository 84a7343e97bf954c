// fit.rs

/// Largest size with the source aspect ratio that fits inside the bound.
///
/// Returns `None` for degenerate input (any dimension zero, negative or
/// non-finite), e.g. before an image has been loaded; callers skip scaling
/// in that case. Runs on every frame, so it must stay allocation-free.
pub fn fit(source_w: f32, source_h: f32, bound_w: f32, bound_h: f32) -> Option<(f32, f32)> {
    let valid = |v: f32| v.is_finite() && v > 0.0;
    if !(valid(source_w) && valid(source_h) && valid(bound_w) && valid(bound_h)) {
        return None;
    }

    let source_aspect = source_w / source_h;
    let bound_aspect = bound_w / bound_h;

    if bound_aspect > source_aspect {
        // Bound is relatively wider than the source: height limits.
        Some((source_aspect * bound_h, bound_h))
    } else {
        Some((bound_w, bound_w / source_aspect))
    }
}

#[cfg(test)]
mod tests {
    use super::fit;

    fn assert_close(actual: (f32, f32), expected: (f32, f32)) {
        assert!(
            (actual.0 - expected.0).abs() < 0.01 && (actual.1 - expected.1).abs() < 0.01,
            "got {:?}, expected {:?}",
            actual,
            expected
        );
    }

    #[test]
    fn width_limits_when_bound_is_relatively_narrower() {
        // 800/600 = 1.33 < 1600/900 = 1.78
        assert_close(fit(1600.0, 900.0, 800.0, 600.0).unwrap(), (800.0, 450.0));
    }

    #[test]
    fn height_limits_when_bound_is_relatively_wider() {
        assert_close(fit(900.0, 1600.0, 800.0, 600.0).unwrap(), (337.5, 600.0));
    }

    #[test]
    fn matching_aspect_fills_the_bound() {
        assert_close(fit(100.0, 100.0, 50.0, 50.0).unwrap(), (50.0, 50.0));
    }

    #[test]
    fn output_never_exceeds_the_bound() {
        for (sw, sh) in [(3000.0, 17.0), (17.0, 3000.0), (640.0, 480.0)] {
            let (w, h) = fit(sw, sh, 800.0, 600.0).unwrap();
            assert!(w <= 800.0 + 0.01 && h <= 600.0 + 0.01);
        }
    }

    #[test]
    fn degenerate_input_is_a_no_op() {
        assert_eq!(fit(0.0, 0.0, 800.0, 600.0), None);
        assert_eq!(fit(100.0, 0.0, 800.0, 600.0), None);
        assert_eq!(fit(100.0, 100.0, 0.0, 600.0), None);
        assert_eq!(fit(f32::NAN, 100.0, 800.0, 600.0), None);
        assert_eq!(fit(-100.0, 100.0, 800.0, 600.0), None);
    }
}
