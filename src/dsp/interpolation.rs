//! Four-point cubic B-spline interpolation for fractional delay reads.

/*
B-Spline Interpolation
======================

A fractional delay needs a value "between" stored samples. Linear
interpolation is cheap but its frequency response wobbles as the fraction
moves, which a modulated delay turns into audible flutter. A 4-point cubic
B-spline reads y[0..4] and evaluates a smooth curve between y[1] and y[2]:

        y[0]    y[1]  x  y[2]    y[3]
         •       •----◦---•       •
                 0   frac  1

The B-spline does not pass through the sample points exactly; it trades a
gentle high-frequency rolloff for constant-shape smoothing, a good fit for
repeats that are filtered anyway. The weights always sum to 1, so DC passes
unchanged.

The polynomial is evaluated in z-form: recentred on the middle of the
interval (z = x - 1/2), which keeps the coefficients small.
*/

/// 4-point, 3rd-order B-spline in z-form. `y` must hold at least 4 samples.
#[inline]
pub fn bspline_43z(y: &[f32], x: f32) -> f32 {
    let z = x - 0.5;
    let even1 = y[3] + y[0];
    let odd1 = y[3] - y[0];
    let even2 = y[2] + y[1];
    let odd2 = y[2] - y[1];
    let c0 = 1.0 / 48.0 * even1 + 23.0 / 48.0 * even2;
    let c1 = 1.0 / 8.0 * odd1 + 5.0 / 8.0 * odd2;
    let c2 = 1.0 / 4.0 * (even1 - even2);
    let c3 = 1.0 / 6.0 * odd1 - 1.0 / 2.0 * odd2;
    ((c3 * z + c2) * z + c1) * z + c0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_signal_passes_unchanged() {
        let y = [0.7; 4];
        for i in 0..=10 {
            let x = i as f32 / 10.0;
            assert!((bspline_43z(&y, x) - 0.7).abs() < 1e-6);
        }
    }

    #[test]
    fn test_linear_ramp_is_reproduced() {
        // B-splines reproduce straight lines exactly: value at y[1] + x.
        let y = [0.0, 1.0, 2.0, 3.0];
        for i in 0..=10 {
            let x = i as f32 / 10.0;
            let expected = 1.0 + x;
            assert!(
                (bspline_43z(&y, x) - expected).abs() < 1e-5,
                "z-form at {}: {}",
                x,
                bspline_43z(&y, x)
            );
        }
    }

    #[test]
    fn test_mirrored_input_mirrors_position() {
        // reversing the taps reflects x around the interval centre
        let y = [0.3, -0.8, 0.5, 0.1];
        let reversed = [0.1, 0.5, -0.8, 0.3];
        for i in 0..=20 {
            let x = i as f32 / 20.0;
            let forward = bspline_43z(&y, x);
            let backward = bspline_43z(&reversed, 1.0 - x);
            assert!(
                (forward - backward).abs() < 1e-5,
                "asymmetric at {}: {} vs {}",
                x,
                forward,
                backward
            );
        }
    }

    #[test]
    fn test_impulse_weights_at_sample_point() {
        // At x = 0 the kernel is 1/6, 2/3, 1/6 around y[1].
        let y = [0.0, 1.0, 0.0, 0.0];
        assert!((bspline_43z(&y, 0.0) - 2.0 / 3.0).abs() < 1e-6);
        let y = [1.0, 0.0, 0.0, 0.0];
        assert!((bspline_43z(&y, 0.0) - 1.0 / 6.0).abs() < 1e-6);
    }
}
