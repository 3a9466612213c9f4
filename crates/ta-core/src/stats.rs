//! Statistical primitives shared by every scorer.
//!
//! All functions are pure and allocation-free. Inputs outside the documented
//! contract are the caller's violation; within contract the functions return
//! defined values and never panic.

/// Zelen & Severo polynomial coefficients for the normal CDF tail
/// (Abramowitz & Stegun 26.2.17, |error| < 7.5e-8).
const CDF_B: [f64; 5] = [
    0.319_381_530,
    -0.356_563_782,
    1.781_477_937,
    -1.821_255_978,
    1.330_274_429,
];
const CDF_T: f64 = 0.231_641_9;

/// Acklam rational-approximation coefficients for the inverse normal CDF.
/// Split into the central region and the two tails at p = 0.02425.
const INV_A: [f64; 6] = [
    -3.969_683_028_665_376e1,
    2.209_460_984_245_205e2,
    -2.759_285_104_469_687e2,
    1.383_577_518_672_690e2,
    -3.066_479_806_614_716e1,
    2.506_628_277_459_239,
];
const INV_B: [f64; 5] = [
    -5.447_609_879_822_406e1,
    1.615_858_368_580_409e2,
    -1.556_989_798_598_866e2,
    6.680_131_188_771_972e1,
    -1.328_068_155_288_572e1,
];
const INV_C: [f64; 6] = [
    -7.784_894_002_430_293e-3,
    -3.223_964_580_411_365e-1,
    -2.400_758_277_161_838,
    -2.549_732_539_343_734,
    4.374_664_141_464_968,
    2.938_163_982_698_783,
];
const INV_D: [f64; 4] = [
    7.784_695_709_041_462e-3,
    3.224_671_290_700_398e-1,
    2.445_134_137_142_996,
    3.754_408_661_907_416,
];
const INV_P_LOW: f64 = 0.024_25;

/// Standard normal cumulative distribution function.
pub fn normal_cdf(x: f64) -> f64 {
    let abs = x.abs();
    let t = 1.0 / (1.0 + CDF_T * abs);
    let pdf = (-0.5 * abs * abs).exp() / (2.0 * std::f64::consts::PI).sqrt();
    let poly = t * (CDF_B[0] + t * (CDF_B[1] + t * (CDF_B[2] + t * (CDF_B[3] + t * CDF_B[4]))));
    let upper_tail = pdf * poly;

    if x >= 0.0 {
        1.0 - upper_tail
    } else {
        upper_tail
    }
}

/// Inverse of the standard normal CDF.
///
/// Contract: `p` in (0, 1). Values at or beyond the bounds are clamped to a
/// tiny interior margin so the tails stay finite.
pub fn normal_inverse(p: f64) -> f64 {
    let p = p.clamp(1e-12, 1.0 - 1e-12);

    if p < INV_P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        tail_value(q)
    } else if p > 1.0 - INV_P_LOW {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -tail_value(q)
    } else {
        let q = p - 0.5;
        let r = q * q;
        let num = ((((INV_A[0] * r + INV_A[1]) * r + INV_A[2]) * r + INV_A[3]) * r + INV_A[4]) * r
            + INV_A[5];
        let den = ((((INV_B[0] * r + INV_B[1]) * r + INV_B[2]) * r + INV_B[3]) * r + INV_B[4]) * r
            + 1.0;
        q * num / den
    }
}

fn tail_value(q: f64) -> f64 {
    let num = ((((INV_C[0] * q + INV_C[1]) * q + INV_C[2]) * q + INV_C[3]) * q + INV_C[4]) * q
        + INV_C[5];
    let den = (((INV_D[0] * q + INV_D[1]) * q + INV_D[2]) * q + INV_D[3]) * q + 1.0;
    num / den
}

/// Converts a raw score on `[raw_min, raw_max]` to an integer STEN in [1, 10].
///
/// The raw score is clamped to the bounds, mapped to a proportion, run
/// through the inverse normal, then placed on the STEN scale
/// (mean 5.5, SD 2). Degenerate proportions pin to the scale ends.
pub fn raw_to_sten(raw: f64, raw_min: f64, raw_max: f64) -> u8 {
    if raw_max <= raw_min {
        return 1;
    }

    let clamped = raw.clamp(raw_min, raw_max);
    let proportion = (clamped - raw_min) / (raw_max - raw_min);

    if proportion <= 0.0 {
        return 1;
    }
    if proportion >= 1.0 {
        return 10;
    }

    let z = normal_inverse(proportion);
    clamp_sten(5.5 + 2.0 * z)
}

/// Sums Likert responses (each on 1..=5) and converts against the bounds
/// `[n, 5n]`.
pub fn likert_sum_to_sten(responses: &[f64]) -> u8 {
    if responses.is_empty() {
        return 1;
    }

    let n = responses.len() as f64;
    let sum: f64 = responses.iter().sum();
    raw_to_sten(sum, n, 5.0 * n)
}

/// Logistic approximation of the percentile for an integer STEN.
pub fn sten_to_percentile(sten: u8) -> u8 {
    let exponent = -1.7 * (sten as f64 - 5.5) / 2.0;
    let p = 100.0 / (1.0 + exponent.exp());
    p.round().clamp(0.0, 100.0) as u8
}

/// Maps a percentile in (0, 100) to a STEN via the inverse normal.
/// Used by the ipsative→normative interest conversion.
pub fn percentile_to_sten(percentile: f64) -> u8 {
    let z = normal_inverse(percentile / 100.0);
    clamp_sten(5.5 + 2.0 * z)
}

fn clamp_sten(value: f64) -> u8 {
    value.round().clamp(1.0, 10.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cdf_matches_known_points() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((normal_cdf(1.0) - 0.841_344_746).abs() < 1e-6);
        assert!((normal_cdf(-1.0) - 0.158_655_254).abs() < 1e-6);
        assert!((normal_cdf(1.96) - 0.975_002_105).abs() < 1e-6);
    }

    #[test]
    fn inverse_round_trips_through_cdf() {
        for p in [0.01, 0.25, 0.5, 0.75, 0.99] {
            let x = normal_inverse(p);
            assert!(
                (normal_cdf(x) - p).abs() < 1e-6,
                "round trip failed at p={p}"
            );
        }
    }

    #[test]
    fn inverse_handles_tails() {
        assert!(normal_inverse(0.001) < -3.0);
        assert!(normal_inverse(0.999) > 3.0);
        assert!(normal_inverse(0.0).is_finite());
        assert!(normal_inverse(1.0).is_finite());
    }

    #[test]
    fn raw_to_sten_pins_the_ends() {
        assert_eq!(raw_to_sten(80.0, 80.0, 400.0), 1);
        assert_eq!(raw_to_sten(400.0, 80.0, 400.0), 10);
        assert_eq!(raw_to_sten(-10.0, 80.0, 400.0), 1);
        assert_eq!(raw_to_sten(900.0, 80.0, 400.0), 10);
    }

    #[test]
    fn midpoint_raw_maps_to_sten_six() {
        // proportion 0.5 → z = 0 → round(5.5) = 6
        assert_eq!(raw_to_sten(240.0, 80.0, 400.0), 6);
    }

    #[test]
    fn raw_to_sten_is_monotone() {
        let mut last = 0u8;
        for raw in (80..=400).step_by(10) {
            let sten = raw_to_sten(raw as f64, 80.0, 400.0);
            assert!(sten >= last, "sten decreased at raw={raw}");
            assert!((1..=10).contains(&sten));
            last = sten;
        }
    }

    #[test]
    fn degenerate_bounds_return_floor() {
        assert_eq!(raw_to_sten(5.0, 5.0, 5.0), 1);
        assert_eq!(raw_to_sten(5.0, 9.0, 3.0), 1);
    }

    #[test]
    fn likert_sum_uses_item_count_bounds() {
        assert_eq!(likert_sum_to_sten(&[]), 1);
        assert_eq!(likert_sum_to_sten(&[1.0, 1.0, 1.0]), 1);
        assert_eq!(likert_sum_to_sten(&[5.0, 5.0, 5.0]), 10);
        assert_eq!(likert_sum_to_sten(&[3.0, 3.0, 3.0]), 6);
    }

    #[test]
    fn sten_to_percentile_follows_logistic() {
        assert_eq!(sten_to_percentile(6), 60);
        assert_eq!(sten_to_percentile(5), 40);
        assert!(sten_to_percentile(10) > 95);
        assert!(sten_to_percentile(1) < 5);
    }

    #[test]
    fn percentile_to_sten_covers_interest_ranks() {
        // Mid-rank percentiles for six scales: (6 - r + 0.5) / 6 * 100.
        assert_eq!(percentile_to_sten(91.666), 8);
        assert_eq!(percentile_to_sten(50.0), 6);
        assert_eq!(percentile_to_sten(8.333), 3);
    }
}
