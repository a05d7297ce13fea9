//! Polygamma functions needed by the variance prior
//!
//! ψ comes from statrs; ψ′ and ψ″ use the recurrence
//! ψ⁽ᵐ⁾(x) = ψ⁽ᵐ⁾(x + 1) − (−1)ᵐ m! / x^{m+1} to shift the argument above
//! [`ASYMPTOTIC_THRESHOLD`], then the asymptotic Bernoulli series.

pub use statrs::function::gamma::digamma;

const ASYMPTOTIC_THRESHOLD: f64 = 12.0;

/// Trigamma ψ′(x) for x > 0; NaN otherwise
pub fn trigamma(x: f64) -> f64 {
    if x == f64::INFINITY {
        return 0.0;
    }
    if x.is_nan() || x <= 0.0 {
        return f64::NAN;
    }
    let mut x = x;
    let mut acc = 0.0;
    while x < ASYMPTOTIC_THRESHOLD {
        acc += 1.0 / (x * x);
        x += 1.0;
    }
    let inv = 1.0 / x;
    let inv2 = inv * inv;
    acc + inv
        + inv2 / 2.0
        + inv * inv2 * (1.0 / 6.0 - inv2 * (1.0 / 30.0 - inv2 * (1.0 / 42.0 - inv2 / 30.0)))
}

/// Tetragamma ψ″(x) for x > 0; NaN otherwise
pub fn tetragamma(x: f64) -> f64 {
    if x == f64::INFINITY {
        return 0.0;
    }
    if x.is_nan() || x <= 0.0 {
        return f64::NAN;
    }
    let mut x = x;
    let mut acc = 0.0;
    while x < ASYMPTOTIC_THRESHOLD {
        acc -= 2.0 / (x * x * x);
        x += 1.0;
    }
    let inv = 1.0 / x;
    let inv2 = inv * inv;
    let series = 0.5 - inv2 * (1.0 / 6.0 - inv2 * (1.0 / 6.0 - inv2 * (0.3 - inv2 * 5.0 / 6.0)));
    acc - inv2 - inv2 * inv - inv2 * inv2 * series
}

/// Solve ψ′(x) = y for x > 0 by Newton iteration
///
/// 1/ψ′ is convex, so Newton on it started from `0.5 + 1/y` (above the
/// root) decreases monotonically to the root.
pub fn trigamma_inverse(y: f64) -> f64 {
    if y.is_nan() || y <= 0.0 || y.is_infinite() {
        return f64::NAN;
    }
    if y > 1e7 {
        return 1.0 / y.sqrt();
    }
    if y < 1e-6 {
        return 1.0 / y;
    }

    let mut x = 0.5 + 1.0 / y;
    for _ in 0..50 {
        let tri = trigamma(x);
        let step = tri * (1.0 - tri / y) / tetragamma(x);
        x += step;
        if -step / x < 1e-8 {
            break;
        }
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use std::f64::consts::PI;

    #[test]
    fn test_trigamma_known_values() {
        assert_relative_eq!(trigamma(1.0), PI * PI / 6.0, max_relative = 1e-10);
        assert_relative_eq!(trigamma(0.5), PI * PI / 2.0, max_relative = 1e-10);
        assert_relative_eq!(trigamma(2.0), PI * PI / 6.0 - 1.0, max_relative = 1e-10);
        assert!(trigamma(0.0).is_nan());
    }

    #[test]
    fn test_tetragamma_known_values() {
        // ψ″(1) = −2 ζ(3)
        assert_relative_eq!(tetragamma(1.0), -2.404_113_806_319_188_5, max_relative = 1e-10);
        assert_relative_eq!(tetragamma(2.0), -2.404_113_806_319_188_5 + 2.0, max_relative = 1e-10);
    }

    #[rstest]
    #[case(0.05)]
    #[case(0.7)]
    #[case(2.0)]
    #[case(30.0)]
    #[case(250.0)]
    fn test_trigamma_inverse_round_trip(#[case] x: f64) {
        assert_relative_eq!(trigamma_inverse(trigamma(x)), x, max_relative = 1e-6);
    }

    #[test]
    fn test_digamma_from_statrs() {
        // ψ(1) = −γ
        assert_relative_eq!(digamma(1.0), -0.577_215_664_901_532_9, max_relative = 1e-10);
    }
}
