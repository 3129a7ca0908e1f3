//! F1/F2 scoring policy and fused-fitness formula (spec §4.1).

/// Weights for the fused-fitness formula. Defaults match spec §4.1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessWeights {
    pub w1: f64,
    pub w2: f64,
    pub w3: f64,
    pub w23: f64,
    pub w13: f64,
    pub w12: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            w1: 0.15,
            w2: 0.25,
            w3: 0.60,
            w23: 0.25,
            w13: 0.10,
            w12: 0.05,
        }
    }
}

/// F1 (compile-quality) policy: `1 / (1 + 3*errors + warnings)`.
pub fn compile_quality(errors: u32, warnings: u32) -> f64 {
    let penalty = 3.0 * errors as f64 + warnings as f64;
    1.0 / (1.0 + penalty)
}

/// Count case-insensitive `error:`/`warning:` substrings in build output.
pub fn count_diagnostics(build_output: &str) -> (u32, u32) {
    let lower = build_output.to_lowercase();
    let errors = lower.matches("error:").count() as u32;
    let warnings = lower.matches("warning:").count() as u32;
    (errors, warnings)
}

/// F2 (unit-test) policy: `num_passed / num_tests`, or 0 when num_tests == 0.
pub fn test_pass_rate(num_tests: u32, num_passed: u32) -> f64 {
    if num_tests == 0 {
        0.0
    } else {
        num_passed as f64 / num_tests as f64
    }
}

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Fused fitness over F1, F2, F3 with synergy terms (spec §4.1). Returns
/// `None` unless all three are present, per spec §3 invariant 6.
pub fn fused_fitness(
    f1: Option<f64>,
    f2: Option<f64>,
    f3: Option<f64>,
    weights: FitnessWeights,
) -> Option<f64> {
    let (f1, f2, f3) = (clamp01(f1?), clamp01(f2?), clamp01(f3?));
    let base = weights.w1 * f1 + weights.w2 * f2 + weights.w3 * f3;
    let synergy = weights.w23 * f2 * f3 + weights.w13 * f1 * f3 + weights.w12 * f1 * f2;
    let denom = weights.w1 + weights.w2 + weights.w3 + weights.w23 + weights.w13 + weights.w12;
    Some((base + synergy) / denom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f1_boundaries() {
        assert_eq!(compile_quality(0, 0), 1.0);
        assert_eq!(compile_quality(1, 0), 0.25);
        assert!((compile_quality(0, 10) - 1.0 / 11.0).abs() < 1e-12);
    }

    #[test]
    fn f2_zero_tests_is_zero_not_nan() {
        let f2 = test_pass_rate(0, 0);
        assert_eq!(f2, 0.0);
        assert!(!f2.is_nan());
    }

    #[test]
    fn f2_full_pass() {
        assert_eq!(test_pass_rate(10, 10), 1.0);
    }

    #[test]
    fn fused_fitness_requires_all_three() {
        assert_eq!(fused_fitness(Some(1.0), Some(1.0), None, FitnessWeights::default()), None);
    }

    #[test]
    fn fused_fitness_happy_path_matches_scenario_1() {
        // spec §8 scenario 1: F1=1.0, F2=1.0, F3=0.9 ⇒ fused ≈ 0.90
        let fused = fused_fitness(Some(1.0), Some(1.0), Some(0.9), FitnessWeights::default()).unwrap();
        assert!((fused - 0.90).abs() < 0.02, "fused={fused}");
    }

    #[test]
    fn fused_fitness_monotone_non_decreasing_in_each_argument() {
        let w = FitnessWeights::default();
        let base = fused_fitness(Some(0.3), Some(0.3), Some(0.3), w).unwrap();
        let bumped_f1 = fused_fitness(Some(0.6), Some(0.3), Some(0.3), w).unwrap();
        let bumped_f2 = fused_fitness(Some(0.3), Some(0.6), Some(0.3), w).unwrap();
        let bumped_f3 = fused_fitness(Some(0.3), Some(0.3), Some(0.6), w).unwrap();
        assert!(bumped_f1 >= base);
        assert!(bumped_f2 >= base);
        assert!(bumped_f3 >= base);
    }

    #[test]
    fn fused_fitness_clamps_out_of_range_inputs() {
        let w = FitnessWeights::default();
        let clamped = fused_fitness(Some(1.5), Some(-0.5), Some(1.0), w).unwrap();
        let expected = fused_fitness(Some(1.0), Some(0.0), Some(1.0), w).unwrap();
        assert!((clamped - expected).abs() < 1e-12);
    }
}
