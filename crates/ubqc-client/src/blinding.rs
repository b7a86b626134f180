//! Angle blinding.
//!
//! Every measurement angle disclosed to the server is
//!
//! ```text
//! δ = φ' + θ + r·π   (mod 2π)
//! ```
//!
//! where φ' is the computation angle after the adaptive MBQC correction
//! (sign flip on odd X-domain parity, `+π` on odd Z-domain parity), θ is the
//! measured qubit's secret rotation angle and `r` is a fresh blind bit.
//! Because θ is uniform over all 256 angles, δ is uniform and independent of
//! φ. The server's raw outcome is flipped back with [`unblind`].

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use ubqc_ir::{Angle, MeasureStep};

use crate::error::ClientResult;
use crate::outcome::OutcomeVector;

/// Compute the blinded angle to send for `step`.
///
/// Fails only if a domain refers to an outcome that is not yet known, which
/// compiled flows rule out.
pub fn compute_disclosed_angle(
    step: &MeasureStep,
    outcomes: &OutcomeVector,
    secret_angle: Angle,
    blind_bit: bool,
) -> ClientResult<Angle> {
    let mut angle = step.angle;
    if outcomes.parity(&step.x_domain)? {
        angle = -angle;
    }
    if outcomes.parity(&step.z_domain)? {
        angle += Angle::PI;
    }
    Ok(angle + secret_angle + Angle::pi_if(blind_bit))
}

/// Undo the blind bit on a raw server outcome.
#[inline]
pub fn unblind(raw: bool, blind_bit: bool) -> bool {
    raw ^ blind_bit
}

/// Source of the client's secret randomness.
pub trait BlindingSource: Send {
    /// A secret rotation angle, uniform over all angles.
    fn secret_angle(&mut self) -> Angle;

    /// A fair blind bit.
    fn blind_bit(&mut self) -> bool;
}

/// [`BlindingSource`] backed by a `rand` generator.
#[derive(Debug, Clone)]
pub struct RngBlinding<R = StdRng> {
    rng: R,
}

impl<R: RngCore> RngBlinding<R> {
    /// Wrap an existing generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngBlinding<StdRng> {
    /// Seed from the operating system.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Deterministic generator, for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl Default for RngBlinding<StdRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: RngCore + Send> BlindingSource for RngBlinding<R> {
    fn secret_angle(&mut self) -> Angle {
        Angle(self.rng.r#gen())
    }

    fn blind_bit(&mut self) -> bool {
        self.rng.r#gen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use ubqc_ir::{ANGLE_RESOLUTION, QubitId};

    fn outcomes_with(bits: &[bool]) -> OutcomeVector {
        let mut outcomes = OutcomeVector::new(bits.len() as u32 + 1);
        for (i, bit) in bits.iter().enumerate() {
            outcomes.record(QubitId::from(i), *bit).unwrap();
        }
        outcomes
    }

    #[test]
    fn test_no_dependencies() {
        let step = MeasureStep::new(QubitId(0), Angle(10));
        let outcomes = OutcomeVector::new(1);
        assert_eq!(
            compute_disclosed_angle(&step, &outcomes, Angle(5), false).unwrap(),
            Angle(15)
        );
        assert_eq!(
            compute_disclosed_angle(&step, &outcomes, Angle(5), true).unwrap(),
            Angle(143)
        );
    }

    #[test]
    fn test_reduces_modulo_resolution() {
        let step = MeasureStep::new(QubitId(0), Angle(200));
        let outcomes = OutcomeVector::new(1);
        let delta = compute_disclosed_angle(&step, &outcomes, Angle(100), true).unwrap();
        assert_eq!(u16::from(delta.steps()), (200 + 100 + 128) % ANGLE_RESOLUTION);
    }

    #[test]
    fn test_z_dependency_shifts_by_pi() {
        let step = MeasureStep::new(QubitId(1), Angle(40)).with_z_domain([QubitId(0)]);
        let zero = compute_disclosed_angle(&step, &outcomes_with(&[false]), Angle(9), false).unwrap();
        let one = compute_disclosed_angle(&step, &outcomes_with(&[true]), Angle(9), false).unwrap();
        assert_eq!(one - zero, Angle::PI);
    }

    #[test]
    fn test_x_dependency_flips_sign() {
        let step = MeasureStep::new(QubitId(1), Angle::HALF_PI).with_x_domain([QubitId(0)]);
        let zero = compute_disclosed_angle(&step, &outcomes_with(&[false]), Angle::ZERO, false).unwrap();
        let one = compute_disclosed_angle(&step, &outcomes_with(&[true]), Angle::ZERO, false).unwrap();
        assert_eq!(zero, Angle::HALF_PI);
        assert_eq!(one, Angle(192));
        // For φ = π/2 a sign flip is also a shift by π.
        assert_eq!(one - zero, Angle::PI);
    }

    #[test]
    fn test_sign_flip_precedes_pi_shift() {
        let step = MeasureStep::new(QubitId(2), Angle(32))
            .with_x_domain([QubitId(0)])
            .with_z_domain([QubitId(1)]);
        let delta =
            compute_disclosed_angle(&step, &outcomes_with(&[true, true]), Angle::ZERO, false)
                .unwrap();
        // -32 = 224, then +128 wraps to 96.
        assert_eq!(delta, Angle(96));
    }

    #[test]
    fn test_unknown_dependency_is_violation() {
        let step = MeasureStep::new(QubitId(1), Angle::ZERO).with_x_domain([QubitId(0)]);
        let outcomes = OutcomeVector::new(2);
        assert!(compute_disclosed_angle(&step, &outcomes, Angle::ZERO, false).is_err());
    }

    #[test]
    fn test_unblind_truth_table() {
        assert!(!unblind(false, false));
        assert!(unblind(true, false));
        assert!(unblind(false, true));
        assert!(!unblind(true, true));
    }

    #[test]
    fn test_disclosed_angles_are_uniform() {
        const ROUNDS: usize = 100;
        let n = usize::from(ANGLE_RESOLUTION);
        let mut blinding = RngBlinding::seeded(0x5eed);
        let step = MeasureStep::new(QubitId(0), Angle::QUARTER_PI);
        let outcomes = OutcomeVector::new(1);

        let mut counts = vec![0usize; n];
        for _ in 0..ROUNDS * n {
            let theta = blinding.secret_angle();
            let r = blinding.blind_bit();
            let delta = compute_disclosed_angle(&step, &outcomes, theta, r).unwrap();
            counts[usize::from(delta.steps())] += 1;
        }

        let expected = ROUNDS as f64;
        let chi_square: f64 = counts
            .iter()
            .map(|&c| (c as f64 - expected).powi(2) / expected)
            .sum();
        // 255 degrees of freedom: mean 255, standard deviation about 22.6.
        assert!(chi_square < 350.0, "chi-square {chi_square} too large");
    }

    #[test]
    fn test_blind_bits_are_balanced() {
        let mut blinding = RngBlinding::seeded(7);
        let ones = (0..10_000).filter(|_| blinding.blind_bit()).count();
        assert!((4_700..5_300).contains(&ones), "{ones} ones in 10000 draws");
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = RngBlinding::seeded(42);
        let mut b = RngBlinding::seeded(42);
        for _ in 0..16 {
            assert_eq!(a.secret_angle(), b.secret_angle());
            assert_eq!(a.blind_bit(), b.blind_bit());
        }
    }

    proptest! {
        #[test]
        fn prop_unblind_is_involution(m in any::<bool>(), r in any::<bool>()) {
            prop_assert_eq!(unblind(unblind(m, r), r), m);
        }

        #[test]
        fn prop_blind_bit_adds_pi(phi in any::<u8>(), theta in any::<u8>()) {
            let step = MeasureStep::new(QubitId(0), Angle(phi));
            let outcomes = OutcomeVector::new(1);
            let plain = compute_disclosed_angle(&step, &outcomes, Angle(theta), false).unwrap();
            let blinded = compute_disclosed_angle(&step, &outcomes, Angle(theta), true).unwrap();
            prop_assert_eq!(blinded - plain, Angle::PI);
        }
    }
}
