//! Discrete measurement angles.
//!
//! Angles are multiples of `π/2^7`, so a full turn is [`ANGLE_RESOLUTION`]
//! steps and every operation wraps modulo that resolution. This is the
//! angle format quantum backends accept as `rot_*(n, 7)`.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};

/// Number of discrete angles in a full turn (2π).
pub const ANGLE_RESOLUTION: u16 = 256;

/// Exponent `d` of the angle denominator: one step is `π / 2^d`.
pub const ANGLE_PRECISION: u8 = 7;

/// An angle `n · π / 128`, stored as `n mod 256`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Angle(pub u8);

impl Angle {
    /// The zero angle.
    pub const ZERO: Angle = Angle(0);
    /// π/4.
    pub const QUARTER_PI: Angle = Angle(32);
    /// π/2.
    pub const HALF_PI: Angle = Angle(64);
    /// π, half the resolution.
    pub const PI: Angle = Angle(128);

    /// Build an angle from any integer step count, reducing modulo the resolution.
    pub fn from_steps(steps: i64) -> Self {
        // rem_euclid keeps the value in 0..256, so the cast is lossless.
        Angle(steps.rem_euclid(i64::from(ANGLE_RESOLUTION)) as u8)
    }

    /// The step count `n` in `0..256`.
    #[inline]
    pub fn steps(self) -> u8 {
        self.0
    }

    /// Convert to radians in `[0, 2π)`.
    pub fn to_radians(self) -> f64 {
        f64::from(self.0) * PI / f64::from(ANGLE_RESOLUTION / 2)
    }

    /// `π` if `bit` is set, zero otherwise.
    #[inline]
    pub fn pi_if(bit: bool) -> Self {
        if bit { Angle::PI } else { Angle::ZERO }
    }
}

impl Add for Angle {
    type Output = Angle;

    fn add(self, rhs: Angle) -> Angle {
        Angle(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for Angle {
    fn add_assign(&mut self, rhs: Angle) {
        *self = *self + rhs;
    }
}

impl Sub for Angle {
    type Output = Angle;

    fn sub(self, rhs: Angle) -> Angle {
        Angle(self.0.wrapping_sub(rhs.0))
    }
}

impl Neg for Angle {
    type Output = Angle;

    fn neg(self) -> Angle {
        Angle(self.0.wrapping_neg())
    }
}

impl From<u8> for Angle {
    fn from(steps: u8) -> Self {
        Angle(steps)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}π/128", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_wrapping_arithmetic() {
        assert_eq!(Angle(200) + Angle(100), Angle(44));
        assert_eq!(Angle(10) - Angle(20), Angle(246));
        assert_eq!(-Angle::HALF_PI, Angle(192));
        assert_eq!(-Angle::ZERO, Angle::ZERO);
        assert_eq!(-Angle::PI, Angle::PI);
    }

    #[test]
    fn test_from_steps_reduces() {
        assert_eq!(Angle::from_steps(256), Angle::ZERO);
        assert_eq!(Angle::from_steps(-1), Angle(255));
        assert_eq!(Angle::from_steps(384), Angle::PI);
    }

    #[test]
    fn test_to_radians() {
        assert!((Angle::PI.to_radians() - PI).abs() < 1e-12);
        assert!((Angle::QUARTER_PI.to_radians() - PI / 4.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_negation_is_additive_inverse(n in any::<u8>()) {
            let a = Angle(n);
            prop_assert_eq!(a + (-a), Angle::ZERO);
        }

        #[test]
        fn prop_adding_pi_twice_is_identity(n in any::<u8>()) {
            let a = Angle(n);
            prop_assert_eq!(a + Angle::PI + Angle::PI, a);
        }
    }
}
