//! Single-qubit gates the client applies locally.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::angle::Angle;
use crate::error::IrError;

/// Pauli byproduct operators produced by MBQC measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pauli {
    /// Bit flip.
    X,
    /// Phase flip.
    Z,
}

impl Pauli {
    /// The gate implementing this operator.
    pub fn gate(self) -> SingleQubitGate {
        match self {
            Pauli::X => SingleQubitGate::X,
            Pauli::Z => SingleQubitGate::Z,
        }
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pauli::X => write!(f, "X"),
            Pauli::Z => write!(f, "Z"),
        }
    }
}

/// Gates a client-side quantum backend must support.
///
/// The `K` gate is the Clifford `(Y+Z)/√2`-style basis change used by the
/// quantum network SDKs this protocol targets; rotations take a discrete
/// [`Angle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SingleQubitGate {
    // Paulis
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Cliffords
    /// Hadamard gate.
    H,
    /// K gate.
    K,
    /// T gate (fourth root of Z).
    T,

    // Rotations
    /// Rotation around X.
    Rx(Angle),
    /// Rotation around Y.
    Ry(Angle),
    /// Rotation around Z.
    Rz(Angle),
}

impl SingleQubitGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            SingleQubitGate::X => "X",
            SingleQubitGate::Y => "Y",
            SingleQubitGate::Z => "Z",
            SingleQubitGate::H => "H",
            SingleQubitGate::K => "K",
            SingleQubitGate::T => "T",
            SingleQubitGate::Rx(_) => "rot_X",
            SingleQubitGate::Ry(_) => "rot_Y",
            SingleQubitGate::Rz(_) => "rot_Z",
        }
    }

    /// The rotation angle, if this is a rotation gate.
    pub fn angle(&self) -> Option<Angle> {
        match self {
            SingleQubitGate::Rx(a) | SingleQubitGate::Ry(a) | SingleQubitGate::Rz(a) => Some(*a),
            _ => None,
        }
    }
}

impl fmt::Display for SingleQubitGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.angle() {
            Some(angle) => write!(f, "{}({})", self.name(), angle.steps()),
            None => write!(f, "{}", self.name()),
        }
    }
}

impl FromStr for SingleQubitGate {
    type Err = IrError;

    /// Parse `X`, `Y`, `Z`, `H`, `K`, `T` or a rotation written as
    /// `rot_X(n)`, `rot_Y(n)`, `rot_Z(n)` with `n` in units of `π/128`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let unknown = || IrError::UnknownGate(s.to_string());

        match s {
            "X" => return Ok(SingleQubitGate::X),
            "Y" => return Ok(SingleQubitGate::Y),
            "Z" => return Ok(SingleQubitGate::Z),
            "H" => return Ok(SingleQubitGate::H),
            "K" => return Ok(SingleQubitGate::K),
            "T" => return Ok(SingleQubitGate::T),
            _ => {}
        }

        let (name, rest) = s.split_once('(').ok_or_else(unknown)?;
        let arg = rest.strip_suffix(')').ok_or_else(unknown)?;
        let steps: i64 = arg.trim().parse().map_err(|_| unknown())?;
        let angle = Angle::from_steps(steps);

        match name.trim() {
            "rot_X" => Ok(SingleQubitGate::Rx(angle)),
            "rot_Y" => Ok(SingleQubitGate::Ry(angle)),
            "rot_Z" => Ok(SingleQubitGate::Rz(angle)),
            _ => Err(unknown()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fixed_gates() {
        for (text, gate) in [
            ("X", SingleQubitGate::X),
            ("Y", SingleQubitGate::Y),
            ("Z", SingleQubitGate::Z),
            ("H", SingleQubitGate::H),
            ("K", SingleQubitGate::K),
            (" T ", SingleQubitGate::T),
        ] {
            assert_eq!(text.parse::<SingleQubitGate>().unwrap(), gate);
        }
    }

    #[test]
    fn test_parse_rotation() {
        assert_eq!(
            "rot_Z(64)".parse::<SingleQubitGate>().unwrap(),
            SingleQubitGate::Rz(Angle::HALF_PI)
        );
        assert_eq!(
            "rot_X(-128)".parse::<SingleQubitGate>().unwrap(),
            SingleQubitGate::Rx(Angle::PI)
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("S".parse::<SingleQubitGate>().is_err());
        assert!("rot_W(3)".parse::<SingleQubitGate>().is_err());
        assert!("rot_Z(abc)".parse::<SingleQubitGate>().is_err());
        assert!("rot_Z(3".parse::<SingleQubitGate>().is_err());
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        let gate = SingleQubitGate::Ry(Angle(17));
        assert_eq!(gate.to_string(), "rot_Y(17)");
        assert_eq!(gate.to_string().parse::<SingleQubitGate>().unwrap(), gate);
    }

    #[test]
    fn test_pauli_gate() {
        assert_eq!(Pauli::X.gate(), SingleQubitGate::X);
        assert_eq!(Pauli::Z.gate(), SingleQubitGate::Z);
    }
}
