//! Logical qubit identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical index of a qubit within a measurement pattern.
///
/// Indices are 0-based. The textual pattern format numbers qubits from 1;
/// use [`QubitId::from_one_based`] and [`QubitId::one_based`] at that boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QubitId(pub u32);

impl QubitId {
    /// Convert a 1-based qubit number into an id. Returns `None` for 0.
    pub fn from_one_based(number: u32) -> Option<Self> {
        number.checked_sub(1).map(QubitId)
    }

    /// The 1-based number of this qubit.
    pub fn one_based(self) -> u32 {
        self.0 + 1
    }

    /// The id as a `usize`, for indexing per-qubit tables.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

impl From<usize> for QubitId {
    fn from(id: usize) -> Self {
        QubitId(u32::try_from(id).expect("QubitId overflow: exceeds u32::MAX"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qubit_display() {
        assert_eq!(format!("{}", QubitId(0)), "q0");
        assert_eq!(format!("{}", QubitId(12)), "q12");
    }

    #[test]
    fn test_one_based_conversion() {
        assert_eq!(QubitId::from_one_based(0), None);
        assert_eq!(QubitId::from_one_based(1), Some(QubitId(0)));
        assert_eq!(QubitId(4).one_based(), 5);
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&QubitId(3)).unwrap();
        assert_eq!(json, "3");
        let back: QubitId = serde_json::from_str("7").unwrap();
        assert_eq!(back, QubitId(7));
    }
}
