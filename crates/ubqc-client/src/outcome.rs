//! Per-run bookkeeping: logical measurement outcomes and secret angles.
//!
//! Both tables have one slot per logical qubit and are write-once. A second
//! write to the same slot means the run has gone wrong and is reported as a
//! [`ClientError::ProtocolViolation`].

use std::fmt;

use ubqc_ir::{Angle, QubitId};

use crate::error::{ClientError, ClientResult};

/// Logical measurement outcomes, indexed by qubit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeVector {
    slots: Vec<Option<bool>>,
}

impl OutcomeVector {
    /// Create a vector of `num_qubits` unknown outcomes.
    pub fn new(num_qubits: u32) -> Self {
        Self {
            slots: vec![None; num_qubits as usize],
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the vector has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The outcome of `qubit`, if it has been recorded.
    pub fn try_get(&self, qubit: QubitId) -> Option<bool> {
        self.slots.get(qubit.index()).copied().flatten()
    }

    /// The outcome of `qubit`; reading an unknown slot is a violation.
    pub fn get(&self, qubit: QubitId) -> ClientResult<bool> {
        match self.slots.get(qubit.index()) {
            Some(Some(bit)) => Ok(*bit),
            Some(None) => Err(ClientError::violation(format!(
                "outcome of {qubit} read before it was measured"
            ))),
            None => Err(ClientError::violation(format!(
                "{qubit} outside outcome vector of {} qubits",
                self.slots.len()
            ))),
        }
    }

    /// Record the logical outcome of `qubit`.
    pub fn record(&mut self, qubit: QubitId, bit: bool) -> ClientResult<()> {
        let len = self.slots.len();
        let slot = self.slots.get_mut(qubit.index()).ok_or_else(|| {
            ClientError::violation(format!("{qubit} outside outcome vector of {len} qubits"))
        })?;
        if slot.is_some() {
            return Err(ClientError::violation(format!(
                "outcome of {qubit} written twice"
            )));
        }
        *slot = Some(bit);
        Ok(())
    }

    /// XOR of the outcomes of `qubits`.
    pub fn parity(&self, qubits: &[QubitId]) -> ClientResult<bool> {
        qubits
            .iter()
            .try_fold(false, |acc, q| -> ClientResult<bool> { Ok(acc ^ self.get(*q)?) })
    }

    /// Copy out the slots.
    pub fn to_vec(&self) -> Vec<Option<bool>> {
        self.slots.clone()
    }
}

/// Secret rotation angle θ of every qubit.
///
/// `Debug` does not print the angles.
#[derive(Clone, Default)]
pub struct AngleLedger {
    angles: Vec<Option<Angle>>,
}

impl AngleLedger {
    /// Create an empty ledger for `num_qubits` qubits.
    pub fn new(num_qubits: u32) -> Self {
        Self {
            angles: vec![None; num_qubits as usize],
        }
    }

    /// Record θ for `qubit`. Each qubit gets exactly one angle.
    pub fn record(&mut self, qubit: QubitId, angle: Angle) -> ClientResult<()> {
        let len = self.angles.len();
        let slot = self.angles.get_mut(qubit.index()).ok_or_else(|| {
            ClientError::violation(format!("{qubit} outside angle ledger of {len} qubits"))
        })?;
        if slot.is_some() {
            return Err(ClientError::violation(format!(
                "secret angle of {qubit} drawn twice"
            )));
        }
        *slot = Some(angle);
        Ok(())
    }

    /// θ for `qubit`.
    pub fn get(&self, qubit: QubitId) -> ClientResult<Angle> {
        self.angles
            .get(qubit.index())
            .copied()
            .flatten()
            .ok_or_else(|| ClientError::violation(format!("no secret angle recorded for {qubit}")))
    }

    /// Number of angles recorded so far.
    pub fn recorded(&self) -> usize {
        self.angles.iter().filter(|a| a.is_some()).count()
    }
}

impl fmt::Debug for AngleLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AngleLedger")
            .field("qubits", &self.angles.len())
            .field("recorded", &self.recorded())
            .field("angles", &"[REDACTED]")
            .finish()
    }
}
