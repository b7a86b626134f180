//! Client-side quantum backend trait.
//!
//! The client never simulates quantum state itself. Everything it does to a
//! qubit goes through [`QuantumBackend`]:
//!
//! ```text
//!   prepare_plus() ──→ apply_gate()* ──→ send_qubit()        (to the server)
//!   receive_qubit() ──→ apply_gate()* ──→ measure()          (from the server)
//! ```
//!
//! | Method | Kind | Required | Returns |
//! |--------|------|----------|---------|
//! | `name()` | sync | yes | `&str` |
//! | `prepare_plus()` | async | yes | `HalResult<Qubit>` |
//! | `apply_gate()` | async | yes | `HalResult<()>` |
//! | `send_qubit()` | async | yes | `HalResult<TeleportBits>` |
//! | `receive_qubit()` | async | yes | `HalResult<Qubit>` |
//! | `measure()` | async | yes | `HalResult<bool>` |
//! | `prepare_rotated()` | async | provided | `HalResult<Qubit>` |
//! | `debug_state()` | sync | provided | `Option<String>` |

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use ubqc_ir::{Angle, SingleQubitGate};

use crate::error::HalResult;

/// The two classical bits produced by teleporting a qubit.
///
/// The receiver restores the state by applying Z if `z` is set, then X if `x`
/// is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeleportBits {
    /// Outcome of measuring the sent qubit after the Hadamard.
    pub z: bool,
    /// Outcome of measuring the local half of the EPR pair.
    pub x: bool,
}

impl TeleportBits {
    /// Create from two bits.
    pub fn new(z: bool, x: bool) -> Self {
        Self { z, x }
    }

    /// Decode raw wire bits, rejecting anything but 0 or 1.
    pub fn from_raw(z: u8, x: u8) -> Option<Self> {
        Some(Self {
            z: bit_from_raw(z)?,
            x: bit_from_raw(x)?,
        })
    }
}

/// Decode a single raw wire bit.
pub fn bit_from_raw(raw: u8) -> Option<bool> {
    match raw {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

/// Trait for the client's local quantum device.
///
/// # Contract
///
/// - Qubit handles are owned: `send_qubit` and `measure` consume them.
/// - `send_qubit` teleports the qubit to the peer and returns the Bell
///   measurement bits; the caller forwards them over the classical channel.
/// - `receive_qubit` returns the local half of a teleportation initiated by
///   the peer; corrections are the caller's job.
/// - `debug_state` is for tracing only and MUST NOT be relied on by protocol
///   logic. Real hardware returns `None`.
#[async_trait]
pub trait QuantumBackend: Send {
    /// Handle to a qubit held by this backend.
    type Qubit: Send;

    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Allocate a qubit in |+⟩.
    async fn prepare_plus(&mut self) -> HalResult<Self::Qubit>;

    /// Apply a single-qubit gate.
    async fn apply_gate(
        &mut self,
        qubit: &mut Self::Qubit,
        gate: SingleQubitGate,
    ) -> HalResult<()>;

    /// Teleport a qubit to the peer.
    async fn send_qubit(&mut self, qubit: Self::Qubit) -> HalResult<TeleportBits>;

    /// Receive a qubit teleported by the peer.
    async fn receive_qubit(&mut self) -> HalResult<Self::Qubit>;

    /// Measure in the standard basis.
    async fn measure(&mut self, qubit: Self::Qubit) -> HalResult<bool>;

    /// Allocate a qubit in |+_θ⟩ = Rz(θ)|+⟩.
    async fn prepare_rotated(&mut self, angle: Angle) -> HalResult<Self::Qubit> {
        let mut qubit = self.prepare_plus().await?;
        self.apply_gate(&mut qubit, SingleQubitGate::Rz(angle)).await?;
        Ok(qubit)
    }

    /// Simulator-only view of a qubit's state, for trace logging.
    fn debug_state(&self, _qubit: &Self::Qubit) -> Option<String> {
        None
    }
}
