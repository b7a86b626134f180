//! UBQC Hardware Abstraction Layer
//!
//! The blind-computation client talks to two collaborators it does not
//! implement: a local quantum device and a classical channel to the server.
//! This crate defines both seams.
//!
//! # Overview
//!
//! - [`QuantumBackend`]: prepare, rotate, teleport, receive and measure qubits
//! - [`ClassicalChannel`]: ordered [`ClientMessage`] / [`ServerMessage`] exchange
//! - [`local_channel`]: an in-process loopback pair for tests and embedding
//!
//! # Implementing a Backend
//!
//! ```ignore
//! use async_trait::async_trait;
//! use ubqc_hal::{HalResult, QuantumBackend, TeleportBits};
//! use ubqc_ir::SingleQubitGate;
//!
//! struct MyDevice { /* connection to the local QPU */ }
//!
//! #[async_trait]
//! impl QuantumBackend for MyDevice {
//!     type Qubit = u32;
//!
//!     fn name(&self) -> &str { "my_device" }
//!
//!     async fn prepare_plus(&mut self) -> HalResult<u32> { todo!() }
//!     async fn apply_gate(&mut self, q: &mut u32, gate: SingleQubitGate) -> HalResult<()> { todo!() }
//!     async fn send_qubit(&mut self, q: u32) -> HalResult<TeleportBits> { todo!() }
//!     async fn receive_qubit(&mut self) -> HalResult<u32> { todo!() }
//!     async fn measure(&mut self, q: u32) -> HalResult<bool> { todo!() }
//! }
//! ```

pub mod backend;
pub mod channel;
pub mod error;
pub mod local;

pub use backend::{QuantumBackend, TeleportBits, bit_from_raw};
pub use channel::{ClassicalChannel, ClientMessage, ServerMessage};
pub use error::{HalError, HalResult};
pub use local::{LocalChannel, ServerEnd, local_channel};
