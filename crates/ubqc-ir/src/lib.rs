//! UBQC Pattern Intermediate Representation
//!
//! This crate provides the data structures shared by the flow compiler and the
//! blind-computation client: qubit identifiers, discrete angles, the gates a
//! client applies locally, and the entangle / measure / correct steps that make
//! up a measurement pattern.
//!
//! # Core Components
//!
//! - [`QubitId`]: 0-based logical qubit index
//! - [`Angle`]: angle `n·π/128`, arithmetic modulo [`ANGLE_RESOLUTION`]
//! - [`SingleQubitGate`] and [`Pauli`]: local gates and byproduct operators
//! - [`FlowStep`]: one pattern command (entangle, measure, correct)
//! - [`PatternDescription`]: the compiler's input, buildable in code,
//!   deserialisable with `serde`, or parsed from text
//!
//! # Example: A Two-Qubit Pattern
//!
//! ```rust
//! use ubqc_ir::{Angle, Condition, MeasureStep, Pauli, PatternDescription, QubitId};
//!
//! let mut pattern = PatternDescription::new("hadamard");
//! pattern
//!     .entangle(QubitId(0), QubitId(1))
//!     .measure(MeasureStep::new(QubitId(0), Angle::ZERO))
//!     .correct(Pauli::X, QubitId(1), Condition::Outcome(QubitId(0)))
//!     .output(QubitId(1));
//!
//! assert_eq!(pattern.num_measurements(), 1);
//! ```

pub mod angle;
pub mod error;
pub mod flow;
pub mod gate;
pub mod pattern;
pub mod qubit;

pub use angle::{ANGLE_PRECISION, ANGLE_RESOLUTION, Angle};
pub use error::{IrError, IrResult};
pub use flow::{Condition, CorrectStep, FlowStep, MeasureStep};
pub use gate::{Pauli, SingleQubitGate};
pub use pattern::PatternDescription;
pub use qubit::QubitId;
