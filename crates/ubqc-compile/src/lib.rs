//! UBQC Flow Compiler
//!
//! Turns a [`PatternDescription`](ubqc_ir::PatternDescription) into a
//! [`Flow`]: the pattern's entangle / measure / correct commands in an
//! order the client can execute, together with the qubit bookkeeping the
//! protocol needs (qubit count, input/auxiliary partition, outputs).
//!
//! # Overview
//!
//! ```text
//! PatternDescription
//!       │
//!       ▼
//! ┌──────────────┐
//! │ FlowCompiler │  validate structure → dependency graph → stable toposort
//! └──────────────┘
//!       │
//!       ▼
//!     Flow  (steps, num_qubits, inputs, outputs)
//! ```
//!
//! Structural defects surface as [`CompileError::MalformedFlow`] before any
//! communication with a server takes place.
//!
//! # Example
//!
//! ```rust
//! use ubqc_compile::FlowCompiler;
//! use ubqc_ir::PatternDescription;
//!
//! let pattern: PatternDescription = "E 1 2\nM 1 0\nX 2 1\nO 2".parse().unwrap();
//! let flow = FlowCompiler::new().compile(&pattern).unwrap();
//!
//! assert_eq!(flow.num_qubits(), 2);
//! assert_eq!(flow.num_measurements(), 1);
//! ```

pub mod compiler;
pub mod error;
pub mod flow;

pub use compiler::{FlowCompiler, compile};
pub use error::{CompileError, CompileResult};
pub use flow::Flow;
