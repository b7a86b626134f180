//! UBQC Client
//!
//! Client side of universal blind quantum computation: the client prepares
//! randomly rotated qubits, teleports them to a server, and steers the
//! server's measurements with blinded angles so that neither the computation
//! nor its result is revealed.
//!
//! # Overview
//!
//! ```text
//!  PatternDescription ──compile──→ Flow (Arc)
//!                                    │
//!                                    ▼
//!  ┌────────────────────────────────────────────────────────┐
//!  │ ClientRun                                              │
//!  │   OutcomeVector · AngleLedger · OutputIndexMap         │
//!  │   blinding: δ = φ' + θ + r·π                           │
//!  └────────────────────────────────────────────────────────┘
//!        │ QuantumBackend                 │ ClassicalChannel
//!        ▼                                ▼
//!    local qubits                      server
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ubqc_client::{ClientConfig, ClientRun, RngBlinding};
//! use ubqc_compile::compile;
//!
//! let config = ClientConfig::load(Some("ubqc.yaml"))?;
//! ubqc_client::init_tracing(&config.logging)?;
//!
//! let flow = Arc::new(compile(&"E 1 2\nM 1 0\nX 2 1\nO 2".parse()?)?);
//! let outcome = ClientRun::new(flow, backend, channel, RngBlinding::from_entropy())
//!     .with_options(config.run_options()?)
//!     .execute()
//!     .await?;
//! println!("{:?}", outcome.bits);
//! ```

pub mod blinding;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod outcome;
pub mod reconcile;
pub mod tracing_config;

pub use blinding::{BlindingSource, RngBlinding, compute_disclosed_angle, unblind};
pub use config::{ClientConfig, LoggingConfig};
pub use error::{ClientError, ClientResult};
pub use orchestrator::{
    ClientRun, DisclosedAngle, RunOptions, RunOutcome, RunPhase, byproduct_applies,
};
pub use outcome::{AngleLedger, OutcomeVector};
pub use reconcile::{OutputIndexMap, ReconciledOutputs};
pub use tracing_config::{TracingFormat, init_tracing};
