//! Classical channel trait and the messages exchanged over it.
//!
//! # Message sequence
//!
//! ```text
//!  client                                   server
//!    │── QubitCount ──────────────────────────▶│
//!    │── TransferCorrection (× qubits) ───────▶│   (one per teleported qubit)
//!    │── MeasurementCount ────────────────────▶│
//!    │── EntanglementEdges ───────────────────▶│
//!    │── MeasureRequest ──────────────────────▶│ ┐
//!    │◀────────────────────── MeasurementResult │ ┘ × measurements, strictly alternating
//!    │◀─────────────────────── OutputCorrection │   × outputs (with the teleported qubit)
//! ```
//!
//! Messages are plain `serde` types so any transport can frame them; the
//! JSON helpers are what the line-based transports use.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use ubqc_ir::{Angle, QubitId};

use crate::backend::TeleportBits;
use crate::error::HalResult;

/// Messages the client sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Number of qubits about to be teleported.
    QubitCount {
        /// Qubit count.
        count: u32,
    },
    /// Bell-measurement bits for one teleported qubit.
    TransferCorrection {
        /// The bits the server must correct with.
        bits: TeleportBits,
    },
    /// Number of measurements the server will be asked for.
    MeasurementCount {
        /// Measurement count.
        count: u32,
    },
    /// Graph-state edges for the server to entangle.
    EntanglementEdges {
        /// Edge list.
        edges: Vec<(QubitId, QubitId)>,
    },
    /// Measure `qubit` at the disclosed `angle`.
    MeasureRequest {
        /// Qubit to measure.
        qubit: QubitId,
        /// Blinded angle.
        angle: Angle,
    },
}

impl ClientMessage {
    /// Encode as a JSON line.
    pub fn to_json(&self) -> HalResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON.
    pub fn from_json(text: &str) -> HalResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::QubitCount { .. } => "qubit_count",
            ClientMessage::TransferCorrection { .. } => "transfer_correction",
            ClientMessage::MeasurementCount { .. } => "measurement_count",
            ClientMessage::EntanglementEdges { .. } => "entanglement_edges",
            ClientMessage::MeasureRequest { .. } => "measure_request",
        }
    }
}

/// Messages the server sends.
///
/// Bits are carried raw so the client can reject values other than 0 and 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Raw outcome of the last requested measurement.
    MeasurementResult {
        /// 0 or 1.
        bit: u8,
    },
    /// Teleportation bits accompanying a returned output qubit.
    OutputCorrection {
        /// Apply Z if 1.
        z: u8,
        /// Apply X if 1.
        x: u8,
    },
}

impl ServerMessage {
    /// Encode as a JSON line.
    pub fn to_json(&self) -> HalResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON.
    pub fn from_json(text: &str) -> HalResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::MeasurementResult { .. } => "measurement_result",
            ServerMessage::OutputCorrection { .. } => "output_correction",
        }
    }
}

/// A bidirectional, ordered, reliable classical channel to the server.
///
/// Both calls may block indefinitely; bounding the wait is the caller's
/// responsibility.
#[async_trait]
pub trait ClassicalChannel: Send {
    /// Send a message to the server.
    async fn send(&mut self, message: ClientMessage) -> HalResult<()>;

    /// Wait for the next message from the server.
    async fn recv(&mut self) -> HalResult<ServerMessage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_json_shape() {
        let msg = ClientMessage::MeasureRequest {
            qubit: QubitId(2),
            angle: Angle(200),
        };
        let json = msg.to_json().unwrap();
        assert_eq!(json, r#"{"type":"measure_request","qubit":2,"angle":200}"#);
        assert_eq!(ClientMessage::from_json(&json).unwrap(), msg);
    }

    #[test]
    fn test_edges_encode_as_pairs() {
        let msg = ClientMessage::EntanglementEdges {
            edges: vec![(QubitId(0), QubitId(1))],
        };
        let value: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(value["edges"], serde_json::json!([[0, 1]]));
    }

    #[test]
    fn test_server_message_decoding() {
        let msg = ServerMessage::from_json(r#"{"type":"output_correction","z":1,"x":0}"#).unwrap();
        assert_eq!(msg, ServerMessage::OutputCorrection { z: 1, x: 0 });
        assert_eq!(msg.kind(), "output_correction");

        assert!(ServerMessage::from_json(r#"{"type":"measurement_result"}"#).is_err());
        assert!(ServerMessage::from_json(r#"{"type":"measurement_result","bit":300}"#).is_err());
    }
}
