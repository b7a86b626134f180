//! The compiled, execution-ordered flow.

use serde::{Deserialize, Serialize};

use ubqc_ir::{CorrectStep, FlowStep, MeasureStep, QubitId};

/// A pattern compiled into execution order.
///
/// Produced only by [`crate::FlowCompiler`], so the following hold:
/// - every dependency of a step refers to a measurement earlier in [`Flow::steps`];
/// - entangle steps precede the measurements of both endpoints;
/// - every qubit in `0..num_qubits` is measured exactly once or is an output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flow {
    pub(crate) name: Option<String>,
    pub(crate) steps: Vec<FlowStep>,
    pub(crate) num_qubits: u32,
    pub(crate) inputs: Vec<QubitId>,
    pub(crate) outputs: Vec<QubitId>,
}

impl Flow {
    /// Name carried over from the description.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[FlowStep] {
        &self.steps
    }

    /// Total number of logical qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Input qubits, ascending.
    pub fn inputs(&self) -> &[QubitId] {
        &self.inputs
    }

    /// Whether `qubit` receives the client's input.
    pub fn is_input(&self, qubit: QubitId) -> bool {
        self.inputs.binary_search(&qubit).is_ok()
    }

    /// Auxiliary (non-input) qubits, ascending.
    pub fn auxiliary(&self) -> impl Iterator<Item = QubitId> + '_ {
        (0..self.num_qubits)
            .map(QubitId)
            .filter(|q| !self.is_input(*q))
    }

    /// Output qubits in declaration order.
    pub fn outputs(&self) -> &[QubitId] {
        &self.outputs
    }

    /// Whether `qubit` is an output.
    pub fn is_output(&self, qubit: QubitId) -> bool {
        self.outputs.contains(&qubit)
    }

    /// Measurement steps in execution order.
    pub fn measurements(&self) -> impl Iterator<Item = &MeasureStep> + '_ {
        self.steps.iter().filter_map(FlowStep::as_measure)
    }

    /// Number of measurements the server will perform.
    pub fn num_measurements(&self) -> usize {
        self.measurements().count()
    }

    /// Byproduct corrections in execution order.
    pub fn corrections(&self) -> impl Iterator<Item = &CorrectStep> + '_ {
        self.steps.iter().filter_map(FlowStep::as_correct)
    }

    /// Edges of the graph state, in execution order.
    pub fn entanglement_edges(&self) -> Vec<(QubitId, QubitId)> {
        self.steps
            .iter()
            .filter_map(|s| match s {
                FlowStep::Entangle { first, second } => Some((*first, *second)),
                _ => None,
            })
            .collect()
    }
}
