//! The blind-computation protocol run.
//!
//! A [`ClientRun`] drives one execution of a compiled [`Flow`] against a
//! server, through a [`QuantumBackend`] for local qubits and a
//! [`ClassicalChannel`] for messages. Phases are strictly sequential:
//!
//! ```text
//! Init → PrepareInputs → PrepareAuxiliary → Transfer → DeclareFlowMetadata
//!      → MeasureLoop → CollectOutputs → ApplyByproductCorrections
//!      → FinalMeasure → Done
//! ```
//!
//! Any error aborts the run and is reported wrapped in
//! [`ClientError::Phase`]. There are no retries.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{Instrument, debug, error, info, info_span, trace};
use uuid::Uuid;

use ubqc_compile::{Flow, compile};
use ubqc_hal::{
    ClassicalChannel, ClientMessage, QuantumBackend, ServerMessage, TeleportBits, bit_from_raw,
};
use ubqc_ir::{Angle, Condition, CorrectStep, PatternDescription, QubitId, SingleQubitGate};

use crate::blinding::{BlindingSource, compute_disclosed_angle, unblind};
use crate::error::{ClientError, ClientResult};
use crate::outcome::{AngleLedger, OutcomeVector};
use crate::reconcile::{OutputIndexMap, ReconciledOutputs};

/// Phases of a protocol run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RunPhase {
    /// Validate options against the flow.
    Init,
    /// Prepare and blind the input qubits.
    PrepareInputs,
    /// Prepare and blind the auxiliary qubits.
    PrepareAuxiliary,
    /// Teleport every qubit to the server.
    Transfer,
    /// Disclose measurement count and graph edges.
    DeclareFlowMetadata,
    /// Request one blinded measurement per measure step.
    MeasureLoop,
    /// Receive the output qubits back.
    CollectOutputs,
    /// Apply the flow's Pauli byproduct corrections.
    ApplyByproductCorrections,
    /// Apply output gates and measure.
    FinalMeasure,
    /// Finished.
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Per-run options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Bound on every wait for a server message.
    pub recv_timeout: Option<Duration>,
    /// Log backend state snapshots at `trace` level.
    pub trace_states: bool,
    /// Gate applied to the i-th input (ascending) before blinding.
    pub input_gates: Vec<SingleQubitGate>,
    /// Gate applied to the i-th output (ascending) before measuring.
    pub output_gates: Vec<SingleQubitGate>,
}

impl RunOptions {
    /// Default options: no timeout, no gates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound each receive.
    #[must_use]
    pub fn with_recv_timeout(mut self, limit: Duration) -> Self {
        self.recv_timeout = Some(limit);
        self
    }

    /// Enable state snapshots.
    #[must_use]
    pub fn with_trace_states(mut self, enabled: bool) -> Self {
        self.trace_states = enabled;
        self
    }

    /// Set the input pre-transformations.
    #[must_use]
    pub fn with_input_gates(mut self, gates: impl IntoIterator<Item = SingleQubitGate>) -> Self {
        self.input_gates = gates.into_iter().collect();
        self
    }

    /// Set the output post-transformations.
    #[must_use]
    pub fn with_output_gates(mut self, gates: impl IntoIterator<Item = SingleQubitGate>) -> Self {
        self.output_gates = gates.into_iter().collect();
        self
    }
}

/// An angle as disclosed to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisclosedAngle {
    /// Qubit measured.
    pub qubit: QubitId,
    /// Angle sent.
    pub angle: Angle,
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Run identifier, as logged.
    pub run_id: Uuid,
    /// Output qubits, ascending.
    pub outputs: Vec<QubitId>,
    /// Final measurement of each output, aligned with `outputs`.
    pub bits: Vec<bool>,
    /// Logical outcome of every qubit measured by the server.
    pub outcomes: Vec<Option<bool>>,
    /// Every angle the server saw, in request order.
    pub transcript: Vec<DisclosedAngle>,
}

impl RunOutcome {
    /// The final bit of output `qubit`.
    pub fn bit(&self, qubit: QubitId) -> Option<bool> {
        let pos = self.outputs.binary_search(&qubit).ok()?;
        self.bits.get(pos).copied()
    }
}

/// Whether a byproduct correction fires for the recorded outcomes.
///
/// [`Condition::Always`] fires regardless of the outcome vector.
pub fn byproduct_applies(correction: &CorrectStep, outcomes: &OutcomeVector) -> ClientResult<bool> {
    match correction.condition {
        Condition::Always => Ok(true),
        Condition::Outcome(qubit) => outcomes.get(qubit),
    }
}

/// One execution of the client side of the protocol.
///
/// Owns the run's outcome vector and angle ledger. [`ClientRun::execute`]
/// consumes the run, so a failed run cannot be resumed.
pub struct ClientRun<B, C, S> {
    id: Uuid,
    flow: Arc<Flow>,
    backend: B,
    channel: C,
    blinding: S,
    options: RunOptions,
    phase: RunPhase,
    outcomes: OutcomeVector,
    ledger: AngleLedger,
    transcript: Vec<DisclosedAngle>,
}

impl<B, C, S> ClientRun<B, C, S>
where
    B: QuantumBackend,
    C: ClassicalChannel,
    S: BlindingSource,
{
    /// Set up a run of `flow`.
    pub fn new(flow: Arc<Flow>, backend: B, channel: C, blinding: S) -> Self {
        let n = flow.num_qubits();
        Self {
            id: Uuid::new_v4(),
            flow,
            backend,
            channel,
            blinding,
            options: RunOptions::default(),
            phase: RunPhase::Init,
            outcomes: OutcomeVector::new(n),
            ledger: AngleLedger::new(n),
            transcript: Vec::new(),
        }
    }

    /// Compile `pattern` and set up a run of it.
    ///
    /// Structural defects are reported as [`ClientError::MalformedFlow`]
    /// before anything touches the backend or the channel.
    pub fn from_pattern(
        pattern: &PatternDescription,
        backend: B,
        channel: C,
        blinding: S,
    ) -> ClientResult<Self> {
        let flow = compile(pattern)?;
        Ok(Self::new(Arc::new(flow), backend, channel, blinding))
    }

    /// Replace the run options.
    #[must_use]
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Identifier of this run.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Run every phase to completion.
    pub async fn execute(mut self) -> ClientResult<RunOutcome> {
        let span = info_span!(
            "ubqc_run",
            run_id = %self.id,
            flow = self.flow.name().unwrap_or("<unnamed>"),
            backend = self.backend.name(),
        );

        match self.run_phases().instrument(span.clone()).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                let phase = self.phase;
                span.in_scope(|| error!(%phase, error = %err, "Run aborted"));
                Err(ClientError::Phase {
                    phase,
                    source: Box::new(err),
                })
            }
        }
    }

    async fn run_phases(&mut self) -> ClientResult<RunOutcome> {
        let flow = Arc::clone(&self.flow);

        self.enter(RunPhase::Init);
        self.check_options(&flow)?;

        self.enter(RunPhase::PrepareInputs);
        let mut prepared = Vec::with_capacity(flow.num_qubits() as usize);
        for (position, &qubit) in flow.inputs().iter().enumerate() {
            let gate = self.options.input_gates.get(position).copied();
            prepared.push((qubit, self.prepare(qubit, gate).await?));
        }

        self.enter(RunPhase::PrepareAuxiliary);
        for qubit in flow.auxiliary() {
            prepared.push((qubit, self.prepare(qubit, None).await?));
        }

        self.enter(RunPhase::Transfer);
        prepared.sort_by_key(|(qubit, _)| *qubit);
        self.transfer(prepared).await?;

        self.enter(RunPhase::DeclareFlowMetadata);
        // Each qubit is measured at most once, so the count fits in u32.
        let count = flow.num_measurements() as u32;
        self.send(ClientMessage::MeasurementCount { count }).await?;
        self.send(ClientMessage::EntanglementEdges {
            edges: flow.entanglement_edges(),
        })
        .await?;

        self.enter(RunPhase::MeasureLoop);
        self.measure_loop(&flow).await?;

        self.enter(RunPhase::CollectOutputs);
        let mut outputs = self.collect_outputs(&flow).await?;

        self.enter(RunPhase::ApplyByproductCorrections);
        self.apply_byproducts(&flow, &mut outputs).await?;

        self.enter(RunPhase::FinalMeasure);
        let (order, bits) = self.final_measure(outputs).await?;

        self.enter(RunPhase::Done);
        Ok(RunOutcome {
            run_id: self.id,
            outputs: order,
            bits,
            outcomes: self.outcomes.to_vec(),
            transcript: std::mem::take(&mut self.transcript),
        })
    }

    fn enter(&mut self, phase: RunPhase) {
        self.phase = phase;
        info!(%phase, "Entering phase");
    }

    fn check_options(&self, flow: &Flow) -> ClientResult<()> {
        if self.options.input_gates.len() > flow.inputs().len() {
            return Err(ClientError::Configuration(format!(
                "{} input gates given for {} inputs",
                self.options.input_gates.len(),
                flow.inputs().len()
            )));
        }
        if self.options.output_gates.len() > flow.outputs().len() {
            return Err(ClientError::Configuration(format!(
                "{} output gates given for {} outputs",
                self.options.output_gates.len(),
                flow.outputs().len()
            )));
        }
        debug!(
            "Flow: {} qubits, {} inputs, {} measurements, {} outputs",
            flow.num_qubits(),
            flow.inputs().len(),
            flow.num_measurements(),
            flow.outputs().len()
        );
        Ok(())
    }

    /// Draw θ and prepare `Rz(θ)·U|+⟩`.
    async fn prepare(
        &mut self,
        qubit: QubitId,
        gate: Option<SingleQubitGate>,
    ) -> ClientResult<B::Qubit> {
        let theta = self.blinding.secret_angle();
        self.ledger.record(qubit, theta)?;
        trace!(%qubit, theta = theta.steps(), "Drew secret angle");

        let handle = match gate {
            Some(gate) => {
                debug!(%qubit, %gate, "Applying input gate");
                let mut handle = self.backend.prepare_plus().await?;
                self.backend.apply_gate(&mut handle, gate).await?;
                self.backend
                    .apply_gate(&mut handle, SingleQubitGate::Rz(theta))
                    .await?;
                handle
            }
            None => self.backend.prepare_rotated(theta).await?,
        };

        self.trace_state(qubit, &handle, "prepared");
        Ok(handle)
    }

    async fn transfer(&mut self, prepared: Vec<(QubitId, B::Qubit)>) -> ClientResult<()> {
        let count = self.flow.num_qubits();
        self.send(ClientMessage::QubitCount { count }).await?;

        for (qubit, handle) in prepared {
            let bits = self.backend.send_qubit(handle).await?;
            debug!(%qubit, "Teleported qubit");
            self.send(ClientMessage::TransferCorrection { bits }).await?;
        }
        Ok(())
    }

    async fn measure_loop(&mut self, flow: &Flow) -> ClientResult<()> {
        for step in flow.measurements() {
            let blind_bit = self.blinding.blind_bit();
            let theta = self.ledger.get(step.qubit)?;
            let angle = compute_disclosed_angle(step, &self.outcomes, theta, blind_bit)?;
            self.transcript.push(DisclosedAngle {
                qubit: step.qubit,
                angle,
            });

            self.send(ClientMessage::MeasureRequest {
                qubit: step.qubit,
                angle,
            })
            .await?;

            let raw = match self.recv().await? {
                ServerMessage::MeasurementResult { bit } => bit,
                other => {
                    return Err(ClientError::violation(format!(
                        "expected measurement_result for {}, got {}",
                        step.qubit,
                        other.kind()
                    )));
                }
            };
            let bit = bit_from_raw(raw).ok_or_else(|| {
                ClientError::violation(format!(
                    "measurement result {raw} for {} is not a bit",
                    step.qubit
                ))
            })?;

            let outcome = unblind(bit, blind_bit);
            self.outcomes.record(step.qubit, outcome)?;
            trace!(qubit = %step.qubit, blind_bit, outcome, "Recorded outcome");
        }
        Ok(())
    }

    async fn collect_outputs(&mut self, flow: &Flow) -> ClientResult<ReconciledOutputs<B::Qubit>> {
        let mut map = OutputIndexMap::new(flow.outputs())?;
        let order = map.request_order().to_vec();

        for (slot, logical) in order.into_iter().enumerate() {
            let mut handle = self.backend.receive_qubit().await?;
            let bits = match self.recv().await? {
                ServerMessage::OutputCorrection { z, x } => TeleportBits::from_raw(z, x)
                    .ok_or_else(|| {
                        ClientError::violation(format!(
                            "output correction ({z}, {x}) for {logical} is not a pair of bits"
                        ))
                    })?,
                other => {
                    return Err(ClientError::violation(format!(
                        "expected output_correction for {logical}, got {}",
                        other.kind()
                    )));
                }
            };

            if bits.z {
                self.backend.apply_gate(&mut handle, SingleQubitGate::Z).await?;
            }
            if bits.x {
                self.backend.apply_gate(&mut handle, SingleQubitGate::X).await?;
            }
            debug!(qubit = %logical, slot, "Received output qubit");
            map.register(slot, handle)?;
        }

        let mut outputs = map.finish()?;

        // Remove the preparation rotation.
        for (logical, handle) in outputs.iter_mut() {
            let theta = self.ledger.get(logical)?;
            self.backend
                .apply_gate(handle, SingleQubitGate::Rz(-theta))
                .await?;
        }

        Ok(outputs)
    }

    async fn apply_byproducts(
        &mut self,
        flow: &Flow,
        outputs: &mut ReconciledOutputs<B::Qubit>,
    ) -> ClientResult<()> {
        for correction in flow.corrections() {
            if !flow.is_output(correction.qubit) {
                debug!(
                    qubit = %correction.qubit,
                    pauli = %correction.pauli,
                    "Skipping correction on non-output qubit"
                );
                continue;
            }
            if !byproduct_applies(correction, &self.outcomes)? {
                continue;
            }
            let handle = outputs.handle_mut(correction.qubit)?;
            self.backend
                .apply_gate(handle, correction.pauli.gate())
                .await?;
            debug!(
                qubit = %correction.qubit,
                pauli = %correction.pauli,
                "Applied byproduct correction"
            );
        }

        for (logical, handle) in outputs.iter_mut() {
            self.trace_state(logical, handle, "corrected");
        }
        Ok(())
    }

    async fn final_measure(
        &mut self,
        outputs: ReconciledOutputs<B::Qubit>,
    ) -> ClientResult<(Vec<QubitId>, Vec<bool>)> {
        let mut order = Vec::with_capacity(outputs.len());
        let mut bits = Vec::with_capacity(outputs.len());

        for (position, (logical, mut handle)) in outputs.into_handles().into_iter().enumerate() {
            if let Some(gate) = self.options.output_gates.get(position).copied() {
                debug!(qubit = %logical, %gate, "Applying output gate");
                self.backend.apply_gate(&mut handle, gate).await?;
            }
            let bit = self.backend.measure(handle).await?;
            order.push(logical);
            bits.push(bit);
        }

        info!(?bits, "Run complete");
        Ok((order, bits))
    }

    async fn send(&mut self, message: ClientMessage) -> ClientResult<()> {
        debug!(kind = message.kind(), "Sending");
        self.channel.send(message).await?;
        Ok(())
    }

    async fn recv(&mut self) -> ClientResult<ServerMessage> {
        let message = match self.options.recv_timeout {
            Some(limit) => timeout(limit, self.channel.recv())
                .await
                .map_err(|_| ClientError::TimedOut(limit))??,
            None => self.channel.recv().await?,
        };
        debug!(kind = message.kind(), "Received");
        Ok(message)
    }

    fn trace_state(&self, qubit: QubitId, handle: &B::Qubit, stage: &'static str) {
        if !self.options.trace_states {
            return;
        }
        if let Some(state) = self.backend.debug_state(handle) {
            trace!(%qubit, stage, %state, "Qubit state");
        }
    }
}

impl<B, C, S> fmt::Debug for ClientRun<B, C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientRun")
            .field("id", &self.id)
            .field("flow", &self.flow.name())
            .field("phase", &self.phase)
            .field("options", &self.options)
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}
