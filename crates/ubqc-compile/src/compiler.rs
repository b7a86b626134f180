//! Compilation of pattern descriptions into execution-ordered flows.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, instrument};

use ubqc_ir::{FlowStep, PatternDescription, QubitId};

use crate::error::{CompileError, CompileResult};
use crate::flow::Flow;

/// Compiles [`PatternDescription`]s into [`Flow`]s.
///
/// Compilation validates the pattern structure and reorders its commands
/// with a stable topological sort: a command only moves later when one of
/// its prerequisites (an entanglement of its qubit or a measurement it
/// depends on) is declared after it. Ties keep declaration order, so the
/// result is deterministic and well-ordered input comes back unchanged.
#[derive(Debug, Clone, Default)]
pub struct FlowCompiler {
    max_qubits: Option<u32>,
}

impl FlowCompiler {
    /// Create a compiler with no qubit limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject patterns using more than `max_qubits` qubits.
    #[must_use]
    pub fn with_max_qubits(mut self, max_qubits: u32) -> Self {
        self.max_qubits = Some(max_qubits);
        self
    }

    /// Validate and order a pattern.
    #[instrument(skip(self, desc), fields(pattern = desc.name.as_deref().unwrap_or("<unnamed>")))]
    pub fn compile(&self, desc: &PatternDescription) -> CompileResult<Flow> {
        let num_qubits = resolve_qubit_count(desc)?;
        if let Some(limit) = self.max_qubits {
            if num_qubits > limit {
                return Err(CompileError::QubitLimitExceeded {
                    required: num_qubits,
                    limit,
                });
            }
        }

        let measured = validate_commands(desc, num_qubits)?;
        let outputs = validate_outputs(desc, num_qubits, &measured)?;
        let inputs = resolve_inputs(desc, num_qubits)?;

        let order = dependency_order(&desc.commands)?;
        let steps: Vec<FlowStep> = order.into_iter().map(|i| desc.commands[i].clone()).collect();

        debug!(
            "Compiled flow: {} qubits, {} inputs, {} measurements, {} outputs",
            num_qubits,
            inputs.len(),
            measured.len(),
            outputs.len()
        );

        Ok(Flow {
            name: desc.name.clone(),
            steps,
            num_qubits,
            inputs,
            outputs,
        })
    }
}

/// Compile with the default compiler.
pub fn compile(desc: &PatternDescription) -> CompileResult<Flow> {
    FlowCompiler::new().compile(desc)
}

/// Qubit count: the declared count, checked against every reference.
fn resolve_qubit_count(desc: &PatternDescription) -> CompileResult<u32> {
    let referenced = desc
        .commands
        .iter()
        .flat_map(|s| s.qubits().into_iter().chain(s.dependencies()))
        .chain(desc.outputs.iter().copied())
        .chain(desc.inputs.iter().flatten().copied());

    let mut implied = 0;
    for q in referenced {
        let count = q
            .0
            .checked_add(1)
            .ok_or_else(|| CompileError::malformed(format!("qubit index {q} out of range")))?;
        implied = implied.max(count);
    }

    match desc.num_qubits {
        Some(declared) if implied > declared => Err(CompileError::malformed(format!(
            "qubit q{} referenced but only {declared} qubits declared",
            implied - 1
        ))),
        Some(declared) => Ok(declared),
        None => Ok(implied),
    }
}

/// Check per-command invariants and return the measured qubits.
fn validate_commands(desc: &PatternDescription, num_qubits: u32) -> CompileResult<FxHashSet<QubitId>> {
    let mut measured = FxHashSet::default();
    let mut edges = FxHashSet::default();

    for step in &desc.commands {
        match step {
            FlowStep::Entangle { first, second } => {
                if first == second {
                    return Err(CompileError::malformed(format!(
                        "qubit {first} entangled with itself"
                    )));
                }
                let key = ((*first).min(*second), (*first).max(*second));
                if !edges.insert(key) {
                    return Err(CompileError::malformed(format!(
                        "duplicate entanglement between {first} and {second}"
                    )));
                }
            }
            FlowStep::Measure(m) => {
                if !measured.insert(m.qubit) {
                    return Err(CompileError::malformed(format!(
                        "qubit {} measured twice",
                        m.qubit
                    )));
                }
                if m.dependencies().any(|d| d == m.qubit) {
                    return Err(CompileError::malformed(format!(
                        "measurement of {} depends on its own outcome",
                        m.qubit
                    )));
                }
            }
            FlowStep::Correct(_) => {}
        }
    }

    for step in &desc.commands {
        for dep in step.dependencies() {
            if !measured.contains(&dep) {
                return Err(CompileError::malformed(format!(
                    "step {step} depends on {dep}, which is never measured"
                )));
            }
        }
    }

    debug_assert!(measured.iter().all(|q| q.0 < num_qubits));
    Ok(measured)
}

/// Outputs must be distinct, unmeasured, and together with the measured
/// qubits cover every qubit.
fn validate_outputs(
    desc: &PatternDescription,
    num_qubits: u32,
    measured: &FxHashSet<QubitId>,
) -> CompileResult<Vec<QubitId>> {
    let mut seen = FxHashSet::default();
    for out in &desc.outputs {
        if !seen.insert(*out) {
            return Err(CompileError::malformed(format!(
                "output {out} declared twice"
            )));
        }
        if measured.contains(out) {
            return Err(CompileError::malformed(format!(
                "output {out} is also measured"
            )));
        }
    }

    if let Some(unused) = (0..num_qubits)
        .map(QubitId)
        .find(|q| !measured.contains(q) && !seen.contains(q))
    {
        return Err(CompileError::malformed(format!(
            "qubit {unused} is neither measured nor an output"
        )));
    }

    Ok(desc.outputs.clone())
}

/// Inputs are either declared or the lowest `n - measurements` qubits.
fn resolve_inputs(desc: &PatternDescription, num_qubits: u32) -> CompileResult<Vec<QubitId>> {
    let mut inputs = match &desc.inputs {
        Some(declared) => declared.clone(),
        None => {
            // Measurements are distinct qubits below `num_qubits` by now.
            let count = (num_qubits as usize).saturating_sub(desc.num_measurements());
            (0..count).map(QubitId::from).collect()
        }
    };

    inputs.sort_unstable();
    if let Some(pair) = inputs.windows(2).find(|w| w[0] == w[1]) {
        return Err(CompileError::malformed(format!(
            "input {} declared twice",
            pair[0]
        )));
    }
    if let Some(bad) = inputs.iter().find(|q| q.0 >= num_qubits) {
        return Err(CompileError::malformed(format!(
            "input {bad} out of range for {num_qubits} qubits"
        )));
    }

    Ok(inputs)
}

/// Stable topological order of command indices.
///
/// Edges: an entanglement precedes measurements and corrections on either
/// endpoint; a measurement precedes every step reading its outcome; and
/// corrections on the same qubit keep their declaration order, since X and Z
/// do not commute.
fn dependency_order(commands: &[FlowStep]) -> CompileResult<Vec<usize>> {
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(commands.len(), commands.len());
    let nodes: Vec<NodeIndex> = (0..commands.len()).map(|i| graph.add_node(i)).collect();

    let mut entangles_on: FxHashMap<QubitId, Vec<NodeIndex>> = FxHashMap::default();
    let mut measure_of: FxHashMap<QubitId, NodeIndex> = FxHashMap::default();
    for (step, &node) in commands.iter().zip(&nodes) {
        match step {
            FlowStep::Entangle { first, second } => {
                entangles_on.entry(*first).or_default().push(node);
                entangles_on.entry(*second).or_default().push(node);
            }
            FlowStep::Measure(m) => {
                measure_of.insert(m.qubit, node);
            }
            FlowStep::Correct(_) => {}
        }
    }

    let mut last_correction: FxHashMap<QubitId, NodeIndex> = FxHashMap::default();
    for (step, &node) in commands.iter().zip(&nodes) {
        let target = match step {
            FlowStep::Entangle { .. } => continue,
            FlowStep::Measure(m) => m.qubit,
            FlowStep::Correct(c) => {
                if let Some(prev) = last_correction.insert(c.qubit, node) {
                    graph.add_edge(prev, node, ());
                }
                c.qubit
            }
        };

        for &entangle in entangles_on.get(&target).into_iter().flatten() {
            graph.add_edge(entangle, node, ());
        }
        for dep in step.dependencies() {
            if let Some(&measure) = measure_of.get(&dep) {
                graph.add_edge(measure, node, ());
            }
        }
    }

    // Kahn's algorithm, always emitting the earliest-declared ready command.
    let mut in_degree: Vec<usize> = nodes
        .iter()
        .map(|&n| graph.edges_directed(n, Direction::Incoming).count())
        .collect();
    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, d)| **d == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut order = Vec::with_capacity(commands.len());
    while let Some(Reverse(i)) = ready.pop() {
        order.push(i);
        for edge in graph.edges(nodes[i]) {
            let target = graph[edge.target()];
            in_degree[target] -= 1;
            if in_degree[target] == 0 {
                ready.push(Reverse(target));
            }
        }
    }

    if order.len() != commands.len() {
        let stuck: Vec<String> = (0..commands.len())
            .filter(|i| in_degree[*i] > 0)
            .map(|i| commands[i].to_string())
            .collect();
        return Err(CompileError::malformed(format!(
            "cyclic measurement dependencies among {}",
            stuck.join(", ")
        )));
    }

    Ok(order)
}
