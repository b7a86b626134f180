//! Property tests for flow ordering.
//!
//! Random linear-cluster patterns with random adaptive dependencies are
//! shuffled, compiled, and checked to be executable front to back.

use proptest::prelude::*;

use ubqc_compile::{CompileError, Flow, compile};
use ubqc_ir::{Angle, Condition, CorrectStep, FlowStep, MeasureStep, Pauli, PatternDescription, QubitId};

/// A valid pattern over `n` qubits on a line: qubits `0..n-1` are measured,
/// qubit `n-1` is the single output.
fn linear_pattern(
    n: u32,
    deps: &[(Vec<u32>, Vec<u32>, u8)],
    corrections: &[(bool, u32)],
) -> Vec<FlowStep> {
    let mut steps = Vec::new();
    for i in 0..n - 1 {
        steps.push(FlowStep::entangle(QubitId(i), QubitId(i + 1)));
    }
    for i in 0..n - 1 {
        let (x, z, angle) = &deps[i as usize];
        // Only earlier qubits may appear in a domain.
        let x: Vec<QubitId> = x.iter().filter(|d| **d < i).map(|d| QubitId(*d)).collect();
        let z: Vec<QubitId> = z.iter().filter(|d| **d < i).map(|d| QubitId(*d)).collect();
        steps.push(FlowStep::Measure(
            MeasureStep::new(QubitId(i), Angle(*angle))
                .with_x_domain(x)
                .with_z_domain(z),
        ));
    }
    for (is_x, power) in corrections {
        let condition = Condition::from_power_index(*power % n);
        steps.push(FlowStep::Correct(CorrectStep {
            pauli: if *is_x { Pauli::X } else { Pauli::Z },
            qubit: QubitId(n - 1),
            condition,
        }));
    }
    steps
}

fn arb_pattern() -> impl Strategy<Value = PatternDescription> {
    (2u32..8)
        .prop_flat_map(|n| {
            let deps = prop::collection::vec(
                (
                    prop::collection::vec(0u32..8, 0..3),
                    prop::collection::vec(0u32..8, 0..3),
                    any::<u8>(),
                ),
                (n - 1) as usize,
            );
            let corrections = prop::collection::vec((any::<bool>(), 0u32..8), 0..4);
            (Just(n), deps, corrections)
        })
        .prop_flat_map(|(n, deps, corrections)| {
            let steps = linear_pattern(n, &deps, &corrections);
            (Just(n), Just(steps).prop_shuffle())
        })
        .prop_map(|(n, commands)| PatternDescription {
            name: Some("random".into()),
            num_qubits: Some(n),
            inputs: None,
            commands,
            outputs: vec![QubitId(n - 1)],
        })
}

fn position_of_measure(flow: &Flow, qubit: QubitId) -> usize {
    flow.steps()
        .iter()
        .position(|s| matches!(s, FlowStep::Measure(m) if m.qubit == qubit))
        .expect("dependency must be measured")
}

proptest! {
    #[test]
    fn prop_dependencies_precede_dependents(desc in arb_pattern()) {
        let flow = compile(&desc).unwrap();
        prop_assert_eq!(flow.steps().len(), desc.commands.len());

        for (pos, step) in flow.steps().iter().enumerate() {
            for dep in step.dependencies() {
                prop_assert!(position_of_measure(&flow, dep) < pos);
            }
        }
    }

    #[test]
    fn prop_entangle_precedes_measurement(desc in arb_pattern()) {
        let flow = compile(&desc).unwrap();

        for (pos, step) in flow.steps().iter().enumerate() {
            if let FlowStep::Entangle { first, second } = step {
                for q in [*first, *second] {
                    if let Some(measured_at) = flow.steps().iter().position(
                        |s| matches!(s, FlowStep::Measure(m) if m.qubit == q),
                    ) {
                        prop_assert!(pos < measured_at);
                    }
                }
            }
        }
    }

    #[test]
    fn prop_corrections_keep_relative_order(desc in arb_pattern()) {
        let flow = compile(&desc).unwrap();
        let declared: Vec<_> = desc.commands.iter().filter_map(FlowStep::as_correct).collect();
        let compiled: Vec<_> = flow.corrections().collect();
        prop_assert_eq!(declared, compiled);
    }

    #[test]
    fn prop_compile_is_idempotent(desc in arb_pattern()) {
        let flow = compile(&desc).unwrap();
        let again = PatternDescription {
            commands: flow.steps().to_vec(),
            ..desc.clone()
        };
        let recompiled = compile(&again).unwrap();
        prop_assert_eq!(recompiled.steps(), flow.steps());
    }
}

#[test]
fn test_malformed_flow_from_text() {
    let pattern: PatternDescription = "E 1 2\nM 1 0 x:2\nO 2".parse().unwrap();
    assert!(matches!(compile(&pattern), Err(CompileError::MalformedFlow(_))));
}
