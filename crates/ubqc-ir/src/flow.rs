//! Flow steps: the entangle / measure / correct commands of a pattern.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::angle::Angle;
use crate::gate::Pauli;
use crate::qubit::QubitId;

/// When a byproduct correction applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Apply unconditionally (power index `0` in the text format).
    Always,
    /// Apply iff the logical outcome of measuring this qubit is 1.
    Outcome(QubitId),
}

impl Condition {
    /// Decode a 1-based power index where `0` means "always".
    pub fn from_power_index(index: u32) -> Self {
        match QubitId::from_one_based(index) {
            Some(qubit) => Condition::Outcome(qubit),
            None => Condition::Always,
        }
    }

    /// Encode as a 1-based power index, `0` for [`Condition::Always`].
    pub fn power_index(self) -> u32 {
        match self {
            Condition::Always => 0,
            Condition::Outcome(q) => q.one_based(),
        }
    }

    /// The measured qubit this condition reads, if any.
    pub fn dependency(self) -> Option<QubitId> {
        match self {
            Condition::Always => None,
            Condition::Outcome(q) => Some(q),
        }
    }
}

/// A measurement command with its adaptive dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureStep {
    /// Qubit to measure.
    pub qubit: QubitId,
    /// Computation angle before adaptation.
    pub angle: Angle,
    /// Outcomes whose parity flips the sign of the angle.
    #[serde(default)]
    pub x_domain: Vec<QubitId>,
    /// Outcomes whose parity adds π to the angle.
    #[serde(default)]
    pub z_domain: Vec<QubitId>,
}

impl MeasureStep {
    /// Create a measurement with no dependencies.
    pub fn new(qubit: QubitId, angle: Angle) -> Self {
        Self {
            qubit,
            angle,
            x_domain: vec![],
            z_domain: vec![],
        }
    }

    /// Set the sign-flipping dependencies.
    #[must_use]
    pub fn with_x_domain(mut self, domain: impl IntoIterator<Item = QubitId>) -> Self {
        self.x_domain = domain.into_iter().collect();
        self
    }

    /// Set the π-shifting dependencies.
    #[must_use]
    pub fn with_z_domain(mut self, domain: impl IntoIterator<Item = QubitId>) -> Self {
        self.z_domain = domain.into_iter().collect();
        self
    }

    /// All qubits whose outcomes this measurement reads.
    pub fn dependencies(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.x_domain.iter().chain(self.z_domain.iter()).copied()
    }
}

/// A conditional Pauli correction on an output qubit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectStep {
    /// Operator to apply.
    pub pauli: Pauli,
    /// Output qubit receiving the correction.
    pub qubit: QubitId,
    /// When to apply it.
    pub condition: Condition,
}

/// One command of a measurement pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FlowStep {
    /// Entangle two qubits (an edge of the graph state).
    Entangle {
        /// First endpoint.
        first: QubitId,
        /// Second endpoint.
        second: QubitId,
    },
    /// Measure a qubit at an adapted angle.
    Measure(MeasureStep),
    /// Apply a byproduct correction.
    Correct(CorrectStep),
}

impl FlowStep {
    /// Create an entangle step.
    pub fn entangle(first: QubitId, second: QubitId) -> Self {
        FlowStep::Entangle { first, second }
    }

    /// Short command tag used in logs and the text format.
    pub fn tag(&self) -> &'static str {
        match self {
            FlowStep::Entangle { .. } => "E",
            FlowStep::Measure(_) => "M",
            FlowStep::Correct(c) => match c.pauli {
                Pauli::X => "X",
                Pauli::Z => "Z",
            },
        }
    }

    /// Qubits this step acts on.
    pub fn qubits(&self) -> Vec<QubitId> {
        match self {
            FlowStep::Entangle { first, second } => vec![*first, *second],
            FlowStep::Measure(m) => vec![m.qubit],
            FlowStep::Correct(c) => vec![c.qubit],
        }
    }

    /// Measured qubits whose outcomes this step reads.
    pub fn dependencies(&self) -> Vec<QubitId> {
        match self {
            FlowStep::Entangle { .. } => vec![],
            FlowStep::Measure(m) => m.dependencies().collect(),
            FlowStep::Correct(c) => c.condition.dependency().into_iter().collect(),
        }
    }

    /// The measurement, if this is a measure step.
    pub fn as_measure(&self) -> Option<&MeasureStep> {
        match self {
            FlowStep::Measure(m) => Some(m),
            _ => None,
        }
    }

    /// The correction, if this is a correct step.
    pub fn as_correct(&self) -> Option<&CorrectStep> {
        match self {
            FlowStep::Correct(c) => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowStep::Entangle { first, second } => write!(f, "E({first}, {second})"),
            FlowStep::Measure(m) => {
                write!(f, "M({}, {}", m.qubit, m.angle)?;
                if !m.x_domain.is_empty() {
                    write!(f, ", x:{:?}", m.x_domain.iter().map(|q| q.0).collect::<Vec<_>>())?;
                }
                if !m.z_domain.is_empty() {
                    write!(f, ", z:{:?}", m.z_domain.iter().map(|q| q.0).collect::<Vec<_>>())?;
                }
                write!(f, ")")
            }
            FlowStep::Correct(c) => match c.condition {
                Condition::Always => write!(f, "{}({})", c.pauli, c.qubit),
                Condition::Outcome(dep) => write!(f, "{}({})^s[{}]", c.pauli, c.qubit, dep),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_index_sentinel() {
        assert_eq!(Condition::from_power_index(0), Condition::Always);
        assert_eq!(
            Condition::from_power_index(2),
            Condition::Outcome(QubitId(1))
        );
        assert_eq!(Condition::Outcome(QubitId(1)).power_index(), 2);
        assert_eq!(Condition::Always.power_index(), 0);
    }

    #[test]
    fn test_step_dependencies() {
        let m = FlowStep::Measure(
            MeasureStep::new(QubitId(2), Angle::HALF_PI)
                .with_x_domain([QubitId(0)])
                .with_z_domain([QubitId(1)]),
        );
        assert_eq!(m.dependencies(), vec![QubitId(0), QubitId(1)]);
        assert_eq!(m.qubits(), vec![QubitId(2)]);

        let always = FlowStep::Correct(CorrectStep {
            pauli: Pauli::Z,
            qubit: QubitId(3),
            condition: Condition::Always,
        });
        assert!(always.dependencies().is_empty());
        assert_eq!(always.tag(), "Z");
    }

    #[test]
    fn test_step_serde_shape() {
        let step = FlowStep::entangle(QubitId(0), QubitId(1));
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["op"], "entangle");
        assert_eq!(json["first"], 0);

        let parsed: FlowStep = serde_json::from_str(
            r#"{"op":"correct","pauli":"X","qubit":2,"condition":{"outcome":1}}"#,
        )
        .unwrap();
        assert_eq!(
            parsed,
            FlowStep::Correct(CorrectStep {
                pauli: Pauli::X,
                qubit: QubitId(2),
                condition: Condition::Outcome(QubitId(1)),
            })
        );

        let measure: FlowStep =
            serde_json::from_str(r#"{"op":"measure","qubit":0,"angle":64}"#).unwrap();
        assert_eq!(
            measure,
            FlowStep::Measure(MeasureStep::new(QubitId(0), Angle::HALF_PI))
        );
    }

    #[test]
    fn test_display() {
        let step = FlowStep::Correct(CorrectStep {
            pauli: Pauli::X,
            qubit: QubitId(2),
            condition: Condition::Outcome(QubitId(0)),
        });
        assert_eq!(step.to_string(), "X(q2)^s[q0]");
    }
}
