//! Pattern descriptions: the circuit input consumed by the flow compiler.
//!
//! A [`PatternDescription`] is an unordered-but-complete list of flow steps
//! plus the declared output qubits. It can be built in code, deserialised
//! with `serde`, or parsed from the line-oriented text format:
//!
//! ```text
//! # one command per line, qubits numbered from 1
//! qubits 3
//! inputs 1
//! E 1 2
//! E 2 3
//! M 1 0
//! M 2 64 x:1
//! X 3 2          # X on qubit 3 iff outcome of qubit 2 is 1
//! Z 3 1
//! Z 3 0          # power index 0: always apply
//! O 3
//! ```
//!
//! Measurement domains are written `x:a,b` and `z:c`; `-` stands for an
//! empty domain.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::angle::Angle;
use crate::error::{IrError, IrResult};
use crate::flow::{Condition, CorrectStep, FlowStep, MeasureStep};
use crate::gate::Pauli;
use crate::qubit::QubitId;

/// Description of a measurement pattern, prior to compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDescription {
    /// Optional human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Declared qubit count; inferred from the commands when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_qubits: Option<u32>,
    /// Qubits that receive the client's input; inferred when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<QubitId>>,
    /// Flow steps, in declaration order.
    pub commands: Vec<FlowStep>,
    /// Output qubits, in declaration order.
    pub outputs: Vec<QubitId>,
}

impl PatternDescription {
    /// Create an empty description.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Declare the total number of qubits.
    pub fn with_num_qubits(&mut self, n: u32) -> &mut Self {
        self.num_qubits = Some(n);
        self
    }

    /// Declare the input qubits explicitly.
    pub fn with_inputs(&mut self, inputs: impl IntoIterator<Item = QubitId>) -> &mut Self {
        self.inputs = Some(inputs.into_iter().collect());
        self
    }

    /// Append an entangle command.
    pub fn entangle(&mut self, first: QubitId, second: QubitId) -> &mut Self {
        self.commands.push(FlowStep::entangle(first, second));
        self
    }

    /// Append a measurement command.
    pub fn measure(&mut self, step: MeasureStep) -> &mut Self {
        self.commands.push(FlowStep::Measure(step));
        self
    }

    /// Append a byproduct correction.
    pub fn correct(&mut self, pauli: Pauli, qubit: QubitId, condition: Condition) -> &mut Self {
        self.commands.push(FlowStep::Correct(CorrectStep {
            pauli,
            qubit,
            condition,
        }));
        self
    }

    /// Declare an output qubit.
    pub fn output(&mut self, qubit: QubitId) -> &mut Self {
        self.outputs.push(qubit);
        self
    }

    /// Number of measurement commands.
    pub fn num_measurements(&self) -> usize {
        self.commands
            .iter()
            .filter(|s| matches!(s, FlowStep::Measure(_)))
            .count()
    }

    /// Parse the line-oriented text format.
    pub fn parse(text: &str) -> IrResult<Self> {
        let mut desc = PatternDescription::default();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let Some(head) = tokens.next() else {
                continue;
            };
            let args: Vec<&str> = tokens.collect();
            let err = |message: String| IrError::Parse {
                line: line_no,
                message,
            };

            match head {
                "name" => desc.name = Some(args.join(" ")),
                "qubits" => {
                    let [n] = args.as_slice() else {
                        return Err(err("expected `qubits <count>`".into()));
                    };
                    desc.num_qubits = Some(parse_u32(n).map_err(err)?);
                }
                "inputs" => {
                    let inputs = args
                        .iter()
                        .map(|a| parse_qubit(a))
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(err)?;
                    desc.inputs = Some(inputs);
                }
                "E" => {
                    let [a, b] = args.as_slice() else {
                        return Err(err("expected `E <qubit> <qubit>`".into()));
                    };
                    desc.entangle(parse_qubit(a).map_err(err)?, parse_qubit(b).map_err(err)?);
                }
                "M" => {
                    let (q, angle, domains) = match args.as_slice() {
                        [q, angle, domains @ ..] => (q, angle, domains),
                        _ => return Err(err("expected `M <qubit> <angle> [x:..] [z:..]`".into())),
                    };
                    let angle: i64 = angle
                        .parse()
                        .map_err(|_| err(format!("invalid angle '{angle}'")))?;
                    let mut step =
                        MeasureStep::new(parse_qubit(q).map_err(err)?, Angle::from_steps(angle));
                    for domain in domains {
                        match domain.split_once(':') {
                            Some(("x", list)) => step.x_domain = parse_domain(list).map_err(err)?,
                            Some(("z", list)) => step.z_domain = parse_domain(list).map_err(err)?,
                            _ => return Err(err(format!("invalid domain '{domain}'"))),
                        }
                    }
                    desc.measure(step);
                }
                "X" | "Z" => {
                    let [q, power] = args.as_slice() else {
                        return Err(err(format!("expected `{head} <qubit> <power index>`")));
                    };
                    let pauli = if head == "X" { Pauli::X } else { Pauli::Z };
                    let condition = Condition::from_power_index(parse_u32(power).map_err(err)?);
                    desc.correct(pauli, parse_qubit(q).map_err(err)?, condition);
                }
                "O" => {
                    if args.is_empty() {
                        return Err(err("expected `O <qubit>...`".into()));
                    }
                    for a in &args {
                        desc.output(parse_qubit(a).map_err(err)?);
                    }
                }
                other => return Err(err(format!("unknown command '{other}'"))),
            }
        }

        Ok(desc)
    }
}

impl FromStr for PatternDescription {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_u32(token: &str) -> Result<u32, String> {
    token
        .parse()
        .map_err(|_| format!("invalid number '{token}'"))
}

fn parse_qubit(token: &str) -> Result<QubitId, String> {
    let n = parse_u32(token)?;
    QubitId::from_one_based(n).ok_or_else(|| "qubits are numbered from 1".to_string())
}

fn parse_domain(list: &str) -> Result<Vec<QubitId>, String> {
    if list == "-" || list.is_empty() {
        return Ok(vec![]);
    }
    list.split(',').map(parse_qubit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAIN: &str = "
        name chain
        qubits 3
        E 1 2
        E 2 3   # linear cluster
        M 1 0
        M 2 64 x:1 z:-
        X 3 2
        Z 3 1
        Z 3 0
        O 3
    ";

    #[test]
    fn test_parse_text_format() {
        let desc = PatternDescription::parse(CHAIN).unwrap();
        assert_eq!(desc.name.as_deref(), Some("chain"));
        assert_eq!(desc.num_qubits, Some(3));
        assert_eq!(desc.commands.len(), 7);
        assert_eq!(desc.num_measurements(), 2);
        assert_eq!(desc.outputs, vec![QubitId(2)]);

        assert_eq!(
            desc.commands[3],
            FlowStep::Measure(MeasureStep::new(QubitId(1), Angle::HALF_PI).with_x_domain([QubitId(0)]))
        );
        assert_eq!(
            desc.commands[6].as_correct().unwrap().condition,
            Condition::Always
        );
    }

    #[test]
    fn test_parse_reports_line() {
        let err = PatternDescription::parse("E 1 2\nM 0 3\n").unwrap_err();
        match err {
            IrError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_command() {
        assert!(PatternDescription::parse("Y 1 0").is_err());
        assert!(PatternDescription::parse("M 1 0 w:2").is_err());
        assert!(PatternDescription::parse("E 1").is_err());
    }

    #[test]
    fn test_builder_matches_parser() {
        let mut built = PatternDescription::new("chain");
        built
            .with_num_qubits(3)
            .entangle(QubitId(0), QubitId(1))
            .entangle(QubitId(1), QubitId(2))
            .measure(MeasureStep::new(QubitId(0), Angle::ZERO))
            .measure(MeasureStep::new(QubitId(1), Angle::HALF_PI).with_x_domain([QubitId(0)]))
            .correct(Pauli::X, QubitId(2), Condition::Outcome(QubitId(1)))
            .correct(Pauli::Z, QubitId(2), Condition::Outcome(QubitId(0)))
            .correct(Pauli::Z, QubitId(2), Condition::Always)
            .output(QubitId(2));

        assert_eq!(built, CHAIN.parse::<PatternDescription>().unwrap());
    }

    #[test]
    fn test_json_description() {
        let json = r#"{
            "num_qubits": 2,
            "commands": [
                {"op": "entangle", "first": 0, "second": 1},
                {"op": "measure", "qubit": 0, "angle": 32},
                {"op": "correct", "pauli": "X", "qubit": 1, "condition": {"outcome": 0}}
            ],
            "outputs": [1]
        }"#;
        let desc: PatternDescription = serde_json::from_str(json).unwrap();
        assert_eq!(desc.num_measurements(), 1);
        assert!(desc.inputs.is_none());
        assert_eq!(desc.outputs, vec![QubitId(1)]);
    }
}
