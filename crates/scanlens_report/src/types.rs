//! Scan-report payload types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;

/// A single string-or-number property value as it appears in packet fields
/// and state-graph nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Int(v) => write!(f, "{}", v),
            ScalarValue::Float(v) => write!(f, "{}", v),
            ScalarValue::Text(v) => write!(f, "{}", v),
        }
    }
}

/// A packet field value: a scalar, or a list of scalars for array-valued
/// fields (repeated sub-identifiers and the like).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(ScalarValue),
    Many(Vec<ScalarValue>),
}

impl FieldValue {
    /// Render the value the way the suggestion list shows it
    /// (array values joined with commas).
    pub fn display(&self) -> String {
        match self {
            FieldValue::Scalar(v) => v.to_string(),
            FieldValue::Many(vs) => vs
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// One decoded field of a request or response packet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketField {
    pub name: String,
    pub repr: String,
    /// Type tag as emitted by the scanner: "number", "bytes", "string", ...
    #[serde(rename = "type")]
    pub type_tag: String,
    pub value: FieldValue,
}

/// Decoded representation of one request or response packet, keyed by an
/// opaque packet id in the per-test-case dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketDescription {
    pub desc: String,
    pub hex: String,
    pub length: u64,
    /// Field index -> descriptor, in wire order.
    #[serde(deserialize_with = "deserialize_field_map")]
    pub fields: BTreeMap<u32, PacketField>,
}

/// Decode the string-keyed field map into integer indices. Done by hand
/// because serde's untagged-enum buffering drops serde_json's own
/// string-to-integer map-key coercion.
fn deserialize_field_map<'de, D>(deserializer: D) -> Result<BTreeMap<u32, PacketField>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = BTreeMap::<String, PacketField>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, field)| {
            key.parse::<u32>()
                .map(|key| (key, field))
                .map_err(serde::de::Error::custom)
        })
        .collect()
}

/// A protocol state: a flat bag of named scalar properties.
pub type StateNode = IndexMap<String, ScalarValue>;

/// The enumeration's finite-state model. Edges are carried for the graph
/// view; the filter engine only reads `nodes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateGraph {
    #[serde(default)]
    pub edges: HashMap<String, Vec<String>>,
    pub nodes: HashMap<String, StateNode>,
    #[serde(default)]
    pub graphviz_source: String,
}

/// One matched request of a test case, with derived display fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    /// Sequence id, assigned by decode order within the test case.
    pub uid: u64,
    /// Request packet id into the packet dictionary.
    pub req: String,
    pub req_ts: f64,
    /// Raw state id into the state graph.
    pub state: String,
    /// Human-readable label derived from the state node.
    pub readable_state: String,
    /// Response packet id, absent for unanswered requests.
    pub resp: Option<String>,
    pub resp_ts: Option<f64>,
    /// `resp_ts - req_ts`, or 0 when unanswered.
    pub round_trip_time: f64,
}

/// Completion marker for one state of a test case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedState {
    pub readable_state: String,
    pub completed: bool,
}

/// Per-state answer-time aggregates, keyed by a state id or "all".
/// Values are carried verbatim as the scanner's decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateStatistics {
    #[serde(default)]
    pub readable_state: String,
    pub answertime_avg: String,
    pub answertime_avg_nr: String,
    pub answertime_avg_pr: String,
    pub answertime_max: String,
    pub answertime_max_nr: String,
    pub answertime_max_pr: String,
    pub answertime_min: String,
    pub answertime_min_nr: String,
    pub answertime_min_pr: String,
    pub num_answered: String,
    pub num_negative_resps: String,
    pub num_unanswered: String,
}

/// One enumerator run: its records plus the packet dictionary they index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestCase {
    pub name: String,
    pub completed: bool,
    pub completed_states: IndexMap<String, CompletedState>,
    pub results: Vec<ResultRecord>,
    pub packet_descriptions: HashMap<String, PacketDescription>,
    pub state_statistics: IndexMap<String, StateStatistics>,
}

/// A fully decoded scan report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub test_cases: Vec<TestCase>,
    pub state_graph: StateGraph,
}
