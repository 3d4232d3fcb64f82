//! Scan-report JSON decoding.
//!
//! Turns the raw JSON artifact written by a scan run into the immutable
//! [`ScanReport`] snapshot. Decoding derives everything the UI and filter
//! engine rely on: sequence ids, round-trip times, readable state labels,
//! and cleaned-up field representations.

use crate::error::{ReportError, Result};
use crate::types::*;
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;

// ============================================================================
// Wire shapes
// ============================================================================

#[derive(Deserialize)]
struct ScanReportWire {
    test_cases: TestCaseSeq,
    state_graph: StateGraph,
}

/// Older reports carry test cases as an id-keyed object, newer ones as an
/// array. Both decode to the same list.
#[derive(Deserialize)]
#[serde(untagged)]
enum TestCaseSeq {
    List(Vec<TestCaseWire>),
    Map(IndexMap<String, TestCaseWire>),
}

impl TestCaseSeq {
    fn into_vec(self) -> Vec<TestCaseWire> {
        match self {
            TestCaseSeq::List(v) => v,
            TestCaseSeq::Map(m) => m.into_values().collect(),
        }
    }
}

#[derive(Deserialize)]
struct TestCaseWire {
    name: String,
    completed: bool,
    results: Vec<ResultWire>,
    #[serde(default)]
    states_completed: IndexMap<String, bool>,
    packet_desc: HashMap<String, PacketDescription>,
    #[serde(default)]
    statistics: IndexMap<String, StateStatistics>,
}

#[derive(Deserialize)]
struct ResultWire {
    req: String,
    req_ts: f64,
    state: String,
    #[serde(default)]
    resp: Option<String>,
    #[serde(default)]
    resp_ts: Option<f64>,
}

// ============================================================================
// Derivations
// ============================================================================

/// Derive the human-readable label of a state node: each property becomes
/// `AB=value` where `AB` is the first plus last character of the uppercased
/// property name, properties joined with spaces.
///
/// `{session: 1, tp: 0}` -> `"SN=1 TP=0"`.
pub fn readable_state_name(node: &StateNode) -> String {
    node.iter()
        .map(|(key, value)| {
            let upper = key.to_uppercase();
            let mut abbrev = String::new();
            abbrev.extend(upper.chars().next());
            abbrev.extend(upper.chars().last());
            format!("{}={}", abbrev, value)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Label for statistics keys: the state label when the key is a state id,
/// otherwise the capitalized key (covers the synthetic "all" bucket).
fn statistics_label(key: &str, graph: &StateGraph) -> String {
    match graph.nodes.get(key) {
        Some(node) => readable_state_name(node),
        None => {
            let mut chars = key.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        }
    }
}

/// Replace raw state ids inside the graphviz source with their quoted
/// readable labels so the rendered graph shows something meaningful.
fn patch_graphviz_source(source: &str, graph: &StateGraph) -> String {
    let mut patched = source.to_string();
    for (id, node) in &graph.nodes {
        patched = patched.replace(id, &format!("\"{}\"", readable_state_name(node)));
    }
    patched
}

/// Field representations arrive wrapped in single quotes for some field
/// types; unwrap them once here so filtering and suggestions see the bare
/// text.
fn cleanup_representations(packets: &mut HashMap<String, PacketDescription>) {
    for packet in packets.values_mut() {
        for field in packet.fields.values_mut() {
            let repr = &field.repr;
            if repr.len() >= 2 && repr.starts_with('\'') && repr.ends_with('\'') {
                field.repr = repr[1..repr.len() - 1].to_string();
            }
        }
    }
}

// ============================================================================
// Decoding
// ============================================================================

fn decode_test_case(wire: TestCaseWire, graph: &StateGraph) -> Result<TestCase> {
    let mut packet_descriptions = wire.packet_desc;
    cleanup_representations(&mut packet_descriptions);

    let mut results = Vec::with_capacity(wire.results.len());
    for (index, raw) in wire.results.into_iter().enumerate() {
        if !packet_descriptions.contains_key(&raw.req) {
            return Err(ReportError::UnknownPacket(raw.req));
        }
        if let Some(resp) = &raw.resp {
            if !packet_descriptions.contains_key(resp) {
                return Err(ReportError::UnknownPacket(resp.clone()));
            }
        }
        let node = graph
            .nodes
            .get(&raw.state)
            .ok_or_else(|| ReportError::UnknownState(raw.state.clone()))?;

        results.push(ResultRecord {
            uid: index as u64,
            round_trip_time: raw.resp_ts.unwrap_or(raw.req_ts) - raw.req_ts,
            readable_state: readable_state_name(node),
            req: raw.req,
            req_ts: raw.req_ts,
            state: raw.state,
            resp: raw.resp,
            resp_ts: raw.resp_ts,
        });
    }

    let mut completed_states = IndexMap::new();
    for (state, completed) in wire.states_completed {
        let node = graph
            .nodes
            .get(&state)
            .ok_or_else(|| ReportError::UnknownState(state.clone()))?;
        completed_states.insert(
            state,
            CompletedState {
                readable_state: readable_state_name(node),
                completed,
            },
        );
    }

    let mut state_statistics = IndexMap::new();
    for (key, mut stats) in wire.statistics {
        stats.readable_state = statistics_label(&key, graph);
        state_statistics.insert(key, stats);
    }

    Ok(TestCase {
        name: wire.name,
        completed: wire.completed,
        completed_states,
        results,
        packet_descriptions,
        state_statistics,
    })
}

/// Decode a scan report from an already parsed JSON value.
pub fn decode_scan_report_value(value: serde_json::Value) -> Result<ScanReport> {
    let wire: ScanReportWire = serde_json::from_value(value)?;
    let mut state_graph = wire.state_graph;
    state_graph.graphviz_source = patch_graphviz_source(&state_graph.graphviz_source, &state_graph);

    let mut test_cases = wire.test_cases.into_vec();
    test_cases.sort_by(|a, b| a.name.cmp(&b.name));

    let test_cases = test_cases
        .into_iter()
        .map(|tc| decode_test_case(tc, &state_graph))
        .collect::<Result<Vec<_>>>()?;

    Ok(ScanReport {
        test_cases,
        state_graph,
    })
}

/// Decode a scan report from raw JSON text.
pub fn decode_scan_report(json: &str) -> Result<ScanReport> {
    decode_scan_report_value(serde_json::from_str(json)?)
}
