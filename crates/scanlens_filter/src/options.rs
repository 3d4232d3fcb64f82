//! Option-tree construction for filter autocompletion.
//!
//! One pass over a test case's records collects every key path a filter
//! could address and the string values observed at each leaf. The tree is a
//! pure function of the record working set; hosts rebuild it whenever that
//! set changes.

use indexmap::{IndexMap, IndexSet};
use scanlens_report::{PacketDescription, StateGraph, TestCase};

/// Values longer than this are not offered as completions. Purely a
/// usability bound to keep the popup readable.
pub const MAX_OPTION_LEN: usize = 50;

/// One level of the option tree: either further key-path segments or the
/// set of observed values at a leaf. Insertion order is preserved so the
/// suggestion list stays stable across rebuilds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionNode {
    Branch(IndexMap<String, OptionNode>),
    Values(IndexSet<String>),
}

impl OptionNode {
    fn branch() -> Self {
        OptionNode::Branch(IndexMap::new())
    }

    fn values() -> Self {
        OptionNode::Values(IndexSet::new())
    }
}

/// The root namespace map: `request` / `response` / `state` branches plus
/// the flat `uid` value set.
pub type OptionTree = IndexMap<String, OptionNode>;

/// Bytes representations can contain characters outside the bareword
/// grammar, so they are offered pre-quoted.
fn prepare_representation(repr: &str, type_tag: &str) -> String {
    if type_tag == "bytes" {
        format!("\"{}\"", repr)
    } else {
        repr.to_string()
    }
}

fn add_packet_fields(branch: &mut OptionNode, packet: &PacketDescription) {
    let OptionNode::Branch(children) = branch else {
        return;
    };
    for field in packet.fields.values() {
        let entry = children
            .entry(field.name.clone())
            .or_insert_with(OptionNode::values);
        let OptionNode::Values(values) = entry else {
            continue;
        };
        let value = field.value.display();
        if value.chars().count() <= MAX_OPTION_LEN {
            values.insert(value);
        }
        let repr = &field.repr;
        if repr.chars().count() <= MAX_OPTION_LEN {
            values.insert(prepare_representation(repr, &field.type_tag));
        }
    }
}

/// Build the option tree for one test case's working set.
pub fn build_option_tree(test_case: &TestCase, state_graph: &StateGraph) -> OptionTree {
    let mut tree = OptionTree::new();
    tree.insert("request".to_string(), OptionNode::branch());
    tree.insert("response".to_string(), OptionNode::branch());
    tree.insert("state".to_string(), OptionNode::branch());
    tree.insert("uid".to_string(), OptionNode::values());

    for record in &test_case.results {
        if let Some(OptionNode::Values(uids)) = tree.get_mut("uid") {
            uids.insert(record.uid.to_string());
        }

        if let Some(packet) = test_case.packet_descriptions.get(&record.req) {
            if let Some(branch) = tree.get_mut("request") {
                add_packet_fields(branch, packet);
            }
        }

        if let Some(packet) = record
            .resp
            .as_ref()
            .and_then(|resp| test_case.packet_descriptions.get(resp))
        {
            if let Some(branch) = tree.get_mut("response") {
                add_packet_fields(branch, packet);
            }
        }

        if let Some(node) = state_graph.nodes.get(&record.state) {
            if let Some(OptionNode::Branch(props)) = tree.get_mut("state") {
                for (name, value) in node {
                    let entry = props
                        .entry(name.clone())
                        .or_insert_with(OptionNode::values);
                    if let OptionNode::Values(values) = entry {
                        let value = value.to_string();
                        if value.chars().count() <= MAX_OPTION_LEN {
                            values.insert(value);
                        }
                    }
                }
            }
        }
    }

    tree
}
