//! Filter AST nodes and their matching semantics.

use scanlens_report::{
    FieldValue, PacketDescription, ResultRecord, ScalarValue, ScanReport, StateGraph, StateNode,
    TestCase,
};
use std::fmt;

/// Everything one record match gets to look at: the record itself plus the
/// packets and state node its keys resolve to. Read-only snapshot borrows.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub record: &'a ResultRecord,
    pub request: &'a PacketDescription,
    pub response: Option<&'a PacketDescription>,
    pub state: &'a StateNode,
}

impl<'a> MatchContext<'a> {
    /// Assemble the context for one record of a test case. Returns `None`
    /// if a packet or state reference does not resolve (decode validation
    /// normally rules that out).
    pub fn for_record(
        test_case: &'a TestCase,
        state_graph: &'a StateGraph,
        record: &'a ResultRecord,
    ) -> Option<Self> {
        let request = test_case.packet_descriptions.get(&record.req)?;
        let response = match &record.resp {
            Some(resp) => Some(test_case.packet_descriptions.get(resp)?),
            None => None,
        };
        let state = state_graph.nodes.get(&record.state)?;
        Some(Self {
            record,
            request,
            response,
            state,
        })
    }

    /// Convenience wrapper when the report as a whole is at hand.
    pub fn for_report_record(
        report: &'a ScanReport,
        test_case: &'a TestCase,
        record: &'a ResultRecord,
    ) -> Option<Self> {
        Self::for_record(test_case, &report.state_graph, record)
    }
}

/// Normalized right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchValue {
    Int(i64),
    /// Lowercased, quote-stripped text.
    Text(String),
}

impl MatchValue {
    fn render(&self) -> String {
        match self {
            MatchValue::Int(v) => v.to_string(),
            MatchValue::Text(v) => v.clone(),
        }
    }
}

/// Integer parse for bareword values. Accepts decimal and `0x` hex, the two
/// numeric spellings the scanner emits.
fn parse_match_int(raw: &str) -> Option<i64> {
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else {
        raw.parse().ok()
    }
}

/// A single `key == value` / `key != value` comparison, the only leaf of
/// the filter grammar.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Key as typed, kept for re-rendering.
    pub raw_key: String,
    /// Value as typed, including surrounding quotes when present.
    pub raw_value: String,
    /// Lowercased dotted key path.
    pub key: String,
    /// Normalized match value: quotes stripped, integers recognized.
    pub value: MatchValue,
    /// Set for `!=`.
    pub invert: bool,
}

impl Comparison {
    pub fn new(raw_key: String, raw_value: String, invert: bool) -> Self {
        let key = raw_key.to_lowercase();
        let value = if raw_value.len() >= 2
            && raw_value.starts_with('"')
            && raw_value.ends_with('"')
        {
            MatchValue::Text(raw_value[1..raw_value.len() - 1].to_lowercase())
        } else {
            match parse_match_int(&raw_value) {
                Some(int) => MatchValue::Int(int),
                None => MatchValue::Text(raw_value.to_lowercase()),
            }
        };
        Self {
            key,
            value,
            invert,
            raw_key,
            raw_value,
        }
    }

    /// Evaluate this comparison against a record context.
    ///
    /// Resolution happens first: a key path that does not resolve to any
    /// known field or property is a miss and yields `false` for both `==`
    /// and `!=`. Only a resolved comparison outcome is inverted.
    pub fn matches(&self, ctx: &MatchContext<'_>) -> bool {
        match self.resolve(ctx) {
            Some(outcome) => outcome != self.invert,
            None => false,
        }
    }

    fn resolve(&self, ctx: &MatchContext<'_>) -> Option<bool> {
        let mut segments = self.key.splitn(2, '.');
        let head = segments.next().unwrap_or("");
        match segments.next() {
            None => self.resolve_record_field(ctx.record, head),
            Some(tail) => {
                // Only the first sub-segment addresses a field; anything
                // after a second dot is ignored, matching the observed
                // resolver.
                let field = tail.split('.').next().unwrap_or("");
                match head {
                    "request" => self.resolve_packet_field(Some(ctx.request), field),
                    "response" => self.resolve_packet_field(ctx.response, field),
                    "state" => self.resolve_state_property(ctx.state, field),
                    _ => None,
                }
            }
        }
    }

    /// Flat namespace: case-insensitive lookup on the record itself.
    /// `state` is aliased to the readable label so matching uses what the
    /// table displays, not the internal state id.
    fn resolve_record_field(&self, record: &ResultRecord, key: &str) -> Option<bool> {
        let shown = match key {
            "uid" => record.uid.to_string(),
            "req" => record.req.to_lowercase(),
            "resp" => record
                .resp
                .as_deref()
                .unwrap_or_default()
                .to_lowercase(),
            "req_ts" => record.req_ts.to_string(),
            "resp_ts" => record
                .resp_ts
                .map(|ts| ts.to_string())
                .unwrap_or_default(),
            "state" | "readablestate" | "readable_state" => record.readable_state.to_lowercase(),
            "roundtriptime" | "round_trip_time" => record.round_trip_time.to_string(),
            _ => return None,
        };
        Some(shown == self.value.render())
    }

    /// `request.*` / `response.*`: iterate the packet's field descriptors.
    /// A field hits when its declared value equals the match value (any
    /// element for array values) or its representation equals it
    /// case-insensitively. No packet or no field of that name is a miss.
    fn resolve_packet_field(
        &self,
        packet: Option<&PacketDescription>,
        name: &str,
    ) -> Option<bool> {
        let packet = packet?;
        let mut seen = false;
        for field in packet.fields.values() {
            if field.name.to_lowercase() != name {
                continue;
            }
            seen = true;
            let value_hit = match &field.value {
                FieldValue::Scalar(scalar) => self.scalar_matches(scalar),
                FieldValue::Many(scalars) => scalars.iter().any(|s| self.scalar_matches(s)),
            };
            let repr_hit = match &self.value {
                MatchValue::Text(text) => field.repr.to_lowercase() == *text,
                MatchValue::Int(_) => false,
            };
            if value_hit || repr_hit {
                return Some(true);
            }
        }
        if seen {
            Some(false)
        } else {
            None
        }
    }

    /// `state.*`: direct case-insensitive property lookup, exact equality
    /// only (no representation fallback).
    fn resolve_state_property(&self, state: &StateNode, name: &str) -> Option<bool> {
        let value = state
            .iter()
            .find(|(key, _)| key.to_lowercase() == name)
            .map(|(_, value)| value)?;
        Some(self.scalar_matches(value))
    }

    /// Strict scalar equality against the normalized match value. Text
    /// compares the stored value as-is against the lowercased match text;
    /// numbers never equal text.
    fn scalar_matches(&self, scalar: &ScalarValue) -> bool {
        match (scalar, &self.value) {
            (ScalarValue::Int(v), MatchValue::Int(want)) => v == want,
            (ScalarValue::Float(v), MatchValue::Int(want)) => *v == *want as f64,
            (ScalarValue::Text(v), MatchValue::Text(want)) => v == want,
            _ => false,
        }
    }
}

/// Parsed filter expression: a closed union with one exhaustive evaluator.
///
/// `Any` is the `||` level (the parse root), `All` the `&&` level. A
/// parenthesized group parses back into an `Any`, so precedence is carried
/// by structure alone and no node can end up with an unexpected child
/// count.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// Matches when at least one child matches.
    Any(Vec<FilterNode>),
    /// Matches when every child matches.
    All(Vec<FilterNode>),
    /// Leaf comparison.
    Compare(Comparison),
}

impl FilterNode {
    /// Evaluate this node against a record context.
    pub fn matches(&self, ctx: &MatchContext<'_>) -> bool {
        match self {
            FilterNode::Any(children) => children.iter().any(|c| c.matches(ctx)),
            FilterNode::All(children) => children.iter().all(|c| c.matches(ctx)),
            FilterNode::Compare(cmp) => cmp.matches(ctx),
        }
    }

    /// Canonical re-rendering of the expression.
    ///
    /// The output is valid filter syntax: re-parsing it yields an AST with
    /// identical matching behavior (multi-child levels are parenthesized,
    /// leaves keep their raw key/value spelling).
    pub fn describe(&self) -> String {
        match self {
            FilterNode::Any(children) => Self::describe_level(children, " || "),
            FilterNode::All(children) => Self::describe_level(children, " && "),
            FilterNode::Compare(cmp) => format!(
                "{} {} {}",
                cmp.raw_key,
                if cmp.invert { "!=" } else { "==" },
                cmp.raw_value
            ),
        }
    }

    fn describe_level(children: &[FilterNode], joiner: &str) -> String {
        match children {
            [] => "<NONE>".to_string(),
            [only] => only.describe(),
            many => {
                let parts: Vec<String> = many.iter().map(|c| c.describe()).collect();
                format!("({})", parts.join(joiner))
            }
        }
    }
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}


#[cfg(test)]
mod tests {
    use super::testkit::*;
    use super::*;
    use crate::parse::parse_filter;
    use scanlens_report::{FieldValue, ScalarValue};

    struct Fixture {
        record: ResultRecord,
        request: PacketDescription,
        response: Option<PacketDescription>,
        state: StateNode,
    }

    impl Fixture {
        fn ctx(&self) -> MatchContext<'_> {
            MatchContext {
                record: &self.record,
                request: &self.request,
                response: self.response.as_ref(),
                state: &self.state,
            }
        }
    }

    fn fixture() -> Fixture {
        Fixture {
            record: record(0, "p1", Some("p2"), "s0"),
            request: packet(
                "read request",
                vec![
                    field(
                        "identifier",
                        FieldValue::Scalar(ScalarValue::Int(256)),
                        "0x100",
                        "number",
                    ),
                    field(
                        "subFunctions",
                        FieldValue::Many(vec![
                            ScalarValue::Int(1),
                            ScalarValue::Int(2),
                            ScalarValue::Int(3),
                        ]),
                        "1, 2, 3",
                        "number",
                    ),
                ],
            ),
            response: Some(packet(
                "positive response",
                vec![field(
                    "service",
                    FieldValue::Scalar(ScalarValue::Text("readDataByIdentifier".to_string())),
                    "ReadDataByIdentifier",
                    "string",
                )],
            )),
            state: state_node(&[("session", ScalarValue::Int(1))]),
        }
    }

    fn matches(expr: &str, ctx: &MatchContext<'_>) -> bool {
        parse_filter(expr).unwrap().matches(ctx)
    }

    #[test]
    fn test_request_field_value_and_repr() {
        let fx = fixture();
        assert!(matches("request.identifier == 256", &fx.ctx()));
        assert!(matches("request.identifier == \"0x100\"", &fx.ctx()));
        assert!(!matches("request.identifier == 99", &fx.ctx()));
    }

    #[test]
    fn test_array_field_matches_any_element() {
        let fx = fixture();
        assert!(matches("request.subfunctions == 2", &fx.ctx()));
        assert!(!matches("request.subfunctions == 5", &fx.ctx()));
    }

    #[test]
    fn test_response_namespace_and_missing_response() {
        let mut fx = fixture();
        assert!(matches("response.service == \"readDataByIdentifier\"", &fx.ctx()));
        fx.response = None;
        // An absent response never matches, not even inverted.
        assert!(!matches("response.service == \"readDataByIdentifier\"", &fx.ctx()));
        assert!(!matches("response.service != \"readDataByIdentifier\"", &fx.ctx()));
    }

    #[test]
    fn test_state_namespace_exact_match() {
        let fx = fixture();
        assert!(matches("state.session == 1", &fx.ctx()));
        assert!(matches("state.SESSION == 1", &fx.ctx()));
        assert!(!matches("state.session == 2", &fx.ctx()));
        // No representation fallback for state properties.
        assert!(!matches("state.session == \"one\"", &fx.ctx()));
    }

    #[test]
    fn test_flat_record_namespace() {
        let fx = fixture();
        assert!(matches("uid == 0", &fx.ctx()));
        assert!(matches("req == p1", &fx.ctx()));
        assert!(matches("resp == \"P2\"", &fx.ctx()));
        // `state` aliases the readable label, not the raw id.
        assert!(matches("state == \"sn=1\"", &fx.ctx()));
        assert!(!matches("state == s0", &fx.ctx()));
    }

    #[test]
    fn test_quoted_and_bare_values_match_identically() {
        let fx = fixture();
        assert_eq!(
            matches("req == p1", &fx.ctx()),
            matches("req == \"p1\"", &fx.ctx())
        );
        assert_eq!(
            matches("state.session == 1", &fx.ctx()),
            matches("uid == 0", &fx.ctx())
        );
    }

    #[test]
    fn test_negation_is_complement_only_when_resolved() {
        let fx = fixture();
        // Resolved: != is the exact complement.
        assert!(!matches("request.identifier != 256", &fx.ctx()));
        assert!(matches("request.identifier != 99", &fx.ctx()));
        // Unresolvable key: miss on both polarities.
        assert!(!matches("request.nosuchfield == 1", &fx.ctx()));
        assert!(!matches("request.nosuchfield != 1", &fx.ctx()));
        assert!(!matches("bogus.namespace == 1", &fx.ctx()));
        assert!(!matches("bogus.namespace != 1", &fx.ctx()));
    }

    #[test]
    fn test_precedence_groups_and_over_or() {
        let fx = fixture();
        // (uid==0 && session==2) || identifier==256 -> right side carries it.
        assert!(matches(
            "uid == 0 && state.session == 2 || request.identifier == 256",
            &fx.ctx()
        ));
        // uid==0 && (session==2 || identifier==99) -> false.
        assert!(!matches(
            "uid == 0 && (state.session == 2 || request.identifier == 99)",
            &fx.ctx()
        ));
    }

    #[test]
    fn test_describe_is_reparseable_and_equivalent() {
        let fx = fixture();
        let exprs = [
            "uid == 0",
            "uid == 0 && state.session == 1 || request.identifier == 99",
            "state == \"sn=1\" && (request.identifier == 256 || request.identifier == 2)",
            "response.service != \"negativeResponse\"",
        ];
        for expr in exprs {
            let ast = parse_filter(expr).unwrap();
            let rendered = ast.describe();
            let reparsed = parse_filter(&rendered).unwrap();
            assert_eq!(
                ast.matches(&fx.ctx()),
                reparsed.matches(&fx.ctx()),
                "{} vs {}",
                expr,
                rendered
            );
        }
    }

    #[test]
    fn test_describe_shows_both_groupings() {
        let ast =
            parse_filter("state == \"s_1\" && (request.foo == 1 || request.foo == 2)").unwrap();
        let rendered = ast.describe();
        assert!(rendered.contains("&&"), "{}", rendered);
        assert!(rendered.contains("||"), "{}", rendered);
    }

    #[test]
    fn test_value_normalization() {
        let cmp = Comparison::new("Key".to_string(), "\"Quoted\"".to_string(), false);
        assert_eq!(cmp.key, "key");
        assert_eq!(cmp.value, MatchValue::Text("quoted".to_string()));

        let cmp = Comparison::new("k".to_string(), "42".to_string(), false);
        assert_eq!(cmp.value, MatchValue::Int(42));

        let cmp = Comparison::new("k".to_string(), "0x100".to_string(), false);
        assert_eq!(cmp.value, MatchValue::Int(256));

        let cmp = Comparison::new("k".to_string(), "NotANumber".to_string(), true);
        assert_eq!(cmp.value, MatchValue::Text("notanumber".to_string()));
        assert!(cmp.invert);
    }
}
