//! Recursive-descent parser for the filter grammar.
//!
//! ```text
//! filter     := andChain ( "||" andChain )*
//! andChain   := term ( "&&" term )*
//! term       := "(" filter ")" | comparison
//! comparison := key ( "==" | "!=" ) value
//! key        := [A-Za-z0-9._]+
//! value      := '"' [^"]* '"' | [A-Za-z0-9_]+
//! ```
//!
//! Greedy left-to-right, no backtracking; precedence is carried by the
//! three-level structure.

use crate::ast::{Comparison, FilterNode};
use crate::cursor::StringConsumer;
use crate::error::{FilterParseError, Result};

/// Parse a complete filter expression.
///
/// Returns the root node (the `||` level) or the first error encountered;
/// input left over after the grammar stops is an error too.
pub fn parse_filter(input: &str) -> Result<FilterNode> {
    let mut cursor = StringConsumer::new(input);
    let root = parse_any(&mut cursor)?;
    if cursor.has_more_chars() {
        return Err(FilterParseError::TrailingInput(
            cursor.remainder().to_string(),
        ));
    }
    Ok(root)
}

/// `||` level: one or more `&&` chains.
fn parse_any(cursor: &mut StringConsumer<'_>) -> Result<FilterNode> {
    let mut children = vec![parse_all(cursor)?];
    while cursor.has_more_chars() {
        cursor.remove_leading_whitespace();
        if cursor.peek(2) == "||" {
            cursor.consume(2);
            children.push(parse_all(cursor)?);
        } else {
            break;
        }
    }
    Ok(FilterNode::Any(children))
}

/// `&&` level: one or more terms.
fn parse_all(cursor: &mut StringConsumer<'_>) -> Result<FilterNode> {
    let mut children = vec![parse_term(cursor)?];
    while cursor.has_more_chars() {
        cursor.remove_leading_whitespace();
        if cursor.peek(2) == "&&" {
            cursor.consume(2);
            children.push(parse_term(cursor)?);
        } else {
            break;
        }
    }
    Ok(FilterNode::All(children))
}

/// Tightest level: a parenthesized sub-filter or a single comparison.
fn parse_term(cursor: &mut StringConsumer<'_>) -> Result<FilterNode> {
    cursor.remove_leading_whitespace();
    if cursor.peek(1) == "(" {
        cursor.consume(1);
        let inner = parse_any(cursor)?;
        cursor.remove_leading_whitespace();
        if cursor.consume(1) != ")" {
            return Err(FilterParseError::UnclosedGroup);
        }
        return Ok(inner);
    }
    parse_comparison(cursor)
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '_'
}

fn is_bareword_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn parse_comparison(cursor: &mut StringConsumer<'_>) -> Result<FilterNode> {
    // key
    cursor.remove_leading_whitespace();
    let mut key = String::new();
    while cursor.has_more_chars() {
        let c = cursor.peek(1);
        if !c.chars().all(is_key_char) {
            break;
        }
        key.push_str(cursor.consume(1));
    }
    if key.is_empty() {
        return Err(FilterParseError::EmptyKey);
    }

    // comparator
    cursor.remove_leading_whitespace();
    let invert = match cursor.peek(2) {
        "==" => false,
        "!=" => true,
        _ => return Err(FilterParseError::ExpectedComparator),
    };
    cursor.consume(2);

    // value: quoted string or bareword
    cursor.remove_leading_whitespace();
    let mut value = String::new();
    let quoted = cursor.peek(1) == "\"";
    if quoted {
        value.push_str(cursor.consume(1));
        while cursor.has_more_chars() && cursor.peek(1) != "\"" {
            value.push_str(cursor.consume(1));
        }
        if cursor.peek(1) != "\"" {
            return Err(FilterParseError::UnclosedQuote);
        }
        value.push_str(cursor.consume(1));
    } else {
        while cursor.has_more_chars() {
            let c = cursor.peek(1);
            if !c.chars().all(is_bareword_char) {
                break;
            }
            value.push_str(cursor.consume(1));
        }
    }
    if value.is_empty() {
        return Err(FilterParseError::EmptyValue);
    }

    Ok(FilterNode::Compare(Comparison::new(key, value, invert)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::MatchValue;

    fn leaf(node: &FilterNode) -> &Comparison {
        match node {
            FilterNode::Compare(cmp) => cmp,
            other => panic!("expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_single_comparison() {
        let ast = parse_filter("uid == 42").unwrap();
        let FilterNode::Any(ors) = &ast else {
            panic!("root must be the || level")
        };
        assert_eq!(ors.len(), 1);
        let FilterNode::All(ands) = &ors[0] else {
            panic!("child must be the && level")
        };
        assert_eq!(ands.len(), 1);
        let cmp = leaf(&ands[0]);
        assert_eq!(cmp.key, "uid");
        assert_eq!(cmp.value, MatchValue::Int(42));
        assert!(!cmp.invert);
    }

    #[test]
    fn test_precedence_structure() {
        // a==1 && b==2 || c==3 -> Any[All[a, b], All[c]]
        let ast = parse_filter("a==1 && b==2 || c==3").unwrap();
        let FilterNode::Any(ors) = &ast else { panic!() };
        assert_eq!(ors.len(), 2);
        let FilterNode::All(left) = &ors[0] else { panic!() };
        assert_eq!(left.len(), 2);
        let FilterNode::All(right) = &ors[1] else { panic!() };
        assert_eq!(right.len(), 1);
    }

    #[test]
    fn test_parenthesized_group() {
        let ast = parse_filter("a == 1 && (b == 2 || c == 3)").unwrap();
        let FilterNode::Any(ors) = &ast else { panic!() };
        let FilterNode::All(ands) = &ors[0] else { panic!() };
        assert_eq!(ands.len(), 2);
        assert!(matches!(&ands[1], FilterNode::Any(inner) if inner.len() == 2));
    }

    #[test]
    fn test_whitespace_insensitive() {
        assert_eq!(
            parse_filter("a==1&&b==2").unwrap(),
            parse_filter("  a == 1   &&  b == 2  ").unwrap()
        );
    }

    #[test]
    fn test_quoted_values_keep_raw_spelling() {
        let ast = parse_filter("state == \"SN=1 TP=0\"").unwrap();
        let FilterNode::Any(ors) = &ast else { panic!() };
        let FilterNode::All(ands) = &ors[0] else { panic!() };
        let cmp = leaf(&ands[0]);
        assert_eq!(cmp.raw_value, "\"SN=1 TP=0\"");
        assert_eq!(cmp.value, MatchValue::Text("sn=1 tp=0".to_string()));
    }

    #[test]
    fn test_deterministic() {
        let a = parse_filter("a == 1 && (b == 2 || c == 3)").unwrap();
        let b = parse_filter("a == 1 && (b == 2 || c == 3)").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_error_empty_key() {
        assert_eq!(parse_filter("== 1"), Err(FilterParseError::EmptyKey));
        assert_eq!(parse_filter(""), Err(FilterParseError::EmptyKey));
        assert_eq!(
            parse_filter("a == 1 && == 2"),
            Err(FilterParseError::EmptyKey)
        );
    }

    #[test]
    fn test_error_empty_value() {
        assert_eq!(parse_filter("key=="), Err(FilterParseError::EmptyValue));
        assert_eq!(parse_filter("key == "), Err(FilterParseError::EmptyValue));
    }

    #[test]
    fn test_error_missing_comparator() {
        assert_eq!(
            parse_filter("key = 1"),
            Err(FilterParseError::ExpectedComparator)
        );
        assert_eq!(
            parse_filter("key < 1"),
            Err(FilterParseError::ExpectedComparator)
        );
    }

    #[test]
    fn test_error_unclosed_quote() {
        assert_eq!(
            parse_filter("key == \"abc"),
            Err(FilterParseError::UnclosedQuote)
        );
    }

    #[test]
    fn test_error_unclosed_group() {
        assert_eq!(
            parse_filter("(a == 1"),
            Err(FilterParseError::UnclosedGroup)
        );
    }

    #[test]
    fn test_error_trailing_input() {
        assert_eq!(
            parse_filter("a == 1)"),
            Err(FilterParseError::TrailingInput(")".to_string()))
        );
        assert!(matches!(
            parse_filter("a == 1 ~ b"),
            Err(FilterParseError::TrailingInput(_))
        ));
    }

    #[test]
    fn test_trailing_whitespace_is_fine() {
        assert!(parse_filter("a == 1   ").is_ok());
    }

    #[test]
    fn test_empty_quoted_value_is_allowed() {
        // The raw value is the two quote characters, so it is not empty.
        let ast = parse_filter("key == \"\"").unwrap();
        let FilterNode::Any(ors) = &ast else { panic!() };
        let FilterNode::All(ands) = &ors[0] else { panic!() };
        assert_eq!(leaf(&ands[0]).value, MatchValue::Text(String::new()));
    }
}
