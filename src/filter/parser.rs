//! Parse the JSON wire form of a filter into a condition tree.
//!
//! Leaf: `["age", "gte", "18"]`. Junction: `[<expr>, "_and" | "_or", <expr>]`.
//! A node is a junction when its first or third element is itself an array.

use crate::error::FilterError;
use crate::filter::condition::{Condition, Filter, Leaf};
use crate::filter::operator::{resolve, Operator};
use serde_json::Value;

impl Filter {
    /// Parse a filter string. Empty (or whitespace-only) input is the empty filter.
    pub fn parse(input: &str) -> Result<Filter, FilterError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Filter::empty());
        }
        let value: Value = serde_json::from_str(input)
            .map_err(|e| FilterError::parse("$", format!("malformed JSON: {}", e)))?;
        parse_value(&value).map(Filter::new)
    }
}

impl std::str::FromStr for Filter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Filter::parse(s)
    }
}

/// Parse an already-decoded JSON value. The value must be an expression array.
pub fn parse_value(value: &Value) -> Result<Condition, FilterError> {
    parse_node(value, "$")
}

fn parse_node(value: &Value, path: &str) -> Result<Condition, FilterError> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(FilterError::parse(
                path,
                format!("expected an expression array, got {}", json_type(other)),
            ))
        }
    };
    if items.len() != 3 {
        return Err(FilterError::parse(
            path,
            format!("invalid expression length: {} (expected 3)", items.len()),
        ));
    }
    let token = items[1]
        .as_str()
        .ok_or_else(|| FilterError::parse(&child(path, 1), format!("operator must be a string, got {}", json_type(&items[1]))))?;
    let operator = resolve(token).map_err(|source| FilterError::UnsupportedOperator {
        path: child(path, 1),
        source,
    })?;

    if items[0].is_array() || items[2].is_array() {
        let Operator::Junction(junction) = operator else {
            return Err(FilterError::parse(
                &child(path, 1),
                format!("unsupported operator '{}' between sub-expressions (expected _and or _or)", token),
            ));
        };
        let left = parse_node(&items[0], &child(path, 0))?;
        let right = parse_node(&items[2], &child(path, 2))?;
        return Ok(Condition::join(junction, left, right));
    }

    let Operator::Leaf(leaf_op) = operator else {
        return Err(FilterError::parse(
            &child(path, 1),
            format!("'{}' requires nested expressions on both sides", token),
        ));
    };
    let column = items[0]
        .as_str()
        .ok_or_else(|| FilterError::parse(&child(path, 0), format!("column must be a string, got {}", json_type(&items[0]))))?;
    if column.is_empty() {
        return Err(FilterError::parse(&child(path, 0), "column must not be empty"));
    }
    let value = items[2]
        .as_str()
        .ok_or_else(|| FilterError::parse(&child(path, 2), format!("value must be a string, got {}", json_type(&items[2]))))?;
    Ok(Condition::Leaf(Leaf {
        column: column.to_string(),
        operator: leaf_op,
        value: value.to_string(),
    }))
}

fn child(path: &str, index: usize) -> String {
    format!("{}[{}]", path, index)
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
