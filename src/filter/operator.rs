//! Operator table: filter tokens to semantic operator kinds. Closed set.

use crate::error::UnsupportedOperator;
use std::fmt;
use std::str::FromStr;

/// Separator between the lower and upper bound of a `bw` / `nbw` value.
pub const RANGE_SEPARATOR: &str = "::";

/// Operators allowed in a leaf `[column, op, value]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LeafOperator {
    Eq,
    Gt,
    Lt,
    Gte,
    Lte,
    Ne,
    Contain,
    NotContain,
    Between,
    NotBetween,
    IsNull,
    IsNotNull,
}

/// Operators joining two sub-expressions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Junction {
    And,
    Or,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Leaf(LeafOperator),
    Junction(Junction),
}

/// Single-operand comparison emitted for comparison and pattern kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Gt,
    Lt,
    Gte,
    Lte,
    Ne,
    Like,
    NotLike,
}

/// What a leaf operator means to the compiler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatorKind {
    Comparison(Comparison),
    Pattern(Comparison),
    Range { negated: bool },
    Nullability { negated: bool },
}

const TABLE: &[(&str, Operator)] = &[
    ("eq", Operator::Leaf(LeafOperator::Eq)),
    ("gt", Operator::Leaf(LeafOperator::Gt)),
    ("lt", Operator::Leaf(LeafOperator::Lt)),
    ("gte", Operator::Leaf(LeafOperator::Gte)),
    ("lte", Operator::Leaf(LeafOperator::Lte)),
    ("ne", Operator::Leaf(LeafOperator::Ne)),
    ("contain", Operator::Leaf(LeafOperator::Contain)),
    ("ncontain", Operator::Leaf(LeafOperator::NotContain)),
    ("bw", Operator::Leaf(LeafOperator::Between)),
    ("nbw", Operator::Leaf(LeafOperator::NotBetween)),
    ("_null", Operator::Leaf(LeafOperator::IsNull)),
    ("_nnull", Operator::Leaf(LeafOperator::IsNotNull)),
    ("_and", Operator::Junction(Junction::And)),
    ("_or", Operator::Junction(Junction::Or)),
];

/// Look up a filter token.
pub fn resolve(token: &str) -> Result<Operator, UnsupportedOperator> {
    TABLE
        .iter()
        .find(|(t, _)| *t == token)
        .map(|(_, op)| *op)
        .ok_or_else(|| UnsupportedOperator(token.to_string()))
}

impl Operator {
    pub fn token(&self) -> &'static str {
        match self {
            Operator::Leaf(op) => op.token(),
            Operator::Junction(j) => j.token(),
        }
    }
}

impl FromStr for Operator {
    type Err = UnsupportedOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        resolve(s)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl LeafOperator {
    pub fn token(&self) -> &'static str {
        match self {
            LeafOperator::Eq => "eq",
            LeafOperator::Gt => "gt",
            LeafOperator::Lt => "lt",
            LeafOperator::Gte => "gte",
            LeafOperator::Lte => "lte",
            LeafOperator::Ne => "ne",
            LeafOperator::Contain => "contain",
            LeafOperator::NotContain => "ncontain",
            LeafOperator::Between => "bw",
            LeafOperator::NotBetween => "nbw",
            LeafOperator::IsNull => "_null",
            LeafOperator::IsNotNull => "_nnull",
        }
    }

    pub fn kind(&self) -> OperatorKind {
        match self {
            LeafOperator::Eq => OperatorKind::Comparison(Comparison::Eq),
            LeafOperator::Gt => OperatorKind::Comparison(Comparison::Gt),
            LeafOperator::Lt => OperatorKind::Comparison(Comparison::Lt),
            LeafOperator::Gte => OperatorKind::Comparison(Comparison::Gte),
            LeafOperator::Lte => OperatorKind::Comparison(Comparison::Lte),
            LeafOperator::Ne => OperatorKind::Comparison(Comparison::Ne),
            LeafOperator::Contain => OperatorKind::Pattern(Comparison::Like),
            LeafOperator::NotContain => OperatorKind::Pattern(Comparison::NotLike),
            LeafOperator::Between => OperatorKind::Range { negated: false },
            LeafOperator::NotBetween => OperatorKind::Range { negated: true },
            LeafOperator::IsNull => OperatorKind::Nullability { negated: false },
            LeafOperator::IsNotNull => OperatorKind::Nullability { negated: true },
        }
    }

    /// SQL spelling of the operator.
    pub fn sql(&self) -> &'static str {
        match self.kind() {
            OperatorKind::Comparison(c) | OperatorKind::Pattern(c) => c.sql(),
            OperatorKind::Range { negated: false } => "BETWEEN",
            OperatorKind::Range { negated: true } => "NOT BETWEEN",
            OperatorKind::Nullability { negated: false } => "IS NULL",
            OperatorKind::Nullability { negated: true } => "IS NOT NULL",
        }
    }
}

impl Junction {
    pub fn token(&self) -> &'static str {
        match self {
            Junction::And => "_and",
            Junction::Or => "_or",
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Junction::And => "AND",
            Junction::Or => "OR",
        }
    }
}

impl Comparison {
    pub fn sql(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Gt => ">",
            Comparison::Lt => "<",
            Comparison::Gte => ">=",
            Comparison::Lte => "<=",
            Comparison::Ne => "!=",
            Comparison::Like => "LIKE",
            Comparison::NotLike => "NOT LIKE",
        }
    }
}
