//! Compile a condition tree into predicate fragments.
//!
//! The compiler only decides structure; fragment construction belongs to a [`QueryBuilder`].
//! [`PredicateBuilder`] is the default builder and yields [`Predicate`] values that the SQL
//! layer renders with bound parameters.

use crate::error::FilterError;
use crate::filter::condition::{Condition, Filter, Leaf};
use crate::filter::operator::{Comparison, Junction, OperatorKind, RANGE_SEPARATOR};
use crate::model::Model;
use std::fmt;

/// Builds composable predicate fragments.
pub trait QueryBuilder {
    type Fragment;

    fn compare(&self, column: &str, op: Comparison, operand: &str) -> Self::Fragment;
    fn range(&self, column: &str, negated: bool, low: &str, high: &str) -> Self::Fragment;
    fn null_check(&self, column: &str, negated: bool) -> Self::Fragment;
    /// `left AND (right)`.
    fn and(&self, left: Self::Fragment, right: Self::Fragment) -> Self::Fragment;
    /// `left OR (right)`.
    fn or(&self, left: Self::Fragment, right: Self::Fragment) -> Self::Fragment;
}

/// Compile a tree. Any error voids the whole result.
pub fn compile<B: QueryBuilder>(condition: &Condition, builder: &B) -> Result<B::Fragment, FilterError> {
    match condition {
        Condition::Leaf(leaf) => compile_leaf(leaf, builder),
        Condition::Junction { operator, left, right } => {
            let left = compile(left, builder)?;
            let right = compile(right, builder)?;
            Ok(match operator {
                Junction::And => builder.and(left, right),
                Junction::Or => builder.or(left, right),
            })
        }
    }
}

fn compile_leaf<B: QueryBuilder>(leaf: &Leaf, builder: &B) -> Result<B::Fragment, FilterError> {
    let column = leaf.column.as_str();
    Ok(match leaf.operator.kind() {
        OperatorKind::Comparison(op) | OperatorKind::Pattern(op) => builder.compare(column, op, &leaf.value),
        OperatorKind::Range { negated } => {
            let (low, high) = split_range(leaf)?;
            builder.range(column, negated, low, high)
        }
        OperatorKind::Nullability { negated } => builder.null_check(column, negated),
    })
}

fn split_range(leaf: &Leaf) -> Result<(&str, &str), FilterError> {
    let bounds: Vec<&str> = leaf.value.split(RANGE_SEPARATOR).collect();
    match bounds.as_slice() {
        [low, high] => Ok((*low, *high)),
        _ => Err(FilterError::InvalidValue {
            column: leaf.column.clone(),
            operator: leaf.operator.token(),
            value: leaf.value.clone(),
        }),
    }
}

/// Compile a filter for a model: the user predicate (if any) AND the soft-delete exclusion (if the
/// model has a soft-delete field). `None` means no predicate at all.
pub fn compile_scoped<B: QueryBuilder>(
    filter: &Filter,
    model: &Model,
    builder: &B,
) -> Result<Option<B::Fragment>, FilterError> {
    let user = filter.root().map(|root| compile(root, builder)).transpose()?;
    Ok(match (user, soft_delete_scope(model, builder)) {
        (Some(user), Some(scope)) => Some(builder.and(user, scope)),
        (user, scope) => user.or(scope),
    })
}

/// `deleted_column IS NULL` for models with a soft-delete field.
pub fn soft_delete_scope<B: QueryBuilder>(model: &Model, builder: &B) -> Option<B::Fragment> {
    model
        .meta
        .soft_deleted
        .as_ref()
        .map(|field| builder.null_check(&field.column, false))
}

/// Predicate value tree. Columns are as written by the caller; the SQL layer maps and quotes them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Predicate {
    Compare {
        column: String,
        op: Comparison,
        operand: String,
    },
    Range {
        column: String,
        negated: bool,
        low: String,
        high: String,
    },
    NullCheck {
        column: String,
        negated: bool,
    },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare { column, op, operand } => write!(f, "{} {} {}", column, op.sql(), operand),
            Predicate::Range { column, negated, low, high } => {
                let op = if *negated { "NOT BETWEEN" } else { "BETWEEN" };
                write!(f, "{} {} {} AND {}", column, op, low, high)
            }
            Predicate::NullCheck { column, negated: false } => write!(f, "{} IS NULL", column),
            Predicate::NullCheck { column, negated: true } => write!(f, "{} IS NOT NULL", column),
            Predicate::And(l, r) => write!(f, "({}) AND ({})", l, r),
            Predicate::Or(l, r) => write!(f, "({}) OR ({})", l, r),
        }
    }
}

/// Builder producing [`Predicate`] values.
#[derive(Clone, Copy, Debug, Default)]
pub struct PredicateBuilder;

impl QueryBuilder for PredicateBuilder {
    type Fragment = Predicate;

    fn compare(&self, column: &str, op: Comparison, operand: &str) -> Predicate {
        Predicate::Compare {
            column: column.to_string(),
            op,
            operand: operand.to_string(),
        }
    }

    fn range(&self, column: &str, negated: bool, low: &str, high: &str) -> Predicate {
        Predicate::Range {
            column: column.to_string(),
            negated,
            low: low.to_string(),
            high: high.to_string(),
        }
    }

    fn null_check(&self, column: &str, negated: bool) -> Predicate {
        Predicate::NullCheck {
            column: column.to_string(),
            negated,
        }
    }

    fn and(&self, left: Predicate, right: Predicate) -> Predicate {
        Predicate::And(Box::new(left), Box::new(right))
    }

    fn or(&self, left: Predicate, right: Predicate) -> Predicate {
        Predicate::Or(Box::new(left), Box::new(right))
    }
}
