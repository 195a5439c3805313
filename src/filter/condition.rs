//! Condition tree produced by the parser.

use crate::filter::operator::{Junction, LeafOperator};

/// `[column, operator, value]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Leaf {
    pub column: String,
    pub operator: LeafOperator,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    Leaf(Leaf),
    Junction {
        operator: Junction,
        left: Box<Condition>,
        right: Box<Condition>,
    },
}

impl Condition {
    pub fn leaf(column: impl Into<String>, operator: LeafOperator, value: impl Into<String>) -> Self {
        Condition::Leaf(Leaf {
            column: column.into(),
            operator,
            value: value.into(),
        })
    }

    pub fn and(left: Condition, right: Condition) -> Self {
        Condition::join(Junction::And, left, right)
    }

    pub fn or(left: Condition, right: Condition) -> Self {
        Condition::join(Junction::Or, left, right)
    }

    pub fn join(operator: Junction, left: Condition, right: Condition) -> Self {
        Condition::Junction {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Leaves in left-to-right order.
    pub fn leaves(&self) -> Vec<&Leaf> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Condition::Leaf(leaf) => out.push(leaf),
                Condition::Junction { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        out
    }

    pub fn depth(&self) -> usize {
        match self {
            Condition::Leaf(_) => 1,
            Condition::Junction { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// A parsed filter. An empty filter string yields no root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filter {
    root: Option<Condition>,
}

impl Filter {
    pub fn empty() -> Self {
        Filter { root: None }
    }

    pub fn new(root: Condition) -> Self {
        Filter { root: Some(root) }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<&Condition> {
        self.root.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaves_in_order() {
        let tree = Condition::or(
            Condition::and(
                Condition::leaf("a", LeafOperator::Eq, "1"),
                Condition::leaf("b", LeafOperator::Eq, "2"),
            ),
            Condition::leaf("c", LeafOperator::IsNull, ""),
        );
        let cols: Vec<_> = tree.leaves().iter().map(|l| l.column.as_str()).collect();
        assert_eq!(cols, ["a", "b", "c"]);
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn test_empty_filter() {
        assert!(Filter::empty().is_empty());
        assert!(Filter::default().root().is_none());
        assert!(!Filter::new(Condition::leaf("a", LeafOperator::Eq, "1")).is_empty());
    }
}
