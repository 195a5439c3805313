//! Filter language: operator table, condition tree, parser, compiler.

pub mod compiler;
pub mod condition;
pub mod operator;
pub mod parser;

pub use compiler::{compile, compile_scoped, soft_delete_scope, Predicate, PredicateBuilder, QueryBuilder};
pub use condition::{Condition, Filter, Leaf};
pub use operator::{resolve, Comparison, Junction, LeafOperator, Operator, OperatorKind, RANGE_SEPARATOR};
pub use parser::parse_value;
