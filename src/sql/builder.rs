//! Builds parameterized SELECT, COUNT, INSERT, UPDATE, DELETE for a registered model.

use crate::error::{AppError, FilterError};
use crate::filter::{soft_delete_scope, Comparison, Predicate, PredicateBuilder, QueryBuilder};
use crate::model::{Model, ModelColumn};
use crate::sql::order::OrderBy;
use crate::sql::params::PgBindValue;
use serde_json::{Map, Value};

/// Quote identifier for PostgreSQL (safe: only from registered models).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn table_ref(model: &Model) -> String {
    match &model.schema {
        Some(schema) => format!("{}.{}", quoted(schema), quoted(&model.table)),
        None => quoted(&model.table),
    }
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf::default()
    }

    fn push_param(&mut self, v: PgBindValue) -> u32 {
        self.params.push(v);
        self.params.len() as u32
    }

    /// `$n`, cast to the column's declared type when it has one.
    fn push_for(&mut self, column: &ModelColumn, v: PgBindValue) -> String {
        let n = self.push_param(v);
        match &column.pg_type {
            Some(t) => format!("${}::{}", n, t),
            None => format!("${}", n),
        }
    }
}

/// SELECT list: numeric columns as text so decoding does not lose precision.
fn select_column_list(model: &Model) -> String {
    model
        .columns
        .iter()
        .map(|c| {
            let q = quoted(&c.column);
            let numeric = c
                .pg_type
                .as_deref()
                .is_some_and(|t| t == "numeric" || t.starts_with("numeric(") || t.starts_with("decimal"));
            if numeric {
                format!("{}::text AS {}", q, q)
            } else {
                q
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn resolve_column<'a>(model: &'a Model, name: &str) -> Result<&'a ModelColumn, AppError> {
    model
        .column(name)
        .ok_or_else(|| AppError::BadRequest(format!("unknown column '{}' for {}", name, model.name)))
}

/// Filter columns are only checked against the model here, so a miss is a compile failure.
fn predicate_column<'a>(model: &'a Model, name: &str) -> Result<&'a ModelColumn, AppError> {
    model.column(name).ok_or_else(|| {
        AppError::Filter(FilterError::Compile(format!(
            "unknown column '{}' for {}",
            name, model.name
        )))
    })
}

/// Render a predicate as a SQL boolean expression, binding operands into `q`.
pub fn render_predicate(q: &mut QueryBuf, model: &Model, predicate: &Predicate) -> Result<String, AppError> {
    Ok(match predicate {
        Predicate::Compare { column, op, operand } => {
            let col = predicate_column(model, column)?;
            match op {
                Comparison::Like | Comparison::NotLike => {
                    let n = q.push_param(PgBindValue::text(operand.as_str()));
                    format!("{}::text {} ${}", quoted(&col.column), op.sql(), n)
                }
                _ => {
                    let ph = q.push_for(col, PgBindValue::text(operand.as_str()));
                    format!("{} {} {}", quoted(&col.column), op.sql(), ph)
                }
            }
        }
        Predicate::Range { column, negated, low, high } => {
            let col = predicate_column(model, column)?;
            let low = q.push_for(col, PgBindValue::text(low.as_str()));
            let high = q.push_for(col, PgBindValue::text(high.as_str()));
            let op = if *negated { "NOT BETWEEN" } else { "BETWEEN" };
            format!("{} {} {} AND {}", quoted(&col.column), op, low, high)
        }
        Predicate::NullCheck { column, negated } => {
            let col = predicate_column(model, column)?;
            let op = if *negated { "IS NOT NULL" } else { "IS NULL" };
            format!("{} {}", quoted(&col.column), op)
        }
        Predicate::And(l, r) => {
            let l = render_predicate(q, model, l)?;
            let r = render_predicate(q, model, r)?;
            format!("({}) AND ({})", l, r)
        }
        Predicate::Or(l, r) => {
            let l = render_predicate(q, model, l)?;
            let r = render_predicate(q, model, r)?;
            format!("({}) OR ({})", l, r)
        }
    })
}

fn where_clause(q: &mut QueryBuf, model: &Model, predicate: Option<&Predicate>) -> Result<String, AppError> {
    match predicate {
        Some(p) => Ok(format!(" WHERE {}", render_predicate(q, model, p)?)),
        None => Ok(String::new()),
    }
}

/// Primary key match, plus the soft-delete exclusion when the model has one.
fn by_id_predicate(model: &Model, id: &str) -> Predicate {
    let builder = PredicateBuilder;
    let pk = builder.compare(&model.primary_key().column, Comparison::Eq, id);
    match soft_delete_scope(model, &builder) {
        Some(scope) => builder.and(pk, scope),
        None => pk,
    }
}

fn order_clause(model: &Model, order: &OrderBy) -> Result<String, AppError> {
    if order.is_empty() {
        return Ok(format!(" ORDER BY {}", quoted(&model.primary_key().column)));
    }
    let terms = order
        .terms
        .iter()
        .map(|t| {
            let col = resolve_column(model, &t.column)?;
            let dir = if t.descending { "DESC" } else { "ASC" };
            Ok(format!("{} {}", quoted(&col.column), dir))
        })
        .collect::<Result<Vec<_>, AppError>>()?;
    Ok(format!(" ORDER BY {}", terms.join(", ")))
}

/// SELECT page of rows matching `predicate` (already scoped by the caller).
pub fn select_list(
    model: &Model,
    predicate: Option<&Predicate>,
    order: &OrderBy,
    limit: u32,
    offset: u64,
) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let where_clause = where_clause(&mut q, model, predicate)?;
    let order_clause = order_clause(model, order)?;
    q.sql = format!(
        "SELECT {} FROM {}{}{} LIMIT {} OFFSET {}",
        select_column_list(model),
        table_ref(model),
        where_clause,
        order_clause,
        limit,
        offset
    );
    Ok(q)
}

/// SELECT COUNT(*) with the same predicate as [`select_list`].
pub fn count(model: &Model, predicate: Option<&Predicate>) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let where_clause = where_clause(&mut q, model, predicate)?;
    q.sql = format!("SELECT COUNT(*) FROM {}{}", table_ref(model), where_clause);
    Ok(q)
}

/// SELECT one live row by primary key.
pub fn select_by_id(model: &Model, id: &str) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let where_clause = where_clause(&mut q, model, Some(&by_id_predicate(model, id)))?;
    q.sql = format!("SELECT {} FROM {}{}", select_column_list(model), table_ref(model), where_clause);
    Ok(q)
}

/// Map body keys (column or member names) to columns, dropping server-managed columns.
fn body_columns<'a>(model: &'a Model, body: &'a Map<String, Value>) -> Result<Vec<(&'a ModelColumn, &'a Value)>, AppError> {
    let mut out: Vec<(&ModelColumn, &Value)> = Vec::with_capacity(body.len());
    for (key, value) in body {
        let col = resolve_column(model, key)?;
        if model.is_managed(&col.column) {
            continue;
        }
        if out.iter().any(|(c, _)| c.column == col.column) {
            return Err(AppError::BadRequest(format!("column '{}' given more than once", col.column)));
        }
        out.push((col, value));
    }
    Ok(out)
}

/// INSERT from body. Created/updated timestamp fields are stamped with NOW().
pub fn insert(model: &Model, body: &Map<String, Value>) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut values = Vec::new();
    for (col, value) in body_columns(model, body)? {
        values.push(q.push_for(col, PgBindValue::from_json(value)));
        cols.push(quoted(&col.column));
    }
    for field in [&model.meta.created_at, &model.meta.updated_at].into_iter().flatten() {
        let col = quoted(&field.column);
        if !cols.contains(&col) {
            cols.push(col);
            values.push("NOW()".to_string());
        }
    }
    let returning = select_column_list(model);
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", table_ref(model), returning)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            table_ref(model),
            cols.join(", "),
            values.join(", "),
            returning
        )
    };
    Ok(q)
}

/// UPDATE a live row by primary key: SET only body columns (never the key), stamp updated-at.
pub fn update(model: &Model, id: &str, body: &Map<String, Value>) -> Result<QueryBuf, AppError> {
    let pk = &model.primary_key().column;
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for (col, value) in body_columns(model, body)? {
        if col.column == *pk {
            continue;
        }
        let ph = q.push_for(col, PgBindValue::from_json(value));
        sets.push(format!("{} = {}", quoted(&col.column), ph));
    }
    if let Some(field) = &model.meta.updated_at {
        sets.push(format!("{} = NOW()", quoted(&field.column)));
    }
    if sets.is_empty() {
        return select_by_id(model, id);
    }
    let where_clause = where_clause(&mut q, model, Some(&by_id_predicate(model, id)))?;
    q.sql = format!(
        "UPDATE {} SET {}{} RETURNING {}",
        table_ref(model),
        sets.join(", "),
        where_clause,
        select_column_list(model)
    );
    Ok(q)
}

/// DELETE by primary key. Soft-delete models get their marker stamped instead.
pub fn delete(model: &Model, id: &str) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let where_clause = where_clause(&mut q, model, Some(&by_id_predicate(model, id)))?;
    let pk = quoted(&model.primary_key().column);
    q.sql = match &model.meta.soft_deleted {
        Some(field) => format!(
            "UPDATE {} SET {} = NOW(){} RETURNING {}",
            table_ref(model),
            quoted(&field.column),
            where_clause,
            pk
        ),
        None => format!("DELETE FROM {}{} RETURNING {}", table_ref(model), where_clause, pk),
    };
    Ok(q)
}
