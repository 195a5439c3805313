//! `order_by` query parameter: `name`, `age desc`, `name asc, created_at desc`.

use crate::error::AppError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderTerm {
    pub column: String,
    pub descending: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderBy {
    pub terms: Vec<OrderTerm>,
}

impl OrderBy {
    /// Parse a comma-separated ordering. Empty input means the default ordering.
    pub fn parse(input: &str) -> Result<OrderBy, AppError> {
        let mut terms = Vec::new();
        for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let mut words = part.split_whitespace();
            let column = words.next().unwrap_or_default().to_string();
            let descending = match words.next().map(|w| w.to_ascii_lowercase()) {
                None => false,
                Some(w) if w == "asc" => false,
                Some(w) if w == "desc" => true,
                Some(w) => return Err(AppError::BadRequest(format!("invalid sort direction '{}'", w))),
            };
            if words.next().is_some() {
                return Err(AppError::BadRequest(format!("invalid order_by term '{}'", part)));
            }
            terms.push(OrderTerm { column, descending });
        }
        Ok(OrderBy { terms })
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let order = OrderBy::parse("name, age DESC , id asc").unwrap();
        assert_eq!(
            order.terms,
            vec![
                OrderTerm { column: "name".into(), descending: false },
                OrderTerm { column: "age".into(), descending: true },
                OrderTerm { column: "id".into(), descending: false },
            ]
        );
        assert!(OrderBy::parse("").unwrap().is_empty());
        assert!(OrderBy::parse(" , ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert!(OrderBy::parse("age sideways").is_err());
        assert!(OrderBy::parse("age desc; drop table users").is_err());
    }
}
