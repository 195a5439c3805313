//! Schema lookup: member name (e.g. `CreatedAt`) to physical column name (e.g. `created_at`).

use std::collections::HashMap;

/// Maps a record's member names to column names. Failures abort model registration.
pub trait SchemaLookup {
    fn column_name(&self, member: &str) -> Result<String, String>;
}

/// snake_case naming with acronym handling: `ID` -> `id`, `UserID` -> `user_id`,
/// `HTTPStatus` -> `http_status`, `CreatedAt` -> `created_at`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NamingStrategy;

impl SchemaLookup for NamingStrategy {
    fn column_name(&self, member: &str) -> Result<String, String> {
        if member.is_empty() {
            return Err("empty member name".into());
        }
        if !member.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(format!("'{}' is not an identifier", member));
        }
        Ok(to_snake_case(member))
    }
}

/// Explicit member -> column table. Unknown members are errors.
#[derive(Clone, Debug, Default)]
pub struct StaticColumns {
    columns: HashMap<String, String>,
}

impl StaticColumns {
    pub fn new() -> Self {
        StaticColumns::default()
    }

    pub fn column(mut self, member: impl Into<String>, column: impl Into<String>) -> Self {
        self.columns.insert(member.into(), column.into());
        self
    }
}

impl<M: Into<String>, C: Into<String>> FromIterator<(M, C)> for StaticColumns {
    fn from_iter<I: IntoIterator<Item = (M, C)>>(iter: I) -> Self {
        StaticColumns {
            columns: iter.into_iter().map(|(m, c)| (m.into(), c.into())).collect(),
        }
    }
}

impl SchemaLookup for StaticColumns {
    fn column_name(&self, member: &str) -> Result<String, String> {
        self.columns
            .get(member)
            .cloned()
            .ok_or_else(|| format!("no column mapped for '{}'", member))
    }
}

/// Convert an identifier to snake_case. A run of capitals is one word; its last capital starts the
/// next word when followed by a lowercase letter.
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                None | Some('_') => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.map(|n| n.is_lowercase()).unwrap_or(false),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
