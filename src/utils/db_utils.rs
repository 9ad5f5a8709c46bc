use chrono::NaiveDate;
use sqlx::MySql;
use sqlx::mysql::MySqlArguments;
use sqlx::query::{Query, QueryAs};

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    U64(u64),
    Date(NaiveDate),
    Null,
}

/// ===============================
/// Dynamic WHERE / SET builder
/// ===============================
/// Column names are always static strings chosen by the caller, only values
/// are bound.
#[derive(Debug, Default)]
pub struct SqlClause {
    parts: Vec<String>,
    values: Vec<SqlValue>,
}

impl SqlClause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &'static str, value: SqlValue) -> Self {
        self.parts.push(format!("{column} = ?"));
        self.values.push(value);
        self
    }

    /// `column IN (...)`; an empty list matches nothing.
    pub fn any_of(mut self, column: &'static str, ids: &[u64]) -> Self {
        if ids.is_empty() {
            self.parts.push("1 = 0".to_string());
            return self;
        }
        let marks = vec!["?"; ids.len()].join(", ");
        self.parts.push(format!("{column} IN ({marks})"));
        self.values.extend(ids.iter().map(|id| SqlValue::U64(*id)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// " WHERE a = ? AND b IN (?, ?)" or "" when there are no predicates
    pub fn where_sql(&self) -> String {
        if self.parts.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.parts.join(" AND "))
        }
    }

    /// "a = ?, b = ?"
    pub fn set_sql(&self) -> String {
        self.parts.join(", ")
    }

    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

pub fn build_update_sql(table: &str, set: SqlClause, filter: SqlClause) -> Option<SqlUpdate> {
    if set.is_empty() {
        return None;
    }

    let sql = format!("UPDATE {} SET {}{}", table, set.set_sql(), filter.where_sql());
    let mut values = set.into_values();
    values.extend(filter.into_values());

    Some(SqlUpdate { sql, values })
}

pub fn bind_query<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    values: &[SqlValue],
) -> Query<'q, MySql, MySqlArguments> {
    for value in values {
        query = match value {
            SqlValue::String(v) => query.bind(v.clone()),
            SqlValue::U64(v) => query.bind(*v),
            SqlValue::Date(v) => query.bind(*v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }
    query
}

pub fn bind_query_as<'q, O>(
    mut query: QueryAs<'q, MySql, O, MySqlArguments>,
    values: &[SqlValue],
) -> QueryAs<'q, MySql, O, MySqlArguments> {
    for value in values {
        query = match value {
            SqlValue::String(v) => query.bind(v.clone()),
            SqlValue::U64(v) => query.bind(*v),
            SqlValue::Date(v) => query.bind(*v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }
    query
}
