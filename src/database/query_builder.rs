use serde_json::Value;
use sqlx::{self, postgres::PgArguments, PgPool, Row};

use crate::database::manager::DatabaseError;
use crate::filter::types::SqlResult;
use crate::filter::Filter;

/// Runs a validated `Filter` against a table or view and returns rows as JSON objects
pub struct QueryBuilder {
    filter: Filter,
}

impl QueryBuilder {
    pub fn new(filter: Filter) -> Self {
        Self { filter }
    }

    /// Adjust the filter between queries, e.g. to page after counting
    pub fn filter_mut(&mut self) -> &mut Filter {
        &mut self.filter
    }

    pub async fn select_all(&self, pool: &PgPool) -> Result<Vec<Value>, DatabaseError> {
        let sql_result = self.filter.to_sql().map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        let query = format!("SELECT row_to_json(t) AS row FROM ({}) t", sql_result.query);

        let mut q = sqlx::query(&query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let rows = q.fetch_all(pool).await?;
        rows.iter()
            .map(|row| row.try_get::<Value, _>("row").map_err(DatabaseError::from))
            .collect()
    }

    pub async fn count(&self, pool: &PgPool) -> Result<i64, DatabaseError> {
        let SqlResult { query, params } = self
            .filter
            .to_count_sql()
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        let mut q = sqlx::query(&query);
        for p in params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(pool).await?;
        let count: i64 = row.try_get("count")?;
        tracing::debug!("Counted {} rows in {}", count, self.filter.table_name());
        Ok(count)
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        // FilterWhere rejects composite values before they reach binding
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}
