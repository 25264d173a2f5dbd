use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{is_valid_identifier, FilterData, FilterOrderInfo, SqlResult};

pub struct Filter {
    table_name: String,
    select_columns: Vec<String>,
    where_data: Option<Value>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        if !is_valid_identifier(&table_name) {
            return Err(FilterError::InvalidView(table_name));
        }
        Ok(Self {
            table_name,
            select_columns: vec![],
            where_data: None,
            order_data: vec![],
            limit: None,
            offset: None,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        if let Some(select) = data.select { self.select(select)?; }
        if let Some(where_clause) = data.where_clause { self.where_clause(where_clause)?; }
        if let Some(order) = data.order { self.order(order)?; }
        if let Some(limit) = data.limit { self.limit(limit, data.offset)?; }
        Ok(self)
    }

    pub fn select(&mut self, columns: Vec<String>) -> Result<&mut Self, FilterError> {
        for column in &columns {
            if column != "*" && !is_valid_identifier(column) {
                return Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", column)));
            }
        }
        self.select_columns = columns;
        Ok(self)
    }

    pub fn where_clause(&mut self, conditions: Value) -> Result<&mut Self, FilterError> {
        FilterWhere::validate(&conditions)?;
        self.where_data = Some(conditions);
        Ok(self)
    }

    pub fn order(&mut self, order_spec: Value) -> Result<&mut Self, FilterError> {
        self.order_data = FilterOrder::validate_and_parse(&order_spec)?;
        Ok(self)
    }

    pub fn order_columns(&self) -> impl Iterator<Item = &str> {
        self.order_data.iter().map(|info| info.column.as_str())
    }

    pub fn limit(&mut self, limit: i64, offset: Option<i64>) -> Result<&mut Self, FilterError> {
        if limit < 0 { return Err(FilterError::InvalidWindow("limit must be non-negative".to_string())); }
        if let Some(off) = offset { if off < 0 { return Err(FilterError::InvalidWindow("offset must be non-negative".to_string())); } }

        // Apply max limit from config
        let max_limit = crate::config::CONFIG.blog.admin_max_limit;
        let applied_limit = if limit > max_limit {
            tracing::warn!("Limit {} exceeds max {}, capping to max", limit, max_limit);
            max_limit
        } else {
            limit
        };

        self.limit = Some(applied_limit);
        self.offset = offset;
        Ok(self)
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let select_clause = self.build_select_clause();
        let (where_clause, params) = self.build_where()?;
        let order_clause = FilterOrder::generate(&self.order_data);
        let limit_clause = self.build_limit_clause();

        let query = [
            format!("SELECT {}", select_clause),
            format!("FROM \"{}\"", self.table_name),
            format!("WHERE {}", where_clause),
            order_clause,
            limit_clause,
        ].into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ");

        Ok(SqlResult { query, params })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = self.build_where()?;
        let query = format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.table_name, where_clause);
        Ok(SqlResult { query, params })
    }

    fn build_where(&self) -> Result<(String, Vec<Value>), FilterError> {
        match self.where_data {
            Some(ref where_data) => FilterWhere::generate(where_data, 0),
            None => Ok(("1=1".to_string(), vec![])),
        }
    }

    fn build_select_clause(&self) -> String {
        if self.select_columns.is_empty() || self.select_columns.iter().any(|c| c == "*") {
            "*".to_string()
        } else {
            self.select_columns.iter().map(|c| format!("\"{}\"", c)).collect::<Vec<_>>().join(", ")
        }
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_full_select() {
        let mut filter = Filter::new("admin_posts").unwrap();
        filter
            .assign(FilterData {
                select: Some(vec!["id".into(), "title".into()]),
                where_clause: Some(json!({ "is_published": false })),
                order: Some(json!("-pub_date")),
                limit: Some(10),
                offset: Some(20),
            })
            .unwrap();
        let sql = filter.to_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT \"id\", \"title\" FROM \"admin_posts\" WHERE \"is_published\" = $1 ORDER BY \"pub_date\" DESC LIMIT 10 OFFSET 20"
        );
        assert_eq!(sql.params, vec![json!(false)]);

        let count = filter.to_count_sql().unwrap();
        assert_eq!(count.query, "SELECT COUNT(*) AS count FROM \"admin_posts\" WHERE \"is_published\" = $1");
    }

    #[test]
    fn rejects_bad_names_and_limits() {
        assert!(Filter::new("posts; --").is_err());
        let mut filter = Filter::new("admin_comments").unwrap();
        assert!(filter.select(vec!["text\"".into()]).is_err());
        assert!(filter.limit(-1, None).is_err());
        assert!(filter.limit(5, Some(-3)).is_err());
    }
}
