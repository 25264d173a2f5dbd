use chrono::DateTime;
use serde_json::Value;

use super::error::FilterError;
use super::types::{is_valid_identifier, FilterOp};

/// Compiles a JSON where document into a SQL predicate with positional parameters.
///
/// ```json
/// { "is_published": true, "created_at": { "$gte": "2024-01-01T00:00:00Z" },
///   "$or": [ { "title": { "$ilike": "%rust%" } }, { "slug": { "$ilike": "%rust%" } } ] }
/// ```
pub struct FilterWhere {
    param_offset: usize,
    param_values: Vec<Value>,
}

impl FilterWhere {
    pub fn new(param_offset: usize) -> Self {
        Self {
            param_offset,
            param_values: vec![],
        }
    }

    /// Returns the predicate ("1=1" when empty) and its parameters, numbered after `param_offset`
    pub fn generate(where_data: &Value, param_offset: usize) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self::new(param_offset);
        let sql = filter_where.build(where_data)?;
        Ok((sql, filter_where.param_values))
    }

    pub fn validate(where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Null | Value::Object(_) => Ok(()),
            _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        }
    }

    fn build(&mut self, where_data: &Value) -> Result<String, FilterError> {
        let conditions = match where_data {
            Value::Null => vec![],
            Value::Object(obj) => {
                let mut conditions = Vec::with_capacity(obj.len());
                for (key, value) in obj {
                    if key.starts_with('$') {
                        conditions.push(self.logical_condition(key, value)?);
                    } else {
                        conditions.extend(self.field_conditions(key, value)?);
                    }
                }
                conditions
            }
            _ => return Err(FilterError::InvalidWhereClause("Unsupported WHERE format".to_string())),
        };

        if conditions.is_empty() {
            Ok("1=1".to_string())
        } else {
            Ok(conditions.join(" AND "))
        }
    }

    fn logical_condition(&mut self, op: &str, value: &Value) -> Result<String, FilterError> {
        match op {
            "$and" | "$or" => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} requires array", op)))?;
                if arr.is_empty() {
                    // Empty conjunction is true, empty disjunction is false
                    return Ok(if op == "$and" { "1=1" } else { "1=0" }.to_string());
                }
                let mut parts = Vec::with_capacity(arr.len());
                for v in arr {
                    parts.push(format!("({})", self.build(v)?));
                }
                let joiner = if op == "$and" { " AND " } else { " OR " };
                Ok(format!("({})", parts.join(joiner)))
            }
            "$not" => Ok(format!("NOT ({})", self.build(value)?)),
            _ => Err(FilterError::UnsupportedOperator(op.to_string())),
        }
    }

    fn field_conditions(&mut self, field: &str, value: &Value) -> Result<Vec<String>, FilterError> {
        if !is_valid_identifier(field) {
            return Err(FilterError::InvalidColumn(field.to_string()));
        }

        match value {
            Value::Object(obj) => {
                let mut out = Vec::with_capacity(obj.len());
                for (op_key, op_val) in obj {
                    let operator = FilterOp::from_key(op_key)
                        .ok_or_else(|| FilterError::UnsupportedOperator(op_key.clone()))?;
                    out.push(self.condition(field, operator, op_val)?);
                }
                Ok(out)
            }
            // Implicit equality: { field: value }
            _ => Ok(vec![self.condition(field, FilterOp::Eq, value)?]),
        }
    }

    fn condition(&mut self, field: &str, operator: FilterOp, data: &Value) -> Result<String, FilterError> {
        let quoted_column = format!("\"{}\"", field);
        match operator {
            FilterOp::Eq if data.is_null() => Ok(format!("{} IS NULL", quoted_column)),
            FilterOp::Ne if data.is_null() => Ok(format!("{} IS NOT NULL", quoted_column)),
            FilterOp::In => {
                let values = data
                    .as_array()
                    .ok_or_else(|| FilterError::InvalidOperatorData("$in requires array".to_string()))?;
                if values.is_empty() {
                    return Ok("1=0".to_string());
                }
                let mut placeholders = Vec::with_capacity(values.len());
                for v in values {
                    placeholders.push(self.param(v)?);
                }
                Ok(format!("{} IN ({})", quoted_column, placeholders.join(", ")))
            }
            FilterOp::Like | FilterOp::ILike if !data.is_string() => Err(FilterError::InvalidOperatorData(
                format!("{} requires a string pattern", operator.sql_operator()),
            )),
            _ => Ok(format!("{} {} {}", quoted_column, operator.sql_operator(), self.param(data)?)),
        }
    }

    fn param(&mut self, value: &Value) -> Result<String, FilterError> {
        match value {
            Value::Array(_) | Value::Object(_) => {
                return Err(FilterError::InvalidOperatorData(format!("unsupported value: {}", value)))
            }
            _ => {}
        }
        self.param_values.push(value.clone());
        let placeholder = format!("${}", self.param_offset + self.param_values.len());

        // RFC 3339 strings compare against timestamp columns
        if let Value::String(s) = value {
            if DateTime::parse_from_rfc3339(s).is_ok() {
                return Ok(format!("{}::timestamptz", placeholder));
            }
        }
        Ok(placeholder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_where_is_true() {
        let (sql, params) = FilterWhere::generate(&json!({}), 0).unwrap();
        assert_eq!(sql, "1=1");
        assert!(params.is_empty());
    }

    #[test]
    fn implicit_equality_and_null() {
        let (sql, params) = FilterWhere::generate(&json!({ "is_published": true, "author": null }), 0).unwrap();
        assert!(sql.contains("\"is_published\" = $1"));
        assert!(sql.contains("\"author\" IS NULL"));
        assert_eq!(params, vec![json!(true)]);
    }

    #[test]
    fn nested_or_numbers_parameters_in_order() {
        let where_data = json!({
            "$or": [
                { "title": { "$ilike": "%rust%" } },
                { "slug": { "$ilike": "%rust%" } }
            ]
        });
        let (sql, params) = FilterWhere::generate(&where_data, 2).unwrap();
        assert_eq!(sql, "((\"title\" ILIKE $3) OR (\"slug\" ILIKE $4))");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn timestamps_are_cast() {
        let where_data = json!({ "created_at": { "$gte": "2024-05-01T00:00:00Z" } });
        let (sql, _) = FilterWhere::generate(&where_data, 0).unwrap();
        assert_eq!(sql, "\"created_at\" >= $1::timestamptz");
    }

    #[test]
    fn rejects_bad_columns_and_operators() {
        assert!(matches!(
            FilterWhere::generate(&json!({ "title; DROP TABLE posts": 1 }), 0),
            Err(FilterError::InvalidColumn(_))
        ));
        assert!(matches!(
            FilterWhere::generate(&json!({ "title": { "$regex": ".*" } }), 0),
            Err(FilterError::UnsupportedOperator(_))
        ));
        assert!(FilterWhere::validate(&json!("1=1")).is_err());
    }

    #[test]
    fn empty_in_matches_nothing() {
        let (sql, params) = FilterWhere::generate(&json!({ "id": { "$in": [] } }), 0).unwrap();
        assert_eq!(sql, "1=0");
        assert!(params.is_empty());
    }
}
