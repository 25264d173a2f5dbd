use serde_json::Value;

use super::error::FilterError;
use super::types::{is_valid_identifier, FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    pub fn validate_and_parse(order: &Value) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let infos = match order {
            Value::Null => vec![],
            Value::String(s) => Self::parse_order_string(s)?,
            Value::Array(arr) => {
                // Expect array of strings like ["created_at desc", "-pub_date"]
                let mut out = Vec::new();
                for v in arr {
                    match v {
                        Value::String(s) => out.extend(Self::parse_order_string(s)?),
                        other => return Err(FilterError::InvalidOrder(other.to_string())),
                    }
                }
                out
            }
            Value::Object(obj) => {
                // { "created_at": "desc", "title": "asc" }
                let mut out = Vec::new();
                for (k, v) in obj {
                    let sort = match v.as_str().unwrap_or("asc").to_ascii_lowercase().as_str() {
                        "desc" => SortDirection::Desc,
                        _ => SortDirection::Asc,
                    };
                    out.push(FilterOrderInfo { column: k.clone(), sort });
                }
                out
            }
            other => return Err(FilterError::InvalidOrder(other.to_string())),
        };

        for info in &infos {
            if !is_valid_identifier(&info.column) {
                return Err(FilterError::InvalidColumn(info.column.clone()));
            }
        }
        Ok(infos)
    }

    fn parse_order_string(s: &str) -> Result<Vec<FilterOrderInfo>, FilterError> {
        // split on commas, then each token into column and direction
        let mut out = Vec::new();
        for part in s.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut it = trimmed.split_whitespace();
            let Some(col) = it.next() else { continue };
            // "-created_at" is shorthand for descending
            let (col, mut sort) = match col.strip_prefix('-') {
                Some(rest) => (rest, SortDirection::Desc),
                None => (col, SortDirection::Asc),
            };
            match it.next() {
                Some(dir) if dir.eq_ignore_ascii_case("desc") => sort = SortDirection::Desc,
                Some(dir) if dir.eq_ignore_ascii_case("asc") => sort = SortDirection::Asc,
                Some(dir) => return Err(FilterError::InvalidOrder(format!("unknown direction '{}'", dir))),
                None => {}
            }
            out.push(FilterOrderInfo { column: col.to_string(), sort });
        }
        Ok(out)
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_all_order_forms() {
        let infos = FilterOrder::validate_and_parse(&json!("-created_at, title")).unwrap();
        assert_eq!(infos[0], FilterOrderInfo { column: "created_at".into(), sort: SortDirection::Desc });
        assert_eq!(infos[1], FilterOrderInfo { column: "title".into(), sort: SortDirection::Asc });

        let infos = FilterOrder::validate_and_parse(&json!(["pub_date desc"])).unwrap();
        assert_eq!(infos[0].sort, SortDirection::Desc);

        let infos = FilterOrder::validate_and_parse(&json!({ "name": "DESC" })).unwrap();
        assert_eq!(FilterOrder::generate(&infos), "ORDER BY \"name\" DESC");
    }

    #[test]
    fn rejects_injection_in_order() {
        assert!(FilterOrder::validate_and_parse(&json!("title; DROP TABLE users")).is_err());
        assert!(FilterOrder::validate_and_parse(&json!("title sideways")).is_err());
    }
}
