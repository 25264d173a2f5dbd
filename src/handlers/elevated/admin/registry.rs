// handlers/elevated/admin/registry.rs - Per-model admin list configuration
//
// Each model lists rows from its `admin_*` view. Query parameters are
// translated into a JSON filter document for the `filter` module.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};

use crate::blog::forms::parse_bool;
use crate::error::ApiError;
use crate::filter::FilterData;

/// Rows per admin page
pub const ADMIN_PER_PAGE: i64 = 100;

/// Page size actually served: a lower `admin_max_limit` would otherwise cap
/// each page while offsets still advance by `ADMIN_PER_PAGE`
pub fn admin_page_size(max_limit: i64) -> i64 {
    ADMIN_PER_PAGE.min(max_limit).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminModel {
    Categories,
    Locations,
    Posts,
    Comments,
}

/// Filter document plus the raw `page` parameter, ready for `Filter::assign`
#[derive(Debug, Clone)]
pub struct AdminListQuery {
    pub filter: FilterData,
    pub page: Option<String>,
}

impl AdminModel {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "categories" => Some(AdminModel::Categories),
            "locations" => Some(AdminModel::Locations),
            "posts" => Some(AdminModel::Posts),
            "comments" => Some(AdminModel::Comments),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AdminModel::Categories => "categories",
            AdminModel::Locations => "locations",
            AdminModel::Posts => "posts",
            AdminModel::Comments => "comments",
        }
    }

    pub fn view(&self) -> &'static str {
        match self {
            AdminModel::Categories => "admin_categories",
            AdminModel::Locations => "admin_locations",
            AdminModel::Posts => "admin_posts",
            AdminModel::Comments => "admin_comments",
        }
    }

    pub fn list_display(&self) -> &'static [&'static str] {
        match self {
            AdminModel::Categories => &["title", "slug", "is_published", "created_at"],
            AdminModel::Locations => &["name", "is_published", "created_at"],
            AdminModel::Posts => &["title", "author", "pub_date", "is_published", "created_at"],
            AdminModel::Comments => &["text", "post", "author", "created_at"],
        }
    }

    pub fn search_fields(&self) -> &'static [&'static str] {
        match self {
            AdminModel::Categories => &["title", "slug"],
            AdminModel::Locations => &["name"],
            AdminModel::Posts => &["title", "text"],
            AdminModel::Comments => &["text"],
        }
    }

    pub fn list_filter(&self) -> &'static [&'static str] {
        match self {
            AdminModel::Categories | AdminModel::Locations | AdminModel::Posts => &["is_published", "created_at"],
            AdminModel::Comments => &["created_at", "author"],
        }
    }

    pub fn date_hierarchy(&self) -> Option<&'static str> {
        match self {
            AdminModel::Posts => Some("pub_date"),
            _ => None,
        }
    }

    fn default_order(&self) -> &'static str {
        match self {
            AdminModel::Posts => "-pub_date",
            _ => "-created_at",
        }
    }

    fn accepts_param(&self, key: &str) -> bool {
        match key {
            "q" | "order" | "page" => true,
            "is_published" | "author" => self.list_filter().contains(&key),
            "created" => self.list_filter().contains(&"created_at"),
            "year" | "month" | "day" => self.date_hierarchy().is_some(),
            _ => false,
        }
    }

    /// Translate list query parameters into a filter document.
    /// Unknown parameters and order columns outside `list_display` are rejected.
    pub fn list_query(&self, params: &HashMap<String, String>, now: DateTime<Utc>) -> Result<AdminListQuery, ApiError> {
        let mut unknown: Vec<&str> = params
            .keys()
            .map(String::as_str)
            .filter(|key| !self.accepts_param(key))
            .collect();
        if !unknown.is_empty() {
            unknown.sort_unstable();
            return Err(ApiError::bad_request(format!(
                "Unknown filter for {}: {}",
                self.name(),
                unknown.join(", ")
            )));
        }

        let mut conditions = Vec::new();

        if let Some(q) = params.get("q") {
            conditions.extend(self.search_conditions(q));
        }
        if let Some(raw) = params.get("is_published") {
            let value = parse_bool(raw)
                .ok_or_else(|| ApiError::bad_request(format!("Invalid is_published value: {}", raw)))?;
            conditions.push(json!({ "is_published": { "$eq": value } }));
        }
        if let Some(author) = params.get("author") {
            conditions.push(json!({ "author": { "$eq": author } }));
        }
        if let Some(period) = params.get("created") {
            let (start, end) = created_range(period, now)?;
            conditions.push(range_condition("created_at", start, end));
        }
        if let Some(column) = self.date_hierarchy() {
            if let Some((start, end)) = date_hierarchy_range(params)? {
                conditions.push(range_condition(column, start, end));
            }
        }

        let order = self.order(params.get("order").map(String::as_str))?;

        let mut select = vec!["id".to_string()];
        select.extend(self.list_display().iter().map(|c| c.to_string()));

        let where_clause = match conditions.len() {
            0 => None,
            1 => conditions.pop(),
            _ => Some(json!({ "$and": conditions })),
        };

        Ok(AdminListQuery {
            filter: FilterData {
                select: Some(select),
                where_clause,
                order: Some(order),
                limit: None,
                offset: None,
            },
            page: params.get("page").cloned(),
        })
    }

    /// Every whitespace-separated term must match at least one search field
    fn search_conditions(&self, q: &str) -> Vec<Value> {
        q.split_whitespace()
            .map(|term| {
                let pattern = format!("%{}%", escape_like(term));
                let alternatives: Vec<Value> = self
                    .search_fields()
                    .iter()
                    .map(|field| json!({ *field: { "$ilike": pattern } }))
                    .collect();
                json!({ "$or": alternatives })
            })
            .collect()
    }

    fn order(&self, raw: Option<&str>) -> Result<Value, ApiError> {
        let raw = raw.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(self.default_order());
        let mut columns = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let column = part.strip_prefix('-').unwrap_or(part);
            if column != "id" && !self.list_display().contains(&column) {
                return Err(ApiError::bad_request(format!(
                    "Cannot order {} by '{}'",
                    self.name(),
                    column
                )));
            }
            columns.push(Value::String(part.to_string()));
        }
        // Stable paging across equal sort keys
        columns.push(Value::String("-id".to_string()));
        Ok(Value::Array(columns))
    }
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

fn range_condition(column: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Value {
    json!({
        column: {
            "$gte": start.to_rfc3339(),
            "$lt": end.to_rfc3339()
        }
    })
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

/// Ranges for the created_at list filter: today, past 7 days, this month, this year
fn created_range(period: &str, now: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
    let today = now.date_naive();
    let tomorrow = midnight(today) + Duration::days(1);

    let start = match period {
        "today" => midnight(today),
        "week" => midnight(today) - Duration::days(7),
        "month" => midnight(today.with_day(1).unwrap_or(today)),
        "year" => midnight(NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today)),
        other => {
            return Err(ApiError::bad_request(format!(
                "Invalid created filter '{}': expected today, week, month or year",
                other
            )))
        }
    };

    let end = match period {
        "month" => midnight(next_month(today.year(), today.month())),
        "year" => midnight(NaiveDate::from_ymd_opt(today.year() + 1, 1, 1).unwrap_or(today)),
        _ => tomorrow,
    };
    Ok((start, end))
}

fn next_month(year: i32, month: u32) -> NaiveDate {
    let (y, m) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(y, m, 1).unwrap_or(NaiveDate::MAX)
}

fn parse_component(params: &HashMap<String, String>, key: &str) -> Result<Option<u32>, ApiError> {
    params
        .get(key)
        .map(|raw| {
            raw.trim()
                .parse::<u32>()
                .map_err(|_| ApiError::bad_request(format!("Invalid {} value: {}", key, raw)))
        })
        .transpose()
}

/// year, year+month, or year+month+day drill-down
fn date_hierarchy_range(params: &HashMap<String, String>) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, ApiError> {
    let year = parse_component(params, "year")?;
    let month = parse_component(params, "month")?;
    let day = parse_component(params, "day")?;

    let invalid = || ApiError::bad_request("Invalid date drill-down");

    match (year, month, day) {
        (None, None, None) => Ok(None),
        (Some(y), None, None) => {
            let y = i32::try_from(y).map_err(|_| invalid())?;
            let start = NaiveDate::from_ymd_opt(y, 1, 1).ok_or_else(invalid)?;
            let end = NaiveDate::from_ymd_opt(y + 1, 1, 1).ok_or_else(invalid)?;
            Ok(Some((midnight(start), midnight(end))))
        }
        (Some(y), Some(m), None) => {
            let y = i32::try_from(y).map_err(|_| invalid())?;
            let start = NaiveDate::from_ymd_opt(y, m, 1).ok_or_else(invalid)?;
            Ok(Some((midnight(start), midnight(next_month(y, m)))))
        }
        (Some(y), Some(m), Some(d)) => {
            let y = i32::try_from(y).map_err(|_| invalid())?;
            let start = NaiveDate::from_ymd_opt(y, m, d).ok_or_else(invalid)?;
            Ok(Some((midnight(start), midnight(start) + Duration::days(1))))
        }
        _ => Err(ApiError::bad_request("month requires year, and day requires month")),
    }
}
