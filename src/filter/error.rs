use thiserror::Error;

/// Rejections raised while turning an admin list request into SQL.
/// All of them are caller mistakes and surface as 400s.
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Unknown list view: {0}")]
    InvalidView(String),

    #[error("Invalid column name: {0}")]
    InvalidColumn(String),

    #[error("Invalid filter: {0}")]
    InvalidWhereClause(String),

    #[error("Unsupported lookup: {0}")]
    UnsupportedOperator(String),

    #[error("Invalid lookup value: {0}")]
    InvalidOperatorData(String),

    #[error("Invalid ordering: {0}")]
    InvalidOrder(String),

    #[error("Invalid page window: {0}")]
    InvalidWindow(String),
}
