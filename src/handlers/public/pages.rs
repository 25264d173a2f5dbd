// handlers/public/pages.rs - Static informational pages

use serde::Serialize;

use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct StaticPage {
    pub slug: &'static str,
    pub title: &'static str,
    pub content: &'static str,
}

const ABOUT: StaticPage = StaticPage {
    slug: "about",
    title: "About the project",
    content: "Blogicum is a social network for travel and everyday notes. \
              Register, write posts, attach photos and discuss them with other readers.",
};

const RULES: StaticPage = StaticPage {
    slug: "rules",
    title: "Our rules",
    content: "Be polite to other users. Do not publish other people's content as your own. \
              Posts that break the law or these rules are hidden by moderators.",
};

/// GET /pages/about
pub async fn about() -> ApiResult<StaticPage> {
    Ok(ApiResponse::success(ABOUT))
}

/// GET /pages/rules
pub async fn rules() -> ApiResult<StaticPage> {
    Ok(ApiResponse::success(RULES))
}
