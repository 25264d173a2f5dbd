// handlers/public/blog.rs - Post listings and detail pages

use axum::extract::{Path, Query, State};
use chrono::Utc;
use serde::Serialize;

use crate::app::AppState;
use crate::blog::{Page, PageQuery, Paginator};
use crate::config;
use crate::database::models::{Category, CommentView, PostView, UserProfile};
use crate::database::{categories, comments, posts, users, PostScope};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, OptionalUser};

#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Serialize)]
pub struct CategoryPage {
    pub category: Category,
    pub posts: Page<PostView>,
}

#[derive(Debug, Serialize)]
pub struct ProfilePage {
    pub profile: UserProfile,
    pub posts: Page<PostView>,
}

/// Count, resolve the requested page, then fetch just that slice
pub(crate) async fn paginate_posts(
    state: &AppState,
    scope: PostScope,
    query: &PageQuery,
) -> Result<Page<PostView>, ApiError> {
    let now = Utc::now();
    let total = posts::count(&state.pool, scope, now).await?;
    let paginator = Paginator::new(total, config::config().blog.posts_per_page);
    let number = paginator.get_page(query.page.as_deref());

    let rows = posts::list(&state.pool, scope, now, paginator.per_page, paginator.offset(number)).await?;
    Ok(paginator.page(number, rows).map(|row| row.into_view(&state.media)))
}

/// GET /?page=N - Publicly visible posts, newest first
pub async fn index(State(state): State<AppState>, Query(query): Query<PageQuery>) -> ApiResult<Page<PostView>> {
    let page = paginate_posts(&state, PostScope::Published, &query).await?;
    Ok(ApiResponse::success(page))
}

/// GET /posts/:id - One post with its comments, oldest comment first.
/// Hidden posts are reported as missing to everyone but their author.
pub async fn post_detail(
    State(state): State<AppState>,
    viewer: OptionalUser,
    Path(id): Path<i64>,
) -> ApiResult<PostDetail> {
    let post = posts::find(&state.pool, id)
        .await?
        .filter(|post| post.is_visible_to(viewer.id(), Utc::now()))
        .ok_or_else(|| ApiError::not_found(format!("Post {} not found", id)))?;

    let comments = comments::list_for_post(&state.pool, id)
        .await?
        .into_iter()
        .map(CommentView::from)
        .collect();

    Ok(ApiResponse::success(PostDetail {
        post: post.into_view(&state.media),
        comments,
    }))
}

/// GET /category/:slug?page=N
pub async fn category_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<CategoryPage> {
    let category = categories::find_published_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Category '{}' not found", slug)))?;

    let posts = paginate_posts(&state, PostScope::Category(category.id), &query).await?;
    Ok(ApiResponse::success(CategoryPage { category, posts }))
}

/// GET /profile/:username?page=N - The owner also sees drafts and scheduled posts
pub async fn profile(
    State(state): State<AppState>,
    viewer: OptionalUser,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<ProfilePage> {
    let user = users::find_by_username(&state.pool, &username)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User '{}' not found", username)))?;

    let scope = PostScope::Author {
        author_id: user.id,
        include_hidden: viewer.id() == Some(user.id),
    };
    let posts = paginate_posts(&state, scope, &query).await?;

    Ok(ApiResponse::success(ProfilePage {
        profile: UserProfile::from(&user),
        posts,
    }))
}
