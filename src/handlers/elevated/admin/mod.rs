// handlers/elevated/admin/mod.rs - Generic admin endpoints over `AdminModel`

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::app::AppState;
use crate::blog::forms::{CategoryForm, CommentForm, LocationForm, PostForm};
use crate::blog::{Page, Paginator};
use crate::config;
use crate::database::models::CommentView;
use crate::database::query_builder::QueryBuilder;
use crate::database::{categories, comments, locations, posts};
use crate::error::ApiError;
use crate::filter::Filter;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

pub mod registry;

pub use registry::{admin_page_size, AdminListQuery, AdminModel, ADMIN_PER_PAGE};

const SLUG_TAKEN: &str = "Category with this slug already exists.";

fn resolve_model(name: &str) -> Result<AdminModel, ApiError> {
    AdminModel::from_name(name).ok_or_else(|| ApiError::not_found(format!("No admin for '{}'", name)))
}

fn parse_body<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))
}

fn to_value<T: serde::Serialize>(data: T) -> Result<Value, ApiError> {
    serde_json::to_value(data).map_err(|e| {
        tracing::error!("Failed to serialize admin record: {}", e);
        ApiError::internal_server_error("Failed to serialize record")
    })
}

/// GET /api/admin/:model - Paginated change list
///
/// Query parameters: `q` (search), `is_published`, `created=today|week|month|year`,
/// `author` (comments), `year`/`month`/`day` (posts), `order` (e.g. `-created_at,title`), `page`.
///
/// Expected Output:
/// ```json
/// {
///   "success": true,
///   "data": {
///     "items": [ { "id": 3, "title": "Travel", "slug": "travel", "is_published": true, "created_at": "..." } ],
///     "number": 1, "num_pages": 1, "count": 1, "per_page": 100,
///     "has_next": false, "has_previous": false
///   }
/// }
/// ```
pub async fn list(
    State(state): State<AppState>,
    Path(model): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Page<Value>> {
    let model = resolve_model(&model)?;
    let AdminListQuery { filter: filter_data, page } = model.list_query(&params, Utc::now())?;

    let mut filter = Filter::new(model.view())?;
    filter.assign(filter_data)?;

    let mut query = QueryBuilder::new(filter);
    let total = query.count(&state.pool).await?;
    let paginator = Paginator::new(total, admin_page_size(config::config().blog.admin_max_limit));
    let number = paginator.get_page(page.as_deref());

    query.filter_mut().limit(paginator.per_page, Some(paginator.offset(number)))?;
    let rows = query.select_all(&state.pool).await?;

    Ok(ApiResponse::success(paginator.page(number, rows)))
}

/// POST /api/admin/:model - Create a category or a location
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(model): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let created = match resolve_model(&model)? {
        AdminModel::Categories => {
            let draft = parse_body::<CategoryForm>(body)?.into_draft()?;
            if categories::slug_taken(&state.pool, &draft.slug, None).await? {
                return Err(ApiError::field_error("slug", SLUG_TAKEN));
            }
            let category = categories::insert(&state.pool, &draft.as_new()).await?;
            tracing::info!("Staff '{}' created category '{}'", user.username, category.slug);
            to_value(category)?
        }
        AdminModel::Locations => {
            let (name, is_published) = parse_body::<LocationForm>(body)?.into_new()?;
            let location = locations::insert(&state.pool, &name, is_published).await?;
            tracing::info!("Staff '{}' created location {}", user.username, location.id);
            to_value(location)?
        }
        AdminModel::Posts | AdminModel::Comments => {
            return Err(ApiError::bad_request(format!(
                "{} are created through /api/posts",
                model
            )))
        }
    };

    Ok(ApiResponse::created(created))
}

/// PATCH /api/admin/:model/:id - Partial update of any record
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((model, id)): Path<(String, i64)>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let model = resolve_model(&model)?;
    let updated = match model {
        AdminModel::Categories => {
            let changes = parse_body::<CategoryForm>(body)?.into_changes()?;
            if let Some(slug) = &changes.slug {
                if categories::slug_taken(&state.pool, slug, Some(id)).await? {
                    return Err(ApiError::field_error("slug", SLUG_TAKEN));
                }
            }
            to_value(categories::update(&state.pool, id, &changes).await?)?
        }
        AdminModel::Locations => {
            let (name, is_published) = parse_body::<LocationForm>(body)?.into_changes()?;
            to_value(locations::update(&state.pool, id, name.as_deref(), is_published).await?)?
        }
        AdminModel::Posts => {
            let form = parse_body::<PostForm>(body)?;
            let changes = form.clone().into_changes()?;
            form.check_references(&state.pool).await?;
            if !posts::update(&state.pool, id, changes).await? {
                return Err(ApiError::not_found(format!("Post {} not found", id)));
            }
            let post = posts::find(&state.pool, id)
                .await?
                .ok_or_else(|| ApiError::not_found(format!("Post {} not found", id)))?;
            to_value(post.into_view(&state.media))?
        }
        AdminModel::Comments => {
            let text = parse_body::<CommentForm>(body)?.validate()?;
            to_value(CommentView::from(comments::update_text(&state.pool, id, &text).await?))?
        }
    };

    tracing::info!("Staff '{}' updated {} {}", user.username, model.name(), id);
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/admin/:model/:id - Moderation delete. Deleting a category or
/// location detaches its posts; deleting a post removes its comments and image.
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((model, id)): Path<(String, i64)>,
) -> ApiResult<()> {
    let model = resolve_model(&model)?;
    let deleted = match model {
        AdminModel::Categories => categories::delete(&state.pool, id).await?,
        AdminModel::Locations => locations::delete(&state.pool, id).await?,
        AdminModel::Comments => comments::delete(&state.pool, id).await?,
        AdminModel::Posts => match posts::delete(&state.pool, id).await? {
            Some(image) => {
                if let Some(path) = image {
                    state.media.remove(&path).await;
                }
                true
            }
            None => false,
        },
    };

    if !deleted {
        return Err(ApiError::not_found(format!("{} {} not found", model.name(), id)));
    }

    tracing::info!("Staff '{}' deleted {} {}", user.username, model.name(), id);
    Ok(ApiResponse::no_content())
}
