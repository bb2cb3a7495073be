//! Blog and article API endpoints. Both feeds share these handlers; the
//! routes bind each handler to its feed.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::{respond, respond_deleted, respond_found, ApiResult, DeleteOutcome};
use crate::listing::{list_view, ListParams, Page};
use crate::models::{CreatePostRequest, Post, PostFeed, UpdatePostRequest};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PopularParams {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Public read routes for one feed under `/api/{collection}`.
pub fn post_routes(router: Router<AppState>, feed: PostFeed) -> Router<AppState> {
    let base = format!("/api/{}", feed.collection());
    router
        .route(
            &base,
            get(move |state: State<AppState>, params: Query<ListParams>| {
                list_posts(state, feed, params)
            }),
        )
        .route(
            &format!("{}/popular", base),
            get(move |state: State<AppState>, params: Query<PopularParams>| {
                popular_posts(state, feed, params)
            }),
        )
        .route(
            &format!("{}/{{slug}}", base),
            get(move |state: State<AppState>, slug: Path<String>| {
                get_post_by_slug(state, feed, slug)
            }),
        )
}

/// Admin write routes for one feed under `/{collection}`, nested below `/api/admin`.
pub fn admin_post_routes(router: Router<AppState>, feed: PostFeed) -> Router<AppState> {
    let base = format!("/{}", feed.collection());
    router
        .route(
            &base,
            axum::routing::post(
                move |state: State<AppState>, request: Json<CreatePostRequest>| {
                    create_post(state, feed, request)
                },
            ),
        )
        .route(
            &format!("{}/{{id}}", base),
            axum::routing::put(
                move |state: State<AppState>, id: Path<String>, request: Json<UpdatePostRequest>| {
                    update_post(state, feed, id, request)
                },
            )
            .delete(move |state: State<AppState>, id: Path<String>| {
                delete_post(state, feed, id)
            }),
        )
}

/// GET /api/{blogs|articles}?category&sort&page - One page of posts.
pub async fn list_posts(
    State(state): State<AppState>,
    feed: PostFeed,
    Query(params): Query<ListParams>,
) -> ApiResult<Page<Post>> {
    let result = state
        .store
        .list_posts(feed)
        .await
        .map(|posts| list_view(posts, &params));
    respond(&state, result).await
}

/// GET /api/{blogs|articles}/popular - Posts flagged popular.
pub async fn popular_posts(
    State(state): State<AppState>,
    feed: PostFeed,
    Query(params): Query<PopularParams>,
) -> ApiResult<Vec<Post>> {
    let result = state.store.list_popular_posts(feed, params.limit).await;
    respond(&state, result).await
}

/// GET /api/{blogs|articles}/{slug} - A single post by slug.
pub async fn get_post_by_slug(
    State(state): State<AppState>,
    feed: PostFeed,
    Path(slug): Path<String>,
) -> ApiResult<Post> {
    let result = state.store.get_post_by_slug(feed, &slug).await;
    respond_found(&state, result, &format!("{} {}", feed.label(), slug)).await
}

/// POST /api/admin/{blogs|articles} - Create a post.
pub async fn create_post(
    State(state): State<AppState>,
    feed: PostFeed,
    Json(request): Json<CreatePostRequest>,
) -> ApiResult<Post> {
    let result = state.store.create_post(feed, &request).await;
    respond(&state, result).await
}

/// PUT /api/admin/{blogs|articles}/{id} - Update a post.
pub async fn update_post(
    State(state): State<AppState>,
    feed: PostFeed,
    Path(id): Path<String>,
    Json(request): Json<UpdatePostRequest>,
) -> ApiResult<Post> {
    let result = state.store.update_post(feed, &id, &request).await;
    respond(&state, result).await
}

/// DELETE /api/admin/{blogs|articles}/{id} - Delete a post.
pub async fn delete_post(
    State(state): State<AppState>,
    feed: PostFeed,
    Path(id): Path<String>,
) -> ApiResult<DeleteOutcome> {
    let result = state.store.delete_post(feed, &id).await;
    respond_deleted(&state, id, result).await
}
