use serde_json::{Value, json};
use tracing::info;

use super::helpers::{err_response, json_response};
use crate::blog::{BlogIndex, BlogParams, Paginator};

/// Filtered, paginated listing as JSON. Pages past the end fall back to page one.
#[must_use]
pub fn blog_listing(index: &BlogIndex, params: &BlogParams) -> Value {
    let search = params.search_query();
    let hits = search.filter(index.posts());

    let mut paginator = Paginator::new(hits.len());
    if params.page != 1 && !paginator.go_to(params.page) {
        info!(requested = params.page, "Requested page out of range");
    }

    json!({
        "query": search.text(),
        "category": search.category().slug(),
        "page": paginator.current_page(),
        "total_pages": paginator.total_pages(),
        "total_items": paginator.total_items(),
        "info": paginator.info_text(),
        "links": paginator.links(),
        "posts": paginator.page_items(&hits),
    })
}

/// `GET /blog/posts`
#[must_use]
pub fn handle_blog_posts(index: Option<&BlogIndex>, params: &BlogParams) -> Value {
    match index {
        Some(index) => json_response(200, &blog_listing(index, params)),
        None => err_response(404, "Blog index not configured"),
    }
}
