//! Landing page.

use axum::response::Html;

use crate::render;

/// GET / - search form.
pub async fn page() -> Html<String> {
    Html(render::home_page())
}
