//! Route definitions for the `/projects` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{content, edits, generation, media, project, publish};
use crate::state::AppState;

/// Body ceiling for media uploads: the 5 MiB file plus multipart framing.
const MEDIA_BODY_LIMIT: usize = 6 * 1024 * 1024;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                        -> list
/// GET    /{id}                    -> get_by_id
/// DELETE /{id}                    -> delete
/// GET    /{id}/history            -> history
///
/// PUT    /{id}/content            -> put_content (surgical update)
/// POST   /{id}/generate           -> generate (once per project)
/// POST   /{id}/edits              -> edit (paid)
/// POST   /{id}/undo               -> undo
///
/// POST   /{id}/publish            -> publish
/// POST   /{id}/unpublish          -> unpublish
/// POST   /{id}/republish          -> republish
/// POST   /{id}/domain             -> set_domain
/// POST   /{id}/domain/verified    -> domain_verified
///
/// POST   /{id}/media              -> upload
/// GET    /{id}/media              -> list
/// DELETE /{id}/media/{asset_id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    // Uploads get a higher body limit than the JSON routes.
    let media_routes = Router::new()
        .route("/{id}/media", post(media::upload).get(media::list))
        .route("/{id}/media/{asset_id}", delete(media::delete))
        .layer(DefaultBodyLimit::max(MEDIA_BODY_LIMIT));

    Router::new()
        .route("/", get(project::list))
        .route("/{id}", get(project::get_by_id).delete(project::delete))
        .route("/{id}/history", get(project::history))
        .route("/{id}/content", put(content::put_content))
        .route("/{id}/generate", post(generation::generate))
        .route("/{id}/edits", post(edits::edit))
        .route("/{id}/undo", post(edits::undo))
        .route("/{id}/publish", post(publish::publish))
        .route("/{id}/unpublish", post(publish::unpublish))
        .route("/{id}/republish", post(publish::republish))
        .route("/{id}/domain", post(publish::set_domain))
        .route("/{id}/domain/verified", post(publish::domain_verified))
        .merge(media_routes)
}
