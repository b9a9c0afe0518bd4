/// HTTP handlers for the posts resource
///
/// `configure` registers the REST surface under whatever scope the caller
/// mounts it on (`/api/v1` in `main`):
///
/// - `GET    /posts`              chunked scan over every post
/// - `GET    /posts/create`       form schema for a new post
/// - `POST   /posts`              create
/// - `GET    /posts/reading-time` average minutes to read per author
/// - `GET    /posts/page`         paginated listing
/// - `GET    /posts/{id}`         show
/// - `GET    /posts/{id}/edit`    form schema prefilled with the post
/// - `PUT    /posts/{id}`         update (partial)
/// - `PATCH  /posts/{id}`         update (partial)
/// - `DELETE /posts/{id}`         delete
pub mod posts;

pub use posts::{create, destroy, edit, index, page, reading_time, show, store, update};

use crate::error::AppError;
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/posts")
            .service(
                web::resource("")
                    .route(web::get().to(index))
                    .route(web::post().to(store)),
            )
            // Literal segments first so they never reach the `{post_id}` matcher.
            .route("/create", web::get().to(create))
            .route("/reading-time", web::get().to(reading_time))
            .route("/page", web::get().to(page))
            .service(
                web::resource("/{post_id}")
                    .route(web::get().to(show))
                    .route(web::put().to(update))
                    .route(web::patch().to(update))
                    .route(web::delete().to(destroy)),
            )
            .route("/{post_id}/edit", web::get().to(edit)),
    );
}
