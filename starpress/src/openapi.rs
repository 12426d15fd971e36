//! OpenAPI documentation assembled with utoipa.

use utoipa::OpenApi;

use crate::api;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "starpress",
        description = "Publishing gateway for the Star content service"
    ),
    paths(api::handlers::posts::create_post),
    components(schemas(api::models::posts::CreatePostRequest)),
    tags(
        (name = "posts", description = "Write proxy to the content service")
    )
)]
pub struct ApiDoc;
