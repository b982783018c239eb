use utoipa::OpenApi;

use super::handlers::{health, login, logout};

#[derive(OpenApi)]
#[openapi(
    paths(health::health, login::login, logout::logout),
    components(schemas(health::Health, login::LoginForm)),
    tags(
        (name = "auth", description = "Form login and logout"),
        (name = "health", description = "Liveness")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    // Use Cargo.toml metadata instead of the utoipa defaults.
    doc.info.title = env!("CARGO_PKG_NAME").to_string();
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();
    doc.info.description = Some(env!("CARGO_PKG_DESCRIPTION").to_string());
    doc
}
