pub mod post;
pub mod preview;
pub mod root;

use std::time::Duration;

use askama::Template;
use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, get_service},
    Router,
};
use thiserror::Error;
use tower::{BoxError, ServiceBuilder};
use tower_http::{add_extension::AddExtensionLayer, services::ServeDir, trace::TraceLayer};
use tracing::error;

use crate::config::Config;
use crate::fetcher::prismic::PrismicClient;
use crate::fetcher::FetchError;

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    heading: String,
    message: String,
}

pub struct HtmlTemplate<T>(pub T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template. Error: {}", err),
            )
                .into_response(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("post {0} not found")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, heading) = match &self {
            AppError::Fetch(e) => {
                error!("Error loading content: {}", e);
                (StatusCode::BAD_GATEWAY, "Não foi possível carregar o conteúdo")
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Post não encontrado"),
        };

        let page = ErrorTemplate {
            heading: heading.to_string(),
            message: self.to_string(),
        };
        (status, HtmlTemplate(page)).into_response()
    }
}

async fn handle_middleware_error(error: BoxError) -> Result<StatusCode, (StatusCode, String)> {
    if error.is::<tower::timeout::error::Elapsed>() {
        Ok(StatusCode::REQUEST_TIMEOUT)
    } else {
        Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled internal error: {}", error),
        ))
    }
}

async fn handle_static_error(error: std::io::Error) -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Could not read static file: {}", error),
    )
}

pub fn app(config: Config, client: PrismicClient) -> Router {
    let timeout = Duration::from_secs(config.request_timeout_in_sec);
    let assets = get_service(ServeDir::new(&config.public_dir)).handle_error(handle_static_error);

    Router::new()
        .route("/", get(root::root))
        .route("/post/:uid", get(post::post))
        .route("/api/preview", get(preview::enter))
        .route("/api/exit-preview", get(preview::exit))
        .nest("/static", assets)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(timeout)
                .layer(TraceLayer::new_for_http())
                .layer(AddExtensionLayer::new(config))
                .layer(AddExtensionLayer::new(client))
                .into_inner(),
        )
}
