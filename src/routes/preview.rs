use axum::{
    extract::Query,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::helpers::cookie::{self, PREVIEW_COOKIE};

#[derive(Debug, Deserialize)]
pub struct PreviewParams {
    token: String,
}

fn valid_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_graphic() && c != ';' && c != ',' && c != '"' && c != '\\')
}

fn redirect_home(set_cookie: String) -> Response {
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, String::from("/")),
            (header::SET_COOKIE, set_cookie),
        ],
    )
        .into_response()
}

/// Turns preview mode on, the token becomes the ref used for every query.
#[tracing::instrument(skip(params))]
pub async fn enter(Query(params): Query<PreviewParams>) -> Response {
    if !valid_token(&params.token) {
        warn!("Rejecting malformed preview token");
        return (StatusCode::BAD_REQUEST, "invalid preview token").into_response();
    }

    info!("Entering preview mode");
    redirect_home(cookie::set(PREVIEW_COOKIE, &params.token))
}

#[tracing::instrument]
pub async fn exit() -> Response {
    info!("Leaving preview mode");
    redirect_home(cookie::expire(PREVIEW_COOKIE))
}
