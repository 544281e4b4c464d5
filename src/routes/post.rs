use askama::Template;
use axum::{
    extract::{Extension, Path},
    http::HeaderMap,
};

use crate::fetcher::base::{Post, Section};
use crate::fetcher::prismic::PrismicClient;
use crate::helpers::cookie::{self, PREVIEW_COOKIE};
use crate::helpers::date::format_date;
use crate::routes::{AppError, HtmlTemplate};

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: String,
    pub reading_time: usize,
    pub banner: Option<String>,
    pub content: Vec<Section>,
    pub preview: bool,
}

impl PostTemplate {
    pub fn new(post: Post, preview: bool) -> Self {
        PostTemplate {
            date: format_date(post.first_publication_date.as_deref()),
            reading_time: post.reading_time(),
            title: post.title,
            subtitle: post.subtitle,
            author: post.author,
            banner: post.banner,
            content: post.content,
            preview,
        }
    }
}

#[tracing::instrument(skip(client, headers))]
pub async fn post(
    Path(uid): Path<String>,
    Extension(client): Extension<PrismicClient>,
    headers: HeaderMap,
) -> Result<HtmlTemplate<PostTemplate>, AppError> {
    let preview_ref = cookie::read(&headers, PREVIEW_COOKIE);

    match client.post_by_uid(&uid, preview_ref.as_deref()).await? {
        Some(post) => Ok(HtmlTemplate(PostTemplate::new(post, preview_ref.is_some()))),
        None => Err(AppError::NotFound(uid)),
    }
}
