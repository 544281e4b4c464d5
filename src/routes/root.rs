use askama::Template;
use axum::{
    extract::{Extension, Query},
    http::HeaderMap,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{de, Deserialize, Deserializer};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info};

use crate::config::Config;
use crate::fetcher::base::PostSummary;
use crate::fetcher::prismic::PrismicClient;
use crate::fetcher::FetchError;
use crate::helpers::cookie::{self, PREVIEW_COOKIE};
use crate::helpers::date::format_date;
use crate::listing::Listing;
use crate::routes::{AppError, HtmlTemplate};

/// Characters kept as-is when a uid becomes a path segment.
const UID_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub struct PostCard {
    pub href: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: String,
}

impl From<&PostSummary> for PostCard {
    fn from(post: &PostSummary) -> Self {
        PostCard {
            href: format!("/post/{}", utf8_percent_encode(&post.uid, UID_SEGMENT)),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            date: format_date(post.first_publication_date.as_deref()),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub posts: Vec<PostCard>,
    pub load_more_href: Option<String>,
    pub preview: bool,
}

impl IndexTemplate {
    pub fn new(listing: &Listing, max_pages: usize, preview: bool) -> Self {
        let load_more_href = if listing.has_more() && listing.pages() < max_pages {
            Some(format!("/?pages={}", listing.pages() + 1))
        } else {
            None
        };

        IndexTemplate {
            posts: listing.posts().iter().map(PostCard::from).collect(),
            load_more_href,
            preview,
        }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListingParams {
    /// How many pages of the listing to show, `1` when absent or empty.
    #[serde(default, deserialize_with = "empty_as_none")]
    pages: Option<usize>,
}

#[tracing::instrument(skip(config, client, headers))]
pub async fn root(
    Extension(config): Extension<Config>,
    Extension(client): Extension<PrismicClient>,
    Query(params): Query<ListingParams>,
    headers: HeaderMap,
) -> Result<HtmlTemplate<IndexTemplate>, AppError> {
    let deadline = Instant::now() + config.content_api_budget();
    let preview_ref = cookie::read(&headers, PREVIEW_COOKIE);
    let max_pages = config.max_pages.max(1);
    let pages = params.pages.unwrap_or(1).clamp(1, max_pages);

    let first = timeout_at(deadline, client.query_posts(preview_ref.as_deref()))
        .await
        .map_err(|_| FetchError::OutOfTime)??;
    let mut listing = Listing::new(first);
    listing.load_pages(&client, pages, deadline).await;
    info!("Rendering {} posts", listing.posts().len());
    debug!("Next page: {:?}", listing.next_page());

    Ok(HtmlTemplate(IndexTemplate::new(
        &listing,
        max_pages,
        preview_ref.is_some(),
    )))
}
