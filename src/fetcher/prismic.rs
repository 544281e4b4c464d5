use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::fetcher::base::{Post, PostPagination, PostSummary, Section};
use crate::fetcher::FetchError;

/// Posts shown per page on the home listing.
pub const PAGE_SIZE: usize = 2;

const POSTS_PREDICATE: &str = r#"[[at(document.type, "posts")]]"#;
const SUMMARY_FIELDS: &str = "posts.title,posts.subtitle,posts.author";
const NEWEST_FIRST: &str = "[document.first_publication_date desc]";

#[derive(Debug, Deserialize)]
struct ApiDescriptor {
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(default)]
    is_master_ref: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    next_page: Option<String>,
    results: Vec<Document<T>>,
}

#[derive(Debug, Deserialize)]
struct Document<T> {
    id: String,
    uid: Option<String>,
    first_publication_date: Option<String>,
    data: T,
}

#[derive(Debug, Deserialize)]
struct SummaryData {
    title: Option<String>,
    subtitle: Option<String>,
    author: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostData {
    title: Option<String>,
    subtitle: Option<String>,
    author: Option<String>,
    banner: Option<Image>,
    #[serde(default)]
    content: Vec<RawSection>,
}

#[derive(Debug, Deserialize)]
struct Image {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    heading: Option<String>,
    #[serde(default)]
    body: Vec<RichTextBlock>,
}

#[derive(Debug, Deserialize)]
struct RichTextBlock {
    #[serde(default)]
    text: String,
}

impl Document<SummaryData> {
    fn into_summary(self) -> PostSummary {
        PostSummary {
            uid: self.uid.unwrap_or(self.id),
            first_publication_date: self.first_publication_date,
            title: self.data.title.unwrap_or_default(),
            subtitle: self.data.subtitle.unwrap_or_default(),
            author: self.data.author.unwrap_or_default(),
        }
    }
}

impl SearchResponse<SummaryData> {
    fn into_pagination(self) -> PostPagination {
        PostPagination {
            next_page: self.next_page,
            results: self.results.into_iter().map(|doc| doc.into_summary()).collect(),
        }
    }
}

impl Document<PostData> {
    fn into_post(self) -> Post {
        Post {
            uid: self.uid.unwrap_or(self.id),
            first_publication_date: self.first_publication_date,
            title: self.data.title.unwrap_or_default(),
            subtitle: self.data.subtitle.unwrap_or_default(),
            author: self.data.author.unwrap_or_default(),
            banner: self.data.banner.and_then(|image| image.url),
            content: self
                .data
                .content
                .into_iter()
                .map(|section| Section {
                    heading: section.heading.unwrap_or_default(),
                    body: section.body.into_iter().map(|block| block.text).collect(),
                })
                .collect(),
        }
    }
}

/// Query matching the post with `uid`. Quotes and backslashes cannot
/// appear in a uid and are dropped so they never break out of the string.
fn uid_predicate(uid: &str) -> String {
    let uid: String = uid.chars().filter(|c| *c != '"' && *c != '\\').collect();
    format!(r#"[[at(my.posts.uid, "{}")]]"#, uid)
}

/// Thin client over the Prismic REST API v2.
#[derive(Debug, Clone)]
pub struct PrismicClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
}

impl PrismicClient {
    pub fn new(
        endpoint: &str,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .gzip(true)
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::Request {
                url: endpoint.to_string(),
                source,
            })?;

        Ok(PrismicClient {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(
            &config.prismic_api_endpoint,
            config.prismic_access_token.clone(),
            config.content_api_budget(),
        )
    }

    fn parse_url(&self, url: &str, params: &[(&str, &str)]) -> Result<Url, FetchError> {
        let parsed = if params.is_empty() {
            Url::parse(url)
        } else {
            Url::parse_with_params(url, params)
        };
        parsed.map_err(|err| FetchError::Url {
            url: url.to_string(),
            reason: err.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        debug!("GET {}", url);
        let resp = self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/json; charset=utf-8")
            .send()
            .await
            .map_err(|source| {
                error!("Content API request failed: {}", source);
                FetchError::Request {
                    url: url.to_string(),
                    source,
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            error!("Content API answered {} for {}", status, url);
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        resp.json::<T>().await.map_err(|source| {
            error!("Could not parse content API response: {}", source);
            FetchError::Decode {
                url: url.to_string(),
                source,
            }
        })
    }

    /// The ref pointing at the currently published content.
    pub async fn master_ref(&self) -> Result<String, FetchError> {
        let mut params = Vec::new();
        if let Some(token) = &self.access_token {
            params.push(("access_token", token.as_str()));
        }
        let url = self.parse_url(&self.endpoint, &params)?;
        let descriptor = self.get_json::<ApiDescriptor>(url).await?;

        descriptor
            .refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or_else(|| FetchError::MissingMasterRef(self.endpoint.clone()))
    }

    async fn resolve_ref(&self, preview_ref: Option<&str>) -> Result<String, FetchError> {
        match preview_ref {
            Some(preview) => Ok(preview.to_string()),
            None => self.master_ref().await,
        }
    }

    fn search_url(&self, reference: &str, params: &[(&str, &str)]) -> Result<Url, FetchError> {
        let mut all = vec![("ref", reference)];
        all.extend_from_slice(params);
        if let Some(token) = &self.access_token {
            all.push(("access_token", token.as_str()));
        }
        self.parse_url(&format!("{}/documents/search", self.endpoint), &all)
    }

    /// First page of the listing, newest first.
    #[tracing::instrument(skip(self, preview_ref))]
    pub async fn query_posts(
        &self,
        preview_ref: Option<&str>,
    ) -> Result<PostPagination, FetchError> {
        let reference = self.resolve_ref(preview_ref).await?;
        let page_size = PAGE_SIZE.to_string();
        let url = self.search_url(
            &reference,
            &[
                ("q", POSTS_PREDICATE),
                ("fetch", SUMMARY_FIELDS),
                ("pageSize", page_size.as_str()),
                ("orderings", NEWEST_FIRST),
            ],
        )?;

        let resp = self.get_json::<SearchResponse<SummaryData>>(url).await?;
        info!("Fetched {} posts", resp.results.len());
        Ok(resp.into_pagination())
    }

    /// Follows a `next_page` continuation url as handed out by the API.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_page(&self, cursor: &str) -> Result<PostPagination, FetchError> {
        let url = self.parse_url(cursor, &[])?;
        let resp = self.get_json::<SearchResponse<SummaryData>>(url).await?;
        info!("Fetched {} more posts", resp.results.len());
        Ok(resp.into_pagination())
    }

    #[tracing::instrument(skip(self, preview_ref))]
    pub async fn post_by_uid(
        &self,
        uid: &str,
        preview_ref: Option<&str>,
    ) -> Result<Option<Post>, FetchError> {
        let reference = self.resolve_ref(preview_ref).await?;
        let predicate = uid_predicate(uid);
        let url = self.search_url(&reference, &[("q", predicate.as_str()), ("pageSize", "1")])?;

        let resp = self.get_json::<SearchResponse<PostData>>(url).await?;
        Ok(resp.results.into_iter().next().map(|doc| doc.into_post()))
    }
}

#[cfg(test)]
impl PrismicClient {
    pub fn for_endpoint(endpoint: &str) -> Self {
        Self::from_config(&Config::for_endpoint(endpoint)).unwrap()
    }
}
