use std::collections::HashSet;

use tokio::time::{timeout_at, Instant};
use tracing::{error, info, warn};

use crate::fetcher::base::{PostPagination, PostSummary};
use crate::fetcher::prismic::PrismicClient;
use crate::fetcher::FetchError;

/// The posts shown so far and the cursor to the next page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    posts: Vec<PostSummary>,
    next_page: Option<String>,
    pages: usize,
}

impl Listing {
    pub fn new(first: PostPagination) -> Self {
        Listing {
            posts: first.results,
            next_page: first.next_page,
            pages: 1,
        }
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    /// Pages loaded so far, the first one included.
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Appends a fetched page after the current posts and takes over its cursor.
    ///
    /// Posts are never de-duplicated; overlapping pages show up twice.
    pub fn append(&mut self, page: PostPagination) {
        let known: HashSet<&str> = self.posts.iter().map(|post| post.uid.as_str()).collect();
        for post in page.results.iter().filter(|post| known.contains(post.uid.as_str())) {
            warn!("Post {} was already listed", post.uid);
        }

        self.posts.extend(page.results);
        self.next_page = page.next_page;
        self.pages += 1;
    }

    /// Fetches the page behind the cursor and appends it.
    ///
    /// Returns `Ok(false)` without fetching when there is no next page. On
    /// error the listing is left untouched.
    pub async fn load_more(&mut self, client: &PrismicClient) -> Result<bool, FetchError> {
        let cursor = match &self.next_page {
            Some(cursor) => cursor.clone(),
            None => return Ok(false),
        };

        let page = client.fetch_page(&cursor).await?;
        self.append(page);
        Ok(true)
    }

    /// Loads more until `pages` pages are shown, the cursor runs out or
    /// `deadline` passes.
    ///
    /// A failing or late fetch stops the walk and keeps what was loaded before it.
    pub async fn load_pages(&mut self, client: &PrismicClient, pages: usize, deadline: Instant) {
        while self.pages < pages {
            match timeout_at(deadline, self.load_more(client)).await {
                Ok(Ok(true)) => {}
                Ok(Ok(false)) => break,
                Ok(Err(e)) => {
                    error!("Could not load page {}: {}", self.pages + 1, e);
                    break;
                }
                Err(_) => {
                    error!("Gave up loading page {}, out of time", self.pages + 1);
                    break;
                }
            }
        }
        info!("Listing {} posts over {} pages", self.posts.len(), self.pages);
    }
}
