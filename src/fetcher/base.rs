use serde::{Deserialize, Serialize};

/// One entry of the listing, as shown on the home page.
#[derive(Deserialize, Debug, Clone, Serialize, Eq, PartialEq)]
pub struct PostSummary {
    pub uid: String,
    pub first_publication_date: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// A page of summaries plus the continuation url of the next one.
#[derive(Deserialize, Debug, Clone, Serialize, Eq, PartialEq, Default)]
pub struct PostPagination {
    pub next_page: Option<String>,
    pub results: Vec<PostSummary>,
}

#[derive(Deserialize, Debug, Clone, Serialize, Eq, PartialEq)]
pub struct Section {
    pub heading: String,
    pub body: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, Serialize, Eq, PartialEq)]
pub struct Post {
    pub uid: String,
    pub first_publication_date: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner: Option<String>,
    pub content: Vec<Section>,
}

const WORDS_PER_MINUTE: usize = 200;

impl Post {
    /// Minutes needed to read headings and body, rounded up.
    pub fn reading_time(&self) -> usize {
        let words: usize = self
            .content
            .iter()
            .map(|section| {
                let heading = section.heading.split_whitespace().count();
                let body: usize = section
                    .body
                    .iter()
                    .map(|paragraph| paragraph.split_whitespace().count())
                    .sum();
                heading + body
            })
            .sum();

        (words + WORDS_PER_MINUTE - 1) / WORDS_PER_MINUTE
    }
}
