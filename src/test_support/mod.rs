//! In-process stand-in for the Prismic REST API, served on an ephemeral port.

use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::add_extension::AddExtensionLayer;

pub const MASTER_REF: &str = "YEoD1xAAACIA-master";
const LAST_PAGE: usize = 3;

type Searches = Arc<Mutex<Vec<HashMap<String, String>>>>;

#[derive(Clone)]
struct FakeState {
    endpoint: String,
    searches: Searches,
    failing_page: Option<usize>,
    stalling_page: Option<(usize, Duration)>,
}

pub struct FakeCms {
    pub endpoint: String,
    searches: Searches,
}

fn summary(n: usize) -> Value {
    json!({
        "id": format!("doc-{}", n),
        "uid": format!("post-{}", n),
        "type": "posts",
        "first_publication_date": format!("2021-03-{:02}T19:25:28+0000", 20 - n),
        "data": {
            "title": if n == 1 {
                String::from("Como utilizar Hooks")
            } else {
                format!("Post {}", n)
            },
            "subtitle": format!("Subtitle {}", n),
            "author": "Joseph Oliveira"
        }
    })
}

fn post_document() -> Value {
    json!({
        "id": "doc-1",
        "uid": "post-1",
        "type": "posts",
        "first_publication_date": "2021-03-19T19:25:28+0000",
        "data": {
            "title": "Como utilizar Hooks",
            "subtitle": "Pensando em sincronização em vez de ciclos de vida",
            "author": "Joseph Oliveira",
            "banner": { "url": "https://images.prismic.io/spacetraveling/banner.png" },
            "content": [{
                "heading": "Proin et varius",
                "body": [
                    { "type": "paragraph", "text": "Lorem ipsum dolor sit amet", "spans": [] }
                ]
            }]
        }
    })
}

/// Uids of every post across all pages, newest first.
pub fn all_uids() -> Vec<&'static str> {
    vec!["post-1", "post-2", "post-3", "post-4", "post-5"]
}

fn page_url(endpoint: &str, page: usize) -> String {
    format!("{}/documents/search?page={}&pageSize=2", endpoint, page)
}

async fn descriptor() -> Json<Value> {
    Json(json!({
        "refs": [
            { "id": "master", "ref": MASTER_REF, "label": "Master", "isMasterRef": true },
            { "id": "release", "ref": "YEoD1xAAACIA-release", "label": "Next release" }
        ]
    }))
}

async fn search(
    Extension(state): Extension<FakeState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.searches.lock().unwrap().push(params.clone());

    if let Some(q) = params.get("q").filter(|q| q.contains("my.posts.uid")) {
        let results = if q.contains(r#""post-1""#) {
            vec![post_document()]
        } else {
            vec![]
        };
        return Json(json!({ "next_page": null, "results": results })).into_response();
    }

    let page = params
        .get("page")
        .and_then(|page| page.parse::<usize>().ok())
        .unwrap_or(1);
    if state.failing_page == Some(page) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    if let Some((stalling, delay)) = state.stalling_page {
        if stalling == page {
            tokio::time::sleep(delay).await;
        }
    }

    let results = ((page - 1) * 2 + 1..=(page * 2).min(5))
        .map(summary)
        .collect::<Vec<Value>>();
    let next_page = if page < LAST_PAGE {
        Some(page_url(&state.endpoint, page + 1))
    } else {
        None
    };

    Json(json!({
        "page": page,
        "results_per_page": 2,
        "total_results_size": 5,
        "total_pages": LAST_PAGE,
        "next_page": next_page,
        "results": results
    }))
    .into_response()
}

impl FakeCms {
    pub async fn spawn() -> Self {
        Self::start(None, None).await
    }

    /// Like `spawn`, but answers 500 for listing page `page`.
    pub async fn spawn_failing_on(page: usize) -> Self {
        Self::start(Some(page), None).await
    }

    /// Like `spawn`, but waits `delay` before answering listing page `page`.
    pub async fn spawn_stalling_on(page: usize, delay: Duration) -> Self {
        Self::start(None, Some((page, delay))).await
    }

    async fn start(failing_page: Option<usize>, stalling_page: Option<(usize, Duration)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/api/v2", listener.local_addr().unwrap());
        let searches = Searches::default();

        let state = FakeState {
            endpoint: endpoint.clone(),
            searches: searches.clone(),
            failing_page,
            stalling_page,
        };
        let app = Router::new()
            .route("/api/v2", get(descriptor))
            .route("/api/v2/documents/search", get(search))
            .layer(AddExtensionLayer::new(state));

        tokio::spawn(async move {
            axum::Server::from_tcp(listener)
                .unwrap()
                .serve(app.into_make_service())
                .await
                .unwrap();
        });

        FakeCms { endpoint, searches }
    }

    /// Continuation url the fake hands out for listing page `page`.
    pub fn page_url(&self, page: usize) -> String {
        page_url(&self.endpoint, page)
    }

    /// Query parameters of every search request received so far.
    pub fn searches(&self) -> Vec<HashMap<String, String>> {
        self.searches.lock().unwrap().clone()
    }
}
