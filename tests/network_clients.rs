use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use folio::fetch::Source;
use folio::local_store::{
    profile_stats_key, LocalStore, MemoryLocalStore, HAS_VISITED_KEY, PROFILE_STATS_KEY,
};
use folio::profile::{GithubClient, ProfileStats, ProfileStatsWidget};
use folio::server::{router, state::State, VISITORS_PATH};
use folio::visitor_client::{VisitorClient, FALLBACK_COUNT};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

const TIMEOUT: Duration = Duration::from_secs(2);

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

// --- visitor counter client ---

#[tokio::test]
async fn first_visit_posts_then_reads() {
    let base = serve(router(State::new())).await;
    let client = VisitorClient::new(&format!("{base}{VISITORS_PATH}"), TIMEOUT).unwrap();
    let cancel = CancellationToken::new();
    let me = MemoryLocalStore::new();

    assert_eq!(client.track(&me, &cancel).await, 1);
    assert_eq!(me.get(HAS_VISITED_KEY).as_deref(), Some("true"));

    // returning visitor does not count again
    assert_eq!(client.track(&me, &cancel).await, 1);

    let someone_else = MemoryLocalStore::new();
    assert_eq!(client.track(&someone_else, &cancel).await, 2);
    assert_eq!(client.track(&me, &cancel).await, 2);
}

#[tokio::test]
async fn unreachable_counter_shows_one_and_keeps_flag_unset() {
    let base = closed_port().await;
    let client = VisitorClient::new(&format!("{base}{VISITORS_PATH}"), TIMEOUT).unwrap();
    let store = MemoryLocalStore::new();

    assert_eq!(client.track(&store, &CancellationToken::new()).await, FALLBACK_COUNT);
    assert_eq!(store.get(HAS_VISITED_KEY), None);
}

#[tokio::test]
async fn error_status_shows_one() {
    let app = Router::new().route(
        VISITORS_PATH,
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR })
            .post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let base = serve(app).await;
    let client = VisitorClient::new(&format!("{base}{VISITORS_PATH}"), TIMEOUT).unwrap();

    let store = MemoryLocalStore::new();
    assert_eq!(client.track(&store, &CancellationToken::new()).await, 1);
    assert_eq!(store.get(HAS_VISITED_KEY), None);
}

#[tokio::test]
async fn undecodable_body_shows_one() {
    let app = Router::new().route(VISITORS_PATH, get(|| async { "not json" }));
    let base = serve(app).await;
    let client = VisitorClient::new(&format!("{base}{VISITORS_PATH}"), TIMEOUT).unwrap();

    let store = MemoryLocalStore::new();
    store.set(HAS_VISITED_KEY, "true").unwrap();
    assert_eq!(client.track(&store, &CancellationToken::new()).await, 1);
}

#[tokio::test]
async fn slow_counter_times_out() {
    let app = Router::new().route(
        VISITORS_PATH,
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "success": true, "count": 99 }))
        }),
    );
    let base = serve(app).await;
    let client =
        VisitorClient::new(&format!("{base}{VISITORS_PATH}"), Duration::from_millis(100)).unwrap();

    let store = MemoryLocalStore::new();
    store.set(HAS_VISITED_KEY, "true").unwrap();
    assert_eq!(client.track(&store, &CancellationToken::new()).await, 1);
}

#[tokio::test]
async fn cancelled_before_reply_shows_one() {
    let base = serve(router(State::new())).await;
    let client = VisitorClient::new(&format!("{base}{VISITORS_PATH}"), TIMEOUT).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let store = MemoryLocalStore::new();
    assert_eq!(client.track(&store, &cancel).await, 1);
    assert_eq!(store.get(HAS_VISITED_KEY), None);
}

// --- profile stats widget ---

#[derive(Clone, Default)]
struct Seen {
    handles: Arc<Mutex<Vec<String>>>,
}

#[derive(Clone, Copy)]
enum Repos {
    Listed,
    Unavailable,
    Malformed,
}

fn speaks_v3(headers: &HeaderMap) -> bool {
    headers.get(header::ACCEPT).map(|v| v.as_bytes())
        == Some(b"application/vnd.github.v3+json".as_slice())
}

fn github(repos: Repos) -> (Router, Seen) {
    let seen = Seen::default();
    let profile_seen = seen.clone();

    let app = Router::new()
        .route(
            "/users/{handle}",
            get(move |Path(handle): Path<String>, headers: HeaderMap| {
                let seen = profile_seen.clone();
                async move {
                    if headers.get(header::USER_AGENT).map(|v| v.as_bytes())
                        != Some(b"Portfolio-Website".as_slice())
                    {
                        return StatusCode::FORBIDDEN.into_response();
                    }
                    if !speaks_v3(&headers) {
                        return StatusCode::NOT_ACCEPTABLE.into_response();
                    }
                    seen.handles.lock().unwrap().push(handle.clone());
                    Json(json!({
                        "login": handle,
                        "name": "Zidan",
                        "public_repos": 7,
                        "followers": 10,
                        "avatar_url": "https://avatars.example/u/1",
                        "html_url": format!("https://github.com/{handle}"),
                    }))
                    .into_response()
                }
            }),
        )
        .route(
            "/users/{handle}/repos",
            get(
                move |Query(query): Query<HashMap<String, String>>, headers: HeaderMap| async move {
                    if !speaks_v3(&headers) {
                        return StatusCode::NOT_ACCEPTABLE.into_response();
                    }
                    if query.get("per_page").map(String::as_str) != Some("100")
                        || query.get("type").map(String::as_str) != Some("owner")
                    {
                        return StatusCode::BAD_REQUEST.into_response();
                    }
                    match repos {
                        Repos::Unavailable => StatusCode::SERVICE_UNAVAILABLE.into_response(),
                        Repos::Malformed => {
                            Json(json!({ "message": "API rate limit exceeded" })).into_response()
                        }
                        Repos::Listed => Json(json!([
                            { "name": "a", "stargazers_count": 12 },
                            { "name": "b", "stargazers_count": 8 },
                            { "name": "c" },
                            { "name": "d", "stargazers_count": 0 },
                            { "name": "e", "stargazers_count": 0 },
                        ]))
                        .into_response(),
                    }
                },
            ),
        );

    (app, seen)
}

fn widget(
    base: &str,
    handle: &str,
    store: Arc<MemoryLocalStore>,
    timeout: Duration,
) -> ProfileStatsWidget<MemoryLocalStore> {
    ProfileStatsWidget::new(GithubClient::new(base, timeout).unwrap(), handle, store)
}

#[tokio::test]
async fn fresh_stats_are_aggregated_and_cached() {
    let (app, _) = github(Repos::Listed);
    let base = serve(app).await;
    let store = Arc::new(MemoryLocalStore::new());
    let widget = widget(&base, "zidanXcode", store.clone(), TIMEOUT);

    assert_eq!(widget.initial().source, Source::Fallback);

    let resolved = widget.refresh(&CancellationToken::new()).await;

    assert_eq!(resolved.source, Source::Fresh);
    assert_eq!(resolved.value.repo_count, 5);
    assert_eq!(resolved.value.follower_count, 10);
    assert_eq!(resolved.value.star_count, 20);
    assert_eq!(resolved.value.display_name, "Zidan");
    // 5*8 + 10*1.5 + 20*0.5 = 65
    assert_eq!(resolved.value.xp().level, 65);
    assert_eq!(resolved.value.xp().progress, 65);

    let cached: ProfileStats =
        serde_json::from_str(&store.get(&profile_stats_key("zidanXcode")).unwrap()).unwrap();
    assert_eq!(cached, resolved.value);

    let next_visit = widget.initial();
    assert_eq!(next_visit.source, Source::Cache);
    assert_eq!(next_visit.value, resolved.value);
}

#[tokio::test]
async fn repo_failure_keeps_profile_counts() {
    let (app, _) = github(Repos::Unavailable);
    let base = serve(app).await;
    let widget = widget(&base, "zidanXcode", Arc::new(MemoryLocalStore::new()), TIMEOUT);

    let resolved = widget.refresh(&CancellationToken::new()).await;

    assert_eq!(resolved.source, Source::Fresh);
    assert_eq!(resolved.value.repo_count, 7);
    assert_eq!(resolved.value.star_count, 0);
}

#[tokio::test]
async fn malformed_repo_list_keeps_profile_counts() {
    let (app, _) = github(Repos::Malformed);
    let base = serve(app).await;
    let widget = widget(&base, "zidanXcode", Arc::new(MemoryLocalStore::new()), TIMEOUT);

    let resolved = widget.refresh(&CancellationToken::new()).await;

    assert_eq!(resolved.source, Source::Fresh);
    assert_eq!(resolved.value.repo_count, 7);
    assert_eq!(resolved.value.follower_count, 10);
    assert_eq!(resolved.value.star_count, 0);
}

#[tokio::test]
async fn another_handles_cache_is_not_shown() {
    let store = Arc::new(MemoryLocalStore::new());
    let mut theirs = ProfileStats::fallback("zidanXcode");
    theirs.repo_count = 40;
    let raw = serde_json::to_string(&theirs).unwrap();
    store.set(&profile_stats_key("zidanXcode"), &raw).unwrap();
    store.set(PROFILE_STATS_KEY, &raw).unwrap();

    let base = closed_port().await;
    let octocat = widget(&base, "octocat", store.clone(), TIMEOUT);

    let shown = octocat.initial();
    assert_eq!(shown.source, Source::Fallback);
    assert_eq!(shown.value.handle, "octocat");
    assert_eq!(shown.value.repo_count, 2);

    let resolved = octocat.refresh(&CancellationToken::new()).await;
    assert_eq!(resolved.source, Source::Fallback);
    assert_eq!(resolved.value.handle, "octocat");

    // logins differ only in case
    let same_login = widget(&base, "ZidanXCode", store, TIMEOUT).initial();
    assert_eq!(same_login.source, Source::Cache);
    assert_eq!(same_login.value.repo_count, 40);
}

#[tokio::test]
async fn failed_refresh_keeps_cached_stats() {
    let store = Arc::new(MemoryLocalStore::new());
    let mut cached = ProfileStats::fallback("zidanXcode");
    cached.repo_count = 9;
    store
        .set(
            &profile_stats_key("zidanXcode"),
            &serde_json::to_string(&cached).unwrap(),
        )
        .unwrap();

    let base = closed_port().await;
    let widget = widget(&base, "zidanXcode", store.clone(), TIMEOUT);
    let resolved = widget.refresh(&CancellationToken::new()).await;

    assert_eq!(resolved.source, Source::Cache);
    assert_eq!(resolved.value, cached);
}

#[tokio::test]
async fn failed_refresh_without_cache_uses_fallback() {
    let base = closed_port().await;
    let widget = widget(&base, "zidanXcode", Arc::new(MemoryLocalStore::new()), TIMEOUT);

    let resolved = widget.refresh(&CancellationToken::new()).await;

    assert_eq!(resolved.source, Source::Fallback);
    assert_eq!(resolved.value.repo_count, 2);
    assert_eq!(resolved.value.follower_count, 0);
    assert_eq!(resolved.value.star_count, 0);
}

#[tokio::test]
async fn slow_api_falls_back_after_timeout() {
    let app = Router::new().route(
        "/users/{handle}",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            StatusCode::OK
        }),
    );
    let base = serve(app).await;
    let widget = widget(
        &base,
        "zidanXcode",
        Arc::new(MemoryLocalStore::new()),
        Duration::from_millis(100),
    );

    let started = std::time::Instant::now();
    let resolved = widget.refresh(&CancellationToken::new()).await;

    assert_eq!(resolved.source, Source::Fallback);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn handle_is_escaped_in_the_path() {
    let (app, seen) = github(Repos::Listed);
    let base = serve(app).await;
    let widget = widget(&base, "odd name", Arc::new(MemoryLocalStore::new()), TIMEOUT);

    let resolved = widget.refresh(&CancellationToken::new()).await;

    assert_eq!(resolved.source, Source::Fresh);
    assert_eq!(*seen.handles.lock().unwrap(), vec!["odd name".to_string()]);
}
