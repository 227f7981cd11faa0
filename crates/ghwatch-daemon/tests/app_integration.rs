use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::Path;
use serde_json::{Value, json};

use ghwatch_core::settings::KEY_GITHUB_REPO;
use ghwatch_core::test_helpers::{force_push_event, push_event};
use ghwatch_core::{NotificationSink, SettingsStore};
use ghwatch_daemon::App;
use ghwatch_daemon::config::DaemonConfig;
use ghwatch_daemon::console::{Command, Console, Flow};

/// Repository name every request was made for.
type Seen = Arc<Mutex<Vec<String>>>;

async fn start_mock(activity: Value, issue_events: Value) -> (String, Seen) {
    let seen: Seen = Arc::default();
    let activity_seen = Arc::clone(&seen);
    let issues_seen = Arc::clone(&seen);

    let app = Router::new()
        .route(
            "/repos/{owner}/{repo}/events",
            axum::routing::get(move |Path((owner, repo)): Path<(String, String)>| {
                let body = activity.clone();
                async move {
                    activity_seen.lock().unwrap().push(format!("{owner}/{repo}"));
                    axum::Json(body)
                }
            }),
        )
        .route(
            "/repos/{owner}/{repo}/issues/events",
            axum::routing::get(move |Path((owner, repo)): Path<(String, String)>| {
                let body = issue_events.clone();
                async move {
                    issues_seen.lock().unwrap().push(format!("{owner}/{repo}"));
                    axum::Json(body)
                }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    (format!("http://{addr}/repos"), seen)
}

fn config(api_root: String, repo: &str) -> DaemonConfig {
    let mut config = DaemonConfig::default();
    config.github.repo = repo.to_string();
    config.github.api_root = api_root;
    config.github.request_timeout_secs = 5;
    config
}

#[tokio::test]
async fn run_once_fills_tray_from_both_feeds() {
    let (root, seen) = start_mock(
        json!([push_event("2", "al", "fix", "https://github.com/o/r/commit/2")]),
        json!([force_push_event(10, "bo", 4, "Speedup")]),
    )
    .await;
    let app = App::new(&config(root, "octo/hello")).unwrap();

    let outcome = app.run_once().await;

    assert_eq!(outcome.summary.emitted(), 2);
    assert_eq!(outcome.notifications.len(), 2);
    let titles: Vec<String> = app
        .tray
        .current_notifications()
        .into_iter()
        .map(|n| n.title)
        .collect();
    assert!(titles.contains(&"Push by al".to_string()));
    assert!(titles.contains(&"bo force pushed PR #4".to_string()));
    assert!(seen.lock().unwrap().iter().all(|r| r == "octo/hello"));
}

#[tokio::test]
async fn tray_rotates_past_configured_capacity() {
    let events: Vec<Value> = (1..=3)
        .rev()
        .map(|i| push_event(&i.to_string(), "al", &format!("m{i}"), "u"))
        .collect();
    let (root, _) = start_mock(Value::Array(events), json!([])).await;
    let mut cfg = config(root, "octo/hello");
    cfg.ui.tray_capacity = 2;
    let app = App::new(&cfg).unwrap();

    app.run_once().await;

    let bodies: Vec<String> = app
        .tray
        .current_notifications()
        .into_iter()
        .map(|n| n.body)
        .collect();
    assert_eq!(bodies, vec!["m2", "m1"]);
}

#[tokio::test]
async fn run_once_reports_notifications_rotated_out_of_tray() {
    let activity: Vec<Value> = (1..=4)
        .rev()
        .map(|i| push_event(&i.to_string(), "al", &format!("m{i}"), "u"))
        .collect();
    let issue_events: Vec<Value> = (1..=4)
        .rev()
        .map(|i| force_push_event(i, "bo", i, &format!("t{i}")))
        .collect();
    let (root, _) = start_mock(Value::Array(activity), Value::Array(issue_events)).await;
    let app = App::new(&config(root, "octo/hello")).unwrap();

    let outcome = app.run_once().await;

    assert_eq!(outcome.summary.emitted(), 6);
    assert_eq!(outcome.notifications.len(), 6);
    assert_eq!(app.tray.len(), 3);
    let bodies: Vec<&str> = outcome
        .notifications
        .iter()
        .map(|n| n.body.as_str())
        .collect();
    for body in ["m4", "m3", "m2", "t4", "t3", "t2"] {
        assert!(bodies.contains(&body), "{body} missing from {bodies:?}");
    }
}

#[tokio::test]
async fn console_repo_change_applies_to_next_poll() {
    let (root, seen) = start_mock(json!([]), json!([])).await;
    let app = App::new(&config(root, "octo/one")).unwrap();
    let console = Console::new(
        Arc::clone(&app.settings) as Arc<dyn SettingsStore>,
        Arc::clone(&app.tray),
    );

    app.run_once().await;
    let (flow, _) = console.execute(Command::parse("set github-repo octo/two").unwrap());
    assert_eq!(flow, Flow::Continue);
    assert_eq!(app.settings.get_string(KEY_GITHUB_REPO), "octo/two");
    app.run_once().await;

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 4);
    assert_eq!(seen.iter().filter(|r| *r == "octo/two").count(), 2);
}

#[tokio::test]
async fn scheduler_manual_check_via_app() {
    let (root, _) = start_mock(json!([push_event("1", "al", "hi", "u")]), json!([])).await;
    let app = App::new(&config(root, "octo/hello")).unwrap();

    let handle = app.start();
    let mut completed = handle.subscribe();
    assert!(handle.poll_now());
    let done = tokio::time::timeout(Duration::from_secs(5), completed.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(done.emitted, 1);

    handle.disable().await;
    assert_eq!(app.tray.len(), 1);
}
