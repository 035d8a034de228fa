use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogStats {
    total_logs: usize,
    completed_tasks: usize,
}

#[derive(Debug, Deserialize)]
struct Card {
    id: i64,
    priority: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct LogList {
    filter: String,
    cards: Vec<Card>,
    stats: LogStats,
}

#[derive(Debug, Deserialize)]
struct Notice {
    changed: bool,
    message: String,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::Once;
    use std::sync::atomic::{AtomicI32, Ordering};

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("study_desk_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/logs/stats")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_study_desk"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn list(client: &Client, base_url: &str, filter: &str) -> LogList {
    client
        .get(format!("{base_url}/api/logs?filter={filter}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

fn log_body(activity: &str, priority: &str, duration: f64) -> Value {
    json!({
        "date": "2026-01-05",
        "type": "learning",
        "priority": priority,
        "status": "pending",
        "activity": activity,
        "duration": duration,
    })
}

#[tokio::test]
async fn http_add_log_counts_only_valid_entries() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = list(&client, &server.base_url, "all").await;

    let added: Value = client
        .post(format!("{}/api/logs", server.base_url))
        .json(&log_body("Read the handbook", "high", 1.5))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(added["added"], true);

    let rejected: Value = client
        .post(format!("{}/api/logs", server.base_url))
        .json(&log_body("Zero hours", "low", 0.0))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rejected["added"], false);

    let after = list(&client, &server.base_url, "all").await;
    assert_eq!(after.stats.total_logs, before.stats.total_logs + 1);
    assert_eq!(after.cards.len(), before.cards.len() + 1);
}

#[tokio::test]
async fn http_high_filter_selects_priority() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    client
        .post(format!("{}/api/logs", server.base_url))
        .json(&log_body("Urgent fix", "high", 2.0))
        .send()
        .await
        .unwrap();

    let high = list(&client, &server.base_url, "high").await;
    assert_eq!(high.filter, "high");
    assert!(!high.cards.is_empty());
    assert!(high.cards.iter().all(|card| card.priority == "high"));

    let bad = client
        .get(format!("{}/api/logs?filter=urgent", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_toggle_and_bulk_delete() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let added: Value = client
        .post(format!("{}/api/logs", server.base_url))
        .json(&log_body("Toggle me", "medium", 1.0))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = added["entry"]["id"].as_i64().unwrap();

    let notice: Notice = client
        .post(format!("{}/api/logs/{id}/toggle", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(notice.changed);
    let in_progress = list(&client, &server.base_url, "in-progress").await;
    assert!(in_progress.cards.iter().any(|card| card.id == id && card.status == "in-progress"));

    let before = list(&client, &server.base_url, "all").await;
    let empty = client
        .post(format!("{}/api/logs/bulk-delete", server.base_url))
        .json(&json!({ "ids": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
    assert!(empty.text().await.unwrap().contains("Select at least one"));

    let unconfirmed: Notice = client
        .post(format!("{}/api/logs/bulk-delete", server.base_url))
        .json(&json!({ "ids": [id] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!unconfirmed.changed);
    assert_eq!(list(&client, &server.base_url, "all").await.stats.total_logs, before.stats.total_logs);

    let confirmed: Notice = client
        .post(format!("{}/api/logs/bulk-delete", server.base_url))
        .json(&json!({ "ids": [id], "confirmed": true }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(confirmed.changed, "{}", confirmed.message);
    let after = list(&client, &server.base_url, "all").await;
    assert_eq!(after.stats.total_logs, before.stats.total_logs - 1);
    assert!(after.stats.completed_tasks <= after.stats.total_logs);
}

#[tokio::test]
async fn http_study_subjects_and_timer() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let view: Value = client
        .post(format!("{}/api/study/login", server.base_url))
        .json(&json!({ "name": "tester" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["user"], "tester");

    let subject = json!({ "name": "Geometry", "difficulty": "advanced", "targetTime": 30 });
    let first = client
        .post(format!("{}/api/study/subjects", server.base_url))
        .json(&subject)
        .send()
        .await
        .unwrap();
    assert!(first.status().is_success());

    let duplicate = client
        .post(format!("{}/api/study/subjects", server.base_url))
        .json(&json!({ "name": "geometry" }))
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let timer: Value = client
        .post(format!("{}/api/timer/start", server.base_url))
        .json(&json!({ "subject": 0, "minutes": 25 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(timer["state"], "running");
    assert_eq!(timer["subject"], "Geometry");

    let stopped: Value = client
        .post(format!("{}/api/timer/stop", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stopped["state"], "idle");

    let tips: Vec<String> = client
        .get(format!("{}/api/recommendations", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(tips.len(), 3);
}

#[tokio::test]
async fn http_faq_matches_exact_questions() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let questions: Vec<String> = client
        .get(format!("{}/api/faq", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!questions.is_empty());

    let hit: Value = client
        .post(format!("{}/api/faq/ask", server.base_url))
        .json(&json!({ "question": questions[0].to_uppercase() }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(hit["matched"], true);

    let miss: Value = client
        .post(format!("{}/api/faq/ask", server.base_url))
        .json(&json!({ "question": "timer" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(miss["matched"], false);
}

#[tokio::test]
async fn http_edit_log() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let added: Value = client
        .post(format!("{}/api/logs", server.base_url))
        .json(&log_body("Draft report", "low", 1.0))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = added["entry"]["id"].as_i64().unwrap();

    let rejected = client
        .put(format!("{}/api/logs/{id}", server.base_url))
        .json(&json!({ "status": "completed", "priority": "high", "duration": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);

    let notice: Notice = client
        .put(format!("{}/api/logs/{id}", server.base_url))
        .json(&json!({ "status": "completed", "priority": "high", "duration": 2.5, "notes": "sent" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(notice.changed, "{}", notice.message);

    let completed = list(&client, &server.base_url, "completed").await;
    let card = completed.cards.iter().find(|card| card.id == id).unwrap();
    assert_eq!(card.priority, "high");
    assert_eq!(card.status, "completed");

    let unknown: Notice = client
        .put(format!("{}/api/logs/1", server.base_url))
        .json(&json!({ "status": "pending", "priority": "low", "duration": 1 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!unknown.changed);
}

#[tokio::test]
async fn http_filtered_cards_keep_controls() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let added: Value = client
        .post(format!("{}/api/logs", server.base_url))
        .json(&log_body("Pair review", "high", 1.0))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = added["entry"]["id"].as_i64().unwrap();

    let html = client
        .get(format!("{}/api/logs/cards?filter=high&q=pair", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains(&format!(r#"class="log-checkbox" data-id="{id}""#)));
    assert!(html.contains(&format!(r#"data-action="edit" data-id="{id}""#)));
    assert!(html.contains(&format!(r#"data-action="toggle" data-id="{id}""#)));
    assert!(!html.contains("Read the handbook"));
}
