use once_cell::sync::Lazy;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct SessionResponse {
    user_id: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct TrackerResponse {
    state: String,
    selected: Option<String>,
    can_confirm: bool,
    total_entries: usize,
}

#[derive(Debug, Deserialize)]
struct EntryView {
    mood: String,
}

#[derive(Debug, Deserialize)]
struct DistributionEntry {
    mood: String,
    count: u32,
}

#[derive(Debug, Deserialize)]
struct Distribution {
    entries: Vec<DistributionEntry>,
    sample: bool,
}

#[derive(Debug, Deserialize)]
struct WeeklySeries {
    points: Vec<serde_json::Value>,
    illustrative: bool,
}

#[derive(Debug, Deserialize)]
struct AnalyticsResponse {
    distribution: Distribution,
    weekly_sample: WeeklySeries,
    current_week: WeeklySeries,
}

#[derive(Debug, Deserialize)]
struct Notification {
    title: String,
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
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

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
    path.push(format!("mood_tracker_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

fn unique_email(tag: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{tag}-{nanos}@example.com")
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/healthz")).send().await {
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
    let child = Command::new(env!("CARGO_BIN_EXE_mood_tracker"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("AUTH_MODE", "mock")
        .env("STORAGE_MODE", "file")
        .env("DUPLICATE_POLICY", "suppress_same_day")
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

async fn sign_in(client: &Client, base_url: &str, email: &str) -> String {
    let response = client
        .post(format!("{base_url}/api/session"))
        .json(&serde_json::json!({ "email": email, "password": "secret", "mode": "signup" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert!(response.headers().contains_key(header::SET_COOKIE));

    let session: SessionResponse = response.json().await.unwrap();
    assert_eq!(session.user_id, email);
    format!("mood_session={}", session.token)
}

async fn tracker(client: &Client, base_url: &str, cookie: &str) -> TrackerResponse {
    client
        .get(format!("{base_url}/api/tracker"))
        .header(header::COOKIE, cookie)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_api_requires_sign_in() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/api/history", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .post(format!("{}/api/session", server.base_url))
        .json(&serde_json::json!({ "email": "someone@example.com", "password": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let page = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Sign In"));
}

#[tokio::test]
async fn http_log_mood_updates_history_and_analytics() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let cookie = sign_in(&client, &server.base_url, &unique_email("log")).await;

    let before = tracker(&client, &server.base_url, &cookie).await;
    assert_eq!(before.state, "no_selection");
    assert_eq!(before.total_entries, 0);

    let empty: AnalyticsResponse = client
        .get(format!("{}/api/analytics", server.base_url))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(empty.distribution.sample);
    assert_eq!(empty.distribution.entries.iter().map(|e| e.count).sum::<u32>(), 20);

    let selected: TrackerResponse = client
        .post(format!("{}/api/mood/select", server.base_url))
        .header(header::COOKIE, &cookie)
        .json(&serde_json::json!({ "mood": "calm" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(selected.state, "selected");
    assert_eq!(selected.selected.as_deref(), Some("calm"));
    assert!(selected.can_confirm);

    let response = client
        .post(format!("{}/api/mood/confirm", server.base_url))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let entry: EntryView = response.json().await.unwrap();
    assert_eq!(entry.mood, "calm");

    let after = tracker(&client, &server.base_url, &cookie).await;
    assert_eq!(after.state, "saved");
    assert_eq!(after.total_entries, 1);

    let notifications: Vec<Notification> = client
        .get(format!("{}/api/notifications", server.base_url))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let logged = notifications
        .iter()
        .filter(|n| n.title == "Mood logged successfully! 🌟")
        .count();
    assert_eq!(logged, 1);

    let analytics: AnalyticsResponse = client
        .get(format!("{}/api/analytics", server.base_url))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!analytics.distribution.sample);
    assert_eq!(analytics.distribution.entries.len(), 1);
    assert_eq!(analytics.distribution.entries[0].mood, "calm");
    assert_eq!(analytics.distribution.entries[0].count, 1);
    assert_eq!(analytics.weekly_sample.points.len(), 7);
    assert!(analytics.weekly_sample.illustrative);
    assert!(!analytics.current_week.illustrative);
}

#[tokio::test]
async fn http_same_day_duplicate_is_refused() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let cookie = sign_in(&client, &server.base_url, &unique_email("dup")).await;

    for _ in 0..2 {
        let response = client
            .post(format!("{}/api/mood/select", server.base_url))
            .header(header::COOKIE, &cookie)
            .json(&serde_json::json!({ "mood": "happy" }))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
        let _ = client
            .post(format!("{}/api/mood/confirm", server.base_url))
            .header(header::COOKIE, &cookie)
            .send()
            .await
            .unwrap();
    }

    let state = tracker(&client, &server.base_url, &cookie).await;
    assert_eq!(state.total_entries, 1);
    assert_eq!(state.state, "selected");
    assert!(!state.can_confirm);

    let history: Vec<EntryView> = client
        .get(format!("{}/api/history", server.base_url))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn http_therapists_and_quotes() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let cookie = sign_in(&client, &server.base_url, &unique_email("static")).await;

    let therapists: Vec<serde_json::Value> = client
        .get(format!("{}/api/therapists", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(therapists.len(), 3);

    let booked: Notification = client
        .post(format!("{}/api/therapists/1/book", server.base_url))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(booked.title.starts_with("Consultation Request Sent!"));

    let missing = client
        .post(format!("{}/api/therapists/42/message", server.base_url))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let quote: serde_json::Value = client
        .get(format!("{}/api/quote?mood=sad", server.base_url))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(quote["mood"], "sad");
    assert!(quote["quote"].as_str().is_some_and(|q| !q.is_empty()));

    let bad = client
        .get(format!("{}/api/quote?mood=bored", server.base_url))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}
