#![allow(dead_code)]

use std::{
  fs,
  io::Read,
  path::Path,
  process::Command,
  sync::{Arc, Mutex},
  thread::JoinHandle,
};

use tempfile::TempDir;
use tiny_http::{Response, Server};

pub fn git(dir: &Path, args: &[&str]) -> String {
  let output = Command::new("git").current_dir(dir).args(args).output().expect("failed to run git");

  assert!(output.status.success(), "git {:?} failed: {}", args, String::from_utf8_lossy(&output.stderr));

  String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn init_repo() -> TempDir {
  let temp = TempDir::new().expect("temp dir");
  git(temp.path(), &["init", "-q", "-b", "main"]);
  git(temp.path(), &["config", "user.email", "tests@example.com"]);
  git(temp.path(), &["config", "user.name", "Tests"]);
  temp
}

pub fn add_remote(temp: &TempDir, owner: &str, repo: &str) {
  git(temp.path(), &["remote", "add", "origin", &format!("https://github.com/{owner}/{repo}.git")]);
}

pub fn create_repo(owner: &str, repo: &str) -> TempDir {
  let temp = init_repo();
  add_remote(&temp, owner, repo);

  fs::write(temp.path().join("README.md"), "# fixture\n").expect("write README.md");
  commit_with_date(temp.path(), "chore: init", "2026-01-01T00:00:00Z");
  lightweight_tag(temp.path(), "v0.1.0");

  temp
}

pub fn commit_with_date(dir: &Path, message: &str, date: &str) {
  git(dir, &["add", "."]);

  let output = Command::new("git")
    .current_dir(dir)
    .env("GIT_AUTHOR_DATE", date)
    .env("GIT_COMMITTER_DATE", date)
    .args(["commit", "-m", message])
    .output()
    .expect("failed to run git commit");

  assert!(output.status.success(), "git commit failed: {}", String::from_utf8_lossy(&output.stderr));
}

pub fn lightweight_tag(dir: &Path, name: &str) { git(dir, &["tag", name]); }

pub fn annotated_tag(dir: &Path, name: &str, message: &str) { git(dir, &["tag", "-a", name, "-m", message]); }

/// A canned request/response pair for the fake forge server: `matcher` is checked against the
/// raw request body (for GraphQL POSTs) or the request path (for REST GETs).
pub struct StubbedResponse {
  pub matcher: &'static str,
  pub body: String,
}

/// A background HTTP server standing in for GitHub's GraphQL and REST endpoints. Responses are
/// matched in order against each incoming request's body/path, first match wins.
pub struct FakeForge {
  pub base_url: String,
  handle: Option<JoinHandle<()>>,
  shutdown: Arc<Mutex<bool>>,
}

impl FakeForge {
  pub fn start(responses: Vec<StubbedResponse>) -> Self {
    let server = Server::http("127.0.0.1:0").expect("bind fake forge server");
    let base_url = format!("http://{}", server.server_addr());
    let shutdown = Arc::new(Mutex::new(false));
    let shutdown_handle = Arc::clone(&shutdown);

    let handle = std::thread::spawn(move || {
      for mut request in server.incoming_requests() {
        if *shutdown_handle.lock().unwrap() {
          break;
        }

        let mut body = String::new();
        let _ = request.as_reader().read_to_string(&mut body);
        let haystack = format!("{} {}", request.url(), body);

        let matched = responses.iter().find(|candidate| haystack.contains(candidate.matcher));
        let response_body = matched.map(|r| r.body.clone()).unwrap_or_else(|| "{}".to_string());

        let response = Response::from_string(response_body).with_header("Content-Type: application/json".parse::<tiny_http::Header>().unwrap());
        let _ = request.respond(response);
      }
    });

    Self { base_url, handle: Some(handle), shutdown }
  }
}

impl Drop for FakeForge {
  fn drop(&mut self) {
    *self.shutdown.lock().unwrap() = true;
    // The server thread is parked in a blocking accept loop; it exits on the next request (or
    // when the test process itself tears down), so we don't join it here.
    self.handle.take();
  }
}
