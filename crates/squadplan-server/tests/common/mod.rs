//! Common test utilities and harness for SquadPlan server integration tests.

use std::path::{Path, PathBuf};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use squadplan_server::{AppState, Settings, build_router};
use tempfile::TempDir;
use tower::ServiceExt;

/// Planning file with a single squad.
pub const ALPHA_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<resourceConfig>
  <squad name="Alpha">
    <engineers BE="2.0" FE="0.5"/>
    <efficiency BE="0.8" FE="1.0"/>
    <startDate>2024-01-01</startDate>
    <projects>
      <project id="P1" name="Proj1" priority="1">
        <effort BE="5.0"/>
        <concurrency BE="1"/>
      </project>
    </projects>
  </squad>
</resourceConfig>
"#;

/// JSON body for a save that keeps Alpha and adds Beta.
pub const ALPHA_BETA_JSON: &str = r#"{
  "Alpha": {
    "engineers": {"BE": 2.0, "FE": 0.5},
    "efficiency": {"BE": 0.8, "FE": 1.0},
    "startDate": "2024-01-01",
    "projects": [
      {"id": "P1", "name": "Proj1", "priority": 1, "effort": {"BE": 5.0}, "concurrency": {"BE": 1}}
    ]
  },
  "Beta": {
    "engineers": {"QA": 1.0},
    "efficiency": {"QA": 0.9},
    "startDate": "2024-02-01",
    "projects": []
  }
}"#;

/// Test harness for integration tests.
///
/// Owns the temporary directory holding the planning file and a router
/// whose session store lives as long as the harness.
pub struct TestHarness {
    _dir: TempDir,
    /// Path of the planning file.
    pub path: PathBuf,
    /// State shared with the router.
    pub state: AppState,
    /// Router under test.
    pub router: Router,
}

impl TestHarness {
    /// Harness with authentication enforced and the Alpha fixture on disk.
    pub fn new() -> Self {
        Self::with_settings(|settings| settings.auth.bypass = false)
    }

    /// Harness with authentication bypassed.
    pub fn bypass() -> Self {
        Self::with_settings(|settings| settings.auth.bypass = true)
    }

    /// Harness with custom settings applied on top of the defaults.
    pub fn with_settings(configure: impl FnOnce(&mut Settings)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resource_config.xml");
        std::fs::write(&path, ALPHA_XML).unwrap();

        let mut settings = Settings::for_path(&path);
        settings.secret_key = "integration-test-secret".to_string();
        configure(&mut settings);

        let state = AppState::new(settings);
        Self {
            _dir: dir,
            path,
            router: build_router(state.clone()),
            state,
        }
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// GET `uri`, optionally with a session cookie.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::get(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    /// POST a JSON body to `/save`.
    pub async fn save(
        &self,
        body: &str,
        cookie: Option<&str>,
        if_match: Option<&str>,
    ) -> Response<Body> {
        let mut request =
            Request::post("/save").header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        if let Some(version) = if_match {
            request = request.header(header::IF_MATCH, version);
        }
        self.send(request.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Submit the login form.
    pub async fn post_login(&self, username: &str, password: &str) -> Response<Body> {
        let form = format!("username={username}&password={password}");
        let request = Request::post("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .unwrap();
        self.send(request).await
    }

    /// Log in and return the `Cookie` header value for the new session.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self.post_login(username, password).await;
        session_cookie_from(&response).expect("login should set a session cookie")
    }

    /// Current bytes of the planning file.
    pub fn file_bytes(&self) -> Vec<u8> {
        read(&self.path)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn read(path: &Path) -> Vec<u8> {
    std::fs::read(path).unwrap()
}

/// `name=value` part of the first `Set-Cookie` header.
pub fn session_cookie_from(response: &Response<Body>) -> Option<String> {
    let set_cookie = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    set_cookie.split(';').next().map(str::to_string)
}

/// `Location` header of a redirect.
pub fn location(response: &Response<Body>) -> Option<&str> {
    response.headers().get(header::LOCATION)?.to_str().ok()
}

/// Collect a response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
