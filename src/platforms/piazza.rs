//! Piazza client (blocking).
//!
//! Login goes through the web form; everything else is Piazza's JSON-RPC
//! endpoint `logic/api`, authenticated by the session cookie and a `CSRF-Token`
//! header carrying the session id.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::Url;
use serde_json::{json, Value};

use super::{Credentials, DiscussionClass, DiscussionPlatform, DiscussionUser, PlatformError};

const PLATFORM: &str = "Piazza";
const SESSION_COOKIE: &str = "session_id";

/// Logged-in Piazza session.
pub struct PiazzaClient {
    http: Client,
    jar: Arc<Jar>,
    base_url: Url,
}

impl PiazzaClient {
    /// Log in and return a ready client.
    ///
    /// # Errors
    /// Returns [`PlatformError::Auth`] when the credentials are refused.
    pub fn login(base_url: &str, credentials: &Credentials) -> Result<Self, PlatformError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| PlatformError::Parse(format!("invalid {PLATFORM} URL {base_url}: {e}")))?;
        let jar = Arc::new(Jar::default());
        let http = Client::builder()
            .user_agent(format!("gstools/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        crate::debug!("Logging in to {PLATFORM} as {}", credentials.email);
        let body = http
            .post(join(&base_url, "class")?)
            .form(&[
                ("from", "/signup"),
                ("email", credentials.email.as_str()),
                ("password", credentials.password.as_str()),
                ("remember", "on"),
            ])
            .send()?
            .error_for_status()?
            .text()?;

        if body.contains("Email or password incorrect") {
            return Err(PlatformError::Auth {
                platform: PLATFORM,
                reason: "Email or password incorrect".to_string(),
            });
        }

        let client = Self {
            http,
            jar,
            base_url,
        };
        if client.session_id().is_none() {
            return Err(PlatformError::Auth {
                platform: PLATFORM,
                reason: "no session cookie was issued".to_string(),
            });
        }
        crate::info!("Connected to {PLATFORM}");
        Ok(client)
    }

    fn session_id(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base_url)?;
        session_from_cookie_header(header.to_str().ok()?)
    }

    /// Call a JSON-RPC method and return its `result`
    fn rpc(&self, method: &str, params: Value) -> Result<Value, PlatformError> {
        let mut url = join(&self.base_url, "logic/api")?;
        url.query_pairs_mut().append_pair("method", method);

        crate::debug!("{PLATFORM} RPC {method}");
        let mut request = self
            .http
            .post(url)
            .json(&json!({ "method": method, "params": params }));
        if let Some(session) = self.session_id() {
            request = request.header("CSRF-Token", session);
        }
        let reply: Value = request.send()?.error_for_status()?.json()?;
        rpc_result(method, reply)
    }
}

impl DiscussionPlatform for PiazzaClient {
    fn list_classes(&self) -> Result<Vec<DiscussionClass>, PlatformError> {
        let status = self.rpc("user.status", json!({}))?;
        parse_classes(&status)
    }

    fn list_users(&self, class_id: &str) -> Result<Vec<DiscussionUser>, PlatformError> {
        let users = self.rpc("network.get_all_users", json!({ "nid": class_id }))?;
        parse_users(&users)
    }
}

fn join(base: &Url, path: &str) -> Result<Url, PlatformError> {
    base.join(path)
        .map_err(|e| PlatformError::Parse(format!("invalid {PLATFORM} URL: {e}")))
}

fn session_from_cookie_header(header: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Unwrap a JSON-RPC reply `{ "result": ..., "error": ... }`
fn rpc_result(method: &str, mut reply: Value) -> Result<Value, PlatformError> {
    match reply.get("error") {
        None | Some(Value::Null) => {}
        Some(Value::String(message)) => {
            return Err(PlatformError::Rejected(format!("{method}: {message}")));
        }
        Some(other) => return Err(PlatformError::Rejected(format!("{method}: {other}"))),
    }
    match reply.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(PlatformError::Parse(format!("{method}: reply has no result"))),
    }
}

/// Classes from a `user.status` result.
///
/// The user counts as TA of a class when their id is in its `prof_hash`.
fn parse_classes(status: &Value) -> Result<Vec<DiscussionClass>, PlatformError> {
    let uid = status["id"].as_str().unwrap_or_default();
    let networks = status["networks"]
        .as_array()
        .ok_or_else(|| PlatformError::Parse("user.status: no networks".to_string()))?;

    Ok(networks
        .iter()
        .filter_map(|network| {
            let id = network["id"].as_str()?.to_string();
            let number = network["course_number"]
                .as_str()
                .filter(|num| !num.is_empty())
                .or_else(|| network["name"].as_str())
                .unwrap_or_default()
                .to_string();
            let is_ta = network["prof_hash"]
                .as_object()
                .is_some_and(|profs| profs.contains_key(uid));
            Some(DiscussionClass {
                id,
                number,
                term: network["term"].as_str().unwrap_or_default().to_string(),
                is_ta,
            })
        })
        .collect())
}

/// Users from a `network.get_all_users` result
fn parse_users(users: &Value) -> Result<Vec<DiscussionUser>, PlatformError> {
    let users = users
        .as_array()
        .ok_or_else(|| PlatformError::Parse("network.get_all_users: expected a list".to_string()))?;

    Ok(users
        .iter()
        .map(|user| DiscussionUser {
            name: user["name"].as_str().unwrap_or_default().to_string(),
            email: user["email"].as_str().unwrap_or_default().to_string(),
            role: user["role"].as_str().unwrap_or_default().to_string(),
        })
        .collect())
}
