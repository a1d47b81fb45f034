use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as JsonValue;
use tracing::{instrument, warn};

use crate::config::Config;
use crate::error::{Error, Result};

pub mod endpoints {
    pub const CALENDAR_EVENTS: &str = "/api/hr/attendance-calendar/events";
    pub const CALENDAR_DEPARTMENTS: &str = "/api/hr/attendance-calendar/departments";
    pub const HR_MEETINGS: &str = "/api/hr/meetings";
    pub const TEAM_LEADER_MEETINGS: &str = "/api/team-leader/meetings";
    pub const HIRING_JOBS: &str = "/api/hr/hiring/jobs";
    pub const HIRING_ONBOARD: &str = "/api/hr/hiring/onboard";
    pub const SALES_EMPLOYEES: &str = "/api/hr/sales-employees/fetch-data";
    pub const FARMERS: &str = "/api/project-manager/farmers";
    pub const TEAMS_BY_EMPLOYEE: &str = "/api/tl/teams/employee";
}

const ENVELOPE_META_KEYS: [&str; 5] = ["success", "message", "count", "total", "status"];

/// JSON client for the HR backend. Every call is a single request: no retries.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    session_cookie: Option<String>,
}

impl BackendClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
            session_cookie: config.api_session_cookie.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header(header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(cookie) = &self.session_cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
    }

    #[instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path).send().await?;
        decode(response).await
    }

    /// Like [`get`](Self::get) for collections; a `null` body is an empty list.
    #[instrument(skip(self))]
    pub async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let response = self.request(Method::GET, path).send().await?;
        let data = unwrap_envelope(read_body(response).await?)?;
        if data.is_null() {
            return Ok(Vec::new());
        }
        from_data(data)
    }

    #[instrument(skip(self, body))]
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(Method::POST, path).json(body).send().await?;
        decode(response).await
    }

    #[instrument(skip(self, body))]
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(Method::PUT, path).json(body).send().await?;
        decode(response).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, path: &str) -> Result<()> {
        let response = self.request(Method::DELETE, path).send().await?;
        unwrap_envelope(read_body(response).await?)?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let data = unwrap_envelope(read_body(response).await?)?;
    from_data(data)
}

fn from_data<T: DeserializeOwned>(data: JsonValue) -> Result<T> {
    serde_json::from_value(data).map_err(|e| {
        warn!(error = %e, "Backend response did not match the expected shape");
        Error::Internal(format!("Unexpected backend response: {}", e))
    })
}

async fn read_body(response: Response) -> Result<JsonValue> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let message = error_message(&text)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "request failed".to_string());
        warn!(status = status.as_u16(), %message, "Backend returned an error status");
        return Err(Error::Upstream {
            status: status.as_u16(),
            message,
        });
    }

    if text.trim().is_empty() {
        return Ok(JsonValue::Null);
    }
    serde_json::from_str(&text).map_err(|e| Error::Internal(format!("Backend sent invalid JSON: {}", e)))
}

fn error_message(body: &str) -> Option<String> {
    let value: JsonValue = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(JsonValue::as_str))
        .map(str::to_string)
}

/// Strips the `{success, data, message}` wrapper some endpoints use.
///
/// `success: false` becomes [`Error::Rejected`]. With `success: true` the payload is
/// `data` when present, otherwise the single remaining non-meta field when it holds an
/// object or list (`{success: true, events: [...]}`), otherwise the object itself so a
/// bare `{success: true, id}` keeps its id.
pub fn unwrap_envelope(value: JsonValue) -> Result<JsonValue> {
    let mut map = match value {
        JsonValue::Object(map) => map,
        other => return Ok(other),
    };

    match map.get("success").and_then(JsonValue::as_bool) {
        Some(false) => {
            let message = ["message", "error"]
                .iter()
                .find_map(|key| map.get(*key).and_then(JsonValue::as_str))
                .unwrap_or("Request was not successful")
                .to_string();
            warn!(%message, "Backend reported failure");
            Err(Error::Rejected(message))
        }
        Some(true) => {
            if let Some(data) = map.remove("data") {
                return Ok(data);
            }
            for key in ENVELOPE_META_KEYS {
                map.remove(key);
            }
            let collapsible = map.len() == 1
                && map
                    .values()
                    .all(|inner| inner.is_object() || inner.is_array());
            if collapsible {
                if let Some((_, inner)) = map.clone().into_iter().next() {
                    return Ok(inner);
                }
            }
            Ok(JsonValue::Object(map))
        }
        None => match map.remove("data") {
            Some(data) if map.is_empty() => Ok(data),
            Some(data) => {
                map.insert("data".to_string(), data);
                Ok(JsonValue::Object(map))
            }
            None => Ok(JsonValue::Object(map)),
        },
    }
}

/// Writes answer with the stored record, a bare `{id}` or nothing at all. Anything
/// that is not a full record is handed to `fallback` with whatever id it carried.
pub fn saved_record<T, F>(value: JsonValue, fallback: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce(Option<String>) -> T,
{
    let id = ["_id", "id"]
        .iter()
        .find_map(|key| value.get(*key).and_then(JsonValue::as_str))
        .map(str::to_string);
    serde_json::from_value(value).unwrap_or_else(|_| fallback(id))
}
