//! `Gateway` over Supabase's REST endpoints.

use chrono::{Duration, Utc};
use pairdays_core::config::SupabaseConfig;
use pairdays_core::error::{PairDaysError, PairDaysResult};
use pairdays_core::gateway::{AuthSession, Gateway, Query, User};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;
use url::Url;

use crate::postgrest;

/// Cheap to clone: clones share the HTTP connection pool.
#[derive(Clone)]
pub struct SupabaseGateway {
    http: reqwest::Client,
    base: Url,
    anon_key: String,
    access_token: Option<String>,
}

/// GoTrue token endpoint response.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: User,
}

impl From<TokenResponse> for AuthSession {
    fn from(tokens: TokenResponse) -> Self {
        AuthSession {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at: Utc::now() + Duration::seconds(tokens.expires_in),
            user: tokens.user,
        }
    }
}

fn transport(e: reqwest::Error) -> PairDaysError {
    if e.is_timeout() {
        PairDaysError::Gateway("The request timed out".into())
    } else {
        PairDaysError::Gateway(format!("Request failed: {e}"))
    }
}

/// Pull the human-readable message out of an error body. PostgREST uses
/// `message`, GoTrue uses `msg` or `error_description`, Storage uses `message`
/// or `error`.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|key| json.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("Backend returned {status}")
            } else {
                body.trim().to_string()
            }
        })
}

async fn check(response: Response) -> PairDaysResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(status, &body);
    tracing::debug!(%status, %message, "backend rejected request");
    Err(PairDaysError::Gateway(message))
}

/// The token endpoint answers bad credentials and revoked or expired refresh
/// tokens with 400 (older GoTrue versions use 401). Anything else is the
/// service failing, not a verdict on the credentials.
fn grant_error(status: StatusCode, body: &str) -> PairDaysError {
    let message = error_message(status, body);
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            PairDaysError::AuthRejected(message)
        }
        _ => PairDaysError::Gateway(message),
    }
}

async fn json<T: serde::de::DeserializeOwned>(response: Response) -> PairDaysResult<T> {
    response
        .json()
        .await
        .map_err(|e| PairDaysError::Serialization(format!("Unexpected backend response: {e}")))
}

impl SupabaseGateway {
    pub fn new(config: &SupabaseConfig) -> PairDaysResult<Self> {
        // A trailing slash keeps Url::join from dropping a path prefix.
        let mut base = config.url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)
            .map_err(|e| PairDaysError::Config(format!("Invalid Supabase url '{}': {e}", config.url)))?;

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PairDaysError::Config(format!("Could not build HTTP client: {e}")))?;

        Ok(SupabaseGateway {
            http,
            base,
            anon_key: config.anon_key.clone(),
            access_token: None,
        })
    }

    /// Act as the session's user for all following requests.
    pub fn with_session(mut self, session: &AuthSession) -> Self {
        self.access_token = Some(session.access_token.clone());
        self
    }

    fn endpoint(&self, path: &str) -> PairDaysResult<Url> {
        self.base
            .join(path)
            .map_err(|e| PairDaysError::Config(format!("Invalid endpoint {path}: {e}")))
    }

    fn table_url(&self, table: &str) -> PairDaysResult<Url> {
        self.endpoint(&format!("rest/v1/{table}"))
    }

    /// `storage/v1/object[/public]/{bucket}/{key}`, with each key segment
    /// percent-encoded.
    fn object_url(&self, public: bool, bucket: &str, key: &str) -> PairDaysResult<Url> {
        let mut url = self.endpoint("storage/v1/object")?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| PairDaysError::Config("Supabase url cannot be a base".into()))?;
            if public {
                segments.push("public");
            }
            segments.push(bucket);
            segments.extend(key.split('/'));
        }
        Ok(url)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.access_token.as_deref().unwrap_or(&self.anon_key);
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    async fn token_grant(&self, grant_type: &str, body: Value) -> PairDaysResult<AuthSession> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);

        let response = self
            .http
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(%status, grant_type, "token grant refused");
            return Err(grant_error(status, &body));
        }

        let tokens: TokenResponse = json(response).await?;
        Ok(tokens.into())
    }

    /// Exchange a refresh token for a fresh session.
    pub async fn refresh_session(&self, refresh_token: &str) -> PairDaysResult<AuthSession> {
        self.token_grant(
            "refresh_token",
            serde_json::json!({ "refresh_token": refresh_token }),
        )
        .await
    }
}

impl Gateway for SupabaseGateway {
    async fn select(&self, query: &Query) -> PairDaysResult<Vec<Value>> {
        let mut url = self.table_url(&query.table)?;
        postgrest::apply(&mut url, query, true);
        tracing::debug!(%url, "select");

        let response = self
            .authed(self.http.get(url))
            .send()
            .await
            .map_err(transport)?;
        json(check(response).await?).await
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> PairDaysResult<Vec<Value>> {
        let url = self.table_url(table)?;
        tracing::debug!(%url, rows = rows.len(), "insert");

        let response = self
            .authed(self.http.post(url))
            .header("Prefer", "return=representation")
            .json(&rows)
            .send()
            .await
            .map_err(transport)?;
        json(check(response).await?).await
    }

    async fn update(&self, table: &str, id: Uuid, fields: Value) -> PairDaysResult<usize> {
        let mut url = self.table_url(table)?;
        postgrest::apply(&mut url, &Query::table(table).eq("id", id.to_string()), false);
        tracing::debug!(%url, "update");

        let response = self
            .authed(self.http.patch(url))
            .header("Prefer", "return=representation")
            .json(&fields)
            .send()
            .await
            .map_err(transport)?;
        // Row level security hides other couples' rows, so a PATCH that
        // matches nothing still succeeds with an empty body.
        let updated: Vec<Value> = json(check(response).await?).await?;
        Ok(updated.len())
    }

    async fn delete(&self, query: &Query) -> PairDaysResult<usize> {
        let mut url = self.table_url(&query.table)?;
        postgrest::apply(&mut url, query, false);
        tracing::debug!(%url, "delete");

        let response = self
            .authed(self.http.delete(url))
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(transport)?;
        let removed: Vec<Value> = json(check(response).await?).await?;
        Ok(removed.len())
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> PairDaysResult<()> {
        let url = self.object_url(false, bucket, key)?;
        tracing::debug!(%url, size = bytes.len(), "upload");

        let response = self
            .authed(self.http.post(url))
            .header("content-type", content_type)
            .header("cache-control", "max-age=3600")
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await
            .map_err(transport)?;
        check(response).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        match self.object_url(true, bucket, key) {
            Ok(url) => url.to_string(),
            // Only reachable with a cannot-be-a-base url, which `new` rejects.
            Err(_) => format!("{}storage/v1/object/public/{bucket}/{key}", self.base),
        }
    }

    async fn current_user(&self) -> PairDaysResult<Option<User>> {
        if self.access_token.is_none() {
            return Ok(None);
        }

        let url = self.endpoint("auth/v1/user")?;
        let response = self
            .authed(self.http.get(url))
            .send()
            .await
            .map_err(transport)?;

        // An expired or revoked token means "signed out", not a failure.
        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            tracing::debug!("session rejected by auth service");
            return Ok(None);
        }

        let user: User = json(check(response).await?).await?;
        Ok(Some(user))
    }

    async fn sign_in(&self, email: &str, password: &str) -> PairDaysResult<AuthSession> {
        self.token_grant(
            "password",
            serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(url: &str) -> SupabaseGateway {
        SupabaseGateway::new(&SupabaseConfig {
            url: url.to_string(),
            anon_key: "anon".to_string(),
            ..SupabaseConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_public_url() {
        let gw = gateway("https://abc.supabase.co");
        assert_eq!(
            gw.public_url("couple-images", "1234-beach.jpg"),
            "https://abc.supabase.co/storage/v1/object/public/couple-images/1234-beach.jpg"
        );
    }

    #[test]
    fn test_object_url_keeps_path_prefix_and_encodes_key() {
        let gw = gateway("http://localhost:8000/supabase");
        let url = gw.object_url(false, "couple-images", "trips/beach day.jpg").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/supabase/storage/v1/object/couple-images/trips/beach%20day.jpg"
        );
    }

    #[test]
    fn test_table_url() {
        let gw = gateway("https://abc.supabase.co/");
        assert_eq!(
            gw.table_url("daily_messages").unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/daily_messages"
        );
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let result = SupabaseGateway::new(&SupabaseConfig {
            url: "not a url".to_string(),
            ..SupabaseConfig::default()
        });
        assert!(matches!(result, Err(PairDaysError::Config(_))));
    }

    #[test]
    fn test_error_message_extraction() {
        let status = StatusCode::BAD_REQUEST;
        assert_eq!(
            error_message(status, r#"{"code":"23505","message":"duplicate key value"}"#),
            "duplicate key value"
        );
        assert_eq!(
            error_message(status, r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(error_message(status, r#"{"msg":"User not found"}"#), "User not found");
        assert_eq!(error_message(status, "gateway down"), "gateway down");
        assert_eq!(error_message(status, ""), "Backend returned 400 Bad Request");
    }

    #[test]
    fn test_grant_error_separates_rejection_from_outage() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid Refresh Token: Refresh Token Not Found"}"#;
        assert!(matches!(
            grant_error(StatusCode::BAD_REQUEST, body),
            PairDaysError::AuthRejected(m) if m == "Invalid Refresh Token: Refresh Token Not Found"
        ));
        assert!(matches!(
            grant_error(StatusCode::UNAUTHORIZED, ""),
            PairDaysError::AuthRejected(_)
        ));
        assert!(matches!(
            grant_error(StatusCode::INTERNAL_SERVER_ERROR, "upstream down"),
            PairDaysError::Gateway(m) if m == "upstream down"
        ));
        assert!(matches!(
            grant_error(StatusCode::TOO_MANY_REQUESTS, ""),
            PairDaysError::Gateway(_)
        ));
    }

    #[tokio::test]
    async fn test_refresh_against_unreachable_host_is_transport_error() {
        let gw = gateway("http://127.0.0.1:9");
        let result = gw.refresh_session("refresh").await;
        assert!(matches!(result, Err(PairDaysError::Gateway(_))));
    }

    #[tokio::test]
    async fn test_no_token_means_signed_out() {
        let gw = gateway("https://abc.supabase.co");
        assert_eq!(gw.current_user().await.unwrap(), None);
    }
}
