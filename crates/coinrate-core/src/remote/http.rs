//! JSON-over-HTTP remote backend.
//!
//! Endpoints, relative to the configured base URL:
//!
//! ```text
//! POST   auth/signup                  {email, password}
//! POST   auth/signin                  {email, password} -> {user_id, token}
//! POST   auth/signout
//! GET    users/{uid}/entries          -> [Entry]
//! PUT    users/{uid}/entries/{ts}     Entry
//! DELETE users/{uid}/entries/{ts}
//! DELETE users/{uid}/entries
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use super::{AuthProvider, RemoteStore, Session};
use crate::entry::Entry;
use crate::error::RemoteError;

pub struct HttpRemote {
    client: Client,
    base: Url,
}

#[derive(Deserialize)]
struct SignInResponse {
    user_id: String,
    token: String,
}

impl HttpRemote {
    /// # Errors
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        Ok(self.base.join(path)?)
    }

    fn entries_url(&self, session: &Session) -> Result<Url, RemoteError> {
        self.endpoint(&format!(
            "users/{}/entries",
            urlencoding::encode(&session.user_id)
        ))
    }

    fn entry_url(&self, session: &Session, ts: i64) -> Result<Url, RemoteError> {
        self.endpoint(&format!(
            "users/{}/entries/{ts}",
            urlencoding::encode(&session.user_id)
        ))
    }

    /// Turn a non-success response into an error carrying the body text.
    async fn check(resp: Response) -> Result<Response, RemoteError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(RemoteError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl AuthProvider for HttpRemote {
    async fn sign_up(&self, email: &str, password: &str) -> Result<(), RemoteError> {
        let resp = self
            .client
            .post(self.endpoint("auth/signup")?)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, RemoteError> {
        let resp = self
            .client
            .post(self.endpoint("auth/signin")?)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        if matches!(resp.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            let message = resp.text().await.unwrap_or_default();
            return Err(RemoteError::AuthFailed(message));
        }
        let body: SignInResponse = Self::check(resp).await?.json().await?;
        let session = Session {
            user_id: body.user_id,
            email: email.to_string(),
            token: body.token,
        };
        session.ensure_valid()?;
        Ok(session)
    }

    async fn sign_out(&self, session: &Session) -> Result<(), RemoteError> {
        session.ensure_valid()?;
        let resp = self
            .client
            .post(self.endpoint("auth/signout")?)
            .bearer_auth(&session.token)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn upload(&self, session: &Session, entries: &[Entry]) -> Result<(), RemoteError> {
        session.ensure_valid()?;
        for entry in entries {
            let resp = self
                .client
                .put(self.entry_url(session, entry.ts)?)
                .bearer_auth(&session.token)
                .json(entry)
                .send()
                .await?;
            Self::check(resp).await?;
        }
        debug!(count = entries.len(), "uploaded entries");
        Ok(())
    }

    async fn fetch_all(&self, session: &Session) -> Result<Vec<Entry>, RemoteError> {
        session.ensure_valid()?;
        let resp = self
            .client
            .get(self.entries_url(session)?)
            .bearer_auth(&session.token)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn delete_one(&self, session: &Session, ts: i64) -> Result<(), RemoteError> {
        session.ensure_valid()?;
        let resp = self
            .client
            .delete(self.entry_url(session, ts)?)
            .bearer_auth(&session.token)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check(resp).await?;
        Ok(())
    }

    async fn delete_all(&self, session: &Session) -> Result<(), RemoteError> {
        session.ensure_valid()?;
        let resp = self
            .client
            .delete(self.entries_url(session)?)
            .bearer_auth(&session.token)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            user_id: "u 1".into(),
            email: "a@example.com".into(),
            token: "tok".into(),
        }
    }

    #[test]
    fn urls_are_relative_to_base_path() {
        let remote = HttpRemote::new("http://localhost:9000/api").unwrap();
        assert_eq!(
            remote.entry_url(&session(), 42).unwrap().as_str(),
            "http://localhost:9000/api/users/u%201/entries/42"
        );
        assert_eq!(
            remote.entries_url(&session()).unwrap().as_str(),
            "http://localhost:9000/api/users/u%201/entries"
        );
    }

    #[test]
    fn relative_base_url_is_rejected() {
        assert!(matches!(HttpRemote::new("not a url"), Err(RemoteError::Url(_))));
    }

    #[tokio::test]
    async fn empty_session_fails_before_any_request() {
        let remote = HttpRemote::new("http://127.0.0.1:9").unwrap();
        let empty = Session {
            user_id: String::new(),
            email: String::new(),
            token: String::new(),
        };
        assert!(matches!(
            remote.fetch_all(&empty).await,
            Err(RemoteError::NotAuthenticated)
        ));
        assert!(matches!(
            remote.delete_one(&empty, 1).await,
            Err(RemoteError::NotAuthenticated)
        ));
    }
}
