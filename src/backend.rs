use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::BackendError,
    models::{Identity, Profile, Role, Session, UpdateProfileRequest},
};

/// Name of the cookie this application uses to carry the backend access
/// token between requests. Set on login, cleared on logout, read by the
/// session resolver.
pub const SESSION_COOKIE: &str = "sb-access-token";

/// access_token_from_cookies
///
/// Pulls the session access token out of a raw Cookie header, if present.
/// Absence is the normal anonymous case, not an error.
pub fn access_token_from_cookies(cookie_header: Option<&str>) -> Option<String> {
    let header = cookie_header?;
    header.split(';').map(str::trim).find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

/// SignedIn
///
/// Result of a successful credential check: the verified identity plus the
/// access token the client must present on subsequent requests.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: Identity,
    pub access_token: String,
}

/// AuthBackend Trait
///
/// The abstract contract for every operation delegated to the hosted
/// auth/database backend. Handlers, the request guard, and the page views
/// depend only on this trait, which keeps the whole application testable
/// against an injected fake.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn AuthBackend>`) safely shareable across Axum's asynchronous task
/// boundaries.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    // --- Session Resolution ---
    /// Resolves the session carried by the request's Cookie header. An
    /// anonymous session is a valid, non-error outcome; transport failures
    /// degrade to anonymous as well.
    async fn get_session(&self, cookie_header: Option<&str>) -> Session;

    /// Fetches the stored role for a user id. `None` covers both "no profile
    /// row" and "lookup failed"; callers treat either as the lowest
    /// privilege.
    async fn get_role(&self, user_id: Uuid) -> Option<Role>;

    // --- Credential Flow ---
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, BackendError>;
    /// Terminates the session carried by the Cookie header. Succeeds when no
    /// session is present at all.
    async fn sign_out(&self, cookie_header: Option<&str>) -> Result<(), BackendError>;

    // --- Registration ---
    /// Creates a new identity. With `defer_confirmation` the account starts
    /// unconfirmed and the backend owns the verification email flow. The
    /// requested role travels in the identity's metadata.
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
        defer_confirmation: bool,
        role: Role,
    ) -> Result<Identity, BackendError>;

    /// Creates the companion profile record keyed by the new identity's id.
    async fn create_profile_record(&self, user_id: Uuid, role: Role) -> Result<(), BackendError>;

    // --- Profile Records ---
    async fn read_profile(&self, user_id: Uuid) -> Result<Profile, BackendError>;
    /// Overwrites the provided fields and stamps `updated_at`.
    async fn update_profile(
        &self,
        user_id: Uuid,
        fields: UpdateProfileRequest,
    ) -> Result<Profile, BackendError>;
}

/// BackendState
///
/// The concrete type used to share backend access across the application
/// state.
pub type BackendState = Arc<dyn AuthBackend>;

// --- Supabase Wire Schemas (private) ---

/// Minimal view of the user object returned by the auth endpoints.
#[derive(Debug, Deserialize)]
struct BackendUser {
    id: Uuid,
    email: Option<String>,
    created_at: DateTime<Utc>,
    email_confirmed_at: Option<DateTime<Utc>>,
}

impl From<BackendUser> for Identity {
    fn from(user: BackendUser) -> Self {
        Identity {
            id: user.id,
            email: user.email.unwrap_or_default(),
            created_at: user.created_at,
            email_confirmed_at: user.email_confirmed_at,
        }
    }
}

/// Response of the password-grant token endpoint.
#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
    user: BackendUser,
}

/// Single-column projection used by the role lookup.
#[derive(Debug, Deserialize)]
struct RoleRow {
    role: Role,
}

/// Error body shape the backend uses for auth failures.
#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    #[serde(alias = "error_description", alias = "message")]
    msg: Option<String>,
}

// --- The Real Implementation (Supabase) ---

/// SupabaseBackend
///
/// The concrete implementation speaking to a Supabase project: GoTrue under
/// `/auth/v1` for identities and sessions, PostgREST under `/rest/v1` for the
/// `profiles` table. Credentials come from AppConfig at construction; nothing
/// here reads the process environment.
#[derive(Clone)]
pub struct SupabaseBackend {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    service_role_key: String,
}

impl SupabaseBackend {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            service_role_key: config.service_role_key.clone(),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.base_url, path)
    }

    fn profiles_url(&self, query: &str) -> String {
        format!("{}/rest/v1/profiles{}", self.base_url, query)
    }

    /// Extracts the backend's failure message from an error response body,
    /// falling back to the bare status code.
    async fn rejection_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<BackendErrorBody>().await {
            Ok(body) => body.msg.unwrap_or_else(|| status.to_string()),
            Err(_) => status.to_string(),
        }
    }
}

#[async_trait]
impl AuthBackend for SupabaseBackend {
    /// get_session
    ///
    /// Presents the cookie-borne access token to the backend's user endpoint.
    /// The backend owns token verification; this crate never decodes tokens
    /// locally. Any failure resolves to the anonymous session.
    async fn get_session(&self, cookie_header: Option<&str>) -> Session {
        let Some(token) = access_token_from_cookies(cookie_header) else {
            return Session::anonymous();
        };

        let response = self
            .http
            .get(self.auth_url("/user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&token)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => match resp.json::<BackendUser>().await {
                Ok(user) => Session::authenticated(user.into()),
                Err(e) => {
                    tracing::warn!("unreadable session response: {e}");
                    Session::anonymous()
                }
            },
            Ok(_) => Session::anonymous(),
            Err(e) => {
                tracing::warn!("session lookup failed: {e}");
                Session::anonymous()
            }
        }
    }

    /// get_role
    ///
    /// Reads the role column of the user's profile row. A missing row, an
    /// unreadable response, and a transport failure all resolve to `None`;
    /// callers route that to the lowest-privilege page.
    async fn get_role(&self, user_id: Uuid) -> Option<Role> {
        let url = self.profiles_url(&format!("?user_id=eq.{user_id}&select=role"));
        let response = self
            .http
            .get(url)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .header("Accept", "application/vnd.pgrst.object+json")
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                resp.json::<RoleRow>().await.ok().map(|row| row.role)
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(%user_id, "role lookup failed: {e}");
                None
            }
        }
    }

    /// sign_in
    ///
    /// Password-grant token request. Any 4xx collapses into
    /// `InvalidCredentials`; only the caller-facing message distinguishes
    /// nothing about the account's existence.
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, BackendError> {
        let response = self
            .http
            .post(self.auth_url("/token?grant_type=password"))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            return Err(BackendError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(BackendError::Response(status.to_string()));
        }

        let grant = response
            .json::<TokenGrant>()
            .await
            .map_err(|e| BackendError::Response(e.to_string()))?;

        Ok(SignedIn {
            user: grant.user.into(),
            access_token: grant.access_token,
        })
    }

    /// sign_out
    ///
    /// Revokes the cookie-borne token. Idempotent: no token, or a token the
    /// backend no longer recognizes, is success.
    async fn sign_out(&self, cookie_header: Option<&str>) -> Result<(), BackendError> {
        let Some(token) = access_token_from_cookies(cookie_header) else {
            return Ok(());
        };

        let response = self
            .http
            .post(self.auth_url("/logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&token)
            .send()
            .await?;

        let status = response.status();
        // A stale or already-revoked token still counts as signed out.
        if status.is_success() || status == reqwest::StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            Err(BackendError::Rejected(
                Self::rejection_message(response).await,
            ))
        }
    }

    /// create_identity
    ///
    /// Administrative user creation. `defer_confirmation` leaves the account
    /// unconfirmed so the backend sends its verification email; the requested
    /// role is recorded in the identity's metadata.
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
        defer_confirmation: bool,
        role: Role,
    ) -> Result<Identity, BackendError> {
        let response = self
            .http
            .post(self.auth_url("/admin/users"))
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "email_confirm": !defer_confirmation,
                "user_metadata": { "role": role.as_str() },
            }))
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            return Err(BackendError::Rejected(
                Self::rejection_message(response).await,
            ));
        }
        if !status.is_success() {
            return Err(BackendError::Response(status.to_string()));
        }

        let user = response
            .json::<BackendUser>()
            .await
            .map_err(|e| BackendError::Response(e.to_string()))?;

        Ok(user.into())
    }

    /// create_profile_record
    ///
    /// Inserts the companion profile row for a freshly created identity.
    async fn create_profile_record(&self, user_id: Uuid, role: Role) -> Result<(), BackendError> {
        let response = self
            .http
            .post(self.profiles_url(""))
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({ "user_id": user_id, "role": role.as_str() }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(BackendError::Rejected(
                Self::rejection_message(response).await,
            ))
        }
    }

    /// read_profile
    ///
    /// Fetches the single profile row keyed by the user id.
    async fn read_profile(&self, user_id: Uuid) -> Result<Profile, BackendError> {
        let url = self.profiles_url(&format!("?user_id=eq.{user_id}&select=*"));
        let response = self
            .http
            .get(url)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .header("Accept", "application/vnd.pgrst.object+json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Response(status.to_string()));
        }

        response
            .json::<Profile>()
            .await
            .map_err(|e| BackendError::Response(e.to_string()))
    }

    /// update_profile
    ///
    /// Partial overwrite of the profile's display fields. Only fields present
    /// in the payload reach the backend; `updated_at` is stamped here so every
    /// successful update moves the timestamp.
    async fn update_profile(
        &self,
        user_id: Uuid,
        fields: UpdateProfileRequest,
    ) -> Result<Profile, BackendError> {
        let mut patch = serde_json::to_value(&fields)
            .map_err(|e| BackendError::Response(e.to_string()))?;
        patch["updated_at"] = serde_json::json!(Utc::now());

        let url = self.profiles_url(&format!("?user_id=eq.{user_id}"));
        let response = self
            .http
            .patch(url)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .header("Prefer", "return=representation")
            .header("Accept", "application/vnd.pgrst.object+json")
            .json(&patch)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Response(status.to_string()));
        }

        response
            .json::<Profile>()
            .await
            .map_err(|e| BackendError::Response(e.to_string()))
    }
}
