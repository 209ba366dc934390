use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Identity & Session Schemas ---

/// Role
///
/// The RBAC field attached to a profile record by the hosted backend.
/// Serialized lowercase to match the stored values. `author` and `admin`
/// share the dashboard; `user` is the default for new registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    #[default]
    User,
    Author,
    Admin,
}

impl Role {
    /// True for the roles allowed onto the dashboard pages.
    pub fn can_access_dashboard(self) -> bool {
        matches!(self, Role::Author | Role::Admin)
    }

    /// The lowercase wire form, matching the stored column values.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Author => "author",
            Role::Admin => "admin",
        }
    }
}

/// Identity
///
/// The externally-verified user record, as returned by the hosted auth
/// backend. This crate never mints or mutates identities on its own; it only
/// relays what the backend resolved from the request's credentials.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Identity {
    // Primary key in the backend's auth schema; also keys the profile record.
    pub id: Uuid,
    pub email: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    /// Set once the user has confirmed their email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub email_confirmed_at: Option<DateTime<Utc>>,
}

/// Session
///
/// Per-request evidence of an authenticated identity, derived from the
/// request cookies by the hosted backend. Lives for one request; never
/// persisted here. An anonymous session is a valid, non-error state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub identity: Option<Identity>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

/// Profile
///
/// The companion record keyed by identity id, holding the role and the
/// optional display fields a user can edit.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Profile {
    pub id: Uuid,
    // FK to the backend's auth user id.
    pub user_id: Uuid,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// LoginRequest
///
/// Input payload for POST /api/auth/login. The password is passed through to
/// the external auth backend and never persisted or logged here.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// RegisterRequest
///
/// Input payload for POST /api/auth/register. The role defaults to `user`
/// when omitted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// UpdateProfileRequest
///
/// Partial update payload for PUT /api/user/profile. Only fields present in
/// the JSON body are overwritten; `updated_at` is stamped on every update.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

// --- Response Payloads (Output Schemas) ---

/// LoginData
///
/// Payload of a successful login: the resolved identity plus the page the
/// client should navigate to, computed from the user's role.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginData {
    pub user: Identity,
    pub redirect_to: String,
}

/// RegisterData
///
/// Payload of a successful registration: the id the backend assigned to the
/// new identity.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterData {
    pub user_id: Uuid,
}

/// ProfileData
///
/// Payload of GET /api/user/profile: the session identity together with its
/// profile record.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ProfileData {
    pub user: Identity,
    pub profile: Profile,
}

// --- Uniform Response Envelope ---

/// ApiResponse
///
/// The envelope every API route answers with:
/// `{ success, data?, error?, message? }`. Absent fields are omitted from the
/// JSON rather than serialized as null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    /// A success envelope that carries only a human-readable message.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            message: Some(message.into()),
        }
    }

    /// A failure envelope. The error string is what the client sees; any
    /// server-side detail belongs in the logs, not here.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }
}
