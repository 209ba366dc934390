use std::env;

/// AppConfig
///
/// Holds the application's entire configuration state. This struct is
/// designed to be immutable once loaded, ensuring consistency across all
/// threads and services. It is pulled into the application state via FromRef.
///
/// Both backend keys live here so that request handling never touches
/// process-wide environment state: the anon key serves session resolution and
/// sign-in, the service-role key serves the administrative registration and
/// profile-table calls. They are injected into the backend client at
/// construction.
#[derive(Clone)]
pub struct AppConfig {
    // Base URL of the hosted auth/database backend (Supabase project URL).
    pub backend_url: String,
    // Publishable key, sent with requests made on behalf of a visitor.
    pub anon_key: String,
    // Privileged key for the admin user-creation and profile-table calls.
    pub service_role_key: String,
    // Runtime environment marker. Controls log format selection.
    pub env: Env,
}

/// Env
///
/// Defines the runtime context, used to switch between development defaults
/// and hardened production configuration.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Provides a safe, non-panicking AppConfig instance primarily used for
    /// test setup. This allows tests to build application state without
    /// setting environment variables first.
    fn default() -> Self {
        Self {
            // Default local Supabase stack endpoint.
            backend_url: "http://localhost:54321".to_string(),
            anon_key: "local-anon-key".to_string(),
            service_role_key: "local-service-role-key".to_string(),
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// The canonical function for initializing the application configuration
    /// at startup. It reads all parameters from environment variables and
    /// implements the **fail-fast** principle.
    ///
    /// # Panics
    /// Panics if a critical environment variable required for the current
    /// runtime environment (especially Production) is not found. This
    /// prevents the application from starting with an incomplete or insecure
    /// configuration.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        match env {
            Env::Local => Self {
                env: Env::Local,
                // Local development talks to a local Supabase stack unless
                // pointed elsewhere.
                backend_url: env::var("SUPABASE_URL")
                    .unwrap_or_else(|_| "http://localhost:54321".to_string()),
                anon_key: env::var("SUPABASE_ANON_KEY")
                    .unwrap_or_else(|_| "local-anon-key".to_string()),
                service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                    .unwrap_or_else(|_| "local-service-role-key".to_string()),
            },
            Env::Production => Self {
                env: Env::Production,
                // Production demands explicit setting of every backend secret.
                backend_url: env::var("SUPABASE_URL")
                    .expect("FATAL: SUPABASE_URL required in prod"),
                anon_key: env::var("SUPABASE_ANON_KEY")
                    .expect("FATAL: SUPABASE_ANON_KEY required in prod"),
                service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                    .expect("FATAL: SUPABASE_SERVICE_ROLE_KEY required in prod"),
            },
        }
    }
}
