use std::collections::HashMap;
use std::env;
use std::fmt;

use crate::application::ports::snapshot_store::FailurePolicy;
use crate::infrastructure::storage::gist::{GITHUB_API_BASE, GithubAuthScheme};

/// The single storage strategy chosen at startup.
#[derive(Clone)]
pub enum StorageBackend {
    Supabase { url: String, anon_key: String },
    /// Another deployment's `/api/data` handler.
    DataApi { base_url: String },
    GistProxy { proxy_url: String, gist_id: String },
    Gist { gist_id: String, token: String },
    Local,
    /// Settings for the chosen backend are missing; every call fails with this reason.
    Unconfigured { reason: String },
}

impl StorageBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::Supabase { .. } => "supabase",
            StorageBackend::DataApi { .. } => "api",
            StorageBackend::GistProxy { .. } => "gist-proxy",
            StorageBackend::Gist { .. } => "gist",
            StorageBackend::Local => "local",
            StorageBackend::Unconfigured { .. } => "unconfigured",
        }
    }

    pub fn is_snapshot_backed(&self) -> bool {
        matches!(
            self,
            StorageBackend::GistProxy { .. } | StorageBackend::Gist { .. } | StorageBackend::Local
        )
    }
}

// Keeps keys and tokens out of the startup log.
impl fmt::Debug for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Supabase { url, .. } => f
                .debug_struct("Supabase")
                .field("url", url)
                .field("anon_key", &"<redacted>")
                .finish(),
            StorageBackend::DataApi { base_url } => {
                f.debug_struct("DataApi").field("base_url", base_url).finish()
            }
            StorageBackend::GistProxy { proxy_url, gist_id } => f
                .debug_struct("GistProxy")
                .field("proxy_url", proxy_url)
                .field("gist_id", gist_id)
                .finish(),
            StorageBackend::Gist { gist_id, .. } => f
                .debug_struct("Gist")
                .field("gist_id", gist_id)
                .field("token", &"<redacted>")
                .finish(),
            StorageBackend::Local => f.write_str("Local"),
            StorageBackend::Unconfigured { reason } => f
                .debug_struct("Unconfigured")
                .field("reason", reason)
                .finish(),
        }
    }
}

#[derive(Clone)]
pub struct GithubSettings {
    pub api_base: String,
    pub token: Option<String>,
    pub scheme: GithubAuthScheme,
    /// Used by the Gist proxy endpoint when a request names no Gist.
    pub default_gist_id: Option<String>,
}

impl fmt::Debug for GithubSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubSettings")
            .field("api_base", &self.api_base)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("scheme", &self.scheme)
            .field("default_gist_id", &self.default_gist_id)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_port: u16,
    pub storage_backend: StorageBackend,
    pub on_failure: FailurePolicy,
    pub local_store_dir: String,
    pub github: GithubSettings,
}

struct Vars<F: Fn(&str) -> Option<String>> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    /// Trimmed, non-empty value of `name`, falling back to the `VITE_`-prefixed
    /// name the front-end build uses.
    fn get(&self, name: &str) -> Option<String> {
        [name.to_string(), format!("VITE_{name}")]
            .iter()
            .filter_map(|key| (self.lookup)(key))
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
    }

    fn supabase(&self) -> Option<StorageBackend> {
        Some(StorageBackend::Supabase {
            url: self.get("SUPABASE_URL")?,
            anon_key: self.get("SUPABASE_ANON_KEY")?,
        })
    }

    fn data_api(&self) -> Option<StorageBackend> {
        Some(StorageBackend::DataApi {
            base_url: self.get("API_BASE_URL")?,
        })
    }

    /// The proxy URL alone selects the proxy; a missing Gist id surfaces as a
    /// configuration error on the first call.
    fn gist_proxy(&self) -> Option<StorageBackend> {
        Some(StorageBackend::GistProxy {
            proxy_url: self.get("API_PROXY_URL")?,
            gist_id: self.get("GIST_ID").unwrap_or_default(),
        })
    }

    fn gist(&self) -> Option<StorageBackend> {
        Some(StorageBackend::Gist {
            gist_id: self.get("GIST_ID")?,
            token: self.get("GITHUB_TOKEN")?,
        })
    }
}

fn missing(reason: &str, policy: FailurePolicy) -> StorageBackend {
    match policy {
        FailurePolicy::Fail => StorageBackend::Unconfigured {
            reason: reason.to_string(),
        },
        FailurePolicy::FallbackLocal => {
            tracing::warn!(reason, "storage_not_configured_using_local_store");
            StorageBackend::Local
        }
    }
}

fn resolve_backend<F: Fn(&str) -> Option<String>>(
    vars: &Vars<F>,
    policy: FailurePolicy,
) -> anyhow::Result<StorageBackend> {
    const SUPABASE: &str =
        "Supabase is not configured, set SUPABASE_URL and SUPABASE_ANON_KEY";
    const DATA_API: &str = "API is not configured, set API_BASE_URL";
    const GIST_PROXY: &str = "Gist proxy is not configured, set API_PROXY_URL";
    const GIST: &str = "GitHub Gist is not configured, set GIST_ID and GITHUB_TOKEN";

    let explicit = vars.get("STORAGE_BACKEND").map(|v| v.to_ascii_lowercase());
    let backend = match explicit.as_deref() {
        Some("supabase") => vars.supabase().unwrap_or_else(|| missing(SUPABASE, policy)),
        Some("api") => vars.data_api().unwrap_or_else(|| missing(DATA_API, policy)),
        Some("gist-proxy") => vars.gist_proxy().unwrap_or_else(|| missing(GIST_PROXY, policy)),
        Some("gist") => vars.gist().unwrap_or_else(|| missing(GIST, policy)),
        Some("local") => StorageBackend::Local,
        Some(other) => anyhow::bail!(
            "unknown STORAGE_BACKEND `{other}` (expected supabase, api, gist-proxy, gist or local)"
        ),
        // Inferred once here, never at call sites.
        None => vars
            .supabase()
            .or_else(|| vars.data_api())
            .or_else(|| vars.gist_proxy())
            .or_else(|| vars.gist())
            .unwrap_or_else(|| missing(SUPABASE, policy)),
    };
    Ok(backend)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_map(map: &HashMap<String, String>) -> anyhow::Result<Self> {
        Self::from_lookup(|key| map.get(key).cloned())
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> anyhow::Result<Self> {
        let vars = Vars { lookup };

        let api_port = vars
            .get("API_PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(8888);
        let on_failure = match vars.get("STORAGE_ON_FAILURE") {
            Some(raw) => FailurePolicy::parse(&raw).ok_or_else(|| {
                anyhow::anyhow!("STORAGE_ON_FAILURE must be `fail` or `fallback-local`, got `{raw}`")
            })?,
            None => FailurePolicy::default(),
        };
        let scheme = match vars.get("GITHUB_AUTH_SCHEME") {
            Some(raw) => GithubAuthScheme::parse(&raw).ok_or_else(|| {
                anyhow::anyhow!("GITHUB_AUTH_SCHEME must be `bearer` or `token`, got `{raw}`")
            })?,
            None => GithubAuthScheme::default(),
        };
        let github = GithubSettings {
            api_base: vars
                .get("GITHUB_API_URL")
                .unwrap_or_else(|| GITHUB_API_BASE.to_string()),
            token: vars.get("GITHUB_TOKEN"),
            scheme,
            default_gist_id: vars.get("GIST_ID"),
        };
        let local_store_dir = vars
            .get("LOCAL_STORE_DIR")
            .unwrap_or_else(|| "./data".into());
        let storage_backend = resolve_backend(&vars, on_failure)?;

        Ok(Self {
            api_port,
            storage_backend,
            on_failure,
            local_store_dir,
            github,
        })
    }
}
