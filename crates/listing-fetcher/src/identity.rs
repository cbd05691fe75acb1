//! Browser identities and the pool they are drawn from.
//!
//! Every request gets a freshly sampled [`RequestIdentity`]. Sampling is
//! uniform over each list in the [`IdentityPool`]; the pool itself is plain
//! data owned by the fetcher, so there is no global generator to reset.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Compression schemes a desktop browser advertises.
pub const DEFAULT_ACCEPT_ENCODING: &str = "gzip, deflate, br";

/// Accept header sent by browsers for top-level navigations.
pub const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Generic search-engine referral.
pub const DEFAULT_REFERERS: &[&str] = &["https://www.google.com/"];

pub const DEFAULT_ACCEPT_LANGUAGES: &[&str] = &[
    "en-US,en;q=0.9",
    "en-US,en;q=0.8",
    "en-GB,en;q=0.9,en-US;q=0.8",
];

/// Current desktop signatures for Chrome, Edge, Firefox and Safari.
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.7; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:132.0) Gecko/20100101 Firefox/132.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.1 Safari/605.1.15",
];

/// Substrings that give away an HTTP library instead of a browser.
const LIBRARY_MARKERS: &[&str] = &[
    "reqwest",
    "python-requests",
    "python-urllib",
    "aiohttp",
    "curl/",
    "wget",
    "go-http-client",
    "okhttp",
    "libwww",
    "java/",
    "axios",
    "node-fetch",
];

/// Header set presented to the target for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestIdentity {
    pub user_agent: String,
    pub accept_language: String,
    pub referer: String,
    pub accept_encoding: String,
    pub accept: String,
}

impl RequestIdentity {
    /// Headers in the order a browser sends them.
    pub fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("User-Agent".to_string(), self.user_agent.clone()),
            ("Accept".to_string(), self.accept.clone()),
            ("Accept-Language".to_string(), self.accept_language.clone()),
            ("Accept-Encoding".to_string(), self.accept_encoding.clone()),
            ("Referer".to_string(), self.referer.clone()),
        ]
    }
}

/// Validated lists that identities are sampled from.
///
/// All lists are non-empty once constructed, so [`IdentityPool::sample`]
/// always yields a complete identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityPool {
    user_agents: Vec<String>,
    accept_languages: Vec<String>,
    referers: Vec<String>,
    accept_encoding: String,
    accept: String,
}

impl IdentityPool {
    /// Build a pool, rejecting anything that would produce an empty or
    /// library-identifying header.
    pub fn new(
        user_agents: Vec<String>,
        accept_languages: Vec<String>,
        referers: Vec<String>,
        accept_encoding: String,
        accept: String,
    ) -> Result<Self, ConfigError> {
        require_list("user_agents", &user_agents)?;
        require_list("accept_languages", &accept_languages)?;
        require_list("referers", &referers)?;
        require_value("accept_encoding", &accept_encoding)?;
        require_value("accept", &accept)?;

        for ua in &user_agents {
            if !ua.starts_with("Mozilla/") {
                return Err(ConfigError::Invalid(format!(
                    "user agent does not look like a browser: {ua}"
                )));
            }
            if is_library_user_agent(ua) {
                return Err(ConfigError::Invalid(format!(
                    "user agent identifies an HTTP library: {ua}"
                )));
            }
        }

        for referer in &referers {
            let parsed = url::Url::parse(referer)
                .map_err(|e| ConfigError::Invalid(format!("referer {referer}: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::Invalid(format!(
                    "referer must be an http(s) URL: {referer}"
                )));
            }
        }

        Ok(Self {
            user_agents,
            accept_languages,
            referers,
            accept_encoding,
            accept,
        })
    }

    /// The built-in pool of desktop browser signatures.
    pub fn builtin() -> Self {
        Self {
            user_agents: owned_list(DEFAULT_USER_AGENTS),
            accept_languages: owned_list(DEFAULT_ACCEPT_LANGUAGES),
            referers: owned_list(DEFAULT_REFERERS),
            accept_encoding: DEFAULT_ACCEPT_ENCODING.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
        }
    }

    /// Draw a fresh identity, each list sampled uniformly and independently.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> RequestIdentity {
        RequestIdentity {
            user_agent: pick(&self.user_agents, rng),
            accept_language: pick(&self.accept_languages, rng),
            referer: pick(&self.referers, rng),
            accept_encoding: self.accept_encoding.clone(),
            accept: self.accept.clone(),
        }
    }

    /// [`IdentityPool::sample`] with the thread-local generator.
    pub fn draw(&self) -> RequestIdentity {
        self.sample(&mut rand::thread_rng())
    }

    pub fn user_agents(&self) -> &[String] {
        &self.user_agents
    }

    pub fn accept_languages(&self) -> &[String] {
        &self.accept_languages
    }

    pub fn referers(&self) -> &[String] {
        &self.referers
    }

    pub fn accept_encoding(&self) -> &str {
        &self.accept_encoding
    }

    pub fn accept(&self) -> &str {
        &self.accept
    }

    pub fn contains_user_agent(&self, ua: &str) -> bool {
        self.user_agents.iter().any(|candidate| candidate == ua)
    }
}

impl Default for IdentityPool {
    fn default() -> Self {
        Self::builtin()
    }
}

/// True if the string names a scripting or HTTP library rather than a browser.
pub fn is_library_user_agent(ua: &str) -> bool {
    let lower = ua.to_ascii_lowercase();
    LIBRARY_MARKERS.iter().any(|marker| lower.contains(marker))
}

fn pick<R: Rng + ?Sized>(values: &[String], rng: &mut R) -> String {
    // Lists are non-empty by construction.
    values.choose(rng).cloned().unwrap_or_default()
}

fn owned_list(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn require_list(field: &str, values: &[String]) -> Result<(), ConfigError> {
    if values.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must not be empty")));
    }
    values.iter().try_for_each(|v| require_value(field, v))
}

fn require_value(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!(
            "{field} contains an empty value"
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(ConfigError::Invalid(format!(
            "{field} contains control characters: {value:?}"
        )));
    }
    Ok(())
}
