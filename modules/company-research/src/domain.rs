//! Domain input cleaning and hostname validation.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use research_common::ResearchError;

/// Leading scheme and `www.` prefix, both optional.
static RE_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:https?://)?(?:www\.)?").unwrap());

/// Dot-separated labels of 1-63 alphanumerics/hyphens (no leading or trailing
/// hyphen), ending in an alphabetic or punycode TLD.
static RE_HOSTNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+(?:[a-z]{2,63}|xn--[a-z0-9-]{1,59})$")
        .unwrap()
});

const MAX_HOSTNAME_LEN: usize = 253;

/// A validated, lowercase hostname with scheme, `www.` and path removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Domain(String);

impl Domain {
    pub fn parse(raw: &str) -> Result<Self, ResearchError> {
        normalize_domain(raw).map(Domain)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First label of the hostname, used as the company's search name.
    pub fn company_name(&self) -> &str {
        self.0.split('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lower-case, strip `http(s)://` and `www.`, drop everything from the first
/// `/`, then validate the remainder as a hostname.
pub fn normalize_domain(raw: &str) -> Result<String, ResearchError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ResearchError::InvalidDomain("Domain is required".to_string()));
    }

    let lowered = raw.to_lowercase();
    let stripped = RE_PREFIX.replace(&lowered, "");
    let host = stripped.split('/').next().unwrap_or_default();

    if host.len() > MAX_HOSTNAME_LEN || !RE_HOSTNAME.is_match(host) {
        return Err(ResearchError::InvalidDomain(host.to_string()));
    }

    Ok(host.to_string())
}
