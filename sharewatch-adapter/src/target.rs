//! Request target derivation.
//!
//! A share is identified either by a bare share code or by a full share URL.
//! Users paste either into either field, so both inputs are trimmed and a
//! code that is really a URL is unpacked before the request URL is built.

use reqwest::Url;
use thiserror::Error;

/// Default share API endpoint (without query).
pub const DEFAULT_BASE_ENDPOINT: &str = "https://api.sizzapp.com/app/location_sharing/info";

/// Query parameter carrying the share code.
pub const SHARED_CODE_PARAM: &str = "shared_code";

/// Errors from resolving share input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    /// Neither a share code nor a share URL was supplied.
    #[error("Either a shared code or a share URL is required")]
    MissingInput,

    /// The request URL is not an absolute URL with a host.
    #[error("Not a usable share URL: {0}")]
    BadUrl(String),
}

/// The resolved request target of one coordinator.
///
/// # Example
///
/// ```rust
/// use sharewatch_adapter::{ShareTarget, DEFAULT_BASE_ENDPOINT};
///
/// let target = ShareTarget::resolve(Some(" AbC123 "), None, DEFAULT_BASE_ENDPOINT).unwrap();
/// assert_eq!(
///     target.request_url(),
///     "https://api.sizzapp.com/app/location_sharing/info?shared_code=AbC123"
/// );
/// assert_eq!(target.shared_code(), Some("AbC123"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareTarget {
    shared_code: Option<String>,
    request_url: String,
}

impl ShareTarget {
    /// Resolve share input into a request target.
    ///
    /// - An explicit share URL is used verbatim; an empty code is filled from
    ///   its `shared_code` query parameter.
    /// - Otherwise the URL is `base_endpoint?shared_code=<code>`. A code that
    ///   is itself a share URL contributes its embedded code.
    pub fn resolve(
        shared_code: Option<&str>,
        share_url: Option<&str>,
        base_endpoint: &str,
    ) -> Result<Self, TargetError> {
        let code = shared_code.map(str::trim).filter(|s| !s.is_empty());
        let url = share_url.map(str::trim).filter(|s| !s.is_empty());

        match (code, url) {
            (_, Some(url)) => {
                check_url(url)?;
                let shared_code = code
                    .map(str::to_string)
                    .or_else(|| code_from_url(url));
                Ok(Self {
                    shared_code,
                    request_url: url.to_string(),
                })
            }
            (Some(code), None) => {
                let code = code_from_url(code).unwrap_or_else(|| code.to_string());
                let request_url = build_request_url(base_endpoint, &code)?;
                Ok(Self {
                    shared_code: Some(code),
                    request_url,
                })
            }
            (None, None) => Err(TargetError::MissingInput),
        }
    }

    /// The share code, when known.
    pub fn shared_code(&self) -> Option<&str> {
        self.shared_code.as_deref()
    }

    /// The URL every poll of this target requests.
    pub fn request_url(&self) -> &str {
        &self.request_url
    }

    /// Stable identity for de-duplicating configured shares.
    pub fn unique_id(&self) -> String {
        format!(
            "sharewatch::{}",
            self.shared_code.as_deref().unwrap_or(&self.request_url)
        )
    }
}

fn check_url(value: &str) -> Result<Url, TargetError> {
    match Url::parse(value) {
        Ok(url) if url.host_str().is_some() => Ok(url),
        _ => Err(TargetError::BadUrl(value.to_string())),
    }
}

fn code_from_url(value: &str) -> Option<String> {
    let url = check_url(value).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == SHARED_CODE_PARAM)
        .map(|(_, code)| code.trim().to_string())
        .filter(|code| !code.is_empty())
}

fn build_request_url(base_endpoint: &str, code: &str) -> Result<String, TargetError> {
    check_url(base_endpoint)?;
    Url::parse_with_params(base_endpoint, &[(SHARED_CODE_PARAM, code)])
        .map(String::from)
        .map_err(|_| TargetError::BadUrl(base_endpoint.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://api.example.com/info";

    #[test]
    fn test_code_only() {
        let target = ShareTarget::resolve(Some("XYZ"), None, BASE).unwrap();
        assert_eq!(target.request_url(), "https://api.example.com/info?shared_code=XYZ");
        assert_eq!(target.shared_code(), Some("XYZ"));
        assert_eq!(target.unique_id(), "sharewatch::XYZ");
    }

    #[test]
    fn code_is_query_encoded() {
        let target = ShareTarget::resolve(Some("a b&c"), None, BASE).unwrap();
        assert_eq!(
            target.request_url(),
            "https://api.example.com/info?shared_code=a+b%26c"
        );
    }

    #[test]
    fn url_is_used_verbatim() {
        let url = "https://share.example.com/x?shared_code=QQ&lang=de";
        let target = ShareTarget::resolve(None, Some(url), BASE).unwrap();
        assert_eq!(target.request_url(), url);
        assert_eq!(target.shared_code(), Some("QQ"));
    }

    #[test]
    fn explicit_code_wins_over_embedded_code() {
        let url = "https://share.example.com/x?shared_code=QQ";
        let target = ShareTarget::resolve(Some("RR"), Some(url), BASE).unwrap();
        assert_eq!(target.request_url(), url);
        assert_eq!(target.shared_code(), Some("RR"));
    }

    #[test]
    fn url_without_code_keeps_code_empty() {
        let url = "https://share.example.com/x";
        let target = ShareTarget::resolve(None, Some(url), BASE).unwrap();
        assert_eq!(target.shared_code(), None);
        assert_eq!(target.unique_id(), format!("sharewatch::{}", url));
    }

    #[test]
    fn url_pasted_into_code_field_is_unpacked() {
        let target = ShareTarget::resolve(
            Some("https://share.example.com/x?shared_code=ZZ9"),
            None,
            BASE,
        )
        .unwrap();
        assert_eq!(target.shared_code(), Some("ZZ9"));
        assert_eq!(target.request_url(), "https://api.example.com/info?shared_code=ZZ9");
    }

    #[test]
    fn inputs_are_trimmed() {
        let target =
            ShareTarget::resolve(Some("  "), Some("  https://a.example/x  "), BASE).unwrap();
        assert_eq!(target.request_url(), "https://a.example/x");
    }

    #[test]
    fn missing_input() {
        assert_eq!(
            ShareTarget::resolve(None, None, BASE),
            Err(TargetError::MissingInput)
        );
        assert_eq!(
            ShareTarget::resolve(Some(" "), Some(""), BASE),
            Err(TargetError::MissingInput)
        );
    }

    #[test]
    fn bad_urls() {
        assert!(matches!(
            ShareTarget::resolve(None, Some("not a url"), BASE),
            Err(TargetError::BadUrl(_))
        ));
        assert!(matches!(
            ShareTarget::resolve(None, Some("mailto:someone@example.com"), BASE),
            Err(TargetError::BadUrl(_))
        ));
        assert!(matches!(
            ShareTarget::resolve(Some("XYZ"), None, "/relative"),
            Err(TargetError::BadUrl(_))
        ));
    }
}
