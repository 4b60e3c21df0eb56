//! URL 参数验证模块
//!
//! Redirect destinations must be absolute URLs carrying both a scheme and an
//! authority. Anything else is rejected before a cookie or a `Location`
//! header is written.

use std::fmt;

use url::{ParseError, Position, Url};

/// Base used only to check that a rooted reference (`/foo`, `//host/x`)
/// is syntactically sound. It never appears in any output.
const REFERENCE_CHECK_BASE: &str = "http://relay.invalid/";

/// URL 参数验证错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlParamError {
    /// The value cannot be parsed as a request URI at all.
    Malformed { param: String, reason: String },
    /// The value parses but has no explicit scheme and authority.
    Relative { param: String, value: String },
}

impl UrlParamError {
    fn malformed(param: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            param: param.to_string(),
            reason: reason.into(),
        }
    }

    fn relative(param: &str, value: &str) -> Self {
        Self::Relative {
            param: param.to_string(),
            value: value.to_string(),
        }
    }

    /// Name of the parameter that failed
    pub fn param(&self) -> &str {
        match self {
            Self::Malformed { param, .. } | Self::Relative { param, .. } => param,
        }
    }
}

impl fmt::Display for UrlParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { param, reason } => {
                write!(f, "Invalid {} URL parameter: {}", param, reason)
            }
            Self::Relative { param, value } => {
                write!(f, "Relative {} URL not allowed: {}", param, value)
            }
        }
    }
}

impl std::error::Error for UrlParamError {}

/// Validate a raw parameter value as an absolute redirect URL.
///
/// Returns the canonical form of the URL on success. Scheme and host are
/// lower-cased and percent-encoding is normalized, but a bare authority such
/// as `http://example.com` is not given a trailing `/`.
///
/// # Errors
/// * [`UrlParamError::Malformed`] - empty, contains control characters,
///   surrounding whitespace or a broken `%` escape, or is neither absolute
///   nor rooted at `/`
/// * [`UrlParamError::Relative`] - a valid reference without a written
///   scheme and authority (`/foo/bar`, `//host/path`, `mailto:someone`,
///   `http:host`)
pub fn validate_url_param(param: &str, raw: &str) -> Result<String, UrlParamError> {
    if raw.is_empty() {
        return Err(UrlParamError::malformed(param, "empty url"));
    }

    // url 解析器会静默丢弃这些字符，这里必须显式拒绝
    if raw.chars().any(|c| c.is_ascii_control()) {
        return Err(UrlParamError::malformed(
            param,
            "invalid control character in URL",
        ));
    }
    if raw.trim() != raw {
        return Err(UrlParamError::malformed(param, "invalid URI for request"));
    }
    check_escapes(param, raw)?;

    match Url::parse(raw) {
        // 特殊 scheme 下 `http:example.com` 也会被补出 authority，必须要求原文带 `//`
        Ok(url) if url.has_authority() && has_explicit_authority(raw) => {
            Ok(canonicalize(&url, raw))
        }
        Ok(_) => Err(UrlParamError::relative(param, raw)),
        Err(ParseError::RelativeUrlWithoutBase) => classify_reference(param, raw),
        Err(e) => Err(UrlParamError::malformed(param, e.to_string())),
    }
}

/// Every `%` before the query must start a two-digit hex escape.
fn check_escapes(param: &str, raw: &str) -> Result<(), UrlParamError> {
    let end = raw.find(|c: char| c == '?' || c == '#').unwrap_or(raw.len());
    let head = &raw[..end];
    let bytes = head.as_bytes();

    for (i, _) in head.match_indices('%') {
        let valid = bytes
            .get(i + 1..i + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            let escape: String = head[i..].chars().take(3).collect();
            return Err(UrlParamError::malformed(
                param,
                format!("invalid URL escape {:?}", escape),
            ));
        }
    }
    Ok(())
}

/// Whether the scheme in `raw` is followed directly by `//`.
fn has_explicit_authority(raw: &str) -> bool {
    raw.split_once(':')
        .is_some_and(|(_, rest)| rest.starts_with("//"))
}

/// A reference without a scheme is only acceptable as a request URI when it
/// is rooted. Rooted references that parse are relative, the rest malformed.
fn classify_reference(param: &str, raw: &str) -> Result<String, UrlParamError> {
    if !raw.starts_with('/') {
        return Err(UrlParamError::malformed(param, "invalid URI for request"));
    }

    let base =
        Url::parse(REFERENCE_CHECK_BASE).map_err(|e| UrlParamError::malformed(param, e.to_string()))?;
    match base.join(raw) {
        Ok(_) => Err(UrlParamError::relative(param, raw)),
        Err(e) => Err(UrlParamError::malformed(param, e.to_string())),
    }
}

/// Serialize a parsed URL, dropping the root path the parser inserts for
/// special schemes when the input had none.
fn canonicalize(url: &Url, raw: &str) -> String {
    if url.path() == "/" && !has_explicit_root(raw) {
        let mut out = String::with_capacity(url.as_str().len());
        out.push_str(&url[..Position::BeforePath]);
        out.push_str(&url[Position::AfterPath..]);
        return out;
    }
    url.as_str().to_string()
}

/// Whether the authority in `raw` is followed by a path separator.
fn has_explicit_root(raw: &str) -> bool {
    let Some((_, rest)) = raw.split_once("://") else {
        return false;
    };
    rest.chars()
        .find(|c| matches!(c, '/' | '\\' | '?' | '#'))
        .is_some_and(|c| c == '/' || c == '\\')
}
