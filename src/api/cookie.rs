//! `source` cookie construction
//!
//! Setting and expiring the cookie must use the same attributes, otherwise
//! the client keeps the old value next to the expired one.
//!
//! Values are stored as-is apart from the few bytes a cookie cannot carry,
//! and read back without percent-decoding.

use std::borrow::Cow;

use actix_web::HttpRequest;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header;

use super::constants::SOURCE_COOKIE_NAME;
use crate::config::{CookieConfig, SameSitePolicy};

#[derive(Clone, Debug, Default)]
pub struct SourceCookieBuilder {
    path: Option<String>,
    domain: Option<String>,
    secure: bool,
    http_only: bool,
    same_site: Option<SameSite>,
}

impl SourceCookieBuilder {
    pub fn from_config(config: &CookieConfig) -> Self {
        let same_site = config.same_site.map(|policy| match policy {
            SameSitePolicy::Strict => SameSite::Strict,
            SameSitePolicy::Lax => SameSite::Lax,
            SameSitePolicy::None => SameSite::None,
        });

        Self {
            path: config.path.clone(),
            domain: config.domain.clone(),
            secure: config.secure,
            http_only: config.http_only,
            same_site,
        }
    }

    fn build_cookie_base(&self, value: String) -> Cookie<'static> {
        let mut cookie = Cookie::new(SOURCE_COOKIE_NAME, value);
        if let Some(ref path) = self.path {
            cookie.set_path(path.clone());
        }
        if let Some(ref domain) = self.domain {
            cookie.set_domain(domain.clone());
        }
        if self.secure {
            cookie.set_secure(true);
        }
        if self.http_only {
            cookie.set_http_only(true);
        }
        if let Some(same_site) = self.same_site {
            cookie.set_same_site(same_site);
        }
        cookie
    }

    /// Session cookie holding a validated origin URL
    pub fn build_source_cookie(&self, url: &str) -> Cookie<'static> {
        self.build_cookie_base(encode_cookie_value(url).into_owned())
    }

    /// Empty value with `Max-Age=0`, telling the client to drop the cookie
    pub fn build_expired_source_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.build_cookie_base(String::new());
        cookie.set_max_age(actix_web::cookie::time::Duration::ZERO);
        cookie
    }
}

/// Raw value of the first `source` cookie sent by the client.
///
/// `HttpRequest::cookie` percent-decodes values, which would turn
/// `a%20b` into `a b`, so the header is parsed here directly.
pub fn read_source_cookie(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get_all(header::COOKIE)
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| Cookie::parse(pair).ok())
        .find(|cookie| cookie.name() == SOURCE_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}

/// Percent-encode every byte outside the RFC 6265 cookie-octet set.
///
/// Existing escapes are left alone, so `http://x.example/a%20b` is stored
/// verbatim. Only `;`, `,`, `\`, `"`, whitespace, controls and non-ASCII
/// bytes are rewritten.
pub fn encode_cookie_value(value: &str) -> Cow<'_, str> {
    fn needs_encoding(b: u8) -> bool {
        !matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
    }

    if !value.bytes().any(needs_encoding) {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + 8);
    for b in value.bytes() {
        if needs_encoding(b) {
            out.push_str(&format!("%{:02X}", b));
        } else {
            out.push(b as char);
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_source_cookie_is_bare() {
        let builder = SourceCookieBuilder::default();
        assert_eq!(
            builder.build_source_cookie("http://localhost").to_string(),
            "source=http://localhost"
        );
    }

    #[test]
    fn test_default_expired_cookie() {
        let builder = SourceCookieBuilder::default();
        assert_eq!(
            builder.build_expired_source_cookie().to_string(),
            "source=; Max-Age=0"
        );
    }

    #[test]
    fn test_configured_attributes_on_both_cookies() {
        let builder = SourceCookieBuilder::from_config(&CookieConfig {
            path: Some("/".to_string()),
            domain: None,
            secure: true,
            http_only: true,
            same_site: Some(SameSitePolicy::Lax),
        });

        let set = builder.build_source_cookie("https://example.com");
        assert_eq!(set.path(), Some("/"));
        assert_eq!(set.secure(), Some(true));
        assert_eq!(set.http_only(), Some(true));
        assert_eq!(set.same_site(), Some(SameSite::Lax));
        assert!(set.max_age().is_none());

        let expired = builder.build_expired_source_cookie();
        assert_eq!(expired.path(), Some("/"));
        assert_eq!(expired.value(), "");
        assert_eq!(
            expired.max_age(),
            Some(actix_web::cookie::time::Duration::ZERO)
        );
    }

    #[test]
    fn test_encode_cookie_value() {
        assert_eq!(encode_cookie_value("http://localhost"), "http://localhost");
        assert_eq!(
            encode_cookie_value("http://x.example/?a=1;b=2,c"),
            "http://x.example/?a=1%3Bb=2%2Cc"
        );
        assert!(matches!(
            encode_cookie_value("https://example.com/path?q=1"),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn test_existing_escapes_are_not_reencoded() {
        assert!(matches!(
            encode_cookie_value("http://x.example/a%20b"),
            Cow::Borrowed("http://x.example/a%20b")
        ));

        let builder = SourceCookieBuilder::default();
        assert_eq!(
            builder.build_source_cookie("http://x.example/a%20b").to_string(),
            "source=http://x.example/a%20b"
        );
    }

    #[test]
    fn test_read_source_cookie_keeps_escapes() {
        use actix_web::test::TestRequest;

        let req = TestRequest::default()
            .insert_header((header::COOKIE, "theme=dark; source=http://x.example/a%20b"))
            .to_http_request();
        assert_eq!(
            read_source_cookie(&req).as_deref(),
            Some("http://x.example/a%20b")
        );
    }

    #[test]
    fn test_read_source_cookie_first_wins() {
        use actix_web::test::TestRequest;

        let req = TestRequest::default()
            .insert_header((header::COOKIE, "source=http://first.example; source=http://second.example"))
            .to_http_request();
        assert_eq!(
            read_source_cookie(&req).as_deref(),
            Some("http://first.example")
        );

        let req = TestRequest::default()
            .insert_header((header::COOKIE, "sources=http://x.example"))
            .to_http_request();
        assert!(read_source_cookie(&req).is_none());
    }
}
