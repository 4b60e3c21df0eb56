pub mod ip;
pub mod url_validator;

use std::borrow::Cow;

pub use url_validator::{UrlParamError, validate_url_param};

/// 从 query string 提取指定参数值
///
/// Decodes like a form decoder (`+` is a space) and returns the first
/// occurrence of `key`.
pub fn query_param<'a>(query: &'a str, key: &str) -> Option<Cow<'a, str>> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param_first_occurrence_wins() {
        let query = "target=http://a.example&target=http://b.example";
        assert_eq!(
            query_param(query, "target").as_deref(),
            Some("http://a.example")
        );
    }

    #[test]
    fn test_query_param_decodes() {
        let query = "source=http%3A%2F%2Flocalhost%2Fa+b";
        assert_eq!(
            query_param(query, "source").as_deref(),
            Some("http://localhost/a b")
        );
    }

    #[test]
    fn test_query_param_missing() {
        assert_eq!(query_param("other=1", "target"), None);
        assert_eq!(query_param("", "target"), None);
    }
}
