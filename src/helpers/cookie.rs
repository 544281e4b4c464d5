use axum::http::{header, HeaderMap};

/// Cookie carrying the preview ref while preview mode is on.
pub const PREVIEW_COOKIE: &str = "io.prismic.preview";

/// Value of the cookie named `name`, if the request carries it.
pub fn read(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

pub fn set(name: &str, value: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", name, value)
}

pub fn expire(name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn finds_the_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; io.prismic.preview=abc123; lang=pt"),
        );

        assert_eq!(read(&headers, PREVIEW_COOKIE).as_deref(), Some("abc123"));
        assert_eq!(read(&headers, "missing"), None);
    }

    #[test]
    fn empty_cookie_counts_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("io.prismic.preview="));

        assert_eq!(read(&headers, PREVIEW_COOKIE), None);
    }

    #[test]
    fn expired_cookie_has_no_max_age_left() {
        assert_eq!(
            expire(PREVIEW_COOKIE),
            "io.prismic.preview=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
        );
    }
}
