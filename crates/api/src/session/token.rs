//! Session token extraction from request headers.

use axum::http::{
    header::{AUTHORIZATION, COOKIE},
    HeaderMap,
};

/// Cookie the provider's frontend SDK uses for same-origin requests.
pub const SESSION_COOKIE: &str = "__session";

/// Token carried in the `Authorization` header.
///
/// The `Bearer ` prefix is trimmed when present; a bare value is returned
/// as-is. Empty values yield `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

/// Token carried in the [`SESSION_COOKIE`] cookie.
pub fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Header token first, cookie second.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    bearer_token(headers).or_else(|| session_cookie(headers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(axum::http::HeaderName, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn strips_bearer_prefix() {
        let h = headers(&[(AUTHORIZATION, "Bearer abc.def.ghi")]);
        assert_eq!(bearer_token(&h), Some("abc.def.ghi"));
    }

    #[test]
    fn bare_authorization_value_is_used_verbatim() {
        let h = headers(&[(AUTHORIZATION, "abc.def.ghi")]);
        assert_eq!(bearer_token(&h), Some("abc.def.ghi"));
    }

    #[test]
    fn empty_bearer_is_none() {
        let h = headers(&[(AUTHORIZATION, "Bearer ")]);
        assert_eq!(bearer_token(&h), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn finds_session_cookie_among_others() {
        let h = headers(&[
            (COOKIE, "theme=dark"),
            (COOKIE, "a=1; __session=tok123; b=2"),
        ]);
        assert_eq!(session_cookie(&h), Some("tok123"));
    }

    #[test]
    fn header_wins_over_cookie() {
        let h = headers(&[(AUTHORIZATION, "Bearer header"), (COOKIE, "__session=cookie")]);
        assert_eq!(session_token(&h), Some("header"));
        let h = headers(&[(COOKIE, "__session=cookie")]);
        assert_eq!(session_token(&h), Some("cookie"));
    }
}
