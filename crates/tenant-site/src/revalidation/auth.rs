use axum::http::{header, HeaderMap};

/// How the caller proved their session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    BearerToken,
    SessionCookie,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Position of the matching token in the configured list; safe to log.
    pub token_index: usize,
    pub source: CredentialSource,
}

/// Session check delegated to the CMS auth layer.
pub trait SessionAuthenticator: Send + Sync {
    fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, AuthError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing session credentials")]
    MissingCredentials,
    #[error("session credentials rejected")]
    InvalidCredentials,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Accepts operator tokens presented as `Authorization: Bearer <token>` or in a
/// session cookie. With no tokens configured every request is rejected.
#[derive(Debug, Clone)]
pub struct StaticTokenAuthenticator {
    tokens: Vec<String>,
    session_cookie: String,
}

impl StaticTokenAuthenticator {
    pub fn new<I, S>(tokens: I, session_cookie: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens = tokens
            .into_iter()
            .map(Into::into)
            .filter(|token: &String| !token.is_empty())
            .collect();
        Self {
            tokens,
            session_cookie: session_cookie.into(),
        }
    }

    /// Checks every configured token so timing does not reveal which one matched.
    fn lookup(&self, candidate: &str, source: CredentialSource) -> Result<Principal, AuthError> {
        let mut matched = None;
        for (index, token) in self.tokens.iter().enumerate() {
            if constant_time_eq(token.as_bytes(), candidate.as_bytes()) && matched.is_none() {
                matched = Some(index);
            }
        }

        matched
            .map(|token_index| Principal {
                token_index,
                source,
            })
            .ok_or(AuthError::InvalidCredentials)
    }
}

fn constant_time_eq(expected: &[u8], candidate: &[u8]) -> bool {
    if expected.len() != candidate.len() {
        return false;
    }
    expected
        .iter()
        .zip(candidate)
        .fold(0u8, |diff, (left, right)| diff | (left ^ right))
        == 0
}

impl SessionAuthenticator for StaticTokenAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
        if let Some(token) = bearer_token(headers) {
            return self.lookup(token, CredentialSource::BearerToken);
        }
        if let Some(token) = cookie_value(headers, &self.session_cookie) {
            return self.lookup(token, CredentialSource::SessionCookie);
        }
        Err(AuthError::MissingCredentials)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}
