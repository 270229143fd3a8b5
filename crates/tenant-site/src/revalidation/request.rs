use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// How strictly `POST /api/revalidate` bodies are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyPolicy {
    /// Anything that is not a complete `path` or `tag` request invalidates everything.
    #[default]
    Lenient,
    /// Malformed or incomplete requests are rejected; only an empty body means "all".
    Strict,
}

impl FromStr for BodyPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown body policy '{other}'")),
        }
    }
}

impl fmt::Display for BodyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyPolicy::Lenient => f.write_str("lenient"),
            BodyPolicy::Strict => f.write_str("strict"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RevalidateRequest {
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl RevalidateRequest {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.path.is_none() && self.kind.is_none()
    }
}

/// What a request asks the cache to drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevalidationPlan {
    Path(String),
    Tag(String),
    All,
}

#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("request body is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unknown revalidation type '{0}'")]
    UnknownType(String),
    #[error("revalidation type '{kind}' requires a non-empty '{field}'")]
    MissingValue {
        kind: &'static str,
        field: &'static str,
    },
    #[error("'tag' or 'path' was supplied without a revalidation type")]
    MissingType,
}

/// Decide the invalidation for a raw request body under `policy`.
pub fn plan_from_body(body: &[u8], policy: BodyPolicy) -> Result<RevalidationPlan, BodyError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RevalidationPlan::All);
    }

    let request = match serde_json::from_slice::<RevalidateRequest>(body) {
        Ok(request) => request,
        Err(_) if policy == BodyPolicy::Lenient => return Ok(RevalidationPlan::All),
        Err(err) => return Err(BodyError::Malformed(err)),
    };

    plan_from_request(request, policy)
}

pub fn plan_from_request(
    request: RevalidateRequest,
    policy: BodyPolicy,
) -> Result<RevalidationPlan, BodyError> {
    if request.is_empty() {
        return Ok(RevalidationPlan::All);
    }

    let RevalidateRequest { tag, path, kind } = request;
    let tag = tag.filter(|value| !value.is_empty());
    let path = path.filter(|value| !value.is_empty());

    let planned = match kind.as_deref() {
        Some("path") => path.map(RevalidationPlan::Path).ok_or(BodyError::MissingValue {
            kind: "path",
            field: "path",
        }),
        Some("tag") => tag.map(RevalidationPlan::Tag).ok_or(BodyError::MissingValue {
            kind: "tag",
            field: "tag",
        }),
        Some(other) => Err(BodyError::UnknownType(other.to_string())),
        None => Err(BodyError::MissingType),
    };

    match (planned, policy) {
        (Ok(plan), _) => Ok(plan),
        (Err(_), BodyPolicy::Lenient) => Ok(RevalidationPlan::All),
        (Err(err), BodyPolicy::Strict) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient(body: &str) -> RevalidationPlan {
        plan_from_body(body.as_bytes(), BodyPolicy::Lenient).expect("lenient never fails")
    }

    #[test]
    fn complete_requests_target_one_key() {
        assert_eq!(
            lenient(r#"{"type":"path","path":"/about"}"#),
            RevalidationPlan::Path("/about".to_string())
        );
        assert_eq!(
            lenient(r#"{"type":"tag","tag":"posts"}"#),
            RevalidationPlan::Tag("posts".to_string())
        );
    }

    #[test]
    fn lenient_policy_falls_through_to_all() {
        for body in [
            "",
            "{}",
            "not json",
            "[1, 2]",
            r#"{"type":"path"}"#,
            r#"{"type":"tag","path":"/about"}"#,
            r#"{"type":"path","path":""}"#,
            r#"{"path":"/about"}"#,
            r#"{"type":"everything","tag":"posts"}"#,
        ] {
            assert_eq!(lenient(body), RevalidationPlan::All, "body {body:?}");
        }
    }

    #[test]
    fn strict_policy_rejects_incomplete_requests() {
        let strict = |body: &str| plan_from_body(body.as_bytes(), BodyPolicy::Strict);

        assert!(matches!(strict("not json"), Err(BodyError::Malformed(_))));
        assert!(matches!(
            strict(r#"{"type":"path"}"#),
            Err(BodyError::MissingValue { field: "path", .. })
        ));
        assert!(matches!(
            strict(r#"{"type":"purge","tag":"x"}"#),
            Err(BodyError::UnknownType(kind)) if kind == "purge"
        ));
        assert!(matches!(
            strict(r#"{"tag":"posts"}"#),
            Err(BodyError::MissingType)
        ));
    }

    #[test]
    fn strict_policy_still_accepts_explicit_all() {
        for body in ["", "  ", "{}"] {
            let plan = plan_from_body(body.as_bytes(), BodyPolicy::Strict).expect("all");
            assert_eq!(plan, RevalidationPlan::All);
        }
    }

    #[test]
    fn policy_parses_from_config_values() {
        assert_eq!("STRICT".parse::<BodyPolicy>(), Ok(BodyPolicy::Strict));
        assert_eq!(" lenient ".parse::<BodyPolicy>(), Ok(BodyPolicy::Lenient));
        assert!("loose".parse::<BodyPolicy>().is_err());
    }
}
