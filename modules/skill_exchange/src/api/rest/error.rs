use axum::http::{HeaderMap, StatusCode, Uri};
use modkit::api::problem::{Problem, ProblemResponse, ValidationError};

use crate::domain::error::{DomainError, ErrorKind};

/// Header carrying the id the ingress assigns to (or propagates for) each request.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The request a problem belongs to: its path, rendered as `instance`, and
/// the request id when one is present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemScope {
    pub instance: String,
    pub request_id: Option<String>,
}

impl ProblemScope {
    pub fn of(uri: &Uri, headers: &HeaderMap) -> Self {
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_owned);
        Self {
            instance: uri.path().to_owned(),
            request_id,
        }
    }
}

/// Builds a typed problem with the stable `code` and the scope attached.
pub fn problem(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    scope: &ProblemScope,
) -> Problem {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.skillswap.dev/{code}"))
        .with_code(code)
        .with_instance(scope.instance.clone());
    match &scope.request_id {
        Some(id) => problem.with_request_id(id.clone()),
        None => problem,
    }
}

fn status_and_title(kind: ErrorKind) -> (StatusCode, &'static str) {
    match kind {
        ErrorKind::InvalidInput => (StatusCode::BAD_REQUEST, "Invalid input"),
        ErrorKind::DuplicatePending => (StatusCode::BAD_REQUEST, "Request already pending"),
        ErrorKind::AlreadyAccepted => (StatusCode::BAD_REQUEST, "Request already accepted"),
        ErrorKind::NotFound => (StatusCode::NOT_FOUND, "Not found"),
        ErrorKind::DuplicateKey => (StatusCode::CONFLICT, "Email already exists"),
        ErrorKind::PairingRequired => (StatusCode::FORBIDDEN, "Pairing required"),
        ErrorKind::PartialMirrorFailure => (StatusCode::CONFLICT, "Request could not be accepted"),
        ErrorKind::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
        ErrorKind::StorageFailure => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
    }
}

/// Map a domain error to an RFC 9457 response.
pub fn map_domain_error(e: &DomainError, scope: &ProblemScope) -> ProblemResponse {
    let kind = e.kind();
    let (status, title) = status_and_title(kind);

    let problem = match e {
        DomainError::InvalidInput { field, message } => {
            problem(status, kind.as_str(), title, e.to_string(), scope)
                .with_errors(vec![ValidationError::at(field, message.clone())])
        }
        DomainError::Database { .. } => {
            // Logged here, never sent to the client.
            tracing::error!(error = ?e, "Database error occurred");
            problem(
                status,
                kind.as_str(),
                title,
                "An internal database error occurred",
                scope,
            )
        }
        _ => problem(status, kind.as_str(), title, e.to_string(), scope),
    };
    ProblemResponse(problem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use uuid::Uuid;

    fn scope(rid: Option<&str>) -> ProblemScope {
        ProblemScope {
            instance: "/x".into(),
            request_id: rid.map(str::to_owned),
        }
    }

    #[test]
    fn status_codes_follow_error_kind() {
        let cases = [
            (DomainError::invalid_input("skill", "empty"), 400),
            (DomainError::DuplicatePending, 400),
            (DomainError::AlreadyAccepted, 400),
            (DomainError::request_not_found(Uuid::nil()), 404),
            (DomainError::email_already_exists("a@b.io".into()), 409),
            (DomainError::PairingRequired, 403),
            (DomainError::Unauthorized, 401),
            (
                DomainError::MirrorFailure {
                    request_id: Uuid::nil(),
                    sender_id: Uuid::nil(),
                },
                409,
            ),
            (DomainError::database("boom"), 500),
        ];
        for (err, status) in cases {
            assert_eq!(map_domain_error(&err, &scope(None)).0.status, status, "{err}");
        }
    }

    #[test]
    fn storage_details_are_hidden() {
        let p = map_domain_error(
            &DomainError::database("UNIQUE constraint failed"),
            &scope(Some("rid-9")),
        )
        .0;
        assert!(!p.detail.contains("UNIQUE"));
        assert_eq!(p.code, "StorageFailure");
        assert_eq!(p.instance, "/x");
        assert_eq!(p.request_id.as_deref(), Some("rid-9"));
        assert!(p.errors.is_none());
    }

    #[test]
    fn invalid_input_names_the_field() {
        let p = map_domain_error(
            &DomainError::invalid_input("toUserId", "is not a valid id"),
            &scope(None),
        )
        .0;
        let errors = p.errors.expect("field errors");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].pointer, "/toUserId");
        assert_eq!(errors[0].detail, "is not a valid id");
        assert!(p.request_id.is_none());
    }

    #[test]
    fn scope_reads_path_and_request_id_header() {
        let uri: Uri = "/api/user/send-request?x=1".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(ProblemScope::of(&uri, &headers).request_id, None);

        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("abc123"));
        let s = ProblemScope::of(&uri, &headers);
        assert_eq!(s.instance, "/api/user/send-request");
        assert_eq!(s.request_id.as_deref(), Some("abc123"));
    }
}
