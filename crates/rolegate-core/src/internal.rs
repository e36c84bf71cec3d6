//! Extractor guarding endpoints that only trusted collaborators (the chat bot,
//! operators) may call.

use axum::extract::FromRequestParts;
use http::request::Parts;
use subtle::ConstantTimeEq;

use crate::error::AppError;

/// Header carrying the shared secret for internal endpoints.
pub const INTERNAL_TOKEN_HEADER: &str = "x-rolegate-internal-token";

/// Application state that knows the expected internal token.
pub trait InternalTokenSource {
    fn internal_token(&self) -> &str;
}

/// Proof that the request presented the configured internal token.
///
/// Rejects with 401 when the header is absent, not valid UTF-8, or differs.
#[derive(Debug, Clone, Copy)]
pub struct InternalCaller;

impl<S> FromRequestParts<S> for InternalCaller
where
    S: InternalTokenSource + Send + Sync,
{
    type Rejection = AppError;

    // Compare synchronously and hand back a 'static future so the returned
    // future does not capture `parts` or `state`.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let presented = parts
            .headers
            .get(INTERNAL_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());
        let ok = presented.is_some_and(|p| token_matches(p, state.internal_token()));

        async move {
            if ok {
                Ok(InternalCaller)
            } else {
                Err(AppError::Unauthorized)
            }
        }
    }
}

fn token_matches(presented: &str, expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}
