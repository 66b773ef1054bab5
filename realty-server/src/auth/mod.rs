//! Caller identity
//!
//! Identity is resolved once per request by [`resolve_identity`] and stored in
//! the request extensions. Handlers read it back through [`Caller`] (required)
//! or [`MaybeCaller`] (optional) and never look at the token themselves.

pub mod extract;
pub mod jwt;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

pub use extract::{Caller, MaybeCaller};
pub use jwt::{AuthError, Claims, JwtCookieAuth, TokenKeys, TOKEN_COOKIE};

/// Who is making the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    User(Uuid),
}

impl Identity {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Self::User(id) => Some(*id),
            Self::Anonymous => None,
        }
    }
}

/// Resolves the caller from request headers.
///
/// Implementations never fail: anything unverifiable is `Identity::Anonymous`.
pub trait Authenticator: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> Identity;
}

/// Middleware storing the resolved [`Identity`] in request extensions.
pub async fn resolve_identity(
    State(auth): State<Arc<dyn Authenticator>>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = auth.resolve(request.headers());
    request.extensions_mut().insert(identity);
    next.run(request).await
}
