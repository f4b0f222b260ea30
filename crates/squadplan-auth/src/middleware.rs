//! Tower session middleware.
//!
//! `SessionLayer` and `SessionService` resolve the signed session cookie
//! into an [`Identity`] before the request reaches a handler. They never
//! reject a request; guards do that (see [`crate::CurrentUser`]).

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::response::IntoResponse;
use axum_extra::extract::cookie::{Key, SignedCookieJar};
use http::Request;
use tower::{Layer, Service};

use crate::{Authenticator, Identity, SESSION_COOKIE, SessionStore};

/// Tower `Layer` that attaches the session identity to every request.
pub struct SessionLayer<St: SessionStore> {
    store: Arc<St>,
    authenticator: Arc<Authenticator>,
    key: Key,
}

impl<St: SessionStore> SessionLayer<St> {
    /// Create a new session layer.
    pub fn new(store: Arc<St>, authenticator: Arc<Authenticator>, key: Key) -> Self {
        Self {
            store,
            authenticator,
            key,
        }
    }
}

impl<St: SessionStore> Clone for SessionLayer<St> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            authenticator: self.authenticator.clone(),
            key: self.key.clone(),
        }
    }
}

impl<St: SessionStore, S> Layer<S> for SessionLayer<St> {
    type Service = SessionService<St, S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionService {
            inner,
            store: self.store.clone(),
            authenticator: self.authenticator.clone(),
            key: self.key.clone(),
        }
    }
}

/// Tower `Service` that resolves the session before forwarding requests.
///
/// Inserts the effective [`Identity`] into request extensions: the admin
/// identity under bypass, the stored identity for a valid signed cookie,
/// and [`Identity::Anonymous`] otherwise.
pub struct SessionService<St: SessionStore, S> {
    inner: S,
    store: Arc<St>,
    authenticator: Arc<Authenticator>,
    key: Key,
}

impl<St: SessionStore, S: Clone> Clone for SessionService<St, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            store: self.store.clone(),
            authenticator: self.authenticator.clone(),
            key: self.key.clone(),
        }
    }
}

impl<St: SessionStore, S> SessionService<St, S> {
    fn resolve(&self, req: &Request<Body>) -> Identity {
        // Under bypass the stored session is irrelevant.
        let session = if self.authenticator.bypass() {
            Identity::Anonymous
        } else {
            SignedCookieJar::from_headers(req.headers(), self.key.clone())
                .get(SESSION_COOKIE)
                .map(|cookie| self.store.get(cookie.value()))
                .unwrap_or_default()
        };
        self.authenticator.resolve(session)
    }
}

impl<St, S> Service<Request<Body>> for SessionService<St, S>
where
    St: SessionStore,
    S: Service<Request<Body>, Error = Infallible> + Clone + Send + 'static,
    S::Response: IntoResponse,
    S::Future: Send,
{
    type Response = axum::response::Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let identity = self.resolve(&req);
        log::trace!(
            "{} {} as {}",
            req.method(),
            req.uri().path(),
            identity.username().unwrap_or("anonymous")
        );
        req.extensions_mut().insert(identity);

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let resp = inner
                .call(req)
                .await
                .unwrap_or_else(|infallible| match infallible {});
            Ok(resp.into_response())
        })
    }
}
