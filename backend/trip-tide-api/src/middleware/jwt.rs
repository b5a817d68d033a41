//! JWT authentication middleware
//!
//! Resolves `Authorization: Bearer <token>` into [`Claims`] stored in the
//! request extensions. The API serves anonymous visitors too, so a missing
//! or bad token never fails the request; resolvers decide what needs a viewer.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, HttpMessage,
};
use crypto_core::{Claims, JwtKeys};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, warn};

/// JWT authentication middleware
pub struct JwtMiddleware {
    keys: Arc<JwtKeys>,
}

impl JwtMiddleware {
    pub fn new(keys: Arc<JwtKeys>) -> Self {
        Self { keys }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
            keys: self.keys.clone(),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
    keys: Arc<JwtKeys>,
}

/// Token part of a bearer header value, if any
pub(crate) fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn resolve_claims(req: &ServiceRequest, keys: &JwtKeys) -> Option<Claims> {
    let header = req.headers().get(AUTHORIZATION)?;

    let Ok(value) = header.to_str() else {
        warn!("Authorization header is not valid ASCII");
        return None;
    };

    let Some(token) = bearer_token(value) else {
        debug!("Authorization header without bearer token");
        return None;
    };

    match keys.validate_token(token) {
        Ok(claims) => Some(claims),
        Err(e) => {
            warn!(error = %e, "Invalid token");
            None
        }
    }
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Some(claims) = resolve_claims(&req, &self.keys) {
            debug!(user_id = %claims.sub, "Authenticated request");
            req.extensions_mut().insert(claims);
        }

        let service = Rc::clone(&self.service);
        Box::pin(async move { service.call(req).await })
    }
}
