//! Authentication middleware for the HTTP gateway.
//!
//! Implements optional bearer token authentication. The health endpoint and
//! CORS preflight requests are always let through.

use crate::config::GatewayConfig;
use crate::error::Error;
use crate::gateway::http::actix_error::ApiError;

use actix_web::{
    Error as ActixError,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures::future::{LocalBoxFuture, Ready, ready};
use std::sync::Arc;

/// Path exempt from authentication
pub const HEALTH_PATH: &str = "/health";

/// Authentication middleware factory
pub struct Authentication {
    config: Arc<GatewayConfig>,
}

impl Authentication {
    /// Create a new Authentication middleware
    pub fn new(config: Arc<GatewayConfig>) -> Self {
        Self { config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Transform = AuthenticationMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticationMiddleware {
            service,
            config: self.config.clone(),
        }))
    }
}

/// Authentication middleware implementation
pub struct AuthenticationMiddleware<S> {
    service: S,
    config: Arc<GatewayConfig>,
}

impl<S> AuthenticationMiddleware<S> {
    /// Whether `req` may proceed
    fn is_authorized(&self, req: &ServiceRequest) -> bool {
        if req.method() == "OPTIONS" || req.path() == HEALTH_PATH {
            return true;
        }

        let Some(bearer) = self
            .config
            .authenticate
            .as_ref()
            .and_then(|a| a.bearer.as_ref())
        else {
            return true;
        };

        req.headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .is_some_and(|token| token == bearer.token)
    }
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if self.is_authorized(&req) {
            let fut = self.service.call(req);
            return Box::pin(async move {
                let res = fut.await?;
                Ok(res)
            });
        }

        tracing::warn!(path = %req.path(), "Authentication failed: Invalid or missing bearer token");
        Box::pin(async move {
            Err(ApiError::from(Error::Unauthorized(
                "Invalid or missing bearer token".to_string(),
            ))
            .into())
        })
    }
}
