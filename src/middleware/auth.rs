use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::models::PrincipalKind;
use crate::services::auth_service;
use crate::state::AppState;
use crate::utils::AppError;

/// Requires a bearer token issued for `kind` and attaches the resulting
/// [`auth_service::Principal`] to the request extensions.
pub struct Authenticate {
    kind: PrincipalKind,
}

impl Authenticate {
    pub fn user() -> Self {
        Self { kind: PrincipalKind::User }
    }

    pub fn admin() -> Self {
        Self { kind: PrincipalKind::Admin }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Authenticate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthenticateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticateMiddleware {
            service,
            kind: self.kind,
        }))
    }
}

pub struct AuthenticateMiddleware<S> {
    service: S,
    kind: PrincipalKind,
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

impl<S, B> Service<ServiceRequest> for AuthenticateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let verified = match (bearer_token(&req), req.app_data::<web::Data<AppState>>()) {
            (None, _) => Err(AppError::Unauthorized("No token provided".to_string())),
            (Some(_), None) => Err(AppError::Internal("application state not configured".to_string())),
            (Some(token), Some(state)) => auth_service::verify_token(&state.auth, self.kind, &token),
        };

        match verified {
            Ok(principal) => {
                req.extensions_mut().insert(principal);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(e) => {
                let response = e.error_response().map_into_right_body();
                Box::pin(async move { Ok(req.into_response(response)) })
            }
        }
    }
}
