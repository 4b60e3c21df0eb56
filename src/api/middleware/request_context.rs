//! Request context middleware
//!
//! Gives every request an ID and resolves the caller's address once, before
//! any handler runs. Both go into the request extensions and onto an
//! `info_span!("request")`, so the relay's own log lines and the access log
//! for one visitor hop share `request_id` and `client`. The ID is echoed back
//! in `X-Request-ID`.

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    dev::{ServiceRequest, ServiceResponse},
    http::header::{HeaderName, HeaderValue},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::{Instrument, info_span};
use uuid::Uuid;

use crate::utils::ip::extract_client_addr;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 请求 ID，可从 request extensions 中提取
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Caller address as resolved against the trusted proxy list
#[derive(Clone, Debug)]
pub struct ClientAddr(pub String);

#[derive(Clone, Default)]
pub struct RequestContextMiddleware {
    trusted_proxies: Rc<[String]>,
}

impl RequestContextMiddleware {
    pub fn new(trusted_proxies: Vec<String>) -> Self {
        Self {
            trusted_proxies: trusted_proxies.into(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestContextMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestContextService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestContextService {
            service: Rc::new(service),
            trusted_proxies: Rc::clone(&self.trusted_proxies),
        }))
    }
}

pub struct RequestContextService<S> {
    service: Rc<S>,
    trusted_proxies: Rc<[String]>,
}

impl<S> RequestContextService<S> {
    fn attach(&self, req: &ServiceRequest) -> (RequestId, ClientAddr) {
        let request_id = RequestId(Uuid::new_v4().to_string());
        let client = ClientAddr(extract_client_addr(req.request(), &self.trusted_proxies));

        let mut extensions = req.extensions_mut();
        extensions.insert(request_id.clone());
        extensions.insert(client.clone());
        (request_id, client)
    }
}

impl<S, B> Service<ServiceRequest> for RequestContextService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let (request_id, client) = self.attach(&req);

        let span = info_span!(
            "request",
            request_id = %request_id.0,
            client = %client.0,
            method = %req.method(),
            path = %req.path(),
        );

        Box::pin(
            async move {
                let mut response = srv.call(req).await?;

                // 非法字符不会出现在 UUID 中，失败时直接跳过
                if let Ok(value) = HeaderValue::from_str(&request_id.0) {
                    response
                        .headers_mut()
                        .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
                }

                Ok(response)
            }
            .instrument(span),
        )
    }
}
