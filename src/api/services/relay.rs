//! Relay handlers
//!
//! `/goto` remembers where the visitor came from in a `source` cookie and
//! sends them to the target; `/return` sends them back and drops the cookie.
//!
//! Neither handler restricts destinations to an allow-list: `/goto` accepts
//! any absolute URL and `/return` follows whatever the cookie holds. This is
//! an open redirect by construction.

use actix_web::http::StatusCode;
use actix_web::http::header;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, HttpResponseBuilder, Responder, web};
use tracing::{info, warn};

use crate::api::constants::{
    GOTO_PATH, MISSING_COOKIE_MESSAGE, RETURN_PATH, SOURCE_PARAM, TARGET_PARAM,
    TEXT_CONTENT_TYPE,
};
use crate::api::cookie::{SourceCookieBuilder, read_source_cookie};
use crate::api::middleware::ClientAddr;
use crate::config::StaticConfig;
use crate::utils::ip::extract_client_addr;
use crate::utils::{UrlParamError, query_param, validate_url_param};

/// Read-only state shared by every handler invocation
#[derive(Clone, Debug, Default)]
pub struct RelayState {
    pub cookies: SourceCookieBuilder,
    pub trusted_proxies: Vec<String>,
}

impl RelayState {
    pub fn from_config(config: &StaticConfig) -> Self {
        Self {
            cookies: SourceCookieBuilder::from_config(&config.cookie),
            trusted_proxies: config.proxy.trusted_proxies.clone(),
        }
    }

    fn client_addr(&self, req: &HttpRequest) -> String {
        // 中间件已解析过的地址优先
        if let Some(ClientAddr(addr)) = req.extensions().get::<ClientAddr>() {
            return addr.clone();
        }
        extract_client_addr(req, &self.trusted_proxies)
    }
}

pub struct RelayService;

impl RelayService {
    /// `GET /goto?target=<url>&source=<url>`
    pub async fn goto(req: HttpRequest, state: web::Data<RelayState>) -> impl Responder {
        let client = state.client_addr(&req);
        let query = req.query_string();

        let validated = Self::validated_param(query, TARGET_PARAM).and_then(|target| {
            Self::validated_param(query, SOURCE_PARAM).map(|source| (target, source))
        });

        match validated {
            Ok((target, source)) => {
                info!(
                    client = %client,
                    target_url = %target,
                    source_url = %source,
                    "Redirecting visitor to target"
                );
                Self::see_other(&target)
                    .cookie(state.cookies.build_source_cookie(&source))
                    .finish()
            }
            Err(e) => {
                warn!(client = %client, param = e.param(), error = %e, "Bad relay request");
                Self::bad_request().body(e.to_string())
            }
        }
    }

    /// `GET /return`
    ///
    /// The cookie value is used verbatim as the destination.
    pub async fn go_back(req: HttpRequest, state: web::Data<RelayState>) -> impl Responder {
        let client = state.client_addr(&req);

        // 先取出 cookie 值，再构造过期 cookie
        let Some(destination) = read_source_cookie(&req) else {
            warn!(client = %client, "Bad relay request: missing source cookie");
            return Self::bad_request().body(MISSING_COOKIE_MESSAGE);
        };

        info!(
            client = %client,
            destination = %destination,
            "Returning visitor to source"
        );
        Self::see_other(&destination)
            .cookie(state.cookies.build_expired_source_cookie())
            .finish()
    }

    fn validated_param(query: &str, name: &str) -> Result<String, UrlParamError> {
        // 缺失的参数按空字符串处理，由验证器报告 empty url
        let raw = query_param(query, name).unwrap_or_default();
        validate_url_param(name, &raw)
    }

    #[inline]
    fn see_other(location: &str) -> HttpResponseBuilder {
        let mut builder = HttpResponse::build(StatusCode::SEE_OTHER);
        builder.insert_header((header::LOCATION, location));
        builder
    }

    #[inline]
    fn bad_request() -> HttpResponseBuilder {
        let mut builder = HttpResponse::build(StatusCode::BAD_REQUEST);
        builder.insert_header((header::CONTENT_TYPE, TEXT_CONTENT_TYPE));
        builder
    }
}

/// Relay 路由配置
pub fn relay_routes() -> actix_web::Scope {
    web::scope("")
        .route(GOTO_PATH, web::get().to(RelayService::goto))
        .route(GOTO_PATH, web::head().to(RelayService::goto))
        .route(RETURN_PATH, web::get().to(RelayService::go_back))
        .route(RETURN_PATH, web::head().to(RelayService::go_back))
}
