use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Swagger UI ships inline scripts and styles, so its pages get a looser
/// policy and may be framed by the same origin.
const DOCS_HEADERS: &[(&str, &str)] = &[
    (
        "content-security-policy",
        "default-src 'self'; script-src 'self' 'unsafe-inline'; \
         style-src 'self' 'unsafe-inline'; img-src 'self' data:",
    ),
    ("x-frame-options", "SAMEORIGIN"),
];

/// JSON API responses carry tokens, so they are never cached or framed.
const API_HEADERS: &[(&str, &str)] = &[
    (
        "content-security-policy",
        "default-src 'none'; frame-ancestors 'none'",
    ),
    ("x-frame-options", "DENY"),
    ("cache-control", "no-store"),
];

const COMMON_HEADERS: &[(&str, &str)] = &[
    ("x-content-type-options", "nosniff"),
    (
        "strict-transport-security",
        "max-age=31536000; includeSubDomains",
    ),
    ("referrer-policy", "no-referrer"),
];

fn is_docs_route(path: &str) -> bool {
    path.starts_with("/docs") || path == "/.well-known/openapi.json"
}

pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let route_headers = if is_docs_route(req.uri().path()) {
        DOCS_HEADERS
    } else {
        API_HEADERS
    };

    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    for &(name, value) in COMMON_HEADERS.iter().chain(route_headers) {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    response
}
