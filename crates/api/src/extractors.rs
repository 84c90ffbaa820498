//! Request extractors.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Client identity hints taken from proxy and browser headers.
///
/// Extraction never fails; a request without any hints yields all-`None`
/// and downstream rate limiting falls back to the shared anonymous bucket.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    /// First X-Forwarded-For entry, or X-Real-IP.
    pub ip: Option<String>,
    /// User-agent header.
    pub user_agent: Option<String>,
}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| {
                parts
                    .headers
                    .get("x-real-ip")
                    .and_then(|v| v.to_str().ok())
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
            });

        let user_agent = parts
            .headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        Ok(Self { ip, user_agent })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(req: Request<()>) -> ClientInfo {
        let (mut parts, ()) = req.into_parts();
        ClientInfo::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_first_forwarded_for_entry_wins() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .header("x-real-ip", "10.0.0.2")
            .body(())
            .unwrap();

        let info = extract(req).await;
        assert_eq!(info.ip.as_deref(), Some("203.0.113.7"));
    }

    #[tokio::test]
    async fn test_real_ip_fallback() {
        let req = Request::builder()
            .header("x-real-ip", "203.0.113.9")
            .body(())
            .unwrap();

        let info = extract(req).await;
        assert_eq!(info.ip.as_deref(), Some("203.0.113.9"));
    }

    #[tokio::test]
    async fn test_no_headers_yields_none() {
        let req = Request::builder().body(()).unwrap();

        let info = extract(req).await;
        assert!(info.ip.is_none());
        assert!(info.user_agent.is_none());
    }
}
