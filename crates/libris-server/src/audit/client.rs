//! Client address and user agent of the current request

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use std::convert::Infallible;
use std::net::SocketAddr;

use super::capture::AuditContext;
use crate::middleware::AuthUser;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Request origin captured for audit entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: String,
}

impl ClientInfo {
    pub fn from_parts(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        Self {
            ip_address: client_ip(headers, peer),
            user_agent: headers
                .get(header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// Audit context for an action performed by `user`
    pub fn context_for(&self, user: &AuthUser) -> AuditContext {
        AuditContext {
            user_id: Some(user.id),
            ip_address: self.ip_address.clone(),
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn anonymous(&self) -> AuditContext {
        AuditContext {
            user_id: None,
            ip_address: self.ip_address.clone(),
            user_agent: self.user_agent.clone(),
        }
    }
}

/// First `X-Forwarded-For` entry, else the peer address
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    let forwarded = headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    match forwarded {
        Some(ip) => Some(ip.to_string()),
        None => peer.map(|addr| addr.ip().to_string()),
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(Self::from_parts(&parts.headers, peer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use libris_common::types::UserTier;
    use uuid::Uuid;

    fn peer() -> Option<SocketAddr> {
        Some("192.0.2.10:51234".parse().unwrap())
    }

    #[test]
    fn test_forwarded_for_wins_over_peer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_static("203.0.113.5, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers, peer()).as_deref(), Some("203.0.113.5"));
    }

    #[test]
    fn test_peer_address_fallback() {
        assert_eq!(client_ip(&HeaderMap::new(), peer()).as_deref(), Some("192.0.2.10"));
        assert_eq!(client_ip(&HeaderMap::new(), None), None);

        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static(" "));
        assert_eq!(client_ip(&headers, peer()).as_deref(), Some("192.0.2.10"));
    }

    #[test]
    fn test_context_for_user() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("libris-web/1.0"));
        let client = ClientInfo::from_parts(&headers, peer());
        let user = AuthUser {
            id: Uuid::new_v4(),
            username: "reader".to_string(),
            tier: UserTier::Premium,
        };

        let ctx = client.context_for(&user);
        assert_eq!(ctx.user_id, Some(user.id));
        assert_eq!(ctx.user_agent, "libris-web/1.0");
        assert_eq!(ctx.ip_address.as_deref(), Some("192.0.2.10"));
        assert_eq!(client.anonymous().user_id, None);
    }
}
