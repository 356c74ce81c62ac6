//! Client IP extraction for the auth failure limiter
//!
//! X-Forwarded-For is only honored up to the configured number of trusted
//! proxies so a client cannot pick its own rate-limit bucket.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_addr: Option<&SocketAddr>,
    trusted_proxy_count: usize,
) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| from_forwarded_for(v, trusted_proxy_count));
    if let Some(ip) = forwarded {
        return ip;
    }

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| is_valid_ip(v));
    if let Some(ip) = real_ip {
        return ip.to_string();
    }

    socket_addr
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// With N trusted proxies the client sits N hops from the end of the chain.
/// Zero trusted proxies, or a chain shorter than expected, falls back to the
/// nearest hop.
fn from_forwarded_for(header_value: &str, trusted_proxy_count: usize) -> Option<String> {
    let hops: Vec<&str> = header_value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let candidate = if trusted_proxy_count == 0 || hops.len() <= trusted_proxy_count {
        hops.last()?
    } else {
        hops.get(hops.len() - trusted_proxy_count - 1)?
    };

    is_valid_ip(candidate).then(|| candidate.to_string())
}

fn is_valid_ip(ip: &str) -> bool {
    ip.parse::<IpAddr>().is_ok()
}

pub fn trusted_proxy_count() -> usize {
    std::env::var("TRUSTED_PROXY_COUNT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1)
}
