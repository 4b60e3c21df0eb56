//! 客户端地址解析
//!
//! The address recorded in relay logs is the connecting peer, unless that
//! peer is a configured trusted proxy, in which case the forwarded client
//! address is used instead.

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use tracing::trace;

/// Placeholder logged when no address is available (e.g. in-process tests)
pub const UNKNOWN_CLIENT: &str = "unknown";

/// 检查 IP 是否在可信代理列表中
pub fn is_trusted_proxy(ip: &str, trusted_proxies: &[String]) -> bool {
    // 先尝试解析为 SocketAddr（支持 ip:port），如果失败再尝试纯 IpAddr
    let ip_addr = if let Ok(socket_addr) = ip.parse::<SocketAddr>() {
        socket_addr.ip()
    } else if let Ok(ip_addr) = ip.parse::<IpAddr>() {
        ip_addr
    } else {
        return false;
    };

    trusted_proxies.iter().any(|proxy| {
        if proxy.contains('/') {
            ip_in_cidr(&ip_addr, proxy)
        } else {
            proxy.parse::<IpAddr>().is_ok_and(|p| p == ip_addr)
        }
    })
}

/// CIDR 检查
pub fn ip_in_cidr(ip: &IpAddr, cidr: &str) -> bool {
    let Some((network, prefix_len)) = cidr.split_once('/') else {
        return false;
    };

    let Ok(prefix_len): Result<u8, _> = prefix_len.parse() else {
        return false;
    };

    let Ok(network_addr) = network.parse::<IpAddr>() else {
        return false;
    };

    match (ip, network_addr) {
        (IpAddr::V4(ip), IpAddr::V4(net)) => {
            if prefix_len > 32 {
                return false;
            }
            let mask = u32::MAX.checked_shl(32 - prefix_len as u32).unwrap_or(0);
            let ip_bits = u32::from_be_bytes(ip.octets());
            let net_bits = u32::from_be_bytes(net.octets());
            (ip_bits & mask) == (net_bits & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) => {
            if prefix_len > 128 {
                return false;
            }
            let mask = u128::MAX.checked_shl(128 - prefix_len as u32).unwrap_or(0);
            let ip_bits = u128::from_be_bytes(ip.octets());
            let net_bits = u128::from_be_bytes(net.octets());
            (ip_bits & mask) == (net_bits & mask)
        }
        _ => false, // IPv4 vs IPv6 不匹配
    }
}

/// 从 HeaderMap 提取转发的地址
pub fn extract_forwarded_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    // 优先 X-Forwarded-For（取第一个，即原始客户端）
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve the address to log for a request.
///
/// Forwarding headers are only honoured when the peer is trusted, so a
/// direct client cannot spoof its logged address.
pub fn resolve_client_addr(
    peer: Option<SocketAddr>,
    headers: &HeaderMap,
    trusted_proxies: &[String],
) -> String {
    let Some(peer) = peer else {
        return UNKNOWN_CLIENT.to_string();
    };

    if !trusted_proxies.is_empty()
        && is_trusted_proxy(&peer.ip().to_string(), trusted_proxies)
        && let Some(real) = extract_forwarded_ip_from_headers(headers)
    {
        trace!("Trusted proxy {} -> {}", peer, real);
        return real;
    }

    peer.to_string()
}

/// 从 HttpRequest 提取客户端地址
pub fn extract_client_addr(req: &HttpRequest, trusted_proxies: &[String]) -> String {
    resolve_client_addr(req.peer_addr(), req.headers(), trusted_proxies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{HeaderName, HeaderValue};

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(
                HeaderName::from_static(k),
                HeaderValue::from_static(v),
            );
        }
        map
    }

    #[test]
    fn test_ip_in_cidr_ipv4() {
        let ip: IpAddr = "192.168.1.100".parse().unwrap();
        assert!(ip_in_cidr(&ip, "192.168.1.0/24"));
        assert!(ip_in_cidr(&ip, "192.168.0.0/16"));
        assert!(!ip_in_cidr(&ip, "192.168.2.0/24"));
        assert!(!ip_in_cidr(&ip, "10.0.0.0/8"));
        assert!(!ip_in_cidr(&ip, "192.168.1.0/33"));
    }

    #[test]
    fn test_ip_in_cidr_ipv6() {
        let ip: IpAddr = "2001:db8::1".parse().unwrap();
        assert!(ip_in_cidr(&ip, "2001:db8::/32"));
        assert!(!ip_in_cidr(&ip, "2001:db9::/32"));
        assert!(!ip_in_cidr(&ip, "10.0.0.0/8"));
    }

    #[test]
    fn test_is_trusted_proxy() {
        let proxies = vec![
            "127.0.0.1".to_string(),
            "192.168.1.0/24".to_string(),
        ];

        assert!(is_trusted_proxy("127.0.0.1", &proxies));
        assert!(is_trusted_proxy("127.0.0.1:8080", &proxies));
        assert!(is_trusted_proxy("192.168.1.50", &proxies));
        assert!(!is_trusted_proxy("8.8.8.8", &proxies));
        assert!(!is_trusted_proxy("not-an-ip", &proxies));
    }

    #[test]
    fn test_untrusted_peer_ignores_forwarded_header() {
        let peer: SocketAddr = "203.0.113.7:5000".parse().unwrap();
        let h = headers(&[("x-forwarded-for", "1.2.3.4")]);
        assert_eq!(
            resolve_client_addr(Some(peer), &h, &["10.0.0.0/8".to_string()]),
            "203.0.113.7:5000"
        );
        assert_eq!(resolve_client_addr(Some(peer), &h, &[]), "203.0.113.7:5000");
    }

    #[test]
    fn test_trusted_peer_uses_forwarded_header() {
        let peer: SocketAddr = "10.1.2.3:443".parse().unwrap();
        let h = headers(&[("x-forwarded-for", "198.51.100.9, 10.1.2.3")]);
        assert_eq!(
            resolve_client_addr(Some(peer), &h, &["10.0.0.0/8".to_string()]),
            "198.51.100.9"
        );

        let h = headers(&[("x-real-ip", "198.51.100.10")]);
        assert_eq!(
            resolve_client_addr(Some(peer), &h, &["10.0.0.0/8".to_string()]),
            "198.51.100.10"
        );
    }

    #[test]
    fn test_trusted_peer_without_header_falls_back() {
        let peer: SocketAddr = "10.1.2.3:443".parse().unwrap();
        assert_eq!(
            resolve_client_addr(Some(peer), &HeaderMap::new(), &["10.0.0.0/8".to_string()]),
            "10.1.2.3:443"
        );
    }

    #[test]
    fn test_no_peer() {
        assert_eq!(resolve_client_addr(None, &HeaderMap::new(), &[]), UNKNOWN_CLIENT);
    }
}
