use std::net::IpAddr;

use axum::http::HeaderMap;
use ipnet::IpNet;

/// Who sent a submission, for rate limiting and logs.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub ip: IpAddr,
    pub user_agent: String,
    pub referer: String,
}

pub fn extract(
    headers: &HeaderMap,
    peer_addr: Option<IpAddr>,
    trusted_proxies: &[IpNet],
) -> ClientInfo {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string()
    };

    ClientInfo {
        ip: client_ip(headers, peer_addr, trusted_proxies),
        user_agent: header("user-agent"),
        referer: header("referer"),
    }
}

fn client_ip(headers: &HeaderMap, peer_addr: Option<IpAddr>, trusted_proxies: &[IpNet]) -> IpAddr {
    let peer = peer_addr.unwrap_or(IpAddr::from([127, 0, 0, 1]));

    // Only trust X-Forwarded-For if the direct connection is from a trusted proxy
    if !trusted_proxies.is_empty() && trusted_proxies.iter().any(|net| net.contains(&peer)) {
        if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
            // Proxies append on the right; the nearest untrusted hop is the client
            for ip_str in xff.rsplit(',').map(|s| s.trim()) {
                if let Ok(ip) = ip_str.parse::<IpAddr>() {
                    if !trusted_proxies.iter().any(|net| net.contains(&ip)) {
                        return ip;
                    }
                }
            }
        }
    }

    peer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xff(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", value.parse().unwrap());
        headers
    }

    #[test]
    fn forwarded_for_ignored_from_untrusted_peer() {
        let peer: IpAddr = "203.0.113.9".parse().unwrap();
        let info = extract(&xff("198.51.100.1"), Some(peer), &[]);
        assert_eq!(info.ip, peer);
    }

    #[test]
    fn forwarded_for_used_behind_trusted_proxy() {
        let trusted: Vec<IpNet> = vec!["10.0.0.0/8".parse().unwrap()];
        let info = extract(
            &xff("198.51.100.1, 10.0.0.3"),
            Some("10.0.0.2".parse().unwrap()),
            &trusted,
        );
        assert_eq!(info.ip, "198.51.100.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn forged_leftmost_forwarded_for_is_ignored() {
        let trusted: Vec<IpNet> = vec!["10.0.0.0/8".parse().unwrap()];
        let info = extract(
            &xff("6.6.6.6, 198.51.100.1"),
            Some("10.0.0.2".parse().unwrap()),
            &trusted,
        );
        assert_eq!(info.ip, "198.51.100.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn all_trusted_hops_fall_back_to_peer() {
        let trusted: Vec<IpNet> = vec!["10.0.0.0/8".parse().unwrap()];
        let peer: IpAddr = "10.0.0.2".parse().unwrap();
        let info = extract(&xff("10.0.0.5, 10.0.0.3"), Some(peer), &trusted);
        assert_eq!(info.ip, peer);
    }
}
