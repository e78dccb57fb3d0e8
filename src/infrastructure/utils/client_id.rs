use actix_web::HttpRequest;

/// Derives the rate-limit key for a request, in order of preference:
/// first `X-Forwarded-For` hop, `X-Real-IP`, socket peer, `User-Agent`,
/// and finally the literal `"unknown"`.
pub fn client_identifier(req: &HttpRequest) -> String {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    if let Some(first_hop) = header("x-forwarded-for")
        .and_then(|forwarded| forwarded.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
    {
        return first_hop.to_string();
    }

    if let Some(real_ip) = header("x-real-ip") {
        return real_ip.to_string();
    }

    if let Some(addr) = req.peer_addr() {
        return addr.ip().to_string();
    }

    header("user-agent")
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}
