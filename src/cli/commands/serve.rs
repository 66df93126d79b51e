//! Web server command.

use std::net::Ipv6Addr;

use console::style;

use crate::config::Settings;

use super::super::helpers::build_lookup;

/// Port used when the bind address names only a host.
const DEFAULT_PORT: u16 = 8000;

/// Start the web server.
pub async fn cmd_serve(settings: &Settings, bind: &str) -> anyhow::Result<()> {
    let (host, port) = parse_bind_address(bind)?;

    let lookup = build_lookup(settings)?;
    println!(
        "  {} {} properties, {} known locations",
        style("✓").green(),
        lookup.catalog().properties().len(),
        lookup.catalog().locations().len()
    );

    println!(
        "{} Starting nearby server at http://{}",
        style("→").cyan(),
        display_address(&host, port)
    );
    println!("  Press Ctrl+C to stop");

    crate::server::serve(lookup, &host, port).await
}

/// Parse a bind address that can be:
/// - Just a port: "8000" -> 0.0.0.0:8000
/// - Just a host: "127.0.0.1" or "::1" -> host:8000
/// - Host and port: "127.0.0.1:9000" or "[::1]:9000"
fn parse_bind_address(bind: &str) -> anyhow::Result<(String, u16)> {
    let bind = bind.trim();
    if bind.is_empty() {
        anyhow::bail!("Bind address must not be empty");
    }

    // Try parsing as just a port number
    if let Ok(port) = bind.parse::<u16>() {
        return Ok(("0.0.0.0".to_string(), port));
    }

    // Bracketed IPv6, with or without a port
    if let Some(rest) = bind.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| anyhow::anyhow!("Unclosed '[' in bind address '{}'", bind))?;
        host.parse::<Ipv6Addr>()
            .map_err(|_| anyhow::anyhow!("Invalid IPv6 address '{}'", host))?;
        let port = match tail {
            "" => DEFAULT_PORT,
            _ => tail
                .strip_prefix(':')
                .and_then(|p| p.parse::<u16>().ok())
                .ok_or_else(|| anyhow::anyhow!("Invalid port in bind address '{}'", bind))?,
        };
        return Ok((host.to_string(), port));
    }

    // Bare IPv6 never carries a port
    if bind.parse::<Ipv6Addr>().is_ok() {
        return Ok((bind.to_string(), DEFAULT_PORT));
    }

    // Try parsing as host:port
    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if host.contains(':') {
            anyhow::bail!(
                "Invalid bind address '{}'; write IPv6 with a port as [addr]:port",
                bind
            );
        }
        let port = port_str
            .parse::<u16>()
            .map_err(|_| anyhow::anyhow!("Invalid port in bind address '{}'", bind))?;
        return Ok((host.to_string(), port));
    }

    // Must be just a host, use default port
    Ok((bind.to_string(), DEFAULT_PORT))
}

/// `host:port` for display, bracketing IPv6 hosts.
fn display_address(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bind_address() {
        assert_eq!(
            parse_bind_address("9000").unwrap(),
            ("0.0.0.0".to_string(), 9000)
        );
        assert_eq!(
            parse_bind_address("127.0.0.1").unwrap(),
            ("127.0.0.1".to_string(), 8000)
        );
        assert_eq!(
            parse_bind_address("127.0.0.1:9000").unwrap(),
            ("127.0.0.1".to_string(), 9000)
        );
        assert!(parse_bind_address("  ").is_err());
        assert!(parse_bind_address("127.0.0.1:http").is_err());
    }

    #[test]
    fn test_parse_bind_address_ipv6() {
        assert_eq!(parse_bind_address("::1").unwrap(), ("::1".to_string(), 8000));
        assert_eq!(parse_bind_address("::").unwrap(), ("::".to_string(), 8000));
        assert_eq!(
            parse_bind_address("[::1]:9000").unwrap(),
            ("::1".to_string(), 9000)
        );
        assert_eq!(parse_bind_address("[::1]").unwrap(), ("::1".to_string(), 8000));
        assert!(parse_bind_address("[::1").is_err());
        assert!(parse_bind_address("[::1]9000").is_err());
        assert!(parse_bind_address("[localhost]:9000").is_err());
        assert!(parse_bind_address("fe80::1::zz:80").is_err());
    }

    #[test]
    fn test_display_address() {
        assert_eq!(display_address("127.0.0.1", 8000), "127.0.0.1:8000");
        assert_eq!(display_address("::1", 8000), "[::1]:8000");
    }
}
