//! Network helpers for operator-facing address presentation
//!
//! The mapping here affects ready messages and the `listen` hook payload
//! only, never which interface the socket is actually bound to.

use std::net::{IpAddr, UdpSocket};

/// Discover the machine's network-reachable IP address.
///
/// Opens an unconnected UDP socket towards a public address and reads the
/// local address the OS picked for it. No packet is sent.
pub fn local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    socket.local_addr().ok().map(|addr| addr.ip())
}

/// Map a resolved bind address to the host operators should see.
///
/// Loopback is shown as `localhost`; the wildcard address is replaced with
/// the discovered network-reachable IP (falling back to `localhost` on hosts
/// without a usable route). Everything else passes through unchanged.
pub fn display_host(host: &str) -> String {
    match host {
        "127.0.0.1" | "::1" => "localhost".to_string(),
        "0.0.0.0" | "::" => local_ip()
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "localhost".to_string()),
        other => other.to_string(),
    }
}
