//! Address resolution for the IP option types.
//!
//! Values are either address literals or host names. Names are resolved
//! through the system resolver and the first address of the requested
//! family wins. The "local" variants also require the address to be bound
//! to an interface of this host; the wildcard addresses `0.0.0.0` and `::`
//! always count as local.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, ToSocketAddrs};

use argscope_core::IpFamily;
use tracing::{debug, warn};

fn matches_family(addr: &IpAddr, family: IpFamily) -> bool {
    match family {
        IpFamily::V4 => addr.is_ipv4(),
        IpFamily::V6 => addr.is_ipv6(),
        IpFamily::Any => true,
    }
}

/// Resolves `host` to an address of `family`.
///
/// # Examples
///
/// ```
/// use argscope::resolve_address;
/// use argscope_core::IpFamily;
///
/// assert_eq!(
///     resolve_address("127.0.0.1", IpFamily::V4).map(|a| a.to_string()),
///     Some("127.0.0.1".to_string())
/// );
/// assert_eq!(resolve_address("::1", IpFamily::V4), None);
/// ```
pub fn resolve_address(host: &str, family: IpFamily) -> Option<IpAddr> {
    let host = host.trim();
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if host.is_empty() {
        return None;
    }

    if let Ok(addr) = host.parse::<IpAddr>() {
        return matches_family(&addr, family).then_some(addr);
    }

    match (host, 0u16).to_socket_addrs() {
        Ok(addrs) => addrs.map(|sa| sa.ip()).find(|ip| matches_family(ip, family)),
        Err(e) => {
            debug!(host = %host, error = %e, "address resolution failed");
            None
        }
    }
}

/// Addresses bound to this host, plus both wildcard addresses.
pub fn local_addresses() -> Vec<IpAddr> {
    let mut addrs = vec![
        IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        IpAddr::V6(Ipv6Addr::UNSPECIFIED),
    ];
    match interface_addresses() {
        Ok(found) => {
            for addr in found {
                if !addrs.contains(&addr) {
                    addrs.push(addr);
                }
            }
        }
        Err(e) => warn!(error = %e, "could not enumerate interface addresses"),
    }
    addrs
}

/// Resolves `host` like [`resolve_address`] and requires the result to be
/// one of [`local_addresses`].
pub fn resolve_local_address(host: &str, family: IpFamily) -> Option<IpAddr> {
    let addr = resolve_address(host, family)?;
    local_addresses().contains(&addr).then_some(addr)
}

fn interface_addresses() -> std::io::Result<Vec<IpAddr>> {
    let interfaces = if_addrs::get_if_addrs()?;
    Ok(interfaces.iter().map(if_addrs::Interface::ip).collect())
}
