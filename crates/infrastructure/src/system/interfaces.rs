use httpdns_domain::DomainError;
use std::net::IpAddr;

/// Source of the host's interface addresses.
pub trait InterfaceSource: Send + Sync {
    /// Addresses bound to interfaces that are up and not loopback.
    fn addresses(&self) -> Result<Vec<IpAddr>, DomainError>;
}

/// Reads addresses with `getifaddrs(3)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemInterfaces;

#[cfg(unix)]
impl InterfaceSource for SystemInterfaces {
    fn addresses(&self) -> Result<Vec<IpAddr>, DomainError> {
        let mut head: *mut libc::ifaddrs = std::ptr::null_mut();

        // SAFETY: getifaddrs writes a list head we free below.
        if unsafe { libc::getifaddrs(&mut head) } != 0 {
            return Err(DomainError::InterfaceEnumeration(
                std::io::Error::last_os_error().to_string(),
            ));
        }

        let mut addresses = Vec::new();
        let mut cursor = head;
        while !cursor.is_null() {
            // SAFETY: cursor is a non-null node of the list returned above.
            let ifa = unsafe { &*cursor };
            cursor = ifa.ifa_next;

            let flags = ifa.ifa_flags as libc::c_int;
            if flags & libc::IFF_UP == 0 || flags & libc::IFF_LOOPBACK != 0 {
                continue;
            }
            if ifa.ifa_addr.is_null() {
                continue;
            }

            // SAFETY: ifa_addr is non-null and points at a sockaddr owned by the list.
            if let Some(addr) = unsafe { sockaddr_to_ip(ifa.ifa_addr) } {
                addresses.push(addr);
            }
        }

        // SAFETY: head came from a successful getifaddrs call.
        unsafe { libc::freeifaddrs(head) };
        Ok(addresses)
    }
}

#[cfg(not(unix))]
impl InterfaceSource for SystemInterfaces {
    fn addresses(&self) -> Result<Vec<IpAddr>, DomainError> {
        Err(DomainError::InterfaceEnumeration(
            "interface enumeration is not supported on this platform".into(),
        ))
    }
}

#[cfg(unix)]
unsafe fn sockaddr_to_ip(sa: *const libc::sockaddr) -> Option<IpAddr> {
    match (*sa).sa_family as libc::c_int {
        libc::AF_INET => {
            let sin = &*(sa as *const libc::sockaddr_in);
            Some(IpAddr::from(sin.sin_addr.s_addr.to_ne_bytes()))
        }
        libc::AF_INET6 => {
            let sin6 = &*(sa as *const libc::sockaddr_in6);
            Some(IpAddr::from(sin6.sin6_addr.s6_addr))
        }
        _ => None,
    }
}
