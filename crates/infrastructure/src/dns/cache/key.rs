use compact_str::CompactString;
use httpdns_domain::NetworkStack;
use std::hash::{Hash, Hasher};

/// `(domain, stack)` cache key. Domains up to 24 bytes stay inline, so
/// building one for a lookup does not allocate.
#[derive(Clone, Debug, Eq)]
pub struct CacheKey {
    pub domain: CompactString,
    pub stack: NetworkStack,
}

impl CacheKey {
    #[inline]
    pub fn new(domain: &str, stack: NetworkStack) -> Self {
        Self {
            domain: CompactString::from(domain),
            stack,
        }
    }
}

impl Hash for CacheKey {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.domain.as_str().hash(state);
        self.stack.as_u8().hash(state);
    }
}

impl PartialEq for CacheKey {
    #[inline]
    fn eq(&self, other: &CacheKey) -> bool {
        self.stack == other.stack && self.domain == other.domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_is_part_of_the_key() {
        let v4 = CacheKey::new("a.example.com", NetworkStack::Ipv4Only);
        let v6 = CacheKey::new("a.example.com", NetworkStack::Ipv6Only);

        assert_ne!(v4, v6);
        assert_eq!(v4, CacheKey::new("a.example.com", NetworkStack::Ipv4Only));
    }
}
