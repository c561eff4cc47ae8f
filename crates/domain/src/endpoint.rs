use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointRole {
    Primary,
    Backup,
}

impl EndpointRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Backup => "backup",
        }
    }
}

/// One HTTPDNS service address. Index 0 is always the primary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerEndpoint {
    pub address: Arc<str>,
    pub role: EndpointRole,
    pub index: u32,
}

impl ServerEndpoint {
    pub fn primary(address: impl Into<Arc<str>>) -> Self {
        Self {
            address: address.into(),
            role: EndpointRole::Primary,
            index: 0,
        }
    }

    pub fn backup(address: impl Into<Arc<str>>, index: u32) -> Self {
        Self {
            address: address.into(),
            role: EndpointRole::Backup,
            index,
        }
    }

    /// Builds the ordered endpoint list: primary first, then backups in order.
    /// Blank backup entries are skipped.
    pub fn list(primary: &str, backups: &[String]) -> Vec<ServerEndpoint> {
        let mut endpoints = Vec::with_capacity(backups.len() + 1);
        endpoints.push(Self::primary(primary.trim()));
        for backup in backups.iter().map(|b| b.trim()).filter(|b| !b.is_empty()) {
            let index = endpoints.len() as u32;
            endpoints.push(Self::backup(backup, index));
        }
        endpoints
    }

    pub fn is_primary(&self) -> bool {
        self.role == EndpointRole::Primary
    }

    /// Scheme carried by the configured address, if any.
    pub fn scheme(&self) -> Option<&str> {
        self.address.split_once("://").map(|(scheme, _)| scheme)
    }

    /// Address without its scheme prefix or trailing slash.
    pub fn host(&self) -> &str {
        let rest = self
            .address
            .split_once("://")
            .map_or(&*self.address, |(_, rest)| rest);
        rest.trim_end_matches('/')
    }

    pub fn is_plaintext(&self) -> bool {
        self.scheme()
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("http"))
    }
}

impl fmt::Display for ServerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{} ({})", self.address, self.index, self.role.as_str())
    }
}
