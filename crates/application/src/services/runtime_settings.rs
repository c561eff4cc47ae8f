use arc_swap::ArcSwapOption;
use std::sync::Arc;
use tracing::info;

/// Settings the embedding application may change while resolutions run.
#[derive(Default)]
pub struct RuntimeSettings {
    route_ip: ArcSwapOption<String>,
}

impl RuntimeSettings {
    pub fn new(route_ip: Option<&str>) -> Self {
        let settings = Self::default();
        if let Some(ip) = route_ip.filter(|ip| !ip.trim().is_empty()) {
            settings.route_ip.store(Some(Arc::new(ip.trim().to_string())));
        }
        settings
    }

    pub fn route_ip(&self) -> Option<Arc<str>> {
        self.route_ip.load().as_deref().map(|ip| Arc::from(ip.as_str()))
    }

    pub fn set_route_ip(&self, ip: &str) {
        info!(route_ip = %ip, "Routing IP override updated");
        self.route_ip.store(Some(Arc::new(ip.trim().to_string())));
    }

    pub fn clear_route_ip(&self) {
        info!("Routing IP override cleared");
        self.route_ip.store(None);
    }
}
