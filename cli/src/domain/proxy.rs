//! Reverse-proxy route definitions.
//!
//! Pure functions only: rendering and path composition, no filesystem access.

use std::path::{Path, PathBuf};

use crate::domain::naming::Domain;

/// File extension of generated route definitions.
pub const ROUTE_EXTENSION: &str = "conf";

/// On-disk layout of one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRoute {
    pub domain: Domain,
    /// Definition file under the available-routes directory.
    pub available_path: PathBuf,
    /// Activation marker under the enabled-routes directory.
    pub enabled_path: PathBuf,
    pub upstream_port: u16,
}

impl ProxyRoute {
    #[must_use]
    pub fn new(domain: Domain, available_dir: &Path, enabled_dir: &Path, upstream_port: u16) -> Self {
        let file_name = route_file_name(&domain.full);
        Self {
            available_path: available_dir.join(&file_name),
            enabled_path: enabled_dir.join(&file_name),
            domain,
            upstream_port,
        }
    }

    /// Rendered definition for this route.
    #[must_use]
    pub fn render(&self) -> String {
        render_route(&self.domain.full, self.upstream_port)
    }
}

/// File name shared by a route's definition and its activation marker.
#[must_use]
pub fn route_file_name(full_domain: &str) -> String {
    format!("{full_domain}.{ROUTE_EXTENSION}")
}

/// Render an nginx server block routing `full_domain` to `127.0.0.1:port`.
///
/// Websocket upgrade headers are forwarded so dev servers with live reload
/// keep working behind the proxy.
#[must_use]
pub fn render_route(full_domain: &str, port: u16) -> String {
    format!(
        "server {{
    listen 80;
    listen [::]:80;
    server_name {full_domain};

    location / {{
        proxy_pass http://127.0.0.1:{port};
        proxy_http_version 1.1;
        proxy_set_header Upgrade $http_upgrade;
        proxy_set_header Connection \"upgrade\";
        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
        proxy_cache_bypass $http_upgrade;
    }}
}}
"
    )
}
