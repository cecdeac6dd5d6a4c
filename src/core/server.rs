use crate::config::{self, ConfigEntity};
use crate::error::{Error, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    #[serde(skip_deserializing, default)]
    pub id: String,
    pub host: String,
    pub user: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub identity_file: Option<String>,
}

fn default_port() -> u16 {
    22
}

impl Server {
    pub fn is_valid(&self) -> bool {
        !self.host.is_empty() && !self.user.is_empty()
    }

    pub fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.host.is_empty() {
            missing.push("host".to_string());
        }
        if self.user.is_empty() {
            missing.push("user".to_string());
        }
        missing
    }
}

impl ConfigEntity for Server {
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
    fn config_path(id: &str) -> Result<PathBuf> {
        paths::server(id)
    }
    fn config_dir() -> Result<PathBuf> {
        paths::servers()
    }
    fn not_found_error(id: String) -> Error {
        Error::server_not_found(id)
    }
    fn entity_type() -> &'static str {
        "server"
    }
}

// ============================================================================
// Core CRUD - Thin wrappers around config module
// ============================================================================

pub fn load(id: &str) -> Result<Server> {
    config::load::<Server>(id)
}

pub fn list() -> Result<Vec<Server>> {
    config::list::<Server>()
}

pub fn save(server: &Server) -> Result<()> {
    config::save(server)
}

pub fn delete(id: &str) -> Result<()> {
    config::delete::<Server>(id)
}

pub fn exists(id: &str) -> bool {
    config::exists::<Server>(id)
}

/// Create or update a server config from CLI arguments.
pub fn set(
    id: &str,
    host: Option<String>,
    user: Option<String>,
    port: Option<u16>,
    identity_file: Option<String>,
) -> Result<Server> {
    let mut server = if exists(id) {
        load(id)?
    } else {
        Server {
            id: id.to_string(),
            host: String::new(),
            user: String::new(),
            port: default_port(),
            identity_file: None,
        }
    };

    if let Some(new_host) = host {
        server.host = new_host;
    }
    if let Some(new_user) = user {
        server.user = new_user;
    }
    if let Some(new_port) = port {
        server.port = new_port;
    }
    if let Some(key_path) = identity_file {
        let expanded = shellexpand::tilde(&key_path).to_string();
        if !std::path::Path::new(&expanded).exists() {
            return Err(Error::ssh_identity_file_not_found(id.to_string(), expanded));
        }
        server.identity_file = Some(expanded);
    }

    if !server.is_valid() {
        return Err(Error::ssh_server_invalid(
            id.to_string(),
            server.missing_fields(),
        ));
    }

    save(&server)?;
    Ok(server)
}
