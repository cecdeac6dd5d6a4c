use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

/// Base rigger config directory (~/.config/rigger/, APPDATA\rigger on Windows)
pub fn rigger() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected("APPDATA environment variable not set on Windows".to_string())
        })?;
        Ok(PathBuf::from(appdata).join("rigger"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("rigger"))
    }
}

/// Servers directory
pub fn servers() -> Result<PathBuf> {
    Ok(rigger()?.join("servers"))
}

/// Server config file path
pub fn server(id: &str) -> Result<PathBuf> {
    Ok(servers()?.join(format!("{}.json", id)))
}
