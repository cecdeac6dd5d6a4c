use crate::error::Error;
use crate::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

/// A JSON-backed configuration entity stored as one file per id.
pub trait ConfigEntity: Serialize + DeserializeOwned {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn config_path(id: &str) -> Result<PathBuf>;
    fn config_dir() -> Result<PathBuf>;
    fn not_found_error(id: String) -> Error;
    fn entity_type() -> &'static str;
}

/// Parse JSON string into typed value.
pub(crate) fn from_str<T: DeserializeOwned>(s: &str, path: &Path) -> Result<T> {
    serde_json::from_str(s).map_err(|e| Error::config_invalid_json(path.display().to_string(), e))
}

/// Serialize value to pretty-printed JSON string.
pub(crate) fn to_string_pretty<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string_pretty(data)
        .map_err(|e| Error::internal_json(e.to_string(), Some("serialize config".to_string())))
}

pub fn load<T: ConfigEntity>(id: &str) -> Result<T> {
    let path = T::config_path(id)?;
    if !path.exists() {
        return Err(T::not_found_error(id.to_string()));
    }

    let raw = std::fs::read_to_string(&path).map_err(|e| {
        Error::internal_io(
            e.to_string(),
            Some(format!("read {} config", T::entity_type())),
        )
    })?;

    let mut entity: T = from_str(&raw, &path)?;
    entity.set_id(id.to_string());
    Ok(entity)
}

pub fn save<T: ConfigEntity>(entity: &T) -> Result<()> {
    let path = T::config_path(entity.id())?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::internal_io(e.to_string(), Some("create config directory".to_string()))
        })?;
    }

    let payload = to_string_pretty(entity)?;
    std::fs::write(&path, payload).map_err(|e| {
        Error::internal_io(
            e.to_string(),
            Some(format!("write {} config", T::entity_type())),
        )
    })
}

pub fn list<T: ConfigEntity>() -> Result<Vec<T>> {
    let dir = T::config_dir()?;
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(&dir).map_err(|e| {
        Error::internal_io(
            e.to_string(),
            Some(format!("list {} configs", T::entity_type())),
        )
    })?;

    let mut ids: Vec<String> = entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            name.strip_suffix(".json").map(|s| s.to_string())
        })
        .collect();
    ids.sort();

    ids.iter().map(|id| load::<T>(id)).collect()
}

pub fn exists<T: ConfigEntity>(id: &str) -> bool {
    T::config_path(id).map(|p| p.exists()).unwrap_or(false)
}

pub fn delete<T: ConfigEntity>(id: &str) -> Result<()> {
    let path = T::config_path(id)?;
    if !path.exists() {
        return Err(T::not_found_error(id.to_string()));
    }

    std::fs::remove_file(&path).map_err(|e| {
        Error::internal_io(
            e.to_string(),
            Some(format!("delete {} config", T::entity_type())),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn from_str_maps_parse_failure_to_config_error() {
        let err =
            from_str::<serde_json::Value>("{not json", Path::new("/tmp/bad.json")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidJson);
        assert_eq!(err.details["path"], "/tmp/bad.json");
    }
}
