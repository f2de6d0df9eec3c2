use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegistrarConfig {
    pub database: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("registrar.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("registrar.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<RegistrarConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: RegistrarConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

/// Resolve the database path: CLI flag wins over config wins over default.
pub fn resolve_database_path(
    flag: Option<PathBuf>,
    config: Option<&RegistrarConfig>,
) -> PathBuf {
    flag.or_else(|| {
        config
            .and_then(|c| c.database.as_deref())
            .map(PathBuf::from)
    })
    .unwrap_or_else(default_database_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins_over_config() {
        let config = RegistrarConfig {
            database: Some("from_config.db".into()),
        };
        let path = resolve_database_path(Some(PathBuf::from("from_flag.db")), Some(&config));
        assert_eq!(path, PathBuf::from("from_flag.db"));
    }

    #[test]
    fn test_config_wins_over_default() {
        let config = RegistrarConfig {
            database: Some("from_config.db".into()),
        };
        assert_eq!(
            resolve_database_path(None, Some(&config)),
            PathBuf::from("from_config.db")
        );
        assert_eq!(resolve_database_path(None, None), default_database_path());
    }
}
