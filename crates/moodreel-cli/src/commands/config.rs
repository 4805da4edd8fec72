/// Configuration management command handlers
use anyhow::Result;
use std::path::Path;

use moodreel_core::AppConfig;

pub fn handle_config_get(path: &Path, key: &str) -> Result<()> {
    let config = AppConfig::load(path)?;
    let value = config.get(key)?;
    if value.is_empty() {
        println!("{key} is not set");
    } else {
        println!("{key} = {value}");
    }
    Ok(())
}

pub fn handle_config_set(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut config = AppConfig::load(path)?;
    config.set(key, value)?;
    config.save(path)?;
    println!("Set {key} = {value}");
    Ok(())
}

pub fn handle_config_list(path: &Path) -> Result<()> {
    let config = AppConfig::load(path)?;

    println!("Configuration ({}):", path.display());
    let mut section = "";
    for (key, value) in config.entries() {
        let (key_section, field) = key.split_once('.').unwrap_or(("", key));
        if key_section != section {
            section = key_section;
            println!("\n[{section}]");
        }
        if value.is_empty() {
            println!("  {field} = (default)");
        } else {
            println!("  {field} = {value}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        handle_config_set(&path, "limits.break_presets_minutes", "5,20").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.limits.break_presets_minutes, vec![5, 20]);
    }

    #[test]
    fn test_set_unknown_key_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        assert!(handle_config_set(&path, "feed.unknown", "1").is_err());
        assert!(!path.exists());
    }
}
