use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "billed.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub session_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://./data/billed.db".into(),
            session_path: PathBuf::from("./data/session.json"),
        }
    }
}

impl Settings {
    /// Applies command-line values on top of the loaded settings.
    pub fn with_overrides(
        mut self,
        database_url: Option<String>,
        session_path: Option<PathBuf>,
    ) -> Self {
        if let Some(v) = database_url {
            self.database_url = v;
        }
        if let Some(v) = session_path {
            self.session_path = v;
        }
        self
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    database_url: Option<String>,
    session_path: Option<PathBuf>,
}

pub fn load_settings() -> Settings {
    let raw = fs::read_to_string(CONFIG_FILE).ok();
    load_settings_from(raw.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then `billed.toml` contents, then environment overrides.
pub fn load_settings_from(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file_contents {
        match toml::from_str::<FileConfig>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.database_url {
                    settings.database_url = v;
                }
                if let Some(v) = file_cfg.session_path {
                    settings.session_path = v;
                }
            }
            Err(err) => tracing::warn!(error = %err, "ignoring unreadable {CONFIG_FILE}"),
        }
    }

    if let Some(v) = env("BILLED_DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = env("BILLED_SESSION_PATH") {
        settings.session_path = PathBuf::from(v);
    }
    if let Some(v) = env("APP__SESSION_PATH") {
        settings.session_path = PathBuf::from(v);
    }

    settings
}

pub fn prepare_database_url(raw_database_url: &str) -> anyhow::Result<String> {
    let database_url = normalize_database_url(raw_database_url);
    ensure_parent_dir_exists(&database_url)?;
    Ok(database_url)
}

fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

fn ensure_parent_dir_exists(database_url: &str) -> anyhow::Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
