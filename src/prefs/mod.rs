//! Persisted UI preferences (currently just the dark-mode flag).

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};

use crate::config::Config;

#[derive(Debug, Clone)]
pub struct Prefs {
    pub dark_mode: bool,
    path: PathBuf,
}

impl Prefs {
    pub fn from_config(cfg: &Config) -> Self {
        Self::load(cfg.prefs_path())
    }

    /// Missing or unreadable files yield the defaults.
    pub fn load(path: PathBuf) -> Self {
        let dark_mode = fs::read_to_string(&path)
            .ok()
            .and_then(|text| {
                text.lines()
                    .filter_map(|l| l.split_once('='))
                    .find(|(k, _)| k.trim() == "DARK_MODE")
                    .map(|(_, v)| v.trim().eq_ignore_ascii_case("true"))
            })
            .unwrap_or(false);
        Self { dark_mode, path }
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(&self.path, format!("DARK_MODE={}\n", self.dark_mode))
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }

    /// Flip the theme and persist it; returns the new value.
    pub fn toggle_dark_mode(&mut self) -> Result<bool> {
        self.dark_mode = !self.dark_mode;
        self.save()?;
        tracing::debug!(dark_mode = self.dark_mode, "theme preference saved");
        Ok(self.dark_mode)
    }
}
