use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    time::Duration,
};

use directories::BaseDirs;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(default_config_path())
    }

    pub fn load_from(config_path: PathBuf) -> Self {
        let mut map = default_map();

        // Read .codepadrc if exists
        if config_path.exists() {
            if let Ok(file) = fs::File::open(&config_path) {
                let reader = BufReader::new(file);
                for line in reader.lines().map_while(Result::ok) {
                    if let Some((k, v)) = parse_line(&line) {
                        map.insert(k, v);
                    }
                }
            }
        }

        // Overlay environment variables (take precedence)
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map, config_path }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).cloned()
    }

    /// Command-line flags land here so they win over file and environment.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.inner.insert(key.to_string(), value.into());
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn backend_url(&self) -> String {
        self.get("BACKEND_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        let secs = self
            .get_u64("REQUEST_TIMEOUT")
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    pub fn prefs_path(&self) -> PathBuf {
        self.get("PREFS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| codepad_dir().join("prefs"))
    }

    pub fn log_path(&self) -> PathBuf {
        self.get("LOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join("codepad").join("codepad.log"))
    }
}

fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (k, v) = line.split_once('=')?;
    Some((k.trim().to_string(), v.trim().to_string()))
}

fn is_config_key(k: &str) -> bool {
    // Accept known keys or CODEPAD_* for forward-compat
    const KEYS: &[&str] = &[
        "BACKEND_URL",
        "REQUEST_TIMEOUT",
        "PREFS_PATH",
        "LOG_PATH",
        "DEFAULT_COLOR",
    ];

    KEYS.contains(&k) || k.starts_with("CODEPAD_")
}

fn codepad_dir() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("codepad")
}

fn default_config_path() -> PathBuf {
    codepad_dir().join(".codepadrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();
    m.insert("BACKEND_URL".into(), DEFAULT_BACKEND_URL.into());
    m.insert("REQUEST_TIMEOUT".into(), DEFAULT_TIMEOUT_SECS.to_string());
    m.insert("DEFAULT_COLOR".into(), "green".into());
    m
}

pub fn write_default_rc(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = format!(
        "# codepad configuration\nBACKEND_URL={}\nREQUEST_TIMEOUT={}\n",
        DEFAULT_BACKEND_URL, DEFAULT_TIMEOUT_SECS
    );
    fs::write(path, body)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_line_skips_comments_and_blank() {
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("# BACKEND_URL=x"), None);
        assert_eq!(parse_line("no equals sign"), None);
        assert_eq!(
            parse_line(" BACKEND_URL = http://exec:9000 "),
            Some(("BACKEND_URL".into(), "http://exec:9000".into()))
        );
    }

    #[test]
    fn defaults_apply_without_rc_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(dir.path().join("missing-rc"));
        if env::var("BACKEND_URL").is_err() {
            assert_eq!(cfg.backend_url(), DEFAULT_BACKEND_URL);
        }
        if env::var("REQUEST_TIMEOUT").is_err() {
            assert_eq!(cfg.request_timeout(), Duration::from_secs(60));
        }
    }

    #[test]
    fn rc_file_values_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".codepadrc");
        fs::write(&rc, "# comment\nCODEPAD_TEST_ONLY=abc\nREQUEST_TIMEOUT = 5\n").unwrap();
        let cfg = Config::load_from(rc);
        assert_eq!(cfg.get("CODEPAD_TEST_ONLY").as_deref(), Some("abc"));
        if env::var("REQUEST_TIMEOUT").is_err() {
            assert_eq!(cfg.request_timeout(), Duration::from_secs(5));
        }
    }

    #[test]
    fn set_overrides_and_blank_url_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::load_from(dir.path().join("none"));
        cfg.set("BACKEND_URL", "http://127.0.0.1:9999/exec");
        assert_eq!(cfg.backend_url(), "http://127.0.0.1:9999/exec");
        cfg.set("BACKEND_URL", "  ");
        assert_eq!(cfg.backend_url(), DEFAULT_BACKEND_URL);
        cfg.set("REQUEST_TIMEOUT", "0");
        assert_eq!(cfg.request_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn write_default_rc_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join("nested").join(".codepadrc");
        write_default_rc(&rc).unwrap();
        let cfg = Config::load_from(rc);
        if env::var("BACKEND_URL").is_err() {
            assert_eq!(cfg.backend_url(), DEFAULT_BACKEND_URL);
        }
    }
}
