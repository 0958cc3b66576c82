use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

const KEY_HEX_LEN: usize = 64;

/// Typed configuration, loaded once at process start.
#[derive(Clone, Debug)]
pub struct Config {
    /// 64 hex chars (AES-256 key). Held as given; the vault parses it.
    /// Deliberately excluded from `Debug`-friendly logging by the caller.
    pub encryption_key_hex: String,
    pub store_path: PathBuf,
    pub games_path: Option<PathBuf>,

    // Retry / run policy
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub run_timeout: Duration,
    pub worker_pool: usize,
    pub disable_after_failures: u32,

    // HTTP
    pub http_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let encryption_key_hex = env_str("ECB_ENCRYPTION_KEY").unwrap_or_default();
        validate_key_hex(&encryption_key_hex)?;

        let store_path =
            env_path("ECB_STORE_PATH").unwrap_or_else(|| PathBuf::from("ecb-store.json"));
        let games_path = env_path("ECB_GAMES_PATH");

        let max_attempts = env_u32("ECB_MAX_ATTEMPTS").unwrap_or(3).max(1);
        let backoff_base = Duration::from_millis(env_u64("ECB_BACKOFF_MS").unwrap_or(500));
        let run_timeout = Duration::from_millis(env_u64("ECB_RUN_TIMEOUT_MS").unwrap_or(120_000));
        let worker_pool = env_usize("ECB_WORKER_POOL").unwrap_or(4).max(1);
        let disable_after_failures = env_u32("ECB_DISABLE_AFTER_FAILURES").unwrap_or(5).max(1);
        let http_timeout = Duration::from_millis(env_u64("ECB_HTTP_TIMEOUT_MS").unwrap_or(15_000));

        Ok(Self {
            encryption_key_hex,
            store_path,
            games_path,
            max_attempts,
            backoff_base,
            run_timeout,
            worker_pool,
            disable_after_failures,
            http_timeout,
        })
    }
}

/// Fail fast on missing/malformed key material instead of at first use.
pub fn validate_key_hex(key: &str) -> Result<()> {
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::Config(
            "ECB_ENCRYPTION_KEY environment variable is required (64 hex chars)".to_string(),
        ));
    }
    if key.len() != KEY_HEX_LEN || !key.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::Config(format!(
            "ECB_ENCRYPTION_KEY must be {KEY_HEX_LEN} hex chars, got {} chars",
            key.len()
        )));
    }
    Ok(())
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_u32(key: &str) -> Option<u32> {
    env_str(key).and_then(|s| s.trim().parse::<u32>().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    env_str(key).and_then(|s| s.trim().parse::<usize>().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_validation_rejects_missing_and_short_keys() {
        assert!(matches!(validate_key_hex(""), Err(Error::Config(_))));
        assert!(matches!(validate_key_hex("beef"), Err(Error::Config(_))));
        let not_hex = "zz".repeat(32);
        assert!(matches!(validate_key_hex(&not_hex), Err(Error::Config(_))));
    }

    #[test]
    fn key_validation_accepts_64_hex_chars() {
        let key = "0f".repeat(32);
        assert!(validate_key_hex(&key).is_ok());
    }

    #[test]
    fn dotenv_does_not_override_existing_env() {
        let var = format!("ECB_DOTENV_TEST_{}", std::process::id());
        env::set_var(&var, "kept");

        let path = std::env::temp_dir().join(format!("ecb-dotenv-{}.env", std::process::id()));
        fs::write(&path, format!("{var}=overridden\n")).unwrap();
        load_dotenv_if_present(&path);

        assert_eq!(env::var(&var).unwrap(), "kept");
        env::remove_var(&var);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn dotenv_strips_quotes() {
        let var = format!("ECB_DOTENV_QUOTED_{}", std::process::id());
        let path = std::env::temp_dir().join(format!("ecb-dotenv-q-{}.env", std::process::id()));
        fs::write(&path, format!("{var}=\"quoted value\"\n")).unwrap();
        load_dotenv_if_present(&path);

        assert_eq!(env::var(&var).unwrap(), "quoted value");
        env::remove_var(&var);
        let _ = fs::remove_file(&path);
    }
}
