use std::path::PathBuf;

/// 默认每日目标单词数
pub const DEFAULT_DAILY_GOAL: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite 数据库路径
    pub db_path: PathBuf,
    pub log_level: String,
    /// 每日目标单词数（用于计算进度）
    pub daily_goal: u32,
    /// 复习队列打乱种子，未设置时使用系统熵
    pub shuffle_seed: Option<u64>,
    /// 是否缓存重复检测索引
    pub duplicate_cache: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/danci.db"),
            log_level: "info".to_string(),
            daily_goal: DEFAULT_DAILY_GOAL,
            shuffle_seed: None,
            duplicate_cache: false,
        }
    }
}

impl Config {
    /// 先加载 `.env`（如存在），再读取环境变量
    pub fn load() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "已加载 .env");
        }
        Self::from_env()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let db_path = lookup("DANCI_DB_PATH")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let log_level = lookup("RUST_LOG").unwrap_or(defaults.log_level);

        let daily_goal = lookup("DANCI_DAILY_GOAL")
            .and_then(|value| value.trim().parse::<u32>().ok())
            .map(|goal| goal.max(1))
            .unwrap_or(defaults.daily_goal);

        let shuffle_seed =
            lookup("DANCI_SHUFFLE_SEED").and_then(|value| value.trim().parse::<u64>().ok());

        let duplicate_cache = lookup("DANCI_DUPLICATE_CACHE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(defaults.duplicate_cache);

        Self {
            db_path,
            log_level,
            daily_goal,
            shuffle_seed,
            duplicate_cache,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config_from(&[]), Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DANCI_DB_PATH", "/tmp/vocab.db"),
            ("RUST_LOG", "debug"),
            ("DANCI_DAILY_GOAL", "30"),
            ("DANCI_SHUFFLE_SEED", "42"),
            ("DANCI_DUPLICATE_CACHE", "1"),
        ]);

        assert_eq!(config.db_path, PathBuf::from("/tmp/vocab.db"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.daily_goal, 30);
        assert_eq!(config.shuffle_seed, Some(42));
        assert!(config.duplicate_cache);
    }

    #[test]
    fn test_load_reads_environment() {
        let config = Config::load();
        assert!(config.daily_goal >= 1);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("DANCI_DB_PATH", "  "),
            ("DANCI_DAILY_GOAL", "lots"),
            ("DANCI_SHUFFLE_SEED", "-3"),
            ("DANCI_DUPLICATE_CACHE", "yes"),
        ]);
        assert_eq!(config, Config::default());

        let zero = config_from(&[("DANCI_DAILY_GOAL", "0")]);
        assert_eq!(zero.daily_goal, 1);
    }
}
