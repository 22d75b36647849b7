use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::db::config::{env_bool, env_i64, env_u32, DbConfig, DbConfigError};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log: LogConfig,
    pub db: DbConfig,
    pub practice: PracticeConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, DbConfigError> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        Ok(Self {
            host,
            port,
            log: LogConfig::from_env(),
            db: DbConfig::from_env()?,
            practice: PracticeConfig::from_env(),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directive, from `RUST_LOG`
    pub level: String,
    /// Directory for rotated log files; `None` keeps logs on stdout only
    pub file_dir: Option<PathBuf>,
}

impl LogConfig {
    pub fn from_env() -> Self {
        let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let file_dir = env_bool("ENABLE_FILE_LOGS", false).then(|| {
            std::env::var("LOG_DIR")
                .ok()
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./logs"))
        });
        Self { level, file_dir }
    }
}

/// Gamification knobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeConfig {
    pub xp_hint_cost: i64,
    pub xp_solution_cost: i64,
    pub xp_correct_reward: i64,
    pub assessment_size: usize,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            xp_hint_cost: 5,
            xp_solution_cost: 10,
            xp_correct_reward: 10,
            assessment_size: 10,
        }
    }
}

impl PracticeConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            xp_hint_cost: env_i64("XP_HINT_COST", defaults.xp_hint_cost).max(0),
            xp_solution_cost: env_i64("XP_SOLUTION_COST", defaults.xp_solution_cost).max(0),
            xp_correct_reward: env_i64("XP_CORRECT_REWARD", defaults.xp_correct_reward).max(0),
            assessment_size: env_u32("ASSESSMENT_SIZE", defaults.assessment_size as u32).max(1)
                as usize,
        }
    }
}
