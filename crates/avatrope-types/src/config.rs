use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{AvatropeError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub profile_image_url: String,
    pub status_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    pub steps: u32,
    pub duration_secs: u64,
    pub frame_delay_ms: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub state_dir: String,
    pub output_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    pub app_path: String,
    pub user_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsConfig {
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatropeConfig {
    pub api: ApiConfig,
    pub animation: AnimationConfig,
    pub storage: StorageConfig,
    pub credentials: CredentialsConfig,
    pub ops: OpsConfig,
}

impl Default for AvatropeConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                profile_image_url: "https://api.twitter.com/1.1/account/update_profile_image.json"
                    .into(),
                status_url: "https://api.twitter.com/1.1/statuses/update.json".into(),
                timeout_secs: 30,
            },
            animation: AnimationConfig {
                steps: 60,
                duration_secs: 60 * 60 * 24 * 30,
                frame_delay_ms: 100,
            },
            storage: StorageConfig {
                state_dir: ".".into(),
                output_dir: "img".into(),
            },
            credentials: CredentialsConfig {
                app_path: "app.toml".into(),
                user_path: "user.toml".into(),
            },
            ops: OpsConfig {
                log_level: "info".into(),
            },
        }
    }
}

impl AvatropeConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).map_err(|err| {
            AvatropeError::Configuration(format!(
                "unable to read config file {}: {err}",
                path_ref.display()
            ))
        })?;
        toml::from_str(&contents).map_err(|err| {
            AvatropeError::Configuration(format!(
                "failed to parse config file {}: {err}",
                path_ref.display()
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.profile_image_url.trim().is_empty() {
            return Err(AvatropeError::Configuration(
                "api.profile_image_url must not be empty".into(),
            ));
        }
        if self.api.status_url.trim().is_empty() {
            return Err(AvatropeError::Configuration(
                "api.status_url must not be empty".into(),
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(AvatropeError::Configuration(
                "api.timeout_secs must be greater than zero".into(),
            ));
        }
        if self.animation.steps == 0 {
            return Err(AvatropeError::Configuration(
                "animation.steps must be greater than zero".into(),
            ));
        }
        if self.animation.duration_secs == 0 {
            return Err(AvatropeError::Configuration(
                "animation.duration_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
