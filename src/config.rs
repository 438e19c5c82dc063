use serde::Deserialize;
use serde::Serialize;
use std::env;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

const CONFIG_FILE_NAME: &str = ".feedpollconfig.json";

#[derive(Debug)]
pub struct ConfigError {
    pub msg: String,
}

/// Process-wide settings persisted between invocations. The current user is
/// written back to disk on login/register so follow-up commands see it.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Eq, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub db_url: String,
    #[serde(default)]
    pub current_user_name: String,
}

impl Config {
    pub fn read() -> Result<Self, ConfigError> {
        let path = config_file_path()?;

        Self::read_from(&path)
    }

    pub fn set_user(&mut self, name: &str) -> Result<(), ConfigError> {
        self.current_user_name = name.to_string();

        self.write()
    }

    pub fn database_url(&self) -> Result<String, ConfigError> {
        if !self.db_url.is_empty() {
            return Ok(self.db_url.clone());
        }

        env::var("DATABASE_URL").map_err(|_| ConfigError {
            msg: "DATABASE_URL is not set and the config file has no db_url".to_string(),
        })
    }

    pub fn write(&self) -> Result<(), ConfigError> {
        let path = config_file_path()?;

        self.write_to(&path)
    }

    fn read_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let file = File::open(path).map_err(|err| ConfigError {
            msg: format!("failed to open {}: {err}", path.display()),
        })?;

        serde_json::from_reader(file).map_err(|err| ConfigError {
            msg: format!("failed to parse {}: {err}", path.display()),
        })
    }

    fn write_to(&self, path: &Path) -> Result<(), ConfigError> {
        let file = File::create(path).map_err(|err| ConfigError {
            msg: format!("failed to create {}: {err}", path.display()),
        })?;

        serde_json::to_writer(file, self).map_err(|err| ConfigError {
            msg: format!("failed to write {}: {err}", path.display()),
        })
    }
}

fn config_file_path() -> Result<PathBuf, ConfigError> {
    let home = env::var("HOME").map_err(|_| ConfigError {
        msg: "HOME is not set".to_string(),
    })?;

    Ok(PathBuf::from(home).join(CONFIG_FILE_NAME))
}
