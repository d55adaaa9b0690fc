//! File-based configuration for the terminal client.

use std::fs;
use std::io;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;
use crate::error::Result;
use crate::util::ensure_parent_dir;
use crate::util::expand_home;

pub const DEFAULT_CONFIG_PATH: &str = "~/.ringview/config.yaml";
pub const DEFAULT_ENDPOINT_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_POLL_INTERVAL: u64 = 3;
pub const DEFAULT_INSERT_VALUE: &str = "test";

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL
}

fn default_insert_value() -> String {
    DEFAULT_INSERT_VALUE.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Base URL of the ring server.
    pub endpoint_url: String,
    /// Seconds between periodic membership refreshes.
    /// When there is no configuration in the YAML file,
    /// its deserialization is equivalent to the default interval.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
    /// Value stored when an insert is submitted without one.
    #[serde(default = "default_insert_value")]
    pub insert_value: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            insert_value: DEFAULT_INSERT_VALUE.to_string(),
        }
    }
}

impl Config {
    pub fn write_fs<P>(&self, path: P) -> Result<String>
    where P: AsRef<std::path::Path> {
        let path = expand_home(path)?;
        ensure_parent_dir(&path)?;
        let f = fs::File::create(path.as_path()).map_err(|e| Error::CreateFile(e.to_string()))?;
        let f_writer = io::BufWriter::new(f);
        serde_yaml::to_writer(f_writer, self)?;
        Ok(path.to_string_lossy().to_string())
    }

    pub fn read_fs<P>(path: P) -> Result<Config>
    where P: AsRef<std::path::Path> {
        let path = expand_home(path)?;
        tracing::debug!("Read config from: {:?}", path);
        let f = fs::File::open(path).map_err(|e| Error::OpenFile(e.to_string()))?;
        let f_rdr = io::BufReader::new(f);
        Ok(serde_yaml::from_reader(f_rdr)?)
    }
}
