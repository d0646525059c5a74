use std::collections::{BTreeMap, HashMap};
use std::env;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config as HierarchicalConfig, Environment};
use heap_rust_sdk::models::wantlist::WantlistSort;
use heap_rust_sdk::providers::catalog::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Name of heap managed directories
const HEAP_DIR_NAME: &str = "heap";
const HEAP_CONFIG_DIR_VAR: &str = "HEAP_CONFIG_DIR";
const HEAP_ENV_PREFIX: &str = "HEAP_";
pub const HEAP_CONFIG_FILE: &str = "heap.toml";

/// Variables read by earlier releases, used when no `HEAP_*` equivalent is set.
const LEGACY_ENV_VARS: [(&str, &str); 2] = [
    ("DISCOGS_TOKEN", "token"),
    ("DISCOGS_USERNAME", "username"),
];

#[derive(Clone, Debug, Deserialize, Default, Serialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub heap: HeapConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct HeapConfig {
    /// Directory heap loads its configuration file from (default:
    /// `$XDG_CONFIG_HOME/heap`)
    pub config_dir: PathBuf,

    /// Personal access token for the catalog API
    pub token: Option<String>,

    /// Whose collection and wantlist to show when no user is given
    pub username: Option<String>,

    /// The URL of the catalog API to use
    pub base_url: Option<String>,

    /// Override the `User-Agent` sent to the catalog API
    pub user_agent: Option<String>,

    /// How many items to request per page
    pub per_page: Option<u32>,

    /// Default order of `heap wantlist`
    #[serde(default)]
    pub wantlist_sort: WantlistSort,

    /// Additional headers sent with every catalog request
    #[serde(default)]
    pub extra_headers: BTreeMap<String, String>,
}

impl HeapConfig {
    /// The configured page size, falling back to the catalog default.
    pub fn per_page(&self) -> Result<NonZeroU32> {
        match self.per_page {
            None => Ok(DEFAULT_PAGE_SIZE),
            Some(n) => NonZeroU32::new(n).context("'per_page' must be greater than 0"),
        }
    }
}

impl Config {
    /// Creates a [Config] from the environment and config file
    pub fn parse() -> Result<Config> {
        let config_dir = match env::var(HEAP_CONFIG_DIR_VAR) {
            Ok(v) => {
                debug!("`${HEAP_CONFIG_DIR_VAR}` set: {v}");
                PathBuf::from(v)
            },
            Err(_) => {
                let config_dir = dirs::config_dir()
                    .context("Could not determine the user configuration directory")?
                    .join(HEAP_DIR_NAME);
                debug!("`${HEAP_CONFIG_DIR_VAR}` not set, using {config_dir:?}");
                config_dir
            },
        };

        Self::read(&config_dir, env::vars())
    }

    /// Layer defaults, `heap.toml` in `config_dir` and `vars` into a [Config].
    ///
    /// Later sources override earlier ones:
    /// the config file, legacy variables, then `HEAP_*` variables.
    fn read(config_dir: &Path, vars: impl IntoIterator<Item = (String, String)>) -> Result<Config> {
        let config_dir_str = config_dir
            .to_str()
            .context("Config directory is not valid unicode")?;

        let vars: Vec<(String, String)> = vars.into_iter().collect();

        let legacy_envs: HashMap<String, String> = LEGACY_ENV_VARS
            .iter()
            .filter_map(|(var, key)| {
                let (_, value) = vars.iter().find(|(k, _)| k == var)?;
                Some((key.to_string(), value.clone()))
            })
            .collect();

        let heap_envs: HashMap<String, String> = vars
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(HEAP_ENV_PREFIX)
                    .filter(|key| *key != "CONFIG_DIR")
                    .map(|key| (key.to_owned(), v.to_owned()))
            })
            .collect();

        let final_config = HierarchicalConfig::builder()
            .set_default("wantlist_sort", WantlistSort::default().as_str())?
            // The config file cannot change the config dir.
            .set_override("config_dir", config_dir_str)?
            .add_source(
                config::File::from(config_dir.join(HEAP_CONFIG_FILE))
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::default().source(Some(legacy_envs)))
            .add_source(
                Environment::default()
                    .source(Some(heap_envs))
                    .try_parsing(true),
            )
            .build()?;

        final_config
            .try_deserialize()
            .context("Could not parse config")
    }
}
