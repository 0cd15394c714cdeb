use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strand_chain::EngineConfig;
use strand_registry::FeeSchedule;
use strand_store::FILE_SCHEME;

use crate::error::SdkResult;

/// Top-level configuration, usually read from `strand.toml`.
///
/// ```toml
/// identity = "alice"
///
/// [storage]
/// root = ".strand/objects"
/// default_scheme = "file"
///
/// [registry]
/// backend = "file"
/// path = ".strand/registry.json"
///
/// [registry.fees]
/// register = 100
/// write = 10
/// per_byte = 1
///
/// [engine]
/// serialize_mutations = false
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrandConfig {
    /// Identity that registers and owns handles.
    pub identity: String,
    pub storage: StorageConfig,
    pub registry: RegistryConfig,
    pub engine: EngineConfig,
}

impl Default for StrandConfig {
    fn default() -> Self {
        Self {
            identity: "local".into(),
            storage: StorageConfig::default(),
            registry: RegistryConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory backing the `file` scheme.
    pub root: PathBuf,
    /// Scheme new objects are written to: `file` or `mem`.
    pub default_scheme: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(".strand/objects"),
            default_scheme: FILE_SCHEME.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
    Memory,
    #[default]
    File,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub backend: RegistryKind,
    /// JSON document used by the `file` backend.
    pub path: PathBuf,
    pub fees: FeeSchedule,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            backend: RegistryKind::File,
            path: PathBuf::from(".strand/registry.json"),
            fees: FeeSchedule::default(),
        }
    }
}

impl StrandConfig {
    /// Everything in memory: nothing touches the disk.
    pub fn in_memory(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            storage: StorageConfig {
                default_scheme: strand_store::MEMORY_SCHEME.into(),
                ..StorageConfig::default()
            },
            registry: RegistryConfig {
                backend: RegistryKind::Memory,
                ..RegistryConfig::default()
            },
            engine: EngineConfig::default(),
        }
    }

    pub fn from_toml_str(s: &str) -> SdkResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Read a config file. Relative paths inside it are resolved against
    /// the file's directory.
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Make relative storage and registry paths relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        if self.storage.root.is_relative() {
            self.storage.root = base.join(&self.storage.root);
        }
        if self.registry.path.is_relative() {
            self.registry.path = base.join(&self.registry.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StrandConfig::default();
        assert_eq!(c.identity, "local");
        assert_eq!(c.storage.default_scheme, "file");
        assert_eq!(c.registry.backend, RegistryKind::File);
        assert_eq!(c.registry.fees, FeeSchedule::default());
        assert!(!c.engine.serialize_mutations);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(StrandConfig::from_toml_str("").unwrap(), StrandConfig::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let c = StrandConfig::from_toml_str(
            r#"
            identity = "alice"

            [registry]
            backend = "memory"

            [registry.fees]
            write = 3

            [engine]
            serialize_mutations = true
            "#,
        )
        .unwrap();
        assert_eq!(c.identity, "alice");
        assert_eq!(c.registry.backend, RegistryKind::Memory);
        assert_eq!(c.registry.fees.write, 3);
        assert_eq!(c.registry.fees.register, FeeSchedule::default().register);
        assert_eq!(c.registry.path, PathBuf::from(".strand/registry.json"));
        assert!(c.engine.serialize_mutations);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = StrandConfig::from_toml_str("[registry]\nbackend = \"chain\"").unwrap_err();
        assert!(matches!(err, crate::SdkError::ConfigParse(_)));
    }

    #[test]
    fn load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strand.toml");
        std::fs::write(&path, "[storage]\nroot = \"objects\"\n").unwrap();

        let c = StrandConfig::load(&path).unwrap();
        assert_eq!(c.storage.root, dir.path().join("objects"));
        assert_eq!(c.registry.path, dir.path().join(".strand/registry.json"));
    }

    #[test]
    fn toml_roundtrip() {
        let c = StrandConfig::in_memory("bob");
        let text = toml::to_string(&c).unwrap();
        assert_eq!(StrandConfig::from_toml_str(&text).unwrap(), c);
    }
}
