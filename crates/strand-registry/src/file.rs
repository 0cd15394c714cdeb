//! Registry persisted as a single JSON document.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use strand_task::Cost;
use strand_types::Identity;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{RegistryError, RegistryResult};
use crate::pricing::FeeSchedule;
use crate::state::RegistryState;
use crate::traits::RegistryBackend;
use crate::types::{HandleRecord, RegistryOp};

/// A [`RegistryBackend`] that keeps its state in a JSON file.
///
/// Every read loads the file, every applied op rewrites it through a
/// temporary file and a rename. A missing file is an empty registry. Writers
/// within one process are serialized; separate processes sharing the file
/// are not coordinated.
#[derive(Debug)]
pub struct FileRegistry {
    path: PathBuf,
    fees: FeeSchedule,
    write_lock: Mutex<()>,
}

impl FileRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_fees(path, FeeSchedule::default())
    }

    pub fn with_fees(path: impl Into<PathBuf>, fees: FeeSchedule) -> Self {
        Self {
            path: path.into(),
            fees,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> RegistryResult<RegistryState> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| RegistryError::Serialization(e.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(RegistryState::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, state: &RegistryState) -> RegistryResult<()> {
        let bytes = serde_json::to_vec_pretty(state)
            .map_err(|e| RegistryError::Serialization(e.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(format!(".tmp-{}", std::process::id()));
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        debug!(path = %self.path.display(), handles = state.handles.len(), "registry saved");
        Ok(())
    }
}

#[async_trait]
impl RegistryBackend for FileRegistry {
    async fn record(&self, handle: &str) -> RegistryResult<Option<HandleRecord>> {
        Ok(self.load().await?.handles.remove(handle))
    }

    async fn simulate(&self, caller: &Identity, op: &RegistryOp) -> RegistryResult<Cost> {
        self.load().await?.check(caller, op)?;
        self.fees.price(op)
    }

    async fn apply(&self, caller: &Identity, op: &RegistryOp) -> RegistryResult<Cost> {
        let cost = self.fees.price(op)?;
        let _guard = self.write_lock.lock().await;
        let mut state = self.load().await?;
        if state.apply(caller, op)? {
            self.save(&state).await?;
        }
        info!(
            op = op.name(),
            handle = op.handle(),
            caller = %caller,
            fee = cost.fee,
            "registry op applied"
        );
        Ok(cost)
    }
}
