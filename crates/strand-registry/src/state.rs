//! The registry state machine shared by every reference backend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strand_types::{validate_handle, Identity};

use crate::error::{RegistryError, RegistryResult};
use crate::types::{HandleRecord, RegistryOp};

/// All handles known to a registry, keyed by name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryState {
    #[serde(default)]
    pub handles: BTreeMap<String, HandleRecord>,
}

impl RegistryState {
    pub fn record(&self, handle: &str) -> Option<&HandleRecord> {
        self.handles.get(handle)
    }

    /// Check that `caller` may perform `op` without changing anything.
    pub fn check(&self, caller: &Identity, op: &RegistryOp) -> RegistryResult<()> {
        let handle = op.handle();
        validate_handle(handle)?;

        match (op, self.handles.get(handle)) {
            (RegistryOp::Register { .. }, None) => Ok(()),
            (RegistryOp::Register { .. }, Some(record)) if record.owner == *caller => Ok(()),
            (RegistryOp::Register { .. }, Some(record)) => Err(RegistryError::AlreadyRegistered {
                handle: handle.to_string(),
                owner: record.owner.clone(),
            }),
            (_, None) => Err(RegistryError::HandleNotRegistered {
                handle: handle.to_string(),
            }),
            (_, Some(record)) if record.owner != *caller => Err(RegistryError::Unauthorized {
                handle: handle.to_string(),
                caller: caller.clone(),
            }),
            (_, Some(_)) => Ok(()),
        }
    }

    /// Apply `op` on behalf of `caller`.
    ///
    /// Returns `false` when the op was valid but changed nothing (a repeated
    /// registration by the owner).
    pub fn apply(&mut self, caller: &Identity, op: &RegistryOp) -> RegistryResult<bool> {
        self.check(caller, op)?;
        let handle = op.handle();

        if let RegistryOp::Register { .. } = op {
            if self.handles.contains_key(handle) {
                return Ok(false);
            }
            self.handles
                .insert(handle.to_string(), HandleRecord::new(caller.clone()));
            return Ok(true);
        }

        let record = self
            .handles
            .get_mut(handle)
            .ok_or_else(|| RegistryError::HandleNotRegistered {
                handle: handle.to_string(),
            })?;
        match op {
            RegistryOp::Register { .. } => {}
            RegistryOp::SetPointer { pointer, .. } => record.pointer = pointer.clone(),
            RegistryOp::SetProfile { profile, .. } => record.profile = profile.clone(),
            RegistryOp::SetOwner { owner, .. } => record.owner = owner.clone(),
        }
        Ok(true)
    }
}
