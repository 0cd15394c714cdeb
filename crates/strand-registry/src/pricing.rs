use serde::{Deserialize, Serialize};
use strand_task::Cost;

use crate::error::{RegistryError, RegistryResult};
use crate::types::RegistryOp;

/// Fees charged by the reference registries, in an abstract fee unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSchedule {
    /// Registering a handle.
    pub register: u64,
    /// Any single-field update.
    pub write: u64,
    /// Added per byte of serialized profile.
    pub per_byte: u64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            register: 100,
            write: 10,
            per_byte: 1,
        }
    }
}

impl FeeSchedule {
    /// Schedule that charges nothing.
    pub const FREE: Self = Self {
        register: 0,
        write: 0,
        per_byte: 0,
    };

    /// Fee for `op`. Does not check whether `op` would succeed.
    pub fn price(&self, op: &RegistryOp) -> RegistryResult<Cost> {
        let fee = match op {
            RegistryOp::Register { .. } => self.register,
            RegistryOp::SetPointer { .. } | RegistryOp::SetOwner { .. } => self.write,
            RegistryOp::SetProfile { profile, .. } => {
                let len = serde_json::to_vec(profile)
                    .map_err(|e| RegistryError::Serialization(e.to_string()))?
                    .len() as u64;
                self.write.saturating_add(self.per_byte.saturating_mul(len))
            }
        };
        Ok(Cost::fee(fee))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strand_types::Address;

    #[test]
    fn prices_by_op() {
        let fees = FeeSchedule::default();
        let handle = "news".to_string();

        let register = RegistryOp::Register {
            handle: handle.clone(),
        };
        assert_eq!(fees.price(&register).unwrap(), Cost::fee(100));

        let pointer = RegistryOp::SetPointer {
            handle: handle.clone(),
            pointer: Some(Address::parse("mem://ab").unwrap()),
        };
        assert_eq!(fees.price(&pointer).unwrap(), Cost::fee(10));

        let profile = RegistryOp::SetProfile {
            handle,
            profile: json!({"a": 1}),
        };
        // {"a":1} is 7 bytes
        assert_eq!(fees.price(&profile).unwrap(), Cost::fee(17));
    }

    #[test]
    fn pointer_fee_ignores_value() {
        let fees = FeeSchedule::default();
        let set = |pointer| RegistryOp::SetPointer {
            handle: "h".into(),
            pointer,
        };
        assert_eq!(
            fees.price(&set(None)).unwrap(),
            fees.price(&set(Some(Address::parse("mem://x").unwrap()))).unwrap()
        );
    }

    #[test]
    fn free_schedule() {
        let op = RegistryOp::Register { handle: "h".into() };
        assert!(FeeSchedule::FREE.price(&op).unwrap().is_zero());
    }
}
