use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Price of running a task.
///
/// Storage and registry backends price different things, so a cost keeps
/// the components apart instead of collapsing them into one number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cost {
    /// Number of objects written to storage.
    pub storage_writes: u64,
    /// Bytes written to storage.
    pub storage_bytes: u64,
    /// Registry fee, in the backend's fee unit.
    pub fee: u64,
}

impl Cost {
    pub const ZERO: Self = Self {
        storage_writes: 0,
        storage_bytes: 0,
        fee: 0,
    };

    /// One storage write of `bytes` bytes.
    pub const fn storage_write(bytes: u64) -> Self {
        Self {
            storage_writes: 1,
            storage_bytes: bytes,
            fee: 0,
        }
    }

    /// A registry fee.
    pub const fn fee(amount: u64) -> Self {
        Self {
            storage_writes: 0,
            storage_bytes: 0,
            fee: amount,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Add for Cost {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            storage_writes: self.storage_writes.saturating_add(rhs.storage_writes),
            storage_bytes: self.storage_bytes.saturating_add(rhs.storage_bytes),
            fee: self.fee.saturating_add(rhs.fee),
        }
    }
}

impl AddAssign for Cost {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Cost {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Cost> for Cost {
    fn sum<I: Iterator<Item = &'a Cost>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} write(s), {} bytes, fee {}",
            self.storage_writes, self.storage_bytes, self.fee
        )
    }
}
