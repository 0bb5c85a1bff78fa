use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::attendance::{AttendanceRow, AttendanceUpdate, NewAttendance};
use crate::model::leave_balance::LeaveBalanceConfig;

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

/// Data access for attendance records and leave settings, always scoped to
/// the owning user.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// All of a user's records, newest date first.
    async fn fetch_attendance_records(&self, user_id: Uuid) -> Result<Vec<AttendanceRow>, StoreError>;

    async fn fetch_leave_balance_config(
        &self,
        user_id: Uuid,
    ) -> Result<Option<LeaveBalanceConfig>, StoreError>;

    /// Writes each day by natural key (user, date), replacing an existing
    /// record for that day. Returns how many days were written.
    async fn upsert_attendance(
        &self,
        user_id: Uuid,
        days: Vec<NewAttendance>,
    ) -> Result<usize, StoreError>;

    /// Returns false when no record with `id` belongs to the user.
    async fn update_attendance(
        &self,
        user_id: Uuid,
        id: u64,
        update: AttendanceUpdate,
    ) -> Result<bool, StoreError>;

    async fn delete_attendance(&self, user_id: Uuid, id: u64) -> Result<bool, StoreError>;

    async fn upsert_leave_balance(&self, config: LeaveBalanceConfig) -> Result<(), StoreError>;
}
