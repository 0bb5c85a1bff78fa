use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use super::AttendanceStore;
use crate::error::StoreError;
use crate::model::attendance::{AttendanceRow, AttendanceUpdate, DATE_FORMAT, NewAttendance};
use crate::model::leave_balance::LeaveBalanceConfig;

/// Process-local store. Attendance is a map keyed by (user, date), so an
/// upsert is a plain map replace.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<State>,
}

#[derive(Default)]
struct State {
    next_id: u64,
    attendance: BTreeMap<(String, String), AttendanceRow>,
    balances: HashMap<String, LeaveBalanceConfig>,
}

impl State {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds raw rows as-is, including ones that would not pass validation.
    #[cfg(test)]
    pub fn with_rows(rows: impl IntoIterator<Item = AttendanceRow>) -> Self {
        let mut state = State::default();
        for row in rows {
            state.next_id = state.next_id.max(row.id);
            state
                .attendance
                .insert((row.user_id.clone(), row.date.clone()), row);
        }
        MemoryStore {
            inner: RwLock::new(state),
        }
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn fetch_attendance_records(&self, user_id: Uuid) -> Result<Vec<AttendanceRow>, StoreError> {
        let user_id = user_id.to_string();
        let state = self.inner.read().map_err(|_| StoreError::Poisoned)?;

        let mut rows: Vec<_> = state
            .attendance
            .values()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    async fn fetch_leave_balance_config(
        &self,
        user_id: Uuid,
    ) -> Result<Option<LeaveBalanceConfig>, StoreError> {
        let state = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(state.balances.get(&user_id.to_string()).cloned())
    }

    async fn upsert_attendance(
        &self,
        user_id: Uuid,
        days: Vec<NewAttendance>,
    ) -> Result<usize, StoreError> {
        let user_id = user_id.to_string();
        let mut state = self.inner.write().map_err(|_| StoreError::Poisoned)?;

        for day in &days {
            let date = day.date.format(DATE_FORMAT).to_string();
            let key = (user_id.clone(), date.clone());
            let existing = state.attendance.get(&key).map(|row| row.id);
            let id = match existing {
                Some(id) => id,
                None => state.allocate_id(),
            };

            state.attendance.insert(
                key,
                AttendanceRow {
                    id,
                    user_id: user_id.clone(),
                    date,
                    status: day.status.to_string(),
                    is_weekend_work: day.is_weekend_work,
                    leave_form_url: day.leave_form_url.clone(),
                },
            );
        }

        Ok(days.len())
    }

    async fn update_attendance(
        &self,
        user_id: Uuid,
        id: u64,
        update: AttendanceUpdate,
    ) -> Result<bool, StoreError> {
        let user_id = user_id.to_string();
        let mut state = self.inner.write().map_err(|_| StoreError::Poisoned)?;

        let Some(row) = state
            .attendance
            .values_mut()
            .find(|row| row.id == id && row.user_id == user_id)
        else {
            return Ok(false);
        };

        row.status = update.status.to_string();
        row.is_weekend_work = update.is_weekend_work;
        if update.leave_form_url.is_some() {
            row.leave_form_url = update.leave_form_url;
        }
        Ok(true)
    }

    async fn delete_attendance(&self, user_id: Uuid, id: u64) -> Result<bool, StoreError> {
        let user_id = user_id.to_string();
        let mut state = self.inner.write().map_err(|_| StoreError::Poisoned)?;

        let before = state.attendance.len();
        state
            .attendance
            .retain(|_, row| !(row.id == id && row.user_id == user_id));
        Ok(state.attendance.len() < before)
    }

    async fn upsert_leave_balance(&self, config: LeaveBalanceConfig) -> Result<(), StoreError> {
        let mut state = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        state.balances.insert(config.user_id.clone(), config);
        Ok(())
    }
}
