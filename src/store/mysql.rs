use async_trait::async_trait;
use sqlx::MySqlPool;
use tracing::debug;
use uuid::Uuid;

use super::AttendanceStore;
use crate::error::StoreError;
use crate::model::attendance::{AttendanceRow, AttendanceUpdate, NewAttendance};
use crate::model::leave_balance::LeaveBalanceConfig;

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlStore { pool }
    }
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn fetch_attendance_records(&self, user_id: Uuid) -> Result<Vec<AttendanceRow>, StoreError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT
                id,
                user_id,
                DATE_FORMAT(date, '%Y-%m-%d') AS date,
                status,
                is_weekend_work,
                leave_form_url
            FROM attendance
            WHERE user_id = ?
            ORDER BY date DESC
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        debug!(%user_id, count = rows.len(), "Fetched attendance records");
        Ok(rows)
    }

    async fn fetch_leave_balance_config(
        &self,
        user_id: Uuid,
    ) -> Result<Option<LeaveBalanceConfig>, StoreError> {
        let config = sqlx::query_as::<_, LeaveBalanceConfig>(
            r#"
            SELECT
                user_id,
                casual_total,
                medical_total,
                annual_total,
                annual_cf AS annual_carry_forward
            FROM leave_balances
            WHERE user_id = ?
            "#,
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(config)
    }

    async fn upsert_attendance(
        &self,
        user_id: Uuid,
        days: Vec<NewAttendance>,
    ) -> Result<usize, StoreError> {
        let user_id = user_id.to_string();
        let mut tx = self.pool.begin().await?;

        for day in &days {
            sqlx::query(
                r#"
                INSERT INTO attendance
                    (user_id, date, status, is_weekend_work, leave_form_url)
                VALUES (?, ?, ?, ?, ?)
                ON DUPLICATE KEY UPDATE
                    status = VALUES(status),
                    is_weekend_work = VALUES(is_weekend_work),
                    leave_form_url = VALUES(leave_form_url)
                "#,
            )
            .bind(&user_id)
            .bind(day.date)
            .bind(day.status.to_string())
            .bind(day.is_weekend_work)
            .bind(day.leave_form_url.as_deref())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(days.len())
    }

    async fn update_attendance(
        &self,
        user_id: Uuid,
        id: u64,
        update: AttendanceUpdate,
    ) -> Result<bool, StoreError> {
        let user_id = user_id.to_string();
        let mut tx = self.pool.begin().await?;

        // MySQL reports zero affected rows for a no-op update, so ownership is
        // checked separately under a row lock.
        let owned = sqlx::query_scalar::<_, u64>(
            "SELECT id FROM attendance WHERE id = ? AND user_id = ? FOR UPDATE",
        )
        .bind(id)
        .bind(&user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if owned.is_none() {
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE attendance
            SET status = ?,
                is_weekend_work = ?,
                leave_form_url = COALESCE(?, leave_form_url)
            WHERE id = ?
            AND user_id = ?
            "#,
        )
        .bind(update.status.to_string())
        .bind(update.is_weekend_work)
        .bind(update.leave_form_url.as_deref())
        .bind(id)
        .bind(&user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_attendance(&self, user_id: Uuid, id: u64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM attendance WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn upsert_leave_balance(&self, config: LeaveBalanceConfig) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO leave_balances
                (user_id, casual_total, medical_total, annual_total, annual_cf)
            VALUES (?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                casual_total = VALUES(casual_total),
                medical_total = VALUES(medical_total),
                annual_total = VALUES(annual_total),
                annual_cf = VALUES(annual_cf)
            "#,
        )
        .bind(&config.user_id)
        .bind(config.casual_total)
        .bind(config.medical_total)
        .bind(config.annual_total)
        .bind(config.annual_carry_forward)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
