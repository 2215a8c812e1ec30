use crate::DbError;
use crate::store::SignalStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::{CoreError, Signal, SignalRecord, SignalStatus};
use rust_decimal::Decimal;
use sqlx::FromRow;
use sqlx::postgres::PgPool;
use uuid::Uuid;

const SIGNAL_COLUMNS: &str = "id, asset, direction, entry_low, entry_high, stop_loss, target_1, \
     target_2, timeframe, rr_ratio, status, reasoning, disclaimer, created_at, closed_at, result_pct";

/// The `DbRepository` provides a high-level, application-specific interface
/// to the `signals` table. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

/// A row of the `signals` table as stored, with the enums still in text form.
#[derive(Debug, Clone, FromRow)]
pub struct DbSignal {
    pub id: Uuid,
    pub asset: String,
    pub direction: String,
    pub entry_low: Decimal,
    pub entry_high: Decimal,
    pub stop_loss: Decimal,
    pub target_1: Decimal,
    pub target_2: Decimal,
    pub timeframe: String,
    pub rr_ratio: String,
    pub status: String,
    pub reasoning: String,
    pub disclaimer: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub result_pct: Option<Decimal>,
}

impl TryFrom<DbSignal> for SignalRecord {
    type Error = DbError;

    fn try_from(row: DbSignal) -> Result<Self, Self::Error> {
        let id = row.id;
        let invalid = |e: CoreError| DbError::InvalidRow(format!("signal {id}: {e}"));
        Ok(SignalRecord {
            id: row.id,
            direction: row.direction.parse().map_err(invalid)?,
            timeframe: row.timeframe.parse().map_err(invalid)?,
            status: row.status.parse().map_err(invalid)?,
            asset: row.asset,
            entry_low: row.entry_low,
            entry_high: row.entry_high,
            stop_loss: row.stop_loss,
            target_1: row.target_1,
            target_2: row.target_2,
            rr_ratio: row.rr_ratio,
            reasoning: row.reasoning,
            disclaimer: row.disclaimer,
            created_at: row.created_at,
            closed_at: row.closed_at,
            result_pct: row.result_pct,
        })
    }
}

/// Checks a status update against the lifecycle and works out the closure
/// time to store with it.
///
/// Terminal statuses are stamped with `now`; `TP1 Hit` leaves the signal open.
pub fn plan_status_update(
    current: SignalStatus,
    next: SignalStatus,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, CoreError> {
    let next = current.advance_to(next)?;
    Ok(next.is_closed().then_some(now))
}

fn into_records(rows: Vec<DbSignal>) -> Result<Vec<SignalRecord>, DbError> {
    rows.into_iter().map(SignalRecord::try_from).collect()
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a freshly built signal and returns the stored row.
    pub async fn save_signal(&self, signal: &Signal) -> Result<SignalRecord, DbError> {
        let query = format!(
            r#"
            INSERT INTO signals (
                id, asset, direction, entry_low, entry_high, stop_loss,
                target_1, target_2, timeframe, rr_ratio, status, reasoning, disclaimer, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {SIGNAL_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, DbSignal>(&query)
            .bind(signal.signal_id)
            .bind(&signal.asset)
            .bind(signal.direction.as_str())
            .bind(signal.entry.low)
            .bind(signal.entry.high)
            .bind(signal.stop_loss)
            .bind(signal.targets[0])
            .bind(signal.targets[1])
            .bind(signal.timeframe.as_str())
            .bind(&signal.risk_reward)
            .bind(signal.status.as_str())
            .bind(&signal.reasoning)
            .bind(&signal.disclaimer)
            .bind(signal.created_at)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(id = %signal.signal_id, asset = %signal.asset, "Signal saved");
        row.try_into()
    }

    /// Signals created since midnight (database time), newest first.
    pub async fn get_todays_signals(&self) -> Result<Vec<SignalRecord>, DbError> {
        let query = format!(
            "SELECT {SIGNAL_COLUMNS} FROM signals WHERE created_at >= CURRENT_DATE ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, DbSignal>(&query)
            .fetch_all(&self.pool)
            .await?;
        into_records(rows)
    }

    /// Signals still waiting for an outcome, newest first.
    pub async fn get_active_signals(&self) -> Result<Vec<SignalRecord>, DbError> {
        let query = format!(
            "SELECT {SIGNAL_COLUMNS} FROM signals WHERE status = 'Open' ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, DbSignal>(&query)
            .fetch_all(&self.pool)
            .await?;
        into_records(rows)
    }

    /// The most recently closed signals. Signals without a closure time
    /// (`TP1 Hit`) sort last.
    pub async fn get_closed_signals(&self, limit: i64) -> Result<Vec<SignalRecord>, DbError> {
        let query = format!(
            r#"
            SELECT {SIGNAL_COLUMNS} FROM signals
            WHERE status <> 'Open'
            ORDER BY closed_at DESC NULLS LAST
            LIMIT $1
            "#
        );
        let rows = sqlx::query_as::<_, DbSignal>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        into_records(rows)
    }

    /// Every signal that has left `Open`, optionally only those closed at or after `since`.
    pub async fn get_closed_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<SignalRecord>, DbError> {
        let query = format!(
            r#"
            SELECT {SIGNAL_COLUMNS} FROM signals
            WHERE status <> 'Open' AND ($1::timestamptz IS NULL OR closed_at >= $1)
            ORDER BY created_at ASC
            "#
        );
        let rows = sqlx::query_as::<_, DbSignal>(&query)
            .bind(since)
            .fetch_all(&self.pool)
            .await?;
        into_records(rows)
    }

    /// Moves a signal along its lifecycle. This is the only mutation a stored
    /// signal ever sees.
    ///
    /// The current status is read under a row lock so that two concurrent
    /// updates cannot both pass the lifecycle check. A `result_pct` of `None`
    /// keeps whatever was recorded before.
    pub async fn update_signal_status(
        &self,
        id: Uuid,
        status: SignalStatus,
        result_pct: Option<Decimal>,
    ) -> Result<SignalRecord, DbError> {
        let mut tx = self.pool.begin().await?;

        let current: String = sqlx::query_scalar("SELECT status FROM signals WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(DbError::NotFound)?;
        let current: SignalStatus = current
            .parse()
            .map_err(|e| DbError::InvalidRow(format!("signal {id}: {e}")))?;

        let closed_at = plan_status_update(current, status, Utc::now())?;

        let query = format!(
            r#"
            UPDATE signals
            SET status = $1,
                result_pct = COALESCE($2, result_pct),
                closed_at = COALESCE($3, closed_at)
            WHERE id = $4
            RETURNING {SIGNAL_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, DbSignal>(&query)
            .bind(status.as_str())
            .bind(result_pct)
            .bind(closed_at)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(%id, from = %current, to = %status, "Signal status updated");
        row.try_into()
    }
}

#[async_trait]
impl SignalStore for DbRepository {
    async fn save_signal(&self, signal: &Signal) -> Result<SignalRecord, DbError> {
        DbRepository::save_signal(self, signal).await
    }
}
