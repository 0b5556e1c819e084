use super::super::models::{Donation, DonationRow, DonationUpdate, NewDonation};
use crate::core::{AppError, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::MySqlPool;

/// Persistence for donation records
///
/// `order_id` is unique; there is exactly one row per checkout attempt.
#[async_trait]
pub trait DonationRepository: Send + Sync {
    /// Insert a new `pending` donation.
    ///
    /// Fails with `AppError::UniqueViolation` if the order id is taken.
    async fn insert(&self, donation: &NewDonation) -> Result<Donation>;

    /// Find the donation for an order id
    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Donation>>;

    /// Apply a partial update and stamp `updated_at`.
    ///
    /// Returns the number of rows matched. Zero is not an error; callers that
    /// need the row to exist must read it first.
    async fn update_by_order_id(&self, order_id: &str, update: &DonationUpdate) -> Result<u64>;

    /// Check that the store is reachable
    async fn ping(&self) -> Result<()>;
}

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, order_id, name, email, amount, payment_method, payment_type,
        payment_status, transaction_id, payment_details, created_at, updated_at
    FROM donations
"#;

/// MySQL-backed donation repository
pub struct MySqlDonationRepository {
    pool: MySqlPool,
}

impl MySqlDonationRepository {
    /// Create a new MySqlDonationRepository
    ///
    /// # Arguments
    /// * `pool` - Database connection pool
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DonationRepository for MySqlDonationRepository {
    async fn insert(&self, donation: &NewDonation) -> Result<Donation> {
        sqlx::query(
            r#"
            INSERT INTO donations (
                order_id, name, email, amount, payment_method, payment_type, payment_status
            )
            VALUES (?, ?, ?, ?, ?, ?, 'pending')
            "#,
        )
        .bind(&donation.order_id)
        .bind(&donation.name)
        .bind(&donation.email)
        .bind(donation.amount)
        .bind(donation.payment_method.as_str())
        .bind(&donation.payment_type)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_insert(e, &donation.order_id))?;

        self.find_by_order_id(&donation.order_id)
            .await?
            .ok_or_else(|| AppError::internal("Donation was created but not found"))
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Donation>> {
        let row = sqlx::query_as::<_, DonationRow>(&format!(
            "{} WHERE order_id = ? LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Donation::try_from).transpose()
    }

    async fn update_by_order_id(&self, order_id: &str, update: &DonationUpdate) -> Result<u64> {
        let status = update.payment_status.map(|s| s.as_str());

        // The terminal guard lives in the statement so two concurrent
        // deliveries cannot both pass a read-side check.
        let result = sqlx::query(
            r#"
            UPDATE donations
            SET
                payment_status = CASE
                    WHEN ? IS NULL THEN payment_status
                    WHEN ? AND ? = 'pending'
                        AND payment_status IN ('success', 'deny', 'expired', 'cancel', 'challenge')
                        THEN payment_status
                    ELSE ?
                END,
                transaction_id = COALESCE(?, transaction_id),
                payment_type = COALESCE(?, payment_type),
                payment_details = COALESCE(?, payment_details),
                updated_at = ?
            WHERE order_id = ?
            "#,
        )
        .bind(status)
        .bind(update.keep_terminal_status)
        .bind(status)
        .bind(status)
        .bind(&update.transaction_id)
        .bind(&update.payment_type)
        .bind(&update.payment_details)
        .bind(Utc::now())
        .bind(order_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
