use super::super::models::{Donation, DonationUpdate, NewDonation, PaymentStatus};
use super::donation_repository::DonationRepository;
use crate::core::{AppError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// In-process donation store with the same contract as the MySQL one.
///
/// Backs the HTTP-level tests, where no MySQL server is available.
#[derive(Default)]
pub struct InMemoryDonationRepository {
    rows: RwLock<HashMap<String, Donation>>,
    next_id: RwLock<i64>,
    unavailable: AtomicBool,
}

impl InMemoryDonationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail like a lost database connection
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl DonationRepository for InMemoryDonationRepository {
    async fn insert(&self, donation: &NewDonation) -> Result<Donation> {
        self.check_available()?;

        let mut rows = self.rows.write().await;
        if rows.contains_key(&donation.order_id) {
            return Err(AppError::UniqueViolation(donation.order_id.clone()));
        }

        let mut next_id = self.next_id.write().await;
        *next_id += 1;

        let record = Donation {
            id: *next_id,
            order_id: donation.order_id.clone(),
            name: donation.name.clone(),
            email: donation.email.clone(),
            amount: donation.amount,
            payment_method: donation.payment_method,
            payment_type: donation.payment_type.clone(),
            payment_status: PaymentStatus::Pending,
            transaction_id: None,
            payment_details: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        rows.insert(record.order_id.clone(), record.clone());

        Ok(record)
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Donation>> {
        self.check_available()?;
        Ok(self.rows.read().await.get(order_id).cloned())
    }

    async fn update_by_order_id(&self, order_id: &str, update: &DonationUpdate) -> Result<u64> {
        self.check_available()?;

        let mut rows = self.rows.write().await;
        let Some(record) = rows.get_mut(order_id) else {
            return Ok(0);
        };

        record.payment_status = update.resolve_status(record.payment_status);
        if let Some(transaction_id) = &update.transaction_id {
            record.transaction_id = Some(transaction_id.clone());
        }
        if let Some(payment_type) = &update.payment_type {
            record.payment_type = Some(payment_type.clone());
        }
        if let Some(details) = &update.payment_details {
            record.payment_details = Some(details.clone());
        }
        record.updated_at = Some(Utc::now());

        Ok(1)
    }

    async fn ping(&self) -> Result<()> {
        self.check_available()
    }
}
