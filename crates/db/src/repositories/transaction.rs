//! Transaction repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use escrowd_core::escrow::{Currency, DealRole, Transaction, TransactionStatus};
use escrowd_core::store::{StoreError, TransactionStore};

use crate::entities::transactions;
use crate::repositories::backend_error;

/// Transaction repository backed by the transactions table.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn into_domain(model: transactions::Model) -> Result<Transaction, StoreError> {
    let currency = Currency::parse(&model.currency).ok_or_else(|| {
        StoreError::Backend(format!("unknown currency in store: {}", model.currency))
    })?;
    let role = DealRole::parse(&model.role)
        .ok_or_else(|| StoreError::Backend(format!("unknown deal role in store: {}", model.role)))?;
    let status = TransactionStatus::parse(&model.status)
        .ok_or_else(|| StoreError::Backend(format!("unknown status in store: {}", model.status)))?;

    Ok(Transaction {
        id: model.id,
        title: model.title,
        description: model.description,
        amount: model.amount,
        currency,
        role,
        counterparty: model.counterparty,
        status,
        created_by: model.created_by,
        created_at: model.created_at.to_utc(),
        updated_at: model.updated_at.to_utc(),
    })
}

#[async_trait]
impl TransactionStore for TransactionRepository {
    async fn insert(&self, tx: Transaction) -> Result<Transaction, StoreError> {
        let record = transactions::ActiveModel {
            id: Set(tx.id),
            title: Set(tx.title),
            description: Set(tx.description),
            amount: Set(tx.amount),
            currency: Set(tx.currency.as_str().to_string()),
            role: Set(tx.role.as_str().to_string()),
            counterparty: Set(tx.counterparty),
            status: Set(tx.status.as_str().to_string()),
            created_by: Set(tx.created_by),
            created_at: Set(tx.created_at.into()),
            updated_at: Set(tx.updated_at.into()),
        };

        into_domain(record.insert(&self.db).await.map_err(backend_error)?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>, StoreError> {
        transactions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(backend_error)?
            .map(into_domain)
            .transpose()
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Transaction>, StoreError> {
        transactions::Entity::find()
            .filter(transactions::Column::CreatedBy.eq(owner))
            .order_by_desc(transactions::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(backend_error)?
            .into_iter()
            .map(into_domain)
            .collect()
    }

    async fn list_all(&self) -> Result<Vec<Transaction>, StoreError> {
        transactions::Entity::find()
            .order_by_desc(transactions::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(backend_error)?
            .into_iter()
            .map(into_domain)
            .collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        new_status: TransactionStatus,
        expected_updated_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Transaction, StoreError> {
        // Single-record compare-and-set: the write only lands while the
        // updated_at stamp still matches what the caller read.
        let result = transactions::Entity::update_many()
            .col_expr(
                transactions::Column::Status,
                Expr::value(new_status.as_str()),
            )
            .col_expr(
                transactions::Column::UpdatedAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(now)),
            )
            .filter(transactions::Column::Id.eq(id))
            .filter(transactions::Column::UpdatedAt.eq(expected_updated_at))
            .exec(&self.db)
            .await
            .map_err(backend_error)?;

        if result.rows_affected == 0 {
            return match self.find_by_id(id).await? {
                None => Err(StoreError::NotFound),
                Some(_) => Err(StoreError::ConcurrentModification),
            };
        }

        self.find_by_id(id).await?.ok_or(StoreError::NotFound)
    }
}
