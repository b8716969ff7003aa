//! Repositories implementing the core store contracts.
//!
//! Repositories hide the `SeaORM` details from the rest of the application;
//! everything above them speaks the domain types from `escrowd-core`.

pub mod transaction;
pub mod user;

pub use transaction::TransactionRepository;
pub use user::UserRepository;

use escrowd_core::store::StoreError;
use sea_orm::DbErr;

pub(crate) fn backend_error(e: DbErr) -> StoreError {
    StoreError::Backend(e.to_string())
}
