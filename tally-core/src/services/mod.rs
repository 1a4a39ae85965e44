//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod expense;
mod group;
pub mod migration;
mod person;
mod transfer;

pub use expense::ExpenseService;
pub use group::{GroupService, GroupSummary};
pub use migration::{MigrationResult, MigrationService};
pub use person::PersonService;
pub use transfer::TransferService;
