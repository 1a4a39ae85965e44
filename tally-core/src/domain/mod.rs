//! Core domain entities
//!
//! All business entities are defined here, together with the two pure
//! computations the rest of the crate is built around: the group balance
//! and the settlement plan. Nothing in this module performs I/O.

mod person;
mod group;
mod expense;
mod transfer;
pub mod balance;
pub mod settlement;
pub mod money;
pub mod result;

/// Identifier of a registered person
pub type PersonId = i64;
/// Identifier of a group
pub type GroupId = i64;
/// Identifier of a recorded expense
pub type ExpenseId = i64;
/// Identifier of a recorded transfer
pub type TransferId = i64;

pub use person::Person;
pub use group::{invitation_code, Group};
pub use expense::Expense;
pub use transfer::Transfer;
pub use balance::{compute_balance, Balance};
pub use settlement::{plan_settlement, SettlementTransfer};
