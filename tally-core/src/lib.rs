//! Tally Core - Business logic for shared expense groups
//!
//! People form groups, record what they spend for the group and the money
//! they hand each other, and ask who owes what. This crate follows
//! hexagonal architecture:
//!
//! - **domain**: Core entities and the balance / settlement computations
//! - **ports**: Trait definitions for external dependencies (Repository)
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (DuckDB)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;
pub mod migrations;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use adapters::duckdb::DuckDbRepository;
use config::Config;
use ports::Repository;
use services::*;

// Re-export commonly used types at crate root
pub use domain::{
    compute_balance, plan_settlement, Balance, Expense, Group, GroupId, Person, PersonId,
    SettlementTransfer, Transfer,
};
pub use domain::result::{Error, OperationResult, Result};

/// Main context for Tally operations
///
/// This is the primary entry point for all business logic. It holds the
/// configuration, the repository, and all services built on top of it.
pub struct TallyContext {
    pub config: Config,
    pub data_dir: Option<PathBuf>,
    pub repository: Arc<DuckDbRepository>,
    pub person_service: PersonService,
    pub group_service: GroupService,
    pub expense_service: ExpenseService,
    pub transfer_service: TransferService,
}

impl TallyContext {
    /// Open the Tally data directory, creating the database if needed
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let repository = DuckDbRepository::new(&config.db_path(data_dir))?;
        Self::build(config, Some(data_dir.to_path_buf()), repository)
    }

    /// A context backed by an in-memory database, nothing touches disk
    pub fn in_memory(config: Config) -> Result<Self> {
        Self::build(config, None, DuckDbRepository::open_in_memory()?)
    }

    fn build(config: Config, data_dir: Option<PathBuf>, repository: DuckDbRepository) -> Result<Self> {
        repository.ensure_schema()?;
        let repository = Arc::new(repository);
        let port: Arc<dyn Repository> = repository.clone();

        Ok(Self {
            config,
            data_dir,
            person_service: PersonService::new(Arc::clone(&port)),
            group_service: GroupService::new(Arc::clone(&port)),
            expense_service: ExpenseService::new(Arc::clone(&port)),
            transfer_service: TransferService::new(port),
            repository,
        })
    }

    /// Persist the current configuration to the data directory
    pub fn save_config(&self) -> Result<()> {
        match &self.data_dir {
            Some(dir) => self.config.save(dir),
            None => Err(Error::Config("In-memory context has no data directory".to_string())),
        }
    }
}
