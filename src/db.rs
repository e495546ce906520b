pub mod store;
pub use store::LedgerStore;
pub mod ledger_repo;
pub use ledger_repo::PgLedgerRepository;
pub mod memory_repo;
pub use memory_repo::MemoryLedgerStore;
