//! Database layer - connection pool, migrations and stores
//!
//! # Design Principles
//!
//! - Connection pool (max 5 connections by default) - no Arc<Mutex<Connection>>
//! - Handlers talk to store traits, never to the pool directly
//! - Rely on DB constraints, handle conflicts - no check-then-insert
//! - Transactions for multi-step writes

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repos;
pub mod store;

pub use memory::MemoryStore;
pub use pool::{create_pool, create_pool_with_options};
pub use repos::{ChatRepo, DbError, PostRepo, UserRepo};
pub use store::{ChatStore, PostStore, UserStore};
