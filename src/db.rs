pub use self::error::DatabaseError;
pub use self::manager::DatabaseManager;
pub use self::source::{Column, JsonRow, TableQuery, TableSource};

pub mod error;
pub mod manager;
pub mod source;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "sqlite")]
pub mod sqlite;
