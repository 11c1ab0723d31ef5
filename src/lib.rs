//! assetreg - dynamic asset-type registry and validated document persistence
//! for key-value ledgers
//!
//! Operators define typed asset schemas at runtime; the registry enforces
//! them on every instance write and guards schema changes against existing
//! instances and cross-type references.
//!
//! ```ignore
//! use assetreg::identity::CallerGroup;
//! use assetreg::operations::Registry;
//! use assetreg::storage::MemoryStore;
//!
//! let registry = Registry::new(MemoryStore::new());
//! let org1 = CallerGroup::new("org1MSP");
//! registry.invoke_by_name("createAssetType", &args, &org1)?;
//! ```

pub mod cli;
pub mod datatype;
pub mod errors;
pub mod identity;
pub mod instance;
pub mod integrity;
pub mod observability;
pub mod operations;
pub mod schema;
pub mod storage;
pub mod validation;

pub use errors::{AssetError, AssetResult, ErrorClass};
pub use operations::{Operation, Registry};
