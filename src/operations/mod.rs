//! # Registry operations
//!
//! Each operation is one unit of work: it opens a transaction, reads the
//! catalog fresh, validates, buffers its writes and commits once. A failing
//! batch item aborts the whole batch before anything reaches the store.
//!
//! Catalog mutations read the catalog with a tracked read, so concurrent
//! mutations conflict at commit and the loser gets
//! `ASSET_STORAGE_COMMIT_CONFLICT`. Retrying is up to the caller.

mod asset_types;
mod assets;
mod operation;
mod schema_query;

use serde_json::Value;

use crate::datatype::DataType;
use crate::errors::{AssetError, AssetResult};
use crate::identity::Identity;
use crate::observability::{log_event_at, Event, Severity};
use crate::schema::SchemaCatalog;
use crate::storage::{RecordStore, Transaction};
use crate::validation::ValidationEngine;

pub use operation::Operation;

/// Facade over a record store and a validation engine.
pub struct Registry {
    store: Box<dyn RecordStore>,
    engine: ValidationEngine,
}

impl Registry {
    pub fn new(store: impl RecordStore + 'static) -> Self {
        Self::with_engine(store, ValidationEngine::new())
    }

    pub fn with_engine(store: impl RecordStore + 'static, engine: ValidationEngine) -> Self {
        Self {
            store: Box::new(store),
            engine,
        }
    }

    pub fn register_data_type(
        &mut self,
        name: &str,
        data_type: impl DataType + 'static,
    ) -> AssetResult<()> {
        self.engine.register_data_type(name, data_type)
    }

    pub fn register_predicate<F>(&mut self, name: &str, predicate: F) -> AssetResult<()>
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.engine.register_predicate(name, predicate)
    }

    pub fn engine(&self) -> &ValidationEngine {
        &self.engine
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Current catalog, read outside any mutation.
    pub fn catalog(&self) -> AssetResult<SchemaCatalog> {
        let tx = Transaction::begin(self.store());
        SchemaCatalog::snapshot(&tx)
    }

    /// Runs one operation and returns its JSON result.
    ///
    /// Failures are logged as `OPERATION_REJECTED`, at WARN for client
    /// faults and ERROR otherwise, and returned unchanged.
    pub fn invoke(&self, op: Operation, args: &Value, identity: &dyn Identity) -> AssetResult<Value> {
        let result = self.dispatch(op, args, identity);

        if let Err(e) = &result {
            let severity = if e.is_client_error() {
                Severity::Warn
            } else {
                Severity::Error
            };
            let message = e.to_string();
            log_event_at(
                Event::OperationRejected,
                severity,
                &[
                    ("operation", op.tag()),
                    ("code", e.code()),
                    ("group", identity.caller_group()),
                    ("message", message.as_str()),
                ],
            );
        }

        result
    }

    /// Like `invoke`, resolving the operation from its tag.
    pub fn invoke_by_name(
        &self,
        name: &str,
        args: &Value,
        identity: &dyn Identity,
    ) -> AssetResult<Value> {
        let op = Operation::from_tag(name)
            .ok_or_else(|| AssetError::not_found(format!("operation '{}'", name)))?;
        self.invoke(op, args, identity)
    }

    fn dispatch(&self, op: Operation, args: &Value, identity: &dyn Identity) -> AssetResult<Value> {
        match op {
            Operation::CreateAssetType => {
                Ok(serde_json::to_value(self.create_asset_types(args)?)?)
            }
            Operation::UpdateAssetType => {
                Ok(serde_json::to_value(self.update_asset_types(args)?)?)
            }
            Operation::DeleteAssetType => {
                Ok(serde_json::to_value(self.delete_asset_types(args)?)?)
            }
            Operation::PutAsset => Ok(self.put_asset(args, identity)?.to_value()),
            Operation::ReadAsset => self.read_asset(args, identity),
            Operation::GetSchema => self.get_schema(args),
        }
    }
}
