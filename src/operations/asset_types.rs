//! Asset type lifecycle: create, update, delete and built-in sync

use serde_json::{Map, Value};

use crate::errors::{AssetError, AssetResult};
use crate::integrity;
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{AssetType, GroupSet, SchemaCatalog};
use crate::storage::Transaction;
use crate::validation::{check_bool, check_list, check_object, check_string, require_string};

use super::Registry;

const ASSET_TYPES_ARG: &str = "assetTypes";

/// The non-empty `assetTypes` list every lifecycle operation takes.
fn asset_type_list(args: &Value) -> AssetResult<&Vec<Value>> {
    let args = check_object(args, "$root")?;
    let items = check_list(args, ASSET_TYPES_ARG, true)?
        .ok_or_else(|| AssetError::validation(ASSET_TYPES_ARG, "required argument is missing"))?;
    if items.is_empty() {
        return Err(AssetError::validation(
            ASSET_TYPES_ARG,
            "at least one asset type is required",
        ));
    }
    Ok(items)
}

fn item_object(item: &Value) -> AssetResult<&Map<String, Value>> {
    check_object(item, ASSET_TYPES_ARG)
}

impl Registry {
    /// Creates every definition in `assetTypes`, all or none.
    ///
    /// Created types are always dynamic. Definitions in one batch may
    /// reference each other.
    pub fn create_asset_types(&self, args: &Value) -> AssetResult<Vec<AssetType>> {
        let items = asset_type_list(args)?;

        let mut tx = Transaction::begin(self.store());
        let mut catalog = SchemaCatalog::load(&mut tx)?;

        let mut created = Vec::with_capacity(items.len());
        for item in items {
            let mut def: AssetType = serde_json::from_value(item.clone()).map_err(|e| {
                AssetError::validation(ASSET_TYPES_ARG, format!("invalid asset type definition: {}", e))
            })?;
            def.dynamic = true;
            catalog.insert(def.clone())?;
            created.push(def);
        }

        self.engine.check_catalog(&catalog)?;
        catalog.store(&mut tx)?;
        tx.commit()?;

        for def in &created {
            let props = def.props.len().to_string();
            log_event_with_fields(
                Event::AssetTypeCreated,
                &[("tag", def.tag.as_str()), ("props", props.as_str())],
            );
        }

        Ok(created)
    }

    /// Applies each `{tag, ...}` patch in `assetTypes`.
    ///
    /// `label`, `description` and `readers` are replaced. `props` entries
    /// whose tag already exists are ignored; the rest are validated and
    /// appended. Adding a key property to a type with persisted instances
    /// fails with `InUse`. Other keys are ignored.
    pub fn update_asset_types(&self, args: &Value) -> AssetResult<Vec<AssetType>> {
        let items = asset_type_list(args)?;

        let mut tx = Transaction::begin(self.store());
        let mut catalog = SchemaCatalog::load(&mut tx)?;

        let mut updated = Vec::with_capacity(items.len());
        for item in items {
            let patch = item_object(item)?;
            let tag = require_string(patch, "tag")?;

            let existing = catalog.get(tag)?;
            integrity::ensure_dynamic(existing)?;
            let mut def = existing.clone();

            if let Some(label) = check_string(patch, "label", false)? {
                def.label = label.to_string();
            }
            if let Some(description) = check_string(patch, "description", false)? {
                def.description = description.to_string();
            }
            if let Some(readers) = check_list(patch, "readers", false)? {
                def.readers = parse_readers(readers)?;
            }
            if let Some(props) = check_list(patch, "props", false)? {
                let mut in_use = None;
                for raw in props {
                    let known = raw
                        .get("tag")
                        .and_then(Value::as_str)
                        .map_or(false, |t| def.has_prop(t));
                    if known {
                        continue;
                    }

                    let prop = self.engine.build_property(&catalog, &def, raw)?;
                    if prop.is_key {
                        let used = match in_use {
                            Some(used) => used,
                            None => *in_use.insert(integrity::is_in_use(&tx, tag)?),
                        };
                        if used {
                            return Err(AssetError::InUse(tag.to_string()));
                        }
                    }
                    def.props.push(prop);
                }
            }

            catalog.replace(def.clone())?;
            updated.push(def);
        }

        self.engine.check_catalog(&catalog)?;
        catalog.store(&mut tx)?;
        tx.commit()?;

        for def in &updated {
            let props = def.props.len().to_string();
            log_event_with_fields(
                Event::AssetTypeUpdated,
                &[("tag", def.tag.as_str()), ("props", props.as_str())],
            );
        }

        Ok(updated)
    }

    /// Deletes each `{tag, force?}` in `assetTypes`.
    ///
    /// Checks run in order: unknown tag, non-dynamic type, persisted
    /// instances (skipped by `force`, which leaves them orphaned), then
    /// references (never skipped). References are looked up in the catalog
    /// as loaded, so a type referencing itself, or one whose referrer is
    /// deleted earlier in the same batch, still fails.
    pub fn delete_asset_types(&self, args: &Value) -> AssetResult<Vec<AssetType>> {
        let items = asset_type_list(args)?;

        let mut tx = Transaction::begin(self.store());
        let loaded = SchemaCatalog::load(&mut tx)?;
        let mut catalog = loaded.clone();

        let mut deleted = Vec::with_capacity(items.len());
        for item in items {
            let target = item_object(item)?;
            let tag = require_string(target, "tag")?;
            let force = check_bool(target, "force", false)?.unwrap_or(false);

            integrity::ensure_dynamic(catalog.get(tag)?)?;
            let orphaned = integrity::check_usage(&tx, tag, force)?;
            integrity::check_references(&loaded, tag)?;

            if let Some(def) = catalog.remove(tag) {
                deleted.push((def, orphaned));
            }
        }

        self.engine.check_catalog(&catalog)?;
        catalog.store(&mut tx)?;
        tx.commit()?;

        for (def, orphaned) in &deleted {
            log_event_with_fields(Event::AssetTypeDeleted, &[("tag", def.tag.as_str())]);
            if *orphaned {
                log_event_with_fields(Event::AssetTypeOrphaned, &[("tag", def.tag.as_str())]);
            }
        }

        Ok(deleted.into_iter().map(|(def, _)| def).collect())
    }

    /// Installs code-defined types into the stored catalog.
    ///
    /// Each is stored as non-dynamic. A stored non-dynamic entry with the
    /// same tag is replaced; a dynamic one is a `Conflict`.
    pub fn sync_builtin_types(&self, defs: &[AssetType]) -> AssetResult<()> {
        let mut tx = Transaction::begin(self.store());
        let mut catalog = SchemaCatalog::load(&mut tx)?;

        for def in defs {
            let mut def = def.clone();
            def.dynamic = false;
            match catalog.find_by_tag(&def.tag).map(|t| t.dynamic) {
                Some(true) => {
                    return Err(AssetError::conflict(format!(
                        "asset type '{}' is already defined dynamically",
                        def.tag
                    )));
                }
                Some(false) => catalog.replace(def)?,
                None => catalog.insert(def)?,
            }
        }

        self.engine.check_catalog(&catalog)?;
        catalog.store(&mut tx)?;
        tx.commit()?;

        let count = defs.len().to_string();
        log_event_with_fields(Event::BuiltinTypesSynced, &[("types", count.as_str())]);

        Ok(())
    }
}

fn parse_readers(raw: &[Value]) -> AssetResult<GroupSet> {
    let names = raw
        .iter()
        .map(|entry| {
            entry
                .as_str()
                .ok_or_else(|| AssetError::validation("readers", "reader entries must be strings"))
        })
        .collect::<AssetResult<Vec<_>>>()?;
    GroupSet::parse(&names).map_err(|reason| AssetError::validation("readers", reason))
}
