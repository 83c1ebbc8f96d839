use std::any::{TypeId, type_name};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use rsf_error::{RsfResult, rsf_bail};

use crate::{FieldSpec, Record, Schema};

static SCHEMAS: LazyLock<RwLock<HashMap<TypeId, Arc<Schema>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

thread_local! {
    static RESOLVING: RefCell<Vec<TypeId>> = const { RefCell::new(Vec::new()) };
}

/// Resolve the schema of a record type.
///
/// Schemas are a pure function of the type, so the first successful resolution is cached
/// for the lifetime of the process and shared by every later call. Failures are not cached.
pub fn resolve<T: Record>() -> RsfResult<Arc<Schema>> {
    let id = TypeId::of::<T>();
    if let Some(schema) = SCHEMAS.read().get(&id) {
        return Ok(schema.clone());
    }

    let schema = Arc::new(resolve_uncached::<T>()?);
    log::debug!("resolved schema for {}: {}", type_name::<T>(), schema);

    // Another thread may have raced us here; keep whichever schema landed first.
    Ok(SCHEMAS.write().entry(id).or_insert(schema).clone())
}

/// Resolve the schema of a record type without consulting or populating the cache.
pub fn resolve_uncached<T: Record>() -> RsfResult<Schema> {
    let id = TypeId::of::<T>();
    let recursive = RESOLVING.with_borrow_mut(|stack| {
        if stack.contains(&id) {
            true
        } else {
            stack.push(id);
            false
        }
    });
    if recursive {
        rsf_bail!(Schema: "record type {} contains itself", type_name::<T>());
    }

    let result = describe_fields(T::describe());
    RESOLVING.with_borrow_mut(|stack| stack.retain(|t| *t != id));

    result.map_err(|e| e.with_context(format!("resolving {}", type_name::<T>())))
}

fn describe_fields(specs: Vec<FieldSpec>) -> RsfResult<Schema> {
    let fields = specs
        .into_iter()
        .map(FieldSpec::into_descriptor)
        .collect::<RsfResult<Vec<_>>>()?;
    Schema::try_new(fields)
}
