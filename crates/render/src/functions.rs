//! Functions and filters registered on the template environment

use crate::helpers;
use minijinja::value::ValueKind;
use minijinja::{Environment, Error, ErrorKind, Value};
use std::sync::Arc;
use tally_core::{Inventory, ResourceKind};
use tokio::runtime::Handle;
use tracing::warn;

/// Synchronous access to the async inventory from template code
///
/// Templates render on a blocking worker thread, so each call can block on
/// the runtime. Query failures are logged and replaced with empty values.
#[derive(Clone)]
pub struct InventoryBridge {
    inventory: Arc<dyn Inventory>,
    runtime: Handle,
}

impl InventoryBridge {
    pub fn new(inventory: Arc<dyn Inventory>, runtime: Handle) -> Self {
        Self { inventory, runtime }
    }

    /// List resources, or an empty list on failure
    pub fn list(&self, kind: ResourceKind) -> Value {
        match self.runtime.block_on(self.inventory.list(kind)) {
            Ok(json) => Value::from_serialize(&json),
            Err(e) => {
                warn!("{}", e);
                Value::from(Vec::<Value>::new())
            }
        }
    }

    /// Inspect one resource, or an empty map on failure
    pub fn inspect(&self, kind: ResourceKind, id: &str) -> Value {
        match self.runtime.block_on(self.inventory.inspect(kind, id)) {
            Ok(json) => Value::from_serialize(&json),
            Err(e) => {
                warn!("{}", e);
                Value::from_serialize(&serde_json::Map::new())
            }
        }
    }
}

/// Register inventory functions and dictionary helpers
pub fn register(env: &mut Environment<'static>, bridge: InventoryBridge) {
    for (name, kind) in [
        ("containers", ResourceKind::Container),
        ("services", ResourceKind::Service),
        ("tasks", ResourceKind::Task),
        ("nodes", ResourceKind::Node),
        ("networks", ResourceKind::Network),
    ] {
        let bridge = bridge.clone();
        env.add_function(name, move || bridge.list(kind));
    }

    for (name, kind) in [
        ("containerInspect", ResourceKind::Container),
        ("serviceInspect", ResourceKind::Service),
        ("taskInspect", ResourceKind::Task),
        ("nodeInspect", ResourceKind::Node),
        ("networkInspect", ResourceKind::Network),
    ] {
        let bridge = bridge.clone();
        env.add_function(name, move |id: String| bridge.inspect(kind, &id));
    }

    env.add_function("pickRe", pick_re);
    env.add_function("pickReReplace", pick_re_replace);
    env.add_filter("pickRe", pick_re);
    env.add_filter("pickReReplace", pick_re_replace);
}

fn pick_re(dict: Value, pattern: String) -> Result<Value, Error> {
    let picked = helpers::pick_re(map_entries(&dict)?, &pattern);
    Ok(Value::from_serialize(&picked))
}

fn pick_re_replace(dict: Value, pattern: String, replacement: String) -> Result<Value, Error> {
    let picked = helpers::pick_re_replace(map_entries(&dict)?, &pattern, &replacement);
    Ok(Value::from_serialize(&picked))
}

/// Flatten a template map into (key, value) pairs; none/undefined is empty
fn map_entries(dict: &Value) -> Result<Vec<(String, Value)>, Error> {
    if dict.is_undefined() || dict.is_none() {
        return Ok(Vec::new());
    }
    if dict.kind() != ValueKind::Map {
        return Err(Error::new(
            ErrorKind::InvalidOperation,
            format!("expected a map, got {:?}", dict.kind()),
        ));
    }

    let mut entries = Vec::new();
    for key in dict.try_iter()? {
        let value = dict.get_item(&key)?;
        let key = match key.as_str() {
            Some(s) => s.to_string(),
            None => key.to_string(),
        };
        entries.push((key, value));
    }
    Ok(entries)
}
