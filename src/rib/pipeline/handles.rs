//! Handle interning stage
//!
//! Light, object and shader handles may be written as strings. This stage
//! rewrites each string handle to a numeric id, one id space per namespace.
//! The first occurrence of a string registers the next id (starting at 1);
//! repeats resolve to the same id. Ids are never reused.

use crate::rib::error::{Result, RibError};
use crate::rib::pipeline::Stage;
use crate::rib::request::Request;
use crate::rib::values::{HandleNamespace, Value};
use std::any::Any;
use std::collections::HashMap;
use tracing::debug;

/// String to id mapping for a single namespace
#[derive(Debug, Default, Clone)]
pub struct HandleTable {
    ids: HashMap<String, i32>,
    next: i32,
}

impl HandleTable {
    pub fn new() -> Self {
        HandleTable::default()
    }

    /// Id for `handle`, registering it if unseen. Second element reports a fresh registration.
    pub fn intern(&mut self, handle: &str) -> (i32, bool) {
        if let Some(id) = self.ids.get(handle) {
            return (*id, false);
        }
        self.next += 1;
        self.ids.insert(handle.to_string(), self.next);
        (self.next, true)
    }

    pub fn get(&self, handle: &str) -> Option<i32> {
        self.ids.get(handle).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct HandleFilter {
    light: HandleTable,
    object: HandleTable,
    shader: HandleTable,
}

impl HandleFilter {
    pub fn new() -> Self {
        HandleFilter::default()
    }

    pub fn table(&self, namespace: HandleNamespace) -> &HandleTable {
        match namespace {
            HandleNamespace::Light => &self.light,
            HandleNamespace::Object => &self.object,
            HandleNamespace::Shader => &self.shader,
        }
    }

    fn table_mut(&mut self, namespace: HandleNamespace) -> &mut HandleTable {
        match namespace {
            HandleNamespace::Light => &mut self.light,
            HandleNamespace::Object => &mut self.object,
            HandleNamespace::Shader => &mut self.shader,
        }
    }

    fn rewrite(&mut self, value: &mut Value) -> Result<()> {
        let Value::Handle(namespace, inner) = value else {
            return Ok(());
        };
        let namespace = *namespace;
        let id = match inner.as_ref() {
            Value::String(s) | Value::Token(s) | Value::Name(s) => {
                let (id, fresh) = self.table_mut(namespace).intern(s);
                if fresh {
                    debug!(namespace = %namespace, handle = %s, id, "Registered handle");
                }
                id
            }
            // Already numeric
            Value::Int(_) => return Ok(()),
            other => {
                return Err(RibError::BadHandle {
                    namespace: namespace.to_string(),
                    type_name: other.type_name().to_string(),
                })
            }
        };
        **inner = Value::Int(id);
        Ok(())
    }
}

impl Stage for HandleFilter {
    fn name(&self) -> &'static str {
        "handle-filter"
    }

    fn process(&mut self, mut request: Request) -> Result<Request> {
        for value in request.required.iter_mut().chain(request.optional.iter_mut()) {
            self.rewrite(value)?;
        }
        Ok(request)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
