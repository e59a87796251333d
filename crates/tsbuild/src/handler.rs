//! Handler specifiers
//!
//! A handler names the function a deployment invokes, written as the source
//! file path without its extension followed by the exported symbol:
//! `"src/users.create"` is `create` exported from `src/users.ts`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One deployable function from the deployment configuration
///
/// Only `handler` is read; any other fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerSpec {
    pub handler: String,
}

impl HandlerSpec {
    pub fn new(handler: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
        }
    }
}

/// Function name → handler
pub type Handlers = BTreeMap<String, HandlerSpec>;

/// A handler specifier split into file stem and exported name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerPath<'a> {
    /// Path up to and including the final `.`, e.g. `src/a.b.`
    pub stem: &'a str,
    /// Exported symbol, e.g. `handler`
    pub export: &'a str,
}

impl<'a> HandlerPath<'a> {
    /// Split at the last `.`; `None` when there is no `.` or nothing after it
    pub fn parse(handler: &'a str) -> Option<Self> {
        let dot = handler.rfind('.')?;
        let export = &handler[dot + 1..];
        if export.is_empty() {
            return None;
        }
        // The export name recurs in the stem for specifiers like
        // "handler/handler.handler"; split at its rightmost occurrence.
        let split = handler.rfind(export)?;
        Some(Self {
            stem: &handler[..split],
            export,
        })
    }

    /// Source files the handler may live in, in probing order
    pub fn candidates(&self) -> [String; 2] {
        [format!("{}ts", self.stem), format!("{}js", self.stem)]
    }
}
