//! JSON export of the whole message flow.
//!
//! ```json
//! {
//!   "handlers": [
//!     { "declaration": 4, "kind": "Command", "payload": "com.example.PlaceOrder",
//!       "category": "Command", "text": "PlaceOrder", ... }
//!   ],
//!   "creators": [
//!     { "site": 0, "payload": "com.example.PlaceOrder", "origin": "Construction", ... }
//!   ]
//! }
//! ```

use serde::Serialize;

use crate::engine::MessageFlowEngine;
use crate::error::ExportError;
use crate::index::SymbolIndex;
use crate::model::{Creator, Handler, MessageCategory};

#[derive(Debug, Clone, Serialize)]
pub struct HandlerEntry {
    #[serde(flatten)]
    pub handler: Handler,
    pub category: MessageCategory,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatorEntry {
    #[serde(flatten)]
    pub creator: Creator,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_text: Option<String>,
}

/// Every handler and creator known to an engine.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageFlowReport {
    pub handlers: Vec<HandlerEntry>,
    pub creators: Vec<CreatorEntry>,
}

impl MessageFlowReport {
    /// Resolve everything. Runs the bulk creator search.
    pub fn collect<I: SymbolIndex>(engine: &MessageFlowEngine<I>) -> Self {
        let handlers = engine
            .find_all_handlers()
            .iter()
            .map(|handler| HandlerEntry {
                category: handler.category(),
                text: handler.render_text(),
                handler: handler.clone(),
            })
            .collect();
        let creators = engine
            .find_all_creators()
            .into_iter()
            .map(|creator| CreatorEntry {
                text: creator.render_text(),
                container_text: creator.render_container_text().map(str::to_string),
                creator,
            })
            .collect();
        Self { handlers, creators }
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
