//! Document type dispatch.

use std::collections::HashMap;

use toop_core::DocumentType;

/// Handler selected for an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// Answer a registered-organization query from the local registry.
    RegisteredOrganization,
    /// Document request for eProcurement evidence, answered from sample data.
    EProcurement,
    /// Reply to one of our own outstanding lookups.
    QueryResponse,
}

/// Maps document types to handlers. Built once at startup, read-only after.
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    handlers: HashMap<DocumentType, HandlerKind>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The handlers this gateway ships with.
    pub fn standard() -> Self {
        Self::new()
            .with(
                DocumentType::registered_organization_request(),
                HandlerKind::RegisteredOrganization,
            )
            .with(DocumentType::eprocurement_request(), HandlerKind::EProcurement)
            .with(DocumentType::query_response(), HandlerKind::QueryResponse)
    }

    pub fn with(mut self, doc_type: DocumentType, kind: HandlerKind) -> Self {
        self.handlers.insert(doc_type, kind);
        self
    }

    pub fn resolve(&self, doc_type: &DocumentType) -> Option<HandlerKind> {
        self.handlers.get(doc_type).copied()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
