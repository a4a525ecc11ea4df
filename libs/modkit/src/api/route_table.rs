//! In-process record of every registered operation.

use http::Method;
use parking_lot::RwLock;

use crate::api::operation_builder::{OperationSpec, RouteRegistry};

#[derive(Debug, Default)]
pub struct RouteTable {
    operations: RwLock<Vec<OperationSpec>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operations(&self) -> Vec<OperationSpec> {
        self.operations.read().clone()
    }

    pub fn find(&self, operation_id: &str) -> Option<OperationSpec> {
        self.operations
            .read()
            .iter()
            .find(|op| op.operation_id.as_deref() == Some(operation_id))
            .cloned()
    }

    /// Path template (e.g. `/api/users/{id}`) of the named operation.
    pub fn path_for(&self, operation_id: &str) -> Option<String> {
        self.find(operation_id).map(|op| op.path)
    }

    /// Methods registered on `path`, in registration order.
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let ops = self.operations.read();
        let mut methods: Vec<Method> = Vec::new();
        for op in ops.iter().filter(|op| op.path == path) {
            if !methods.contains(&op.method) {
                methods.push(op.method.clone());
            }
        }
        methods
    }

    /// Value for an `Allow` header, e.g. `GET, POST, OPTIONS`.
    pub fn allow_header(&self, path: &str) -> String {
        self.allowed_methods(path)
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl RouteRegistry for RouteTable {
    fn register_operation(&self, spec: &OperationSpec) {
        let mut ops = self.operations.write();
        if let Some(id) = spec.operation_id.as_deref() {
            if ops.iter().any(|op| op.operation_id.as_deref() == Some(id)) {
                tracing::warn!(operation_id = id, "Duplicate operation id; keeping the first");
                return;
            }
        }
        tracing::debug!(method = %spec.method, path = %spec.path, "Registered operation");
        ops.push(spec.clone());
    }
}
