//! JSON Patch (RFC 6902) over flat, fixed-shape payloads.
//!
//! Targets are plain structs that expose their fields through [`Patchable`].
//! Every operation runs even when an earlier one failed; failures land in the
//! caller's [`ValidationErrors`] keyed by the offending path, so a client sees
//! patch problems and field validation problems in one response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::validation::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add { path: String, value: Value },
    Remove { path: String },
    Replace { path: String, value: Value },
    Move { from: String, path: String },
    Copy { from: String, path: String },
    Test { path: String, value: Value },
}

impl PatchOperation {
    pub fn path(&self) -> &str {
        match self {
            PatchOperation::Add { path, .. }
            | PatchOperation::Remove { path }
            | PatchOperation::Replace { path, .. }
            | PatchOperation::Move { path, .. }
            | PatchOperation::Copy { path, .. }
            | PatchOperation::Test { path, .. } => path,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PatchOperation::Add { .. } => "add",
            PatchOperation::Remove { .. } => "remove",
            PatchOperation::Replace { .. } => "replace",
            PatchOperation::Move { .. } => "move",
            PatchOperation::Copy { .. } => "copy",
            PatchOperation::Test { .. } => "test",
        }
    }
}

/// A patch document: operations applied in order.
pub type JsonPatch = Vec<PatchOperation>;

/// A struct whose top-level fields can be addressed by a patch.
pub trait Patchable {
    type Field: Copy;

    /// Resolve a field name (no leading slash). Matching is up to the target;
    /// payloads in this workspace match case-insensitively.
    fn field(name: &str) -> Option<Self::Field>;

    /// Current value, `None` when unset.
    fn get(&self, field: Self::Field) -> Option<Value>;

    /// Assign a value; the error message is reported against the path.
    fn set(&mut self, field: Self::Field, value: Value) -> Result<(), String>;

    fn clear(&mut self, field: Self::Field);
}

/// Strip the leading `/` and reject empty or nested pointers.
fn pointer_name(pointer: &str) -> Option<&str> {
    let name = pointer.strip_prefix('/').unwrap_or(pointer);
    (!name.is_empty() && !name.contains('/')).then_some(name)
}

fn error_key(pointer: &str) -> String {
    pointer.strip_prefix('/').unwrap_or(pointer).to_string()
}

fn resolve<T: Patchable>(pointer: &str, errors: &mut ValidationErrors) -> Option<T::Field> {
    let field = pointer_name(pointer).and_then(T::field);
    if field.is_none() {
        errors.add(
            error_key(pointer),
            format!("The target location specified by path '{pointer}' was not found."),
        );
    }
    field
}

/// Read the source of a move/copy, recording an error when it is unset.
fn read_source<T: Patchable>(
    target: &T,
    from: &str,
    errors: &mut ValidationErrors,
) -> Option<Value> {
    let field = resolve::<T>(from, errors)?;
    let value = target.get(field);
    if value.is_none() {
        errors.add(
            error_key(from),
            format!("The source location '{from}' has no value."),
        );
    }
    value
}

fn assign<T: Patchable>(
    target: &mut T,
    field: T::Field,
    path: &str,
    value: Value,
    errors: &mut ValidationErrors,
) -> bool {
    match target.set(field, value) {
        Ok(()) => true,
        Err(message) => {
            errors.add(error_key(path), message);
            false
        }
    }
}

/// Apply one operation. Returns whether it succeeded.
pub fn apply_operation<T: Patchable>(
    target: &mut T,
    op: &PatchOperation,
    errors: &mut ValidationErrors,
) -> bool {
    match op {
        PatchOperation::Add { path, value } | PatchOperation::Replace { path, value } => {
            let Some(field) = resolve::<T>(path, errors) else {
                return false;
            };
            assign(target, field, path, value.clone(), errors)
        }
        PatchOperation::Remove { path } => {
            let Some(field) = resolve::<T>(path, errors) else {
                return false;
            };
            target.clear(field);
            true
        }
        PatchOperation::Move { from, path } => {
            let Some(dest) = resolve::<T>(path, errors) else {
                return false;
            };
            let Some(value) = read_source(target, from, errors) else {
                return false;
            };
            // field set is flat, so `from` always resolves here
            let Some(src) = pointer_name(from).and_then(T::field) else {
                return false;
            };
            target.clear(src);
            assign(target, dest, path, value, errors)
        }
        PatchOperation::Copy { from, path } => {
            let Some(dest) = resolve::<T>(path, errors) else {
                return false;
            };
            let Some(value) = read_source(target, from, errors) else {
                return false;
            };
            assign(target, dest, path, value, errors)
        }
        PatchOperation::Test { path, value } => {
            let Some(field) = resolve::<T>(path, errors) else {
                return false;
            };
            let current = target.get(field).unwrap_or(Value::Null);
            if &current == value {
                true
            } else {
                errors.add(
                    error_key(path),
                    format!(
                        "The current value '{current}' at path '{path}' is not equal to the test value '{value}'."
                    ),
                );
                false
            }
        }
    }
}

/// Apply every operation in order, collecting failures into `errors`.
///
/// Returns the number of operations that failed.
pub fn apply_patch<T: Patchable>(
    target: &mut T,
    ops: &[PatchOperation],
    errors: &mut ValidationErrors,
) -> usize {
    let mut failed = 0;
    for op in ops {
        if !apply_operation(target, op, errors) {
            tracing::debug!(op = op.name(), path = op.path(), "Patch operation failed");
            failed += 1;
        }
    }
    failed
}
