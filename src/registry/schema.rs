//! Compiled result schemas, one per action.

use crate::actions::{descriptor, ActionKind};
use crate::error::{ActionError, ActionResult, ValidationError, ValidationIssue};
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A draft-07 schema compiled for one action's result.
pub struct ResultSchema {
    action: ActionKind,
    compiled: JSONSchema,
}

impl ResultSchema {
    pub fn compile(action: ActionKind) -> ActionResult<Self> {
        let schema = descriptor(action).result_schema;
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema)
            .map_err(|e| ActionError::Schema {
                action,
                reason: e.to_string(),
            })?;

        Ok(Self { action, compiled })
    }

    pub fn action(&self) -> ActionKind {
        self.action
    }

    /// Validate `value`, describing the subject as `context` on failure.
    pub fn validate(&self, value: &Value, context: &str) -> Result<(), ValidationError> {
        match self.compiled.validate(value) {
            Ok(()) => Ok(()),
            Err(errors) => {
                let issues = errors
                    .map(|e| ValidationIssue {
                        path: e.instance_path.to_string(),
                        message: e.to_string().replace('\n', " "),
                    })
                    .collect();

                Err(ValidationError {
                    context: context.to_string(),
                    issues,
                })
            }
        }
    }
}

impl fmt::Debug for ResultSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSchema")
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

/// Result schemas for every action, compiled once.
#[derive(Debug, Clone)]
pub struct SchemaTable {
    schemas: HashMap<ActionKind, Arc<ResultSchema>>,
}

impl SchemaTable {
    pub fn compile_all() -> ActionResult<Self> {
        let schemas = ActionKind::all()
            .map(|action| Ok((action, Arc::new(ResultSchema::compile(action)?))))
            .collect::<ActionResult<HashMap<_, _>>>()?;

        Ok(Self { schemas })
    }

    pub fn get(&self, action: ActionKind) -> ActionResult<Arc<ResultSchema>> {
        self.schemas
            .get(&action)
            .cloned()
            .ok_or_else(|| ActionError::Schema {
                action,
                reason: "no result schema compiled for action".to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
