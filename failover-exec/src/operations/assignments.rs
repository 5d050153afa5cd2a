//! Technician-to-location assignment operations.
//!
//! The backend services disagree on how an assignment is removed, so the
//! unassignment is expressed as four call shapes, most standard first.

use std::collections::BTreeMap;

use failover_core::types::{FailoverDocument, HttpMethod, OperationSpec, StrategySpec, VerifySpec};
use serde_json::{json, Value};

use crate::executor::ExecutionResult;
use crate::operations::{OperationRunner, RunError};
use crate::session::SessionContext;

pub const UNASSIGN_TECHNICIAN: &str = "unassignTechnician";

pub fn unassign_technician_operation() -> OperationSpec {
    OperationSpec {
        operation_id: UNASSIGN_TECHNICIAN.to_string(),
        description: Some("Remove a technician's assignment to a location".to_string()),
        retry: None,
        strategies: vec![
            strategy(
                "delete-assignment",
                HttpMethod::Delete,
                "/api/locations/{locationId}/technicians/{technicianId}",
                None,
            ),
            strategy(
                "post-unassign-action",
                HttpMethod::Post,
                "/api/locations/{locationId}/unassign-technician",
                Some(json!({ "technicianId": "{technicianId}" })),
            ),
            strategy(
                "patch-clear-location",
                HttpMethod::Patch,
                "/api/technicians/{technicianId}",
                Some(json!({ "assignedLocation": null })),
            ),
            strategy(
                "post-collection-unassign",
                HttpMethod::Post,
                "/api/locations/unassign",
                Some(json!({ "locationId": "{locationId}", "technicianId": "{technicianId}" })),
            ),
        ],
        verify: Some(VerifySpec {
            path: "/api/technicians/{technicianId}".to_string(),
            select: "$.assignedLocation".to_string(),
            equals: Value::Null,
        }),
        extensions: BTreeMap::new(),
    }
}

/// The built-in operations as a document, for listing and planning.
pub fn builtin_document() -> FailoverDocument {
    FailoverDocument {
        failover: "1.0.0".to_string(),
        description: Some("Built-in facility-management operations".to_string()),
        operations: vec![unassign_technician_operation()],
        extensions: BTreeMap::new(),
    }
}

pub fn unassign_technician_vars(technician_id: &str, location_id: &str) -> BTreeMap<String, Value> {
    BTreeMap::from([
        ("technicianId".to_string(), Value::String(technician_id.to_string())),
        ("locationId".to_string(), Value::String(location_id.to_string())),
    ])
}

pub async fn unassign_technician(
    runner: &OperationRunner,
    session: &SessionContext,
    technician_id: &str,
    location_id: &str,
) -> Result<ExecutionResult<Value>, RunError> {
    let op = unassign_technician_operation();
    let vars = unassign_technician_vars(technician_id, location_id);
    runner.run(session, &op, &vars).await
}

fn strategy(name: &str, method: HttpMethod, path: &str, body: Option<Value>) -> StrategySpec {
    StrategySpec {
        name: name.to_string(),
        description: None,
        method,
        path: path.to_string(),
        headers: BTreeMap::new(),
        body,
        non_retryable_statuses: None,
        extensions: BTreeMap::new(),
    }
}
