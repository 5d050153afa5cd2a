use failover_core::types::{HttpMethod, JitterMode};
use failover_core::{parse_document_str, validate_document, DocumentFormat, Validate};

fn minimal_valid_yaml() -> &'static str {
    r#"
failover: 1.0.0
operations:
  - operationId: unassignTechnician
    strategies:
      - name: delete-assignment
        method: DELETE
        path: /api/locations/{locationId}/technicians/{technicianId}
      - name: post-unassign-action
        method: POST
        path: /api/locations/{locationId}/unassign-technician
        body:
          technicianId: "{technicianId}"
"#
}

#[test]
fn parse_yaml_and_validate_ok() {
    let parsed = parse_document_str(minimal_valid_yaml(), DocumentFormat::Yaml).unwrap();
    validate_document(&parsed.document).unwrap();
    let op = parsed.document.operation("unassignTechnician").unwrap();
    assert_eq!(op.strategies.len(), 2);
    assert_eq!(op.strategies[0].method, HttpMethod::Delete);
}

#[test]
fn parse_auto_detects_yaml() {
    let parsed = parse_document_str(minimal_valid_yaml(), DocumentFormat::Auto).unwrap();
    assert_eq!(parsed.format, DocumentFormat::Yaml);
}

#[test]
fn parse_auto_detects_json() {
    let json = r#"
{
  "failover": "1.0.1",
  "operations": [
    {
      "operationId": "closeWorkOrder",
      "strategies": [
        { "name": "patch-status", "method": "PATCH", "path": "/api/work-orders/{id}", "body": { "status": "closed" } }
      ]
    }
  ]
}
"#;
    let parsed = parse_document_str(json, DocumentFormat::Auto).unwrap();
    assert_eq!(parsed.format, DocumentFormat::Json);
    parsed.document.validate().unwrap();
}

#[test]
fn parse_error_reports_yaml_for_garbage() {
    let err = parse_document_str("failover: [unclosed", DocumentFormat::Auto).unwrap_err();
    assert!(matches!(err, failover_core::ParseError::Yaml(_)));
}

#[test]
fn retry_block_accepts_legacy_alias() {
    let doc = r#"
failover: 1.0.0
operations:
  - operationId: op
    retry:
      maxRetriesPerStrategy: 3
      baseDelayMs: 100
      jitter: full
      nonRetryableStatuses: [400, 404]
    strategies:
      - name: s1
        method: GET
        path: /x
"#;
    let parsed = parse_document_str(doc, DocumentFormat::Yaml).unwrap();
    let retry = parsed.document.operations[0].retry.clone().unwrap();
    assert_eq!(retry.max_attempts_per_strategy, Some(3));
    assert_eq!(retry.base_delay_ms, Some(100));
    assert_eq!(retry.jitter, Some(JitterMode::Full));
    assert_eq!(retry.non_retryable_statuses, Some(vec![400, 404]));
}

#[test]
fn empty_strategy_list_is_rejected() {
    let doc = r#"
failover: 1.0.0
operations:
  - operationId: op
    strategies: []
"#;
    let parsed = parse_document_str(doc, DocumentFormat::Yaml).unwrap();
    let err = validate_document(&parsed.document).unwrap_err();
    assert!(err
        .violations
        .iter()
        .any(|v| v.path == "$.operations[0].strategies" && v.message.contains("at least one")));
}

#[test]
fn duplicate_names_and_bad_paths_are_reported() {
    let doc = r#"
failover: 1.0.0
operations:
  - operationId: op
    strategies:
      - name: same
        method: DELETE
        path: api/no-leading-slash
      - name: same
        method: GET
        path: /api/{unclosed
        body: { a: 1 }
"#;
    let parsed = parse_document_str(doc, DocumentFormat::Yaml).unwrap();
    let err = validate_document(&parsed.document).unwrap_err();
    let paths: Vec<&str> = err.violations.iter().map(|v| v.path.as_str()).collect();
    assert!(paths.contains(&"$.operations[0].strategies[0].path"));
    assert!(paths.contains(&"$.operations[0].strategies[1].name"));
    assert!(paths.contains(&"$.operations[0].strategies[1].path"));
    assert!(paths.contains(&"$.operations[0].strategies[1].body"));
}

#[test]
fn retry_and_status_bounds_are_checked() {
    let doc = r#"
failover: 1.0.0
operations:
  - operationId: op
    retry:
      maxAttemptsPerStrategy: 0
      factor: 0.5
      nonRetryableStatuses: [404, 99]
    strategies:
      - name: s1
        method: POST
        path: /x
        nonRetryableStatuses: [700]
"#;
    let parsed = parse_document_str(doc, DocumentFormat::Yaml).unwrap();
    let err = validate_document(&parsed.document).unwrap_err();
    assert!(err.touches("$.operations[0].retry.maxAttemptsPerStrategy"));
    assert!(err.touches("$.operations[0].retry.factor"));
    assert!(err.touches("$.operations[0].retry.nonRetryableStatuses[1]"));
    assert!(err.touches("$.operations[0].strategies[0].nonRetryableStatuses[0]"));
    assert_eq!(err.violations.len(), 4);
}

#[test]
fn unsupported_version_and_unknown_fields_are_reported() {
    let doc = r#"
failover: 2.0.0
owner: facilities
operations:
  - operationId: op
    strategies:
      - name: s1
        method: GET
        path: /x
"#;
    let parsed = parse_document_str(doc, DocumentFormat::Yaml).unwrap();
    let err = validate_document(&parsed.document).unwrap_err();
    assert!(err.touches("$.failover"));
    assert!(err.touches("$.owner"));
}

#[test]
fn verify_select_must_be_jsonpath() {
    let doc = r#"
failover: 1.0.0
operations:
  - operationId: op
    strategies:
      - name: s1
        method: DELETE
        path: /x/{id}
    verify:
      path: /x/{id}
      select: assignedLocation
"#;
    let parsed = parse_document_str(doc, DocumentFormat::Yaml).unwrap();
    let verify = parsed.document.operations[0].verify.clone().unwrap();
    assert_eq!(verify.equals, serde_json::Value::Null);
    let err = validate_document(&parsed.document).unwrap_err();
    assert!(err.touches("$.operations[0].verify.select"));
}
