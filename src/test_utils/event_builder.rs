use serde_json::json;
use serde_json::Value;

use crate::ChangeEvent;
use crate::Record;

pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("record must be a JSON object, got {other}"),
    }
}

pub fn tenant_record(
    tenant_id: &str,
    id: u64,
) -> Record {
    record(json!({ "id": id, "tenant_id": tenant_id }))
}

pub fn insert_event(
    table: &str,
    tenant_id: &str,
) -> ChangeEvent {
    ChangeEvent::insert(table, tenant_record(tenant_id, 1))
}

pub fn update_event(
    table: &str,
    tenant_id: &str,
) -> ChangeEvent {
    ChangeEvent::update(table, tenant_record(tenant_id, 1), tenant_record(tenant_id, 1))
}

pub fn delete_event(
    table: &str,
    tenant_id: &str,
) -> ChangeEvent {
    ChangeEvent::delete(table, tenant_record(tenant_id, 1))
}
