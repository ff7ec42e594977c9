// ============================================================================
// FFI bindings for the `DistributionService` (bulk delivery tasks).
// Strings written to `result` must be released with `aid_free_string`.
// ----------------------------------------------------------------------------

use crate::domains::distribution::types::{BulkTaskRequest, NewPackageTemplate};
use crate::ffi::{block_on_async, handle_status_result, parse_payload, write_json};
use crate::globals;

use serde::Deserialize;
use std::os::raw::{c_char, c_int};
use uuid::Uuid;

/// Register a package template for an organization
/// Expected JSON payload: { "template": { NewPackageTemplate } }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn distribution_register_template(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        ensure_ptr!(result);

        #[derive(Deserialize)]
        struct Payload {
            template: NewPackageTemplate,
        }

        let p: Payload = parse_payload(payload_json)?;
        let svc = globals::get_distribution_service()?;
        let template = block_on_async(svc.register_template(p.template))?;
        write_json(&template, result)
    })
}

/// Templates offered by one organization
/// Expected JSON payload: { "organization_id": "uuid" }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn distribution_available_templates(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        ensure_ptr!(result);

        #[derive(Deserialize)]
        struct Payload {
            organization_id: Uuid,
        }

        let p: Payload = parse_payload(payload_json)?;
        let svc = globals::get_distribution_service()?;
        let templates = block_on_async(svc.available_templates(p.organization_id))?;
        write_json(&templates, result)
    })
}

/// Beneficiaries to offer in the selection step
/// Expected JSON payload: { "term": "string", "exclude": ["uuid", ...] }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn distribution_search_candidates(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        ensure_ptr!(result);

        #[derive(Deserialize)]
        struct Payload {
            term: String,
            #[serde(default)]
            exclude: Vec<Uuid>,
        }

        let p: Payload = parse_payload(payload_json)?;
        let svc = globals::get_distribution_service()?;
        let candidates = block_on_async(svc.search_candidates(&p.term, &p.exclude))?;
        write_json(&candidates, result)
    })
}

/// Totals for the confirmation step
/// Expected JSON payload: { BulkTaskRequest }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn distribution_preview(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        ensure_ptr!(result);
        let request: BulkTaskRequest = parse_payload(payload_json)?;
        let svc = globals::get_distribution_service()?;
        let preview = block_on_async(svc.preview(&request))?;
        write_json(&preview, result)
    })
}

/// Create one task per selected beneficiary
/// Expected JSON payload: { BulkTaskRequest }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn distribution_create_tasks(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        ensure_ptr!(result);
        let request: BulkTaskRequest = parse_payload(payload_json)?;
        let svc = globals::get_distribution_service()?;
        let batch = block_on_async(svc.create_tasks(request))?;
        write_json(&batch, result)
    })
}

/// Tasks of one batch
/// Expected JSON payload: { "batch_id": "TASK-..." }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn distribution_list_tasks(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        ensure_ptr!(result);

        #[derive(Deserialize)]
        struct Payload {
            batch_id: String,
        }

        let p: Payload = parse_payload(payload_json)?;
        let svc = globals::get_distribution_service()?;
        let tasks = block_on_async(svc.list_tasks(&p.batch_id))?;
        write_json(&tasks, result)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::beneficiary::beneficiary_create;
    use crate::ffi::error::ErrorCode;
    use crate::ffi::test_support::{cstring, init, take_json, unique_national_id};
    use serde_json::json;
    use std::ptr;

    #[test]
    fn test_bulk_task_flow() {
        init();
        let org = Uuid::new_v4().to_string();
        unsafe {
            let payload = cstring(&json!({
                "template": {
                    "organization_id": org,
                    "name": "Hygiene kit",
                    "estimated_cost": "40.25",
                    "total_weight_kg": "3.5",
                    "item_count": 8
                }
            }));
            let mut out: *mut c_char = ptr::null_mut();
            assert_eq!(distribution_register_template(payload.as_ptr(), &mut out), 0);
            let template = take_json(out);

            let payload = cstring(&json!({
                "beneficiary": {
                    "name": "Layla Hassan",
                    "national_id": unique_national_id(),
                    "phone": "0597777777",
                    "address": { "governorate": "Gaza", "city": "Gaza City", "district": "Rimal" }
                }
            }));
            let mut out: *mut c_char = ptr::null_mut();
            assert_eq!(beneficiary_create(payload.as_ptr(), &mut out), 0);
            let beneficiary = take_json(out);

            let payload = cstring(&json!({ "organization_id": org }));
            let mut out: *mut c_char = ptr::null_mut();
            assert_eq!(distribution_available_templates(payload.as_ptr(), &mut out), 0);
            assert_eq!(take_json(out).as_array().unwrap().len(), 1);

            let request = cstring(&json!({
                "beneficiary_ids": [beneficiary["id"], beneficiary["id"]],
                "organization_id": org,
                "template_id": template["id"],
                "priority": "urgent"
            }));
            let mut out: *mut c_char = ptr::null_mut();
            assert_eq!(distribution_preview(request.as_ptr(), &mut out), 0);
            let preview = take_json(out);
            assert_eq!(preview["task_count"], 1);
            assert_eq!(preview["estimated_total_cost"], "40.25");

            let mut out: *mut c_char = ptr::null_mut();
            assert_eq!(distribution_create_tasks(request.as_ptr(), &mut out), 0);
            let batch = take_json(out);
            assert_eq!(batch["tasks"][0]["status"], "pending");

            let payload = cstring(&json!({ "batch_id": batch["batch_id"] }));
            let mut out: *mut c_char = ptr::null_mut();
            assert_eq!(distribution_list_tasks(payload.as_ptr(), &mut out), 0);
            assert_eq!(take_json(out).as_array().unwrap().len(), 1);
        }
    }

    #[test]
    fn test_unknown_beneficiary_rejects_batch() {
        init();
        unsafe {
            let request = cstring(&json!({
                "beneficiary_ids": [Uuid::new_v4().to_string()],
                "organization_id": Uuid::new_v4().to_string(),
                "package_code": "PKG-42"
            }));
            let mut out: *mut c_char = ptr::null_mut();
            assert_eq!(
                distribution_create_tasks(request.as_ptr(), &mut out),
                ErrorCode::TaskRejected as c_int
            );

            let missing_package = cstring(&json!({
                "beneficiary_ids": [Uuid::new_v4().to_string()],
                "organization_id": Uuid::new_v4().to_string()
            }));
            assert_eq!(
                distribution_preview(missing_package.as_ptr(), &mut out),
                ErrorCode::ValidationFailed as c_int
            );
        }
    }

    #[test]
    fn test_empty_search_returns_nothing() {
        init();
        unsafe {
            let payload = cstring(&json!({ "term": " " }));
            let mut out: *mut c_char = ptr::null_mut();
            assert_eq!(distribution_search_candidates(payload.as_ptr(), &mut out), 0);
            assert!(take_json(out).as_array().unwrap().is_empty());
        }
    }
}
