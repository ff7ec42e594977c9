// ============================================================================
// FFI bindings for the `BeneficiaryService`.
// Each wrapper decodes the JSON payload, forwards the request to the service
// on a temporary Tokio runtime and encodes the result as JSON.
//
// Memory ownership: every string written to `result` is owned by the caller
// and must be released with `aid_free_string`.
// ----------------------------------------------------------------------------

use crate::domains::beneficiary::types::{
    BeneficiaryFilter, BeneficiaryStatus, NewBeneficiary, UpdateBeneficiary,
};
use crate::domains::beneficiary::query::BeneficiaryQuery;
use crate::ffi::{block_on_async, handle_status_result, parse_payload, write_json};
use crate::globals;

use serde::Deserialize;
use std::collections::HashMap;
use std::os::raw::{c_char, c_int};
use uuid::Uuid;

#[derive(Deserialize)]
struct IdPayload {
    id: Uuid,
}

/// Register a new beneficiary
/// Expected JSON payload:
/// { "beneficiary": { NewBeneficiary } }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn beneficiary_create(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        ensure_ptr!(result);

        #[derive(Deserialize)]
        struct Payload {
            beneficiary: NewBeneficiary,
        }

        let p: Payload = parse_payload(payload_json)?;
        let svc = globals::get_beneficiary_service()?;
        let created = block_on_async(svc.create_beneficiary(p.beneficiary))?;
        write_json(&created, result)
    })
}

/// Fetch one beneficiary
/// Expected JSON payload: { "id": "uuid" }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn beneficiary_get(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        ensure_ptr!(result);
        let p: IdPayload = parse_payload(payload_json)?;
        let svc = globals::get_beneficiary_service()?;
        let beneficiary = block_on_async(svc.get_beneficiary(p.id))?;
        write_json(&beneficiary, result)
    })
}

/// Update a beneficiary; only fields present in `update` change
/// Expected JSON payload:
/// { "id": "uuid", "update": { UpdateBeneficiary } }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn beneficiary_update(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        ensure_ptr!(result);

        #[derive(Deserialize)]
        struct Payload {
            id: Uuid,
            update: UpdateBeneficiary,
        }

        let p: Payload = parse_payload(payload_json)?;
        let svc = globals::get_beneficiary_service()?;
        let updated = block_on_async(svc.update_beneficiary(p.id, p.update))?;
        write_json(&updated, result)
    })
}

/// Delete a beneficiary
/// Expected JSON payload: { "id": "uuid" }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn beneficiary_delete(payload_json: *const c_char) -> c_int {
    handle_status_result(|| unsafe {
        let p: IdPayload = parse_payload(payload_json)?;
        let svc = globals::get_beneficiary_service()?;
        block_on_async(svc.delete_beneficiary(p.id))
    })
}

/// Run the list query.
/// Expected JSON payload:
/// {
///   "query": { BeneficiaryQuery },
///   "selections": { "governorate": "all", "familySize": "large", ... }   // optional
/// }
/// `selections` carries raw dropdown values; when present it replaces
/// `query.filter` after sentinel normalization.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn beneficiary_query(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        ensure_ptr!(result);

        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Payload {
            #[serde(default)]
            query: BeneficiaryQuery,
            #[serde(default)]
            selections: Option<HashMap<String, String>>,
        }

        let p: Payload = parse_payload(payload_json)?;
        let mut query = p.query;
        if let Some(selections) = p.selections {
            query.filter = BeneficiaryFilter::from_selections(&selections)?;
        }

        let svc = globals::get_beneficiary_service()?;
        let page = block_on_async(svc.query_beneficiaries(&query))?;
        write_json(&page, result)
    })
}

/// Summary counts. Takes no payload.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn beneficiary_statistics(result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        ensure_ptr!(result);
        let svc = globals::get_beneficiary_service()?;
        let stats = block_on_async(svc.get_statistics())?;
        write_json(&stats, result)
    })
}

/// Option lists for the cascading location selects
/// Expected JSON payload: { "filter": { BeneficiaryFilter } }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn beneficiary_geography_options(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        ensure_ptr!(result);

        #[derive(Deserialize)]
        struct Payload {
            #[serde(default)]
            filter: BeneficiaryFilter,
        }

        let p: Payload = parse_payload(payload_json)?;
        let svc = globals::get_beneficiary_service()?;
        let options = block_on_async(svc.get_geography_options(&p.filter))?;
        write_json(&options, result)
    })
}

/// Chips for the active filters, with display labels
/// Expected JSON payload: { "filter": { BeneficiaryFilter } }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn beneficiary_active_filters(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        ensure_ptr!(result);

        #[derive(Deserialize)]
        struct Payload {
            #[serde(default)]
            filter: BeneficiaryFilter,
        }

        let p: Payload = parse_payload(payload_json)?;
        write_json(&p.filter.active_filters(), result)
    })
}

/// Move several beneficiaries to one status
/// Expected JSON payload:
/// { "ids": ["uuid", ...], "status": "active" | "pending" | "suspended" }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn beneficiary_bulk_update_status(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        ensure_ptr!(result);

        #[derive(Deserialize)]
        struct Payload {
            ids: Vec<Uuid>,
            status: BeneficiaryStatus,
        }

        let p: Payload = parse_payload(payload_json)?;
        let svc = globals::get_beneficiary_service()?;
        let outcome = block_on_async(svc.bulk_update_status(p.ids, p.status))?;
        write_json(&outcome, result)
    })
}
