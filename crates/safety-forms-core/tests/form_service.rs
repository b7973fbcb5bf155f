// crates/safety-forms-core/tests/form_service.rs
// ============================================================================
// Module: Form Service Tests
// Description: Parent/child writes, filtered reads, login, and companies.
// ============================================================================
//! ## Overview
//! Exercises [`FormService`] against the in-memory store, including the
//! partial-write window left by a failed items insert.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::float_cmp,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use safety_forms_core::AccidenteSubmission;
use safety_forms_core::BotiquinSubmission;
use safety_forms_core::ControlOperacionalSubmission;
use safety_forms_core::ErrorClass;
use safety_forms_core::FilterQuery;
use safety_forms_core::FormError;
use safety_forms_core::FormKind;
use safety_forms_core::FormService;
use safety_forms_core::InMemoryFormStore;
use safety_forms_core::Ntp330Submission;
use safety_forms_core::Operation;
use safety_forms_core::SharedFormStore;
use safety_forms_core::SubmissionError;
use serde_json::Value;
use serde_json::json;

fn service() -> FormService<InMemoryFormStore> {
    FormService::new(InMemoryFormStore::new())
}

fn botiquin(empresa: &str, fecha: &str, items: Value) -> BotiquinSubmission {
    serde_json::from_value(json!({
        "empresa": empresa,
        "responsable": "Ana",
        "fecha": fecha,
        "observaciones": "ok",
        "items": items,
    }))
    .unwrap()
}

fn query(empresa: &str, fecha: &str, formulario: &str) -> FilterQuery {
    FilterQuery {
        empresa: Some(empresa.to_string()),
        fecha: Some(fecha.to_string()),
        formulario: Some(formulario.to_string()),
    }
}

#[test]
fn control_operacional_write_derives_totals_and_reads_back() {
    let service = service();
    let submission: ControlOperacionalSubmission = serde_json::from_value(json!({
        "empresa": "Acme",
        "obra": "Torre Norte",
        "nucleo": "N1",
        "fecha": "2024-05-02",
        "hora": "09:30",
        "rut": "12.345.678-9",
        "observaciones": "sin novedad",
        "items": [
            {"item_principal": "EPP", "item_secundario": "Casco", "correctos": 3, "incorrectos": 1},
            {"item_principal": "EPP", "item_secundario": "Guantes", "correctos": 2, "incorrectos": 0}
        ]
    }))
    .unwrap();

    let outcome = service.submit_form(submission).unwrap();
    assert_eq!(outcome.item_count, 2);

    let rows = service.filter(&query("Acme", "2024-05-02", "control-operacional")).unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row["id"], json!(outcome.master_id.get()));
    assert_eq!(row["total_correctos"], json!(5));
    assert_eq!(row["total_incorrectos"], json!(1));
    assert_eq!(row["indice_co"], json!(83.33));
    assert_eq!(row["fecha"], json!("2024-05-02"));
    let items = row["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["estado_correctos"], json!("verde"));
    assert_eq!(items[0]["estado_incorrectos"], json!("rojo"));
    assert_eq!(items[1]["estado_incorrectos"], json!(""));
}

#[test]
fn write_without_items_reads_back_with_empty_list() {
    let service = service();
    let outcome = service.submit_form(botiquin("Acme", "2024-05-02", Value::Null)).unwrap();
    assert_eq!(outcome.item_count, 0);

    let rows = service.filter_kind(FormKind::Botiquin, "Acme", "2024-05-02").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["items"], json!([]));
}

#[test]
fn missing_required_fields_write_nothing() {
    let service = service();
    let submission = botiquin("Acme", "", json!([{"elemento": "Gasa", "mes": "mayo", "estado": "ok"}]));

    let err = service.submit_form(submission).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Client);
    match err {
        FormError::MissingFields {
            kind,
            fields,
        } => {
            assert_eq!(kind, FormKind::Botiquin);
            assert_eq!(fields, vec!["fecha"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = service.filter_kind(FormKind::Botiquin, "Acme", "2024-05-02").unwrap_err();
    assert_eq!(err.class(), ErrorClass::NotFound);
}

#[test]
fn accident_report_requires_its_subset_and_filters_on_accident_date() {
    let service = service();
    let incomplete: AccidenteSubmission =
        serde_json::from_value(json!({"empresa": "Acme", "obra": "Torre"})).unwrap();
    let err = service.submit_form(incomplete).unwrap_err();
    let FormError::MissingFields {
        fields, ..
    } = err
    else {
        panic!("expected missing fields");
    };
    assert_eq!(fields, vec!["fecha_accidente", "hora", "rut"]);

    let complete: AccidenteSubmission = serde_json::from_value(json!({
        "empresa": "Acme",
        "obra": "Torre",
        "fecha_accidente": "2024-05-02T10:15:00",
        "hora": "10:15",
        "fecha_investigacion": "2024-05-03",
        "rut": "1-9",
        "items": [{"nombre_campo": "lesion", "valor": "corte"}]
    }))
    .unwrap();
    service.submit_form(complete).unwrap();

    let rows = service.filter(&query("Acme", "2024-05-02", "accidente")).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["fecha_accidente"], json!("2024-05-02"));
    assert_eq!(rows[0]["fecha_investigacion"], json!("2024-05-03"));
    assert_eq!(rows[0]["items"], json!([{"nombre_campo": "lesion", "valor": "corte"}]));

    let err = service.filter(&query("Acme", "2024-05-03", "accidente")).unwrap_err();
    assert!(matches!(err, FormError::NotFound { kind: FormKind::Accidente }));
}

#[test]
fn failed_items_insert_leaves_master_persisted() {
    let service = FormService::new(InMemoryFormStore::with_failing_items());
    let submission: Ntp330Submission = serde_json::from_value(json!({
        "empresa": "Acme",
        "obra": "Torre",
        "responsable": "Ana",
        "fecha": "2024-05-02",
        "hora": "08:00",
        "rut": "1-9",
        "items": [{"nombre_campo": "riesgo", "valor": "alto"}]
    }))
    .unwrap();

    let err = service.submit_form(submission).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Server);
    let FormError::ItemsInsert {
        master_id, ..
    } = err
    else {
        panic!("expected items insert failure");
    };

    let rows = service.filter(&query("Acme", "2024-05-02", "ntp330")).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], json!(master_id.get()));
    assert_eq!(rows[0]["items"], json!([]));
}

#[test]
fn control_operacional_without_company_fails_at_master_insert() {
    let service = service();
    let submission: ControlOperacionalSubmission =
        serde_json::from_value(json!({"fecha": "2024-05-02"})).unwrap();
    let err = service.submit_form(submission).unwrap_err();
    assert!(matches!(err, FormError::MasterInsert { kind: FormKind::ControlOperacional, .. }));
}

#[test]
fn concurrent_writes_are_both_visible() {
    let service = FormService::new(SharedFormStore::from_store(InMemoryFormStore::new()));
    std::thread::scope(|scope| {
        for elemento in ["Gasa", "Alcohol"] {
            let service = service.clone();
            scope.spawn(move || {
                let items = json!([{"elemento": elemento, "mes": "mayo", "estado": "ok"}]);
                service.submit_form(botiquin("Acme", "2024-05-02", items)).unwrap();
            });
        }
    });

    let rows = service.filter(&query("Acme", "2024-05-02", "botiquin")).unwrap();
    assert_eq!(rows.len(), 2);
    assert_ne!(rows[0]["id"], rows[1]["id"]);
    for row in &rows {
        assert_eq!(row["items"].as_array().unwrap().len(), 1);
    }
}

#[test]
fn filter_rejects_missing_parameters_and_unknown_forms() {
    let service = service();
    let err = service
        .filter(&FilterQuery {
            empresa: Some("Acme".to_string()),
            fecha: None,
            formulario: Some(String::new()),
        })
        .unwrap_err();
    let FormError::MissingInput {
        fields, ..
    } = err
    else {
        panic!("expected missing input");
    };
    assert_eq!(fields, vec!["fecha", "formulario"]);

    let err = service.filter(&query("Acme", "2024-05-02", "encuesta")).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Client);
    assert!(matches!(err, FormError::UnknownFormKind(ref value) if value == "encuesta"));

    let err = service.filter(&FilterQuery::default()).unwrap_err();
    assert!(matches!(err, FormError::MissingInput { operation: Operation::Filter, .. }));
}

#[test]
fn login_matches_exact_credentials() {
    let service = service();
    let created = service.add_user("ana", "secreta", "admin").unwrap();

    let user = service.login(Some("ana"), Some("secreta")).unwrap();
    assert_eq!(user, created);

    let err = service.login(Some("ana"), Some("otra")).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Unauthenticated);

    let err = service.login(Some("ana"), None).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Client);

    let err = service.add_user("bob", " ", "admin").unwrap_err();
    assert!(matches!(err, FormError::MissingInput { operation: Operation::AddUser, .. }));
}

#[test]
fn register_company_rejects_blank_names() {
    let service = service();
    let err = service.register_company(Some("   ")).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Client);
    assert_eq!(service.register_company(None).unwrap_err().class(), ErrorClass::Client);

    let first = service.register_company(Some("Acme")).unwrap();
    let second = service.register_company(Some("Constructora Sur")).unwrap();
    assert_eq!(first.nombre, "Acme");
    assert_ne!(first.id, second.id);
}

#[test]
fn overflowing_counters_are_rejected_before_any_write() {
    let service = service();
    let submission: ControlOperacionalSubmission = serde_json::from_value(json!({
        "empresa": "Acme",
        "fecha": "2024-05-02",
        "items": [
            {"item_principal": "EPP", "correctos": 5_000_000_000_000_000_000_i64},
            {"item_principal": "Orden", "correctos": 5_000_000_000_000_000_000_i64}
        ]
    }))
    .unwrap();
    let err = service.submit_form(submission).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Client);
    assert!(matches!(
        err,
        FormError::InvalidSubmission {
            kind: FormKind::ControlOperacional,
            source: SubmissionError::CounterOverflow {
                field: "correctos"
            },
        }
    ));

    let err = service
        .filter(&query("Acme", "2024-05-02", "control-operacional"))
        .unwrap_err();
    assert!(matches!(err, FormError::NotFound { .. }));
}

#[test]
fn item_row_limit_is_checked_before_master_insert() {
    let service = FormService::new(InMemoryFormStore::with_item_row_limit(2));
    let items = json!([{"elemento": "Gasa"}, {"elemento": "Venda"}, {"elemento": "Tijeras"}]);
    let err = service.submit_form(botiquin("Acme", "2024-05-02", items)).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Client);
    assert!(matches!(
        err,
        FormError::TooManyItems {
            count: 3,
            limit: 2,
            ..
        }
    ));
    let err = service.filter(&query("Acme", "2024-05-02", "botiquin")).unwrap_err();
    assert!(matches!(err, FormError::NotFound { .. }));

    let items = json!([{"elemento": "Gasa"}, {"elemento": "Venda"}]);
    let outcome = service.submit_form(botiquin("Acme", "2024-05-02", items)).unwrap();
    assert_eq!(outcome.item_count, 2);
}
