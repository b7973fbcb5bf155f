// crates/safety-forms-core/src/core/submission.rs
// ============================================================================
// Module: Safety Forms Submissions
// Description: Request payloads for the four form write endpoints.
// Purpose: Convert submissions into column-ordered master and item values.
// Dependencies: serde, crate::core::{identifiers, schema, values}
// ============================================================================

//! ## Overview
//! Each submission type mirrors the JSON body of its write endpoint. The
//! [`FormSubmission`] trait turns a submission into a [`FormRecord`] whose
//! value vectors follow the column order of the kind's
//! [`crate::FormSchema`]. Operational control submissions also compute their
//! derived totals, compliance index, and per-item status labels here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::core::identifiers::FormKind;
use crate::core::schema::FormSchema;
use crate::core::values::FieldValue;
use crate::core::values::lenient_count;
use crate::core::values::lenient_text;

// ============================================================================
// SECTION: Form Record
// ============================================================================

/// Column-ordered values for one master row and its item rows.
#[derive(Debug, Clone, PartialEq)]
pub struct FormRecord {
    /// Form kind the values belong to.
    pub kind: FormKind,
    /// Master values in [`FormSchema::master_columns`] order.
    pub master: Vec<FieldValue>,
    /// Item rows, each in [`FormSchema::item_columns`] order.
    pub items: Vec<Vec<FieldValue>>,
}

impl FormRecord {
    /// Returns the descriptor for this record's kind.
    #[must_use]
    pub const fn schema(&self) -> &'static FormSchema {
        self.kind.schema()
    }

    /// Returns a master value by column name.
    #[must_use]
    pub fn master_value(&self, column: &str) -> Option<&FieldValue> {
        self.schema().master_index(column).and_then(|index| self.master.get(index))
    }

    /// Lists the required fields that are absent, null, or empty.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.schema()
            .required_fields
            .iter()
            .copied()
            .filter(|field| self.master_value(field).is_none_or(FieldValue::is_missing))
            .collect()
    }
}

/// A submission that parsed but cannot be turned into storable values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// Summing a counter across items overflowed `i64`.
    #[error("sum of {field} across items overflows")]
    CounterOverflow {
        /// Counter being summed.
        field: &'static str,
    },
}

/// A write-endpoint payload that maps onto a form kind.
pub trait FormSubmission: DeserializeOwned {
    /// Kind written by this submission.
    const KIND: FormKind;

    /// Converts the submission into column-ordered values.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError`] when derived fields cannot be computed.
    fn into_record(self) -> Result<FormRecord, SubmissionError>;
}

// ============================================================================
// SECTION: Operational Control
// ============================================================================

/// Status label for an item with at least one compliant observation.
pub const ESTADO_VERDE: &str = "verde";
/// Status label for an item with at least one non-compliant observation.
pub const ESTADO_ROJO: &str = "rojo";

/// Body of `POST /api/control-operacional`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ControlOperacionalSubmission {
    /// Company name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub empresa: Option<String>,
    /// Work site.
    #[serde(default, deserialize_with = "lenient_text")]
    pub obra: Option<String>,
    /// Operational nucleus.
    #[serde(default, deserialize_with = "lenient_text")]
    pub nucleo: Option<String>,
    /// Inspection date.
    #[serde(default, deserialize_with = "lenient_text")]
    pub fecha: Option<String>,
    /// Inspection time.
    #[serde(default, deserialize_with = "lenient_text")]
    pub hora: Option<String>,
    /// Responsible person identifier.
    #[serde(default, deserialize_with = "lenient_text")]
    pub rut: Option<String>,
    /// Free-text observations.
    #[serde(default, deserialize_with = "lenient_text")]
    pub observaciones: Option<String>,
    /// Checklist lines.
    #[serde(default)]
    pub items: Option<Vec<ControlOperacionalItem>>,
}

/// One checklist line of an operational control.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ControlOperacionalItem {
    /// Main category.
    #[serde(default, deserialize_with = "lenient_text")]
    pub item_principal: Option<String>,
    /// Sub-category.
    #[serde(default, deserialize_with = "lenient_text")]
    pub item_secundario: Option<String>,
    /// Compliant observations.
    #[serde(default, deserialize_with = "lenient_count")]
    pub correctos: i64,
    /// Non-compliant observations.
    #[serde(default, deserialize_with = "lenient_count")]
    pub incorrectos: i64,
}

impl ControlOperacionalItem {
    /// Label derived from this item's compliant count alone.
    #[must_use]
    pub const fn estado_correctos(&self) -> &'static str {
        if self.correctos > 0 { ESTADO_VERDE } else { "" }
    }

    /// Label derived from this item's non-compliant count alone.
    #[must_use]
    pub const fn estado_incorrectos(&self) -> &'static str {
        if self.incorrectos > 0 { ESTADO_ROJO } else { "" }
    }
}

/// Derived summary of an operational control checklist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlTotals {
    /// Sum of compliant observations.
    pub total_correctos: i64,
    /// Sum of non-compliant observations.
    pub total_incorrectos: i64,
    /// Compliance percentage rounded to two decimals.
    pub indice_co: f64,
}

impl ControlTotals {
    /// Computes totals and the compliance index over checklist lines.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::CounterOverflow`] when a total does not fit
    /// in `i64`.
    pub fn from_items(items: &[ControlOperacionalItem]) -> Result<Self, SubmissionError> {
        let total_correctos = checked_total(items, "correctos", |item| item.correctos)?;
        let total_incorrectos = checked_total(items, "incorrectos", |item| item.incorrectos)?;
        Ok(Self {
            total_correctos,
            total_incorrectos,
            indice_co: compliance_index(total_correctos, total_incorrectos),
        })
    }
}

/// Sums one counter across items, failing on overflow.
fn checked_total(
    items: &[ControlOperacionalItem],
    field: &'static str,
    count: impl Fn(&ControlOperacionalItem) -> i64,
) -> Result<i64, SubmissionError> {
    items.iter().try_fold(0_i64, |total, item| {
        total.checked_add(count(item)).ok_or(SubmissionError::CounterOverflow {
            field,
        })
    })
}

/// Returns `correctos / (correctos + incorrectos) * 100` rounded to 2 places.
#[must_use]
#[allow(clippy::cast_precision_loss, reason = "Checklist counts stay far below 2^52.")]
pub fn compliance_index(correctos: i64, incorrectos: i64) -> f64 {
    let total = correctos.saturating_add(incorrectos);
    if total == 0 {
        return 0.0;
    }
    let ratio = correctos as f64 / total as f64 * 100.0;
    (ratio * 100.0).round() / 100.0
}

impl FormSubmission for ControlOperacionalSubmission {
    const KIND: FormKind = FormKind::ControlOperacional;

    fn into_record(self) -> Result<FormRecord, SubmissionError> {
        let items = self.items.unwrap_or_default();
        let totals = ControlTotals::from_items(&items)?;
        let master = vec![
            self.empresa.into(),
            self.obra.into(),
            self.nucleo.into(),
            self.fecha.into(),
            self.hora.into(),
            self.rut.into(),
            self.observaciones.into(),
            totals.total_correctos.into(),
            totals.total_incorrectos.into(),
            totals.indice_co.into(),
        ];
        let items = items
            .into_iter()
            .map(|item| {
                let estado_correctos = item.estado_correctos();
                let estado_incorrectos = item.estado_incorrectos();
                vec![
                    item.item_principal.into(),
                    item.item_secundario.into(),
                    item.correctos.into(),
                    item.incorrectos.into(),
                    estado_correctos.into(),
                    estado_incorrectos.into(),
                ]
            })
            .collect();
        Ok(FormRecord {
            kind: Self::KIND,
            master,
            items,
        })
    }
}

// ============================================================================
// SECTION: First-Aid Audit
// ============================================================================

/// Body of `POST /api/botiquin`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BotiquinSubmission {
    /// Company name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub empresa: Option<String>,
    /// Person in charge of the kit.
    #[serde(default, deserialize_with = "lenient_text")]
    pub responsable: Option<String>,
    /// Audit date.
    #[serde(default, deserialize_with = "lenient_text")]
    pub fecha: Option<String>,
    /// Free-text observations.
    #[serde(default, deserialize_with = "lenient_text")]
    pub observaciones: Option<String>,
    /// Kit elements.
    #[serde(default)]
    pub items: Option<Vec<BotiquinItem>>,
}

/// One kit element of a first-aid audit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BotiquinItem {
    /// Element name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub elemento: Option<String>,
    /// Month label.
    #[serde(default, deserialize_with = "lenient_text")]
    pub mes: Option<String>,
    /// Status label.
    #[serde(default, deserialize_with = "lenient_text")]
    pub estado: Option<String>,
}

impl FormSubmission for BotiquinSubmission {
    const KIND: FormKind = FormKind::Botiquin;

    fn into_record(self) -> Result<FormRecord, SubmissionError> {
        Ok(FormRecord {
            kind: Self::KIND,
            master: vec![
                self.empresa.into(),
                self.responsable.into(),
                self.fecha.into(),
                self.observaciones.into(),
            ],
            items: self
                .items
                .unwrap_or_default()
                .into_iter()
                .map(|item| vec![item.elemento.into(), item.mes.into(), item.estado.into()])
                .collect(),
        })
    }
}

// ============================================================================
// SECTION: Field/Value Forms
// ============================================================================

/// Generic named field of an accident or risk-assessment form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldItem {
    /// Field name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub nombre_campo: Option<String>,
    /// Field value.
    #[serde(default, deserialize_with = "lenient_text")]
    pub valor: Option<String>,
}

/// Converts field items into item rows.
fn field_rows(items: Option<Vec<FieldItem>>) -> Vec<Vec<FieldValue>> {
    items
        .unwrap_or_default()
        .into_iter()
        .map(|item| vec![item.nombre_campo.into(), item.valor.into()])
        .collect()
}

/// Body of `POST /api/accidente`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccidenteSubmission {
    /// Company name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub empresa: Option<String>,
    /// Work site.
    #[serde(default, deserialize_with = "lenient_text")]
    pub obra: Option<String>,
    /// Accident date.
    #[serde(default, deserialize_with = "lenient_text")]
    pub fecha_accidente: Option<String>,
    /// Accident time.
    #[serde(default, deserialize_with = "lenient_text")]
    pub hora: Option<String>,
    /// Investigation date.
    #[serde(default, deserialize_with = "lenient_text")]
    pub fecha_investigacion: Option<String>,
    /// Responsible person identifier.
    #[serde(default, deserialize_with = "lenient_text")]
    pub rut: Option<String>,
    /// Free-text observations.
    #[serde(default, deserialize_with = "lenient_text")]
    pub observaciones: Option<String>,
    /// Report fields.
    #[serde(default)]
    pub items: Option<Vec<FieldItem>>,
}

impl FormSubmission for AccidenteSubmission {
    const KIND: FormKind = FormKind::Accidente;

    fn into_record(self) -> Result<FormRecord, SubmissionError> {
        Ok(FormRecord {
            kind: Self::KIND,
            master: vec![
                self.empresa.into(),
                self.obra.into(),
                self.fecha_accidente.into(),
                self.hora.into(),
                self.fecha_investigacion.into(),
                self.rut.into(),
                self.observaciones.into(),
            ],
            items: field_rows(self.items),
        })
    }
}

/// Body of `POST /api/ntp330`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ntp330Submission {
    /// Company name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub empresa: Option<String>,
    /// Work site.
    #[serde(default, deserialize_with = "lenient_text")]
    pub obra: Option<String>,
    /// Person responsible for the assessment.
    #[serde(default, deserialize_with = "lenient_text")]
    pub responsable: Option<String>,
    /// Assessment date.
    #[serde(default, deserialize_with = "lenient_text")]
    pub fecha: Option<String>,
    /// Assessment time.
    #[serde(default, deserialize_with = "lenient_text")]
    pub hora: Option<String>,
    /// Responsible person identifier.
    #[serde(default, deserialize_with = "lenient_text")]
    pub rut: Option<String>,
    /// Free-text observations.
    #[serde(default, deserialize_with = "lenient_text")]
    pub observaciones: Option<String>,
    /// Assessment fields.
    #[serde(default)]
    pub items: Option<Vec<FieldItem>>,
}

impl FormSubmission for Ntp330Submission {
    const KIND: FormKind = FormKind::Ntp330;

    fn into_record(self) -> Result<FormRecord, SubmissionError> {
        Ok(FormRecord {
            kind: Self::KIND,
            master: vec![
                self.empresa.into(),
                self.obra.into(),
                self.responsable.into(),
                self.fecha.into(),
                self.hora.into(),
                self.rut.into(),
                self.observaciones.into(),
            ],
            items: field_rows(self.items),
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions.")]

    use serde_json::json;

    use super::AccidenteSubmission;
    use super::BotiquinSubmission;
    use super::ControlOperacionalSubmission;
    use super::FormSubmission;
    use super::Ntp330Submission;
    use super::SubmissionError;
    use super::compliance_index;
    use crate::core::values::FieldValue;

    fn control(body: serde_json::Value) -> ControlOperacionalSubmission {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn control_totals_sum_children() {
        let record = control(json!({
            "empresa": "Acme",
            "items": [
                {"item_principal": "EPP", "correctos": 3, "incorrectos": 1},
                {"item_principal": "Orden", "correctos": 2, "incorrectos": 0}
            ]
        }))
        .into_record()
        .unwrap();
        assert_eq!(record.master_value("total_correctos"), Some(&FieldValue::Integer(5)));
        assert_eq!(record.master_value("total_incorrectos"), Some(&FieldValue::Integer(1)));
        assert_eq!(record.master_value("indice_co"), Some(&FieldValue::Real(83.33)));
    }

    #[test]
    fn control_index_is_zero_without_observations() {
        assert!(compliance_index(0, 0).abs() < f64::EPSILON);
        let record = control(json!({"empresa": "Acme"})).into_record().unwrap();
        assert!(record.items.is_empty());
        assert_eq!(record.master_value("indice_co"), Some(&FieldValue::Real(0.0)));
        assert_eq!(record.master_value("total_correctos"), Some(&FieldValue::Integer(0)));
    }

    #[test]
    fn control_index_rounds_to_two_places() {
        assert!((compliance_index(1, 2) - 33.33).abs() < 1e-9);
        assert!((compliance_index(2, 1) - 66.67).abs() < 1e-9);
        assert!((compliance_index(4, 0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn item_labels_depend_only_on_own_counts() {
        let record = control(json!({
            "items": [
                {"correctos": 0, "incorrectos": 2},
                {"correctos": 5, "incorrectos": 0}
            ]
        }))
        .into_record()
        .unwrap();
        assert_eq!(record.items[0][4], FieldValue::Text(String::new()));
        assert_eq!(record.items[0][5], FieldValue::Text("rojo".to_string()));
        assert_eq!(record.items[1][4], FieldValue::Text("verde".to_string()));
        assert_eq!(record.items[1][5], FieldValue::Text(String::new()));
    }

    #[test]
    fn control_declares_no_required_fields() {
        let record = control(json!({})).into_record().unwrap();
        assert!(record.missing_fields().is_empty());
    }

    #[test]
    fn botiquin_requires_company_and_date() {
        let submission: BotiquinSubmission =
            serde_json::from_value(json!({"empresa": "", "responsable": "Ana"})).unwrap();
        assert_eq!(submission.into_record().unwrap().missing_fields(), vec!["empresa", "fecha"]);
    }

    #[test]
    fn accident_requires_its_own_date_field() {
        let submission: AccidenteSubmission = serde_json::from_value(json!({
            "empresa": "Acme", "obra": "Torre", "fecha": "2024-03-01", "hora": "10:00", "rut": "1-9"
        }))
        .unwrap();
        assert_eq!(submission.into_record().unwrap().missing_fields(), vec!["fecha_accidente"]);
    }

    #[test]
    fn ntp330_reports_every_missing_field() {
        let submission: Ntp330Submission = serde_json::from_value(json!({"obra": "Torre"})).unwrap();
        assert_eq!(
            submission.into_record().unwrap().missing_fields(),
            vec!["empresa", "responsable", "fecha", "hora", "rut"]
        );
    }

    #[test]
    fn field_items_keep_order_and_stringify_values() {
        let submission: Ntp330Submission = serde_json::from_value(json!({
            "items": [
                {"nombre_campo": "nivel_deficiencia", "valor": 6},
                {"nombre_campo": "nivel_exposicion", "valor": "3"}
            ]
        }))
        .unwrap();
        let record = submission.into_record().unwrap();
        assert_eq!(record.items.len(), 2);
        assert_eq!(record.items[0][1], FieldValue::Text("6".to_string()));
        assert_eq!(record.items[1][0], FieldValue::Text("nivel_exposicion".to_string()));
    }

    #[test]
    fn null_items_mean_no_children() {
        let submission: AccidenteSubmission =
            serde_json::from_value(json!({"items": null})).unwrap();
        assert!(submission.into_record().unwrap().items.is_empty());
    }

    #[test]
    fn control_totals_reject_overflowing_counters() {
        let err = control(json!({
            "empresa": "Acme",
            "items": [
                {"correctos": 5_000_000_000_000_000_000_i64},
                {"correctos": 5_000_000_000_000_000_000_i64}
            ]
        }))
        .into_record()
        .unwrap_err();
        assert_eq!(
            err,
            SubmissionError::CounterOverflow {
                field: "correctos"
            }
        );

        let err = control(json!({
            "items": [{"incorrectos": i64::MAX}, {"incorrectos": 1}]
        }))
        .into_record()
        .unwrap_err();
        assert_eq!(
            err,
            SubmissionError::CounterOverflow {
                field: "incorrectos"
            }
        );
    }

    #[test]
    fn control_totals_accept_counters_summing_to_max() {
        let record = control(json!({
            "items": [{"correctos": i64::MAX - 1}, {"correctos": 1}]
        }))
        .into_record()
        .unwrap();
        assert_eq!(record.master_value("total_correctos"), Some(&FieldValue::Integer(i64::MAX)));
    }
}
