// crates/safety-forms-core/src/core/schema.rs
// ============================================================================
// Module: Safety Forms Table Descriptors
// Description: Static master/items table layouts for each form kind.
// Purpose: Drive the generic parent/child write and filtered read.
// Dependencies: crate::core::identifiers
// ============================================================================

//! ## Overview
//! Each form kind persists into a `<tipo>_maestro` table and a
//! `<tipo>_items` table. A [`FormSchema`] lists the ordered columns of both,
//! the fields a submission must carry, and the date column the filter
//! compares against. Stores build their statements from these descriptors;
//! nothing else hardcodes table or column names.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::identifiers::FormKind;

// ============================================================================
// SECTION: Column Types
// ============================================================================

/// Storage type of a form column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Free text.
    Text,
    /// Calendar date, read back as `YYYY-MM-DD`.
    Date,
    /// Signed integer.
    Integer,
    /// Floating point number.
    Real,
}

/// A single column in a master or items table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name, identical to the JSON field name.
    pub name: &'static str,
    /// Storage type.
    pub column_type: ColumnType,
    /// Whether the table rejects NULL for this column.
    pub not_null: bool,
}

impl ColumnSpec {
    /// Nullable text column.
    const fn text(name: &'static str) -> Self {
        Self {
            name,
            column_type: ColumnType::Text,
            not_null: false,
        }
    }

    /// Nullable date column.
    const fn date(name: &'static str) -> Self {
        Self {
            name,
            column_type: ColumnType::Date,
            not_null: false,
        }
    }

    /// Nullable integer column.
    const fn integer(name: &'static str) -> Self {
        Self {
            name,
            column_type: ColumnType::Integer,
            not_null: false,
        }
    }

    /// Nullable real column.
    const fn real(name: &'static str) -> Self {
        Self {
            name,
            column_type: ColumnType::Real,
            not_null: false,
        }
    }

    /// Marks the column NOT NULL.
    const fn required(self) -> Self {
        Self {
            not_null: true,
            ..self
        }
    }
}

// ============================================================================
// SECTION: Form Schema
// ============================================================================

/// Table layout and validation rules for one form kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormSchema {
    /// Form kind described by this schema.
    pub kind: FormKind,
    /// Master table name.
    pub master_table: &'static str,
    /// Items table name.
    pub items_table: &'static str,
    /// Master columns in insert order (excluding `id` and `created_at`).
    pub master_columns: &'static [ColumnSpec],
    /// Item columns in insert order (excluding `id` and `maestro_id`).
    pub item_columns: &'static [ColumnSpec],
    /// Master fields that must be present and non-empty on submission.
    pub required_fields: &'static [&'static str],
    /// Master date column compared against the filter date.
    pub date_column: &'static str,
}

impl FormSchema {
    /// Returns the position of a master column by name.
    #[must_use]
    pub fn master_index(&self, name: &str) -> Option<usize> {
        self.master_columns.iter().position(|column| column.name == name)
    }
}

/// Name of the items foreign key column.
pub const MASTER_ID_COLUMN: &str = "maestro_id";
/// Name of the server-assigned creation timestamp column.
pub const CREATED_AT_COLUMN: &str = "created_at";

/// Operational control checklist tables.
pub const CONTROL_OPERACIONAL_SCHEMA: FormSchema = FormSchema {
    kind: FormKind::ControlOperacional,
    master_table: "control_operacional_maestro",
    items_table: "control_operacional_items",
    master_columns: &[
        ColumnSpec::text("empresa").required(),
        ColumnSpec::text("obra"),
        ColumnSpec::text("nucleo"),
        ColumnSpec::date("fecha"),
        ColumnSpec::text("hora"),
        ColumnSpec::text("rut"),
        ColumnSpec::text("observaciones"),
        ColumnSpec::integer("total_correctos").required(),
        ColumnSpec::integer("total_incorrectos").required(),
        ColumnSpec::real("indice_co").required(),
    ],
    item_columns: &[
        ColumnSpec::text("item_principal"),
        ColumnSpec::text("item_secundario"),
        ColumnSpec::integer("correctos").required(),
        ColumnSpec::integer("incorrectos").required(),
        ColumnSpec::text("estado_correctos").required(),
        ColumnSpec::text("estado_incorrectos").required(),
    ],
    required_fields: &[],
    date_column: "fecha",
};

/// First-aid kit audit tables.
pub const BOTIQUIN_SCHEMA: FormSchema = FormSchema {
    kind: FormKind::Botiquin,
    master_table: "botiquin_maestro",
    items_table: "botiquin_items",
    master_columns: &[
        ColumnSpec::text("empresa").required(),
        ColumnSpec::text("responsable"),
        ColumnSpec::date("fecha").required(),
        ColumnSpec::text("observaciones"),
    ],
    item_columns: &[
        ColumnSpec::text("elemento"),
        ColumnSpec::text("mes"),
        ColumnSpec::text("estado"),
    ],
    required_fields: &["empresa", "fecha"],
    date_column: "fecha",
};

/// Accident report tables.
pub const ACCIDENTE_SCHEMA: FormSchema = FormSchema {
    kind: FormKind::Accidente,
    master_table: "accidente_maestro",
    items_table: "accidente_items",
    master_columns: &[
        ColumnSpec::text("empresa").required(),
        ColumnSpec::text("obra").required(),
        ColumnSpec::date("fecha_accidente").required(),
        ColumnSpec::text("hora").required(),
        ColumnSpec::date("fecha_investigacion"),
        ColumnSpec::text("rut").required(),
        ColumnSpec::text("observaciones"),
    ],
    item_columns: &[ColumnSpec::text("nombre_campo"), ColumnSpec::text("valor")],
    required_fields: &["empresa", "obra", "fecha_accidente", "hora", "rut"],
    date_column: "fecha_accidente",
};

/// NTP330 risk assessment tables.
pub const NTP330_SCHEMA: FormSchema = FormSchema {
    kind: FormKind::Ntp330,
    master_table: "ntp330_maestro",
    items_table: "ntp330_items",
    master_columns: &[
        ColumnSpec::text("empresa").required(),
        ColumnSpec::text("obra").required(),
        ColumnSpec::text("responsable").required(),
        ColumnSpec::date("fecha").required(),
        ColumnSpec::text("hora").required(),
        ColumnSpec::text("rut").required(),
        ColumnSpec::text("observaciones"),
    ],
    item_columns: &[ColumnSpec::text("nombre_campo"), ColumnSpec::text("valor")],
    required_fields: &["empresa", "obra", "responsable", "fecha", "hora", "rut"],
    date_column: "fecha",
};

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::FormKind;

    #[test]
    fn required_fields_and_date_column_are_master_columns() {
        for kind in FormKind::ALL {
            let schema = kind.schema();
            assert_eq!(schema.kind, kind);
            assert!(schema.master_index(schema.date_column).is_some(), "{kind}");
            for field in schema.required_fields {
                assert!(schema.master_index(field).is_some(), "{kind}: {field}");
            }
        }
    }

    #[test]
    fn accident_filters_on_accident_date() {
        assert_eq!(FormKind::Accidente.schema().date_column, "fecha_accidente");
        assert_eq!(FormKind::Ntp330.schema().date_column, "fecha");
    }
}
