//! Field allow-lists, the grouped-by-field report, and the ad-hoc gateway.
//!
//! Free-text field names from dashboard forms resolve through static enums;
//! only an allow-listed column name ever reaches a statement, and the
//! statement text is fixed per field. Nothing here builds SQL out of user
//! input.

use rusqlite::types::ValueRef;

use super::{KpiError, KpiResult, Reports};
use crate::models::ChartSeries;

/// Queryable attributes of the test entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestField {
    Id,
    Name,
    RequestedDate,
    DeliveryDate,
    Status,
    Observations,
    Rating,
    CategoryId,
    ClientId,
    StaffId,
}

impl TestField {
    /// Resolve a form-submitted field name. Accepts the attribute name and
    /// its upload-format alias; internal spaces are ignored, the way the
    /// dashboard form always treated them.
    pub fn resolve(input: &str) -> KpiResult<Self> {
        let cleaned: String = input.trim().to_lowercase().replace(' ', "");
        match cleaned.as_str() {
            "id" => Ok(TestField::Id),
            "name" | "nombre" => Ok(TestField::Name),
            "requested_date" | "fecha" => Ok(TestField::RequestedDate),
            "delivery_date" | "fecha_entrega" => Ok(TestField::DeliveryDate),
            "status" | "estado" => Ok(TestField::Status),
            "observations" | "observaciones" => Ok(TestField::Observations),
            "rating" | "calificacion" => Ok(TestField::Rating),
            "category_id" | "categoria_id" | "categoria" => Ok(TestField::CategoryId),
            "client_id" | "cliente_id" | "cliente" => Ok(TestField::ClientId),
            "staff_id" | "personal_id" | "personal" => Ok(TestField::StaffId),
            _ => Err(KpiError::UnknownField {
                entity: "test",
                name: input.trim().to_string(),
            }),
        }
    }

    /// The store column this field maps to.
    pub fn column(&self) -> &'static str {
        match self {
            TestField::Id => "id",
            TestField::Name => "name",
            TestField::RequestedDate => "requested_date",
            TestField::DeliveryDate => "delivery_date",
            TestField::Status => "status",
            TestField::Observations => "observations",
            TestField::Rating => "rating",
            TestField::CategoryId => "category_id",
            TestField::ClientId => "client_id",
            TestField::StaffId => "staff_id",
        }
    }
}

/// Queryable attributes of the person entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonField {
    Id,
    Name,
    Surname,
    Sex,
    BirthDate,
    Phone,
    Role,
    Specialty,
}

impl PersonField {
    /// Resolve a query-parameter field name, same aliasing rules as
    /// [`TestField::resolve`].
    pub fn resolve(input: &str) -> KpiResult<Self> {
        let cleaned: String = input.trim().to_lowercase().replace(' ', "");
        match cleaned.as_str() {
            "id" => Ok(PersonField::Id),
            "name" | "nombre" => Ok(PersonField::Name),
            "surname" | "apellidos" => Ok(PersonField::Surname),
            "sex" | "sexo" => Ok(PersonField::Sex),
            "birth_date" | "fnac" => Ok(PersonField::BirthDate),
            "phone" | "telefono" => Ok(PersonField::Phone),
            "role" | "rol" => Ok(PersonField::Role),
            "specialty" | "especialidad" => Ok(PersonField::Specialty),
            _ => Err(KpiError::UnknownField {
                entity: "person",
                name: input.trim().to_string(),
            }),
        }
    }

    /// The store column this field maps to.
    pub fn column(&self) -> &'static str {
        match self {
            PersonField::Id => "id",
            PersonField::Name => "name",
            PersonField::Surname => "surname",
            PersonField::Sex => "sex",
            PersonField::BirthDate => "birth_date",
            PersonField::Phone => "phone",
            PersonField::Role => "role",
            PersonField::Specialty => "specialty",
        }
    }

    /// Whether an average over this field is meaningful.
    pub fn is_numeric(&self) -> bool {
        matches!(self, PersonField::Id)
    }
}

/// Ad-hoc gateway aggregate operation.
///
/// `Sum` keeps its historical name but counts grouped rows; it has never
/// computed a numeric sum and the dashboards depend on the counting
/// behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggOp {
    Sum,
    Avg,
}

impl AggOp {
    /// Resolve the `operation` query parameter against the allow-list.
    pub fn resolve(input: &str) -> KpiResult<Self> {
        match input {
            "sum" => Ok(AggOp::Sum),
            "avg" => Ok(AggOp::Avg),
            other => Err(KpiError::InvalidOperation(other.to_string())),
        }
    }
}

/// Sort direction for the ad-hoc gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// `asc` sorts ascending; anything else descends, matching the original
    /// form contract.
    pub fn parse_lenient(input: &str) -> Self {
        if input == "asc" {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }

    fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl Reports<'_> {
    /// Group tests by an allow-listed field and count occurrences per
    /// distinct value, value-ordered.
    pub fn tests_grouped_by_field(&self, field: TestField) -> KpiResult<ChartSeries> {
        let col = field.column();
        let sql = format!(
            "SELECT {col}, COUNT({col}) FROM lab_tests GROUP BY {col} ORDER BY {col}"
        );
        self.grouped_counts(&sql)
    }

    /// Ad-hoc gateway: group persons by an allow-listed field and aggregate.
    ///
    /// `sum` counts grouped rows; `avg` averages the field and is only
    /// accepted for numeric fields. Results sort by the aggregate.
    pub fn adhoc_person_query(
        &self,
        field: PersonField,
        op: AggOp,
        order: SortOrder,
    ) -> KpiResult<ChartSeries> {
        if op == AggOp::Avg && !field.is_numeric() {
            return Err(KpiError::NonNumericField(field.column().to_string()));
        }

        let col = field.column();
        let agg = match op {
            AggOp::Sum => format!("COUNT({col})"),
            AggOp::Avg => format!("AVG({col})"),
        };
        let sql = format!(
            "SELECT {col}, {agg} AS total FROM persons GROUP BY {col} ORDER BY total {}",
            order.sql()
        );
        self.grouped_counts(&sql)
    }

    fn grouped_counts(&self, sql: &str) -> KpiResult<ChartSeries> {
        let mut stmt = self.db().conn().prepare(sql)?;
        let ncols = stmt.column_count();
        debug_assert_eq!(ncols, 2);

        let mut pairs = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let label = label_from_value(row.get_ref(0)?);
            let value = match row.get_ref(1)? {
                ValueRef::Integer(i) => i as f64,
                ValueRef::Real(f) => f,
                _ => 0.0,
            };
            pairs.push((label, value));
        }
        Ok(ChartSeries::from_pairs(pairs))
    }
}

/// Render a grouped value as a chart label.
fn label_from_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(_) => String::new(),
    }
}
