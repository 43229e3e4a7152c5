//! Person file ingestion.
//!
//! Expected columns: `id` (ignored), `nombre`, `apellidos`, `gender`,
//! `fnac` (MM/DD/YYYY), `telefono`, `rol`, `especialidad` (ignored).

use chrono::NaiveDate;

use super::{ensure_csv_extension, CsvRow, CsvTable, IngestError, IngestResult};
use crate::db::Database;
use crate::models::{Person, Role, Sex};

/// Outcome of a person upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonLoadReport {
    pub inserted: usize,
}

/// Load a person CSV upload.
///
/// Every row is validated before anything is written; the rows then land as
/// one transactional batch, so a failing row means no person from the file
/// is persisted.
pub fn load_persons(
    db: &mut Database,
    filename: &str,
    bytes: &[u8],
) -> IngestResult<PersonLoadReport> {
    ensure_csv_extension(filename)?;
    let text = std::str::from_utf8(bytes).map_err(|_| IngestError::Encoding)?;
    let table = CsvTable::parse(text)?;

    let mut persons = Vec::with_capacity(table.len());
    for row in table.rows() {
        persons.push(parse_person_row(&row)?);
    }

    let inserted = db.insert_person_batch(&persons)?;
    log::info!("person upload {}: {} rows inserted", filename, inserted);
    Ok(PersonLoadReport { inserted })
}

fn parse_person_row(row: &CsvRow<'_>) -> IngestResult<Person> {
    // Any incoming id is dropped so the store assigns a fresh one.
    let name = row.get("nombre")?.to_string();
    let surname = row.get("apellidos")?.to_string();
    let sex = Sex::parse_lenient(row.get("gender")?);
    let birth_date = parse_upload_date(row.get("fnac")?, row.line())?;
    let phone = normalize_phone(row.get("telefono")?);

    let role_raw = row.get("rol")?;
    let role = Role::parse(role_raw).ok_or_else(|| IngestError::InvalidValue {
        line: row.line(),
        column: "rol",
        value: role_raw.to_string(),
    })?;

    // especialidad is discarded regardless of input.
    let _ = row.get("especialidad")?;

    Ok(Person::new(name, surname, sex, birth_date, phone, role))
}

/// Parse the fixed MM/DD/YYYY upload date format.
pub(crate) fn parse_upload_date(value: &str, line: usize) -> IngestResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%m/%d/%Y").map_err(|_| IngestError::MalformedDate {
        line,
        value: value.to_string(),
    })
}

/// Keep only digits, truncated to 8 characters.
pub(crate) fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).take(8).collect()
}
