//! Person database operations.

use std::collections::HashSet;

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{Person, Role, Sex};

impl Database {
    /// Insert a person, returning the store-assigned id.
    ///
    /// A pre-set id (fabricated placeholders) is kept; otherwise the store
    /// assigns the next one.
    pub fn insert_person(&self, person: &Person) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO persons (
                id, name, surname, sex, birth_date, phone, role, specialty
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                person.id,
                person.name,
                person.surname,
                person.sex.as_str(),
                person.birth_date,
                person.phone,
                person.role.as_str(),
                person.specialty,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert a batch of persons in a single transaction.
    ///
    /// Either every row lands or none does: a failure on any row rolls the
    /// whole batch back, so no partial person set from one upload is ever
    /// visible.
    pub fn insert_person_batch(&mut self, persons: &[Person]) -> DbResult<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO persons (
                    id, name, surname, sex, birth_date, phone, role, specialty
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )?;
            for person in persons {
                stmt.execute(params![
                    person.id,
                    person.name,
                    person.surname,
                    person.sex.as_str(),
                    person.birth_date,
                    person.phone,
                    person.role.as_str(),
                    person.specialty,
                ])?;
            }
        }
        tx.commit()?;
        Ok(persons.len())
    }

    /// Get a person by id.
    pub fn get_person(&self, id: i64) -> DbResult<Option<Person>> {
        self.conn
            .query_row(
                r#"
                SELECT id, name, surname, sex, birth_date, phone, role, specialty
                FROM persons
                WHERE id = ?
                "#,
                [id],
                map_person_row,
            )
            .optional()?
            .map(Person::try_from)
            .transpose()
    }

    /// List all persons, id order.
    pub fn list_persons(&self) -> DbResult<Vec<Person>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, surname, sex, birth_date, phone, role, specialty
            FROM persons
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], map_person_row)?;

        let mut persons = Vec::new();
        for row in rows {
            persons.push(row?.try_into()?);
        }
        Ok(persons)
    }

    /// List persons holding a given role, id order.
    pub fn list_persons_by_role(&self, role: Role) -> DbResult<Vec<Person>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, surname, sex, birth_date, phone, role, specialty
            FROM persons
            WHERE role = ?
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([role.as_str()], map_person_row)?;

        let mut persons = Vec::new();
        for row in rows {
            persons.push(row?.try_into()?);
        }
        Ok(persons)
    }

    /// All person ids currently in the store. The bulk loader pre-loads this
    /// once per upload as its reference cache.
    pub fn person_id_set(&self) -> DbResult<HashSet<i64>> {
        let mut stmt = self.conn.prepare("SELECT id FROM persons")?;
        let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;
        rows.collect::<Result<HashSet<_>, _>>().map_err(Into::into)
    }

    /// Count persons in the store.
    pub fn count_persons(&self) -> DbResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM persons", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Insert a person inside an open transaction. Used by the test-upload path
/// to persist fabricated placeholders atomically with their tests.
pub(crate) fn insert_person_in_tx(
    tx: &rusqlite::Transaction<'_>,
    person: &Person,
) -> DbResult<()> {
    tx.execute(
        r#"
        INSERT INTO persons (
            id, name, surname, sex, birth_date, phone, role, specialty
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            person.id,
            person.name,
            person.surname,
            person.sex.as_str(),
            person.birth_date,
            person.phone,
            person.role.as_str(),
            person.specialty,
        ],
    )?;
    Ok(())
}

/// Intermediate row struct for database mapping.
struct PersonRow {
    id: i64,
    name: String,
    surname: String,
    sex: String,
    birth_date: Option<chrono::NaiveDate>,
    phone: String,
    role: String,
    specialty: Option<String>,
}

fn map_person_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PersonRow> {
    Ok(PersonRow {
        id: row.get(0)?,
        name: row.get(1)?,
        surname: row.get(2)?,
        sex: row.get(3)?,
        birth_date: row.get(4)?,
        phone: row.get(5)?,
        role: row.get(6)?,
        specialty: row.get(7)?,
    })
}

impl TryFrom<PersonRow> for Person {
    type Error = DbError;

    fn try_from(row: PersonRow) -> Result<Self, Self::Error> {
        let sex = Sex::from_store(&row.sex)
            .ok_or_else(|| DbError::Constraint(format!("Unknown sex value: {}", row.sex)))?;
        let role = Role::from_store(&row.role)
            .ok_or_else(|| DbError::Constraint(format!("Unknown role value: {}", row.role)))?;

        Ok(Person {
            id: Some(row.id),
            name: row.name,
            surname: row.surname,
            sex,
            birth_date: row.birth_date,
            phone: row.phone,
            role,
            specialty: row.specialty,
        })
    }
}
