//! Person records: clients and staff.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Sex as stored on a person record.
///
/// Exactly two canonical values exist in the store. Unrecognized input
/// normalizes to `Masculine` — long-standing upstream behavior, kept as-is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Sex {
    Masculine,
    Feminine,
}

impl Sex {
    /// Canonical store spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Masculine => "masculino",
            Sex::Feminine => "femenino",
        }
    }

    /// Parse the canonical store spelling.
    pub fn from_store(s: &str) -> Option<Self> {
        match s {
            "masculino" => Some(Sex::Masculine),
            "femenino" => Some(Sex::Feminine),
            _ => None,
        }
    }

    /// Normalize arbitrary upload input to a canonical value.
    ///
    /// `male`/`masculino` and `female`/`femenino` map to their canonical
    /// value; anything else defaults to masculine.
    pub fn parse_lenient(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "female" | "femenino" => Sex::Feminine,
            _ => Sex::Masculine,
        }
    }
}

/// Whether a person participates on tests as the client or as staff.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    Client,
    Staff,
}

impl Role {
    /// Canonical store spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "cliente",
            Role::Staff => "personal",
        }
    }

    /// Parse the canonical store spelling.
    pub fn from_store(s: &str) -> Option<Self> {
        match s {
            "cliente" => Some(Role::Client),
            "personal" => Some(Role::Staff),
            _ => None,
        }
    }

    /// Parse upload input. Accepts the canonical spellings and their
    /// English equivalents, case-insensitively.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "cliente" | "client" => Some(Role::Client),
            "personal" | "staff" => Some(Role::Staff),
            _ => None,
        }
    }
}

/// A client or staff individual recorded in the system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Person {
    /// Store-assigned id; `None` until inserted
    pub id: Option<i64>,
    pub name: String,
    pub surname: String,
    pub sex: Sex,
    /// Absent on fabricated placeholders
    pub birth_date: Option<NaiveDate>,
    /// Digits only, at most 8
    pub phone: String,
    pub role: Role,
    pub specialty: Option<String>,
}

impl Person {
    /// Create a new person with the fields the registration and upload
    /// paths provide. Specialty is never populated by either path.
    pub fn new(
        name: String,
        surname: String,
        sex: Sex,
        birth_date: NaiveDate,
        phone: String,
        role: Role,
    ) -> Self {
        Self {
            id: None,
            name,
            surname,
            sex,
            birth_date: Some(birth_date),
            phone,
            role,
            specialty: None,
        }
    }

    /// Create a placeholder for a test row referencing an unknown person id.
    ///
    /// The id is caller-chosen from a range disjoint from normal
    /// store-assigned ids, but nothing prevents a later real record from
    /// landing on it — a known limitation of the fabricate policy.
    pub fn placeholder(id: i64, role: Role) -> Self {
        let prefix = match role {
            Role::Client => "Cliente",
            Role::Staff => "Personal",
        };
        Self {
            id: Some(id),
            name: format!("{}-{}", prefix, id),
            surname: String::new(),
            sex: Sex::Masculine,
            birth_date: None,
            phone: String::new(),
            role,
            specialty: None,
        }
    }

    /// Age in whole years counting calendar years only. Month and day are
    /// ignored on purpose: reporting buckets use the same approximation.
    pub fn age_years(&self, today: NaiveDate) -> Option<i32> {
        self.birth_date.map(|b| today.year() - b.year())
    }
}
