//! Satisfaction and turnaround reports.

use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};

use super::{round2, to_percentages, KpiResult, Reports};
use crate::models::{ChartSeries, Sex};

/// Mean rating split by client sex.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RatingBySex {
    pub masculine: f64,
    pub feminine: f64,
}

impl Reports<'_> {
    /// Overall mean rating, rounded to 2 decimals. Exactly 0 when no tests
    /// exist — never an error.
    pub fn average_rating(&self) -> KpiResult<f64> {
        let avg: Option<f64> = self
            .db()
            .conn()
            .query_row("SELECT AVG(rating) FROM lab_tests", [], |row| row.get(0))
            .optional()?
            .flatten();
        Ok(avg.map(round2).unwrap_or(0.0))
    }

    /// Count per distinct rating value, ascending rating.
    pub fn rating_histogram(&self) -> KpiResult<ChartSeries> {
        let mut stmt = self.db().conn().prepare(
            "SELECT rating, COUNT(*) FROM lab_tests GROUP BY rating ORDER BY rating",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut pairs = Vec::new();
        for row in rows {
            let (rating, count) = row?;
            pairs.push((rating.to_string(), count as f64));
        }
        Ok(ChartSeries::from_pairs(pairs))
    }

    /// Mean rating per client sex, rounded to 2 decimals, 0 for a side with
    /// no data.
    pub fn average_rating_by_sex(&self) -> KpiResult<RatingBySex> {
        let mut stmt = self.db().conn().prepare(
            r#"
            SELECT p.sex, AVG(t.rating)
            FROM lab_tests t
            JOIN persons p ON p.id = t.client_id
            GROUP BY p.sex
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?;

        let mut split = RatingBySex {
            masculine: 0.0,
            feminine: 0.0,
        };
        for row in rows {
            let (sex, avg) = row?;
            match Sex::from_store(&sex) {
                Some(Sex::Masculine) => split.masculine = round2(avg),
                Some(Sex::Feminine) => split.feminine = round2(avg),
                None => {}
            }
        }
        Ok(split)
    }

    /// Mean rating per staff member, 0 for staff with no tests.
    pub fn average_rating_by_staff(&self) -> KpiResult<ChartSeries> {
        let mut stmt = self.db().conn().prepare(
            r#"
            SELECT p.name, p.surname, AVG(t.rating)
            FROM persons p
            LEFT JOIN lab_tests t ON t.staff_id = p.id
            WHERE p.role = 'personal'
            GROUP BY p.id
            ORDER BY p.id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<f64>>(2)?,
            ))
        })?;

        let mut pairs = Vec::new();
        for row in rows {
            let (name, surname, avg) = row?;
            pairs.push((full_name(&name, &surname), avg.map(round2).unwrap_or(0.0)));
        }
        Ok(ChartSeries::from_pairs(pairs))
    }

    /// Tests performed per staff member.
    pub fn staff_volume(&self) -> KpiResult<ChartSeries> {
        let pairs = self
            .staff_counts()?
            .into_iter()
            .map(|(label, n)| (label, n as f64))
            .collect();
        Ok(ChartSeries::from_pairs(pairs))
    }

    /// Each staff member's share of all staff-performed tests, as
    /// percentages. All zeros when no staff member has tests.
    pub fn staff_share(&self) -> KpiResult<ChartSeries> {
        Ok(to_percentages(self.staff_counts()?))
    }

    /// Mean turnaround per staff member, in whole days with the fraction
    /// discarded. 0 for staff with no tests.
    pub fn turnaround_by_staff(&self) -> KpiResult<ChartSeries> {
        let mut stmt = self.db().conn().prepare(
            r#"
            SELECT p.name, p.surname,
                   AVG(julianday(t.delivery_date) - julianday(t.requested_date))
            FROM persons p
            LEFT JOIN lab_tests t ON t.staff_id = p.id
            WHERE p.role = 'personal'
            GROUP BY p.id
            ORDER BY p.id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<f64>>(2)?,
            ))
        })?;

        let mut pairs = Vec::new();
        for row in rows {
            let (name, surname, avg) = row?;
            pairs.push((full_name(&name, &surname), avg.map(f64::trunc).unwrap_or(0.0)));
        }
        Ok(ChartSeries::from_pairs(pairs))
    }

    /// Mean turnaround per test name, whole days, name-ordered.
    pub fn turnaround_by_name(&self) -> KpiResult<ChartSeries> {
        let mut stmt = self.db().conn().prepare(
            r#"
            SELECT name, AVG(julianday(delivery_date) - julianday(requested_date))
            FROM lab_tests
            GROUP BY name
            ORDER BY name
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?;

        let mut pairs = Vec::new();
        for row in rows {
            let (name, avg) = row?;
            pairs.push((name, avg.trunc()));
        }
        Ok(ChartSeries::from_pairs(pairs))
    }

    fn staff_counts(&self) -> KpiResult<Vec<(String, i64)>> {
        let mut stmt = self.db().conn().prepare(
            r#"
            SELECT p.name, p.surname, COUNT(t.id)
            FROM persons p
            LEFT JOIN lab_tests t ON t.staff_id = p.id
            WHERE p.role = 'personal'
            GROUP BY p.id
            ORDER BY p.id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut counts = Vec::new();
        for row in rows {
            let (name, surname, n) = row?;
            counts.push((full_name(&name, &surname), n));
        }
        Ok(counts)
    }
}

fn full_name(name: &str, surname: &str) -> String {
    if surname.is_empty() {
        name.to_string()
    } else {
        format!("{} {}", name, surname)
    }
}
