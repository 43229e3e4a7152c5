//! Demographic reports: age buckets and sex splits.

use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

use super::{KpiResult, Reports};
use crate::models::{ChartSeries, Dataset, MultiSeries, Sex};

impl Reports<'_> {
    /// Test counts bucketed by client age.
    ///
    /// Age is the calendar-year difference only (month and day ignored).
    /// Buckets are zero-filled across the full observed age range; an empty
    /// store yields an empty series.
    pub fn tests_by_age(&self, today: NaiveDate) -> KpiResult<ChartSeries> {
        let mut stmt = self.db().conn().prepare(
            r#"
            SELECT ?1 - CAST(strftime('%Y', p.birth_date) AS INTEGER) AS age, COUNT(*)
            FROM lab_tests t
            JOIN persons p ON p.id = t.client_id
            WHERE p.role = 'cliente' AND p.birth_date IS NOT NULL
            GROUP BY age
            ORDER BY age
            "#,
        )?;
        let rows = stmt.query_map([today.year() as i64], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts: HashMap<i64, i64> = HashMap::new();
        for row in rows {
            let (age, n) = row?;
            counts.insert(age, n);
        }

        Ok(fill_age_range(&counts)
            .map(|ages| ChartSeries {
                labels: ages.iter().map(|a| a.to_string()).collect(),
                data: ages
                    .iter()
                    .map(|a| *counts.get(a).unwrap_or(&0) as f64)
                    .collect(),
            })
            .unwrap_or_default())
    }

    /// Test counts cross-tabulated by client age and test name.
    ///
    /// One dataset per observed name (alphabetical), each zero-filled
    /// across the full observed age range.
    pub fn tests_by_age_by_name(&self, today: NaiveDate) -> KpiResult<MultiSeries> {
        let mut stmt = self.db().conn().prepare(
            r#"
            SELECT ?1 - CAST(strftime('%Y', p.birth_date) AS INTEGER) AS age, t.name, COUNT(*)
            FROM lab_tests t
            JOIN persons p ON p.id = t.client_id
            WHERE p.role = 'cliente' AND p.birth_date IS NOT NULL
            GROUP BY age, t.name
            ORDER BY age, t.name
            "#,
        )?;
        let rows = stmt.query_map([today.year() as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut grid: HashMap<(i64, String), i64> = HashMap::new();
        let mut ages_seen: HashMap<i64, i64> = HashMap::new();
        let mut names: Vec<String> = Vec::new();
        for row in rows {
            let (age, name, n) = row?;
            ages_seen.insert(age, 0);
            if !names.contains(&name) {
                names.push(name.clone());
            }
            grid.insert((age, name), n);
        }
        names.sort();

        let Some(ages) = fill_age_range(&ages_seen) else {
            return Ok(MultiSeries::default());
        };

        let datasets = names
            .into_iter()
            .map(|name| Dataset {
                data: ages
                    .iter()
                    .map(|a| *grid.get(&(*a, name.clone())).unwrap_or(&0) as f64)
                    .collect(),
                label: name,
            })
            .collect();

        Ok(MultiSeries {
            labels: ages.iter().map(|a| a.to_string()).collect(),
            datasets,
        })
    }

    /// Tests grouped by the performing staff member's sex, fixed
    /// masculino/femenino slots, zero-filled.
    pub fn staff_sex_volume(&self) -> KpiResult<ChartSeries> {
        let mut stmt = self.db().conn().prepare(
            r#"
            SELECT p.sex, COUNT(*)
            FROM lab_tests t
            JOIN persons p ON p.id = t.staff_id
            WHERE p.role = 'personal'
            GROUP BY p.sex
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut masculine = 0.0;
        let mut feminine = 0.0;
        for row in rows {
            let (sex, n) = row?;
            match Sex::from_store(&sex) {
                Some(Sex::Masculine) => masculine = n as f64,
                Some(Sex::Feminine) => feminine = n as f64,
                None => {}
            }
        }

        Ok(ChartSeries {
            labels: vec![
                Sex::Masculine.as_str().to_string(),
                Sex::Feminine.as_str().to_string(),
            ],
            data: vec![masculine, feminine],
        })
    }

    /// Tests per client sex, observed labels only.
    pub fn client_sex_volume(&self) -> KpiResult<ChartSeries> {
        let mut stmt = self.db().conn().prepare(
            r#"
            SELECT p.sex, COUNT(*)
            FROM lab_tests t
            JOIN persons p ON p.id = t.client_id
            WHERE p.role = 'cliente'
            GROUP BY p.sex
            ORDER BY p.sex
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut pairs = Vec::new();
        for row in rows {
            let (sex, n) = row?;
            pairs.push((sex, n as f64));
        }
        Ok(ChartSeries::from_pairs(pairs))
    }
}

/// The full `min..=max` observed age range, or `None` when nothing was
/// observed.
fn fill_age_range(counts: &HashMap<i64, i64>) -> Option<Vec<i64>> {
    let min = *counts.keys().min()?;
    let max = *counts.keys().max()?;
    Some((min..=max).collect())
}
