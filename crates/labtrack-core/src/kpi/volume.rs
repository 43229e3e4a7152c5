//! Test volume reports: time-bucketed counts, shares, and rankings.

use chrono::{Datelike, Duration, NaiveDate};
use rusqlite::params;
use std::collections::HashMap;

use super::{to_percentages, KpiResult, Reports, MONTH_LABELS};
use crate::models::{ChartSeries, Dataset, MultiSeries};

impl Reports<'_> {
    /// Tests per month of the reference year. Always 12 entries, fixed
    /// month-name labels, zero where no tests exist.
    pub fn monthly_volume(&self, today: NaiveDate) -> KpiResult<ChartSeries> {
        let year = format!("{:04}", today.year());
        let mut stmt = self.db().conn().prepare(
            r#"
            SELECT CAST(strftime('%m', requested_date) AS INTEGER) AS month, COUNT(*)
            FROM lab_tests
            WHERE strftime('%Y', requested_date) = ?1
            GROUP BY month
            "#,
        )?;
        let rows = stmt.query_map([&year], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut data = vec![0.0; 12];
        for row in rows {
            let (month, count) = row?;
            if (1..=12).contains(&month) {
                data[(month - 1) as usize] = count as f64;
            }
        }

        Ok(ChartSeries {
            labels: MONTH_LABELS.iter().map(|m| m.to_string()).collect(),
            data,
        })
    }

    /// Tests per calendar day over the trailing week, `[today-6, today]`
    /// inclusive. Always 7 entries, ISO date labels, zero-filled.
    pub fn weekly_volume(&self, today: NaiveDate) -> KpiResult<ChartSeries> {
        let days = trailing_week(today);
        let counts = self.daily_counts(days[0], today)?;

        Ok(ChartSeries {
            labels: days.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect(),
            data: days
                .iter()
                .map(|d| *counts.get(d).unwrap_or(&0) as f64)
                .collect(),
        })
    }

    /// Trailing-week volume split by test name.
    ///
    /// One dataset per distinct name observed anywhere in the store, not
    /// just in the window, each zero-filled across the 7 days.
    pub fn weekly_volume_by_name(&self, today: NaiveDate) -> KpiResult<MultiSeries> {
        let days = trailing_week(today);
        let names = self.db().list_test_names()?;

        let mut stmt = self.db().conn().prepare(
            r#"
            SELECT requested_date, name, COUNT(*)
            FROM lab_tests
            WHERE requested_date >= ?1 AND requested_date <= ?2
            GROUP BY requested_date, name
            "#,
        )?;
        let rows = stmt.query_map(params![days[0], today], |row| {
            Ok((
                row.get::<_, NaiveDate>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut grid: HashMap<(NaiveDate, String), i64> = HashMap::new();
        for row in rows {
            let (day, name, count) = row?;
            grid.insert((day, name), count);
        }

        let datasets = names
            .into_iter()
            .map(|name| Dataset {
                data: days
                    .iter()
                    .map(|d| *grid.get(&(*d, name.clone())).unwrap_or(&0) as f64)
                    .collect(),
                label: name,
            })
            .collect();

        Ok(MultiSeries {
            labels: days.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect(),
            datasets,
        })
    }

    /// Share of total volume per test name, as percentages. All zeros when
    /// the store holds no tests.
    pub fn share_by_name(&self) -> KpiResult<ChartSeries> {
        Ok(to_percentages(self.counts_by_name()?))
    }

    /// Tests per category name, most requested first.
    pub fn category_volume(&self) -> KpiResult<ChartSeries> {
        let mut stmt = self.db().conn().prepare(
            r#"
            SELECT c.name, COUNT(*) AS n
            FROM lab_tests t
            JOIN categories c ON c.id = t.category_id
            GROUP BY c.name
            ORDER BY n DESC, c.name
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut pairs = Vec::new();
        for row in rows {
            let (name, count) = row?;
            pairs.push((name, count as f64));
        }
        Ok(ChartSeries::from_pairs(pairs))
    }

    /// The `n` most requested test names by volume. Ties break on the
    /// store's stable ordering (lowest first-seen id).
    pub fn top_requested(&self, n: usize) -> KpiResult<ChartSeries> {
        self.ranked_by_volume(n, true)
    }

    /// The `n` least requested test names by volume, same tie-break.
    pub fn least_requested(&self, n: usize) -> KpiResult<ChartSeries> {
        self.ranked_by_volume(n, false)
    }

    fn ranked_by_volume(&self, n: usize, descending: bool) -> KpiResult<ChartSeries> {
        let sql = if descending {
            "SELECT name, COUNT(*) AS n FROM lab_tests GROUP BY name ORDER BY n DESC, MIN(id) LIMIT ?1"
        } else {
            "SELECT name, COUNT(*) AS n FROM lab_tests GROUP BY name ORDER BY n ASC, MIN(id) LIMIT ?1"
        };
        let mut stmt = self.db().conn().prepare(sql)?;
        let rows = stmt.query_map([n as i64], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut pairs = Vec::new();
        for row in rows {
            let (name, count) = row?;
            pairs.push((name, count as f64));
        }
        Ok(ChartSeries::from_pairs(pairs))
    }

    /// Counts per test name in first-seen order.
    pub(crate) fn counts_by_name(&self) -> KpiResult<Vec<(String, i64)>> {
        let mut stmt = self.db().conn().prepare(
            "SELECT name, COUNT(*) FROM lab_tests GROUP BY name ORDER BY MIN(id)",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        let mut pairs = Vec::new();
        for row in rows {
            pairs.push(row?);
        }
        Ok(pairs)
    }

    fn daily_counts(&self, from: NaiveDate, to: NaiveDate) -> KpiResult<HashMap<NaiveDate, i64>> {
        let mut stmt = self.db().conn().prepare(
            r#"
            SELECT requested_date, COUNT(*)
            FROM lab_tests
            WHERE requested_date >= ?1 AND requested_date <= ?2
            GROUP BY requested_date
            "#,
        )?;
        let rows = stmt.query_map(params![from, to], |row| {
            Ok((row.get::<_, NaiveDate>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = HashMap::new();
        for row in rows {
            let (day, count) = row?;
            counts.insert(day, count);
        }
        Ok(counts)
    }
}

/// The 7 calendar days ending at `today`, oldest first.
fn trailing_week(today: NaiveDate) -> Vec<NaiveDate> {
    (0..7).map(|i| today - Duration::days(6 - i)).collect()
}
