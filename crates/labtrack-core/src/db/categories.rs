//! Category database operations.

use std::collections::HashSet;

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::Category;

impl Database {
    /// Insert a category, returning the store-assigned id.
    pub fn insert_category(&self, category: &Category) -> DbResult<i64> {
        self.conn.execute(
            "INSERT INTO categories (id, name) VALUES (?1, ?2)",
            params![category.id, category.name],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get a category by id.
    pub fn get_category(&self, id: i64) -> DbResult<Option<Category>> {
        self.conn
            .query_row(
                "SELECT id, name FROM categories WHERE id = ?",
                [id],
                |row| {
                    Ok(Category {
                        id: Some(row.get(0)?),
                        name: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all categories, name order.
    pub fn list_categories(&self) -> DbResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM categories ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: Some(row.get(0)?),
                name: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// All category ids currently in the store, pre-loaded once per upload
    /// by the bulk loader.
    pub fn category_id_set(&self) -> DbResult<HashSet<i64>> {
        let mut stmt = self.conn.prepare("SELECT id FROM categories")?;
        let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;
        rows.collect::<Result<HashSet<_>, _>>().map_err(Into::into)
    }
}
