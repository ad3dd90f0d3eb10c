/// Category database queries.
use anyhow::Result;
use rusqlite::Connection;

use crate::error;
use crate::types::{Category, CategoryId};

pub fn create_category(arg: Category, conn: &Connection) -> Result<CategoryId> {
    conn.execute(
        "INSERT INTO categories (name, created_at) VALUES (?1, ?2)",
        (&arg.name, arg.created_at.to_rfc3339()),
    )
    .map_err(error::from_sqlite)?;
    Ok(conn.last_insert_rowid() as CategoryId)
}

pub fn query_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT id, name, created_at FROM categories ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok(Category {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            created_at: super::parse_datetime(&row.get::<_, String>(2)?, 2)?,
        })
    })?;
    let mut categories = Vec::new();
    for row in rows {
        categories.push(row?);
    }
    Ok(categories)
}

pub fn query_category_by_name(name: &str, conn: &Connection) -> Result<Option<Category>> {
    let mut stmt = conn.prepare("SELECT id, name, created_at FROM categories WHERE name = ?1")?;
    let mut rows = stmt.query([name])?;
    if let Some(row) = rows.next()? {
        Ok(Some(Category {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            created_at: super::parse_datetime(&row.get::<_, String>(2)?, 2)?,
        }))
    } else {
        Ok(None)
    }
}

pub fn query_category_by_id(id: CategoryId, conn: &Connection) -> Result<Option<Category>> {
    let mut stmt = conn.prepare("SELECT id, name, created_at FROM categories WHERE id = ?1")?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        Ok(Some(Category {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            created_at: super::parse_datetime(&row.get::<_, String>(2)?, 2)?,
        }))
    } else {
        Ok(None)
    }
}

/// Fails with `IntegrityViolation` while any issue still references the
/// category.
pub fn delete_category(id: CategoryId, conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM categories WHERE id = ?1", [id])
        .map_err(error::from_sqlite)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Local;

    use super::*;
    use crate::db;
    use crate::error::Error;

    #[test]
    fn name_longer_than_fifty_chars_is_an_integrity_violation() {
        let conn = db::open_in_memory();
        let err = create_category(
            Category {
                id: None,
                name: "x".repeat(51),
                created_at: Local::now(),
            },
            &conn,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::IntegrityViolation(_))
        ));

        // Exactly at the cap is fine.
        create_category(
            Category {
                id: None,
                name: "x".repeat(50),
                created_at: Local::now(),
            },
            &conn,
        )
        .unwrap();
    }
}
