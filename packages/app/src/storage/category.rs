//! Category repository

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use wordcard_algo::sanitize::clean_text;
use wordcard_algo::{Category, SCOPE_ALL, SCOPE_WRONG};

use crate::storage::models::{
    category_from_row, format_datetime, CATEGORY_COLUMNS, DEFAULT_CATEGORY_ID,
};
use crate::storage::{lock_connection, StorageError, StorageResult};

/// Category repository
///
/// Names are unique after trimming and never collide with the `all` and
/// `wrong` study scopes. The default category always exists and receives the
/// words of deleted categories.
pub struct CategoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CategoryRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        lock_connection(&self.conn)
    }

    pub fn get_category(&self, id: &str) -> StorageResult<Option<Category>> {
        let conn = self.get_conn()?;
        Self::get_category_internal(&conn, id)
    }

    pub fn find_by_name(&self, name: &str) -> StorageResult<Option<Category>> {
        let conn = self.get_conn()?;
        Self::find_by_name_internal(&conn, name)
    }

    /// Default category first, then by creation time
    pub fn list_categories(&self) -> StorageResult<Vec<Category>> {
        let conn = self.get_conn()?;
        Self::list_categories_internal(&conn)
    }

    pub fn create_category(&self, name: &str) -> StorageResult<Category> {
        let conn = self.get_conn()?;
        Self::create_category_internal(&conn, name)
    }

    pub fn rename_category(&self, id: &str, name: &str) -> StorageResult<Category> {
        let conn = self.get_conn()?;
        let mut category = Self::get_category_internal(&conn, id)?
            .ok_or_else(|| StorageError::NotFound(format!("category {id}")))?;
        let name = validate_name(name)?;

        if let Some(existing) = Self::find_by_name_internal(&conn, &name)? {
            if existing.id != category.id {
                return Err(StorageError::Conflict(format!(
                    "category name '{name}' already exists"
                )));
            }
        }

        conn.execute(
            "UPDATE category SET name = ?1 WHERE id = ?2",
            params![name, id],
        )?;
        category.name = name;
        Ok(category)
    }

    /// Delete a category, moving its words to the default category
    ///
    /// Returns the number of words moved.
    pub fn delete_category(&self, id: &str) -> StorageResult<usize> {
        if id == DEFAULT_CATEGORY_ID {
            return Err(StorageError::Validation(
                "the default category cannot be deleted".to_string(),
            ));
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        if Self::get_category_internal(&tx, id)?.is_none() {
            return Err(StorageError::NotFound(format!("category {id}")));
        }

        let moved = tx.execute(
            "UPDATE word SET category_id = ?1, updated_at = ?2 WHERE category_id = ?3",
            params![DEFAULT_CATEGORY_ID, format_datetime(Utc::now()), id],
        )?;
        tx.execute("DELETE FROM category WHERE id = ?1", params![id])?;
        tx.commit()?;

        tracing::info!(category_id = id, moved, "category deleted");
        Ok(moved)
    }

    // ============================================================
    // Internal
    // ============================================================

    pub fn get_category_internal(conn: &Connection, id: &str) -> StorageResult<Option<Category>> {
        let category = conn
            .query_row(
                &format!("SELECT {CATEGORY_COLUMNS} FROM category WHERE id = ?1"),
                params![id],
                category_from_row,
            )
            .optional()?;
        Ok(category)
    }

    pub fn find_by_name_internal(conn: &Connection, name: &str) -> StorageResult<Option<Category>> {
        let category = conn
            .query_row(
                &format!("SELECT {CATEGORY_COLUMNS} FROM category WHERE name = ?1"),
                params![name.trim()],
                category_from_row,
            )
            .optional()?;
        Ok(category)
    }

    pub fn list_categories_internal(conn: &Connection) -> StorageResult<Vec<Category>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category \
             ORDER BY is_default DESC, created_at ASC, rowid ASC"
        ))?;
        let categories = stmt
            .query_map([], category_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    pub fn create_category_internal(conn: &Connection, name: &str) -> StorageResult<Category> {
        let name = validate_name(name)?;
        if Self::find_by_name_internal(conn, &name)?.is_some() {
            return Err(StorageError::Conflict(format!(
                "category name '{name}' already exists"
            )));
        }

        let category = Category {
            id: Uuid::new_v4().to_string(),
            name,
            is_default: false,
            created_at: Utc::now(),
        };
        Self::insert_category_internal(conn, &category)?;

        tracing::debug!(category_id = %category.id, name = %category.name, "category created");
        Ok(category)
    }

    /// Insert a fully formed category as-is (restore path)
    pub fn insert_category_internal(conn: &Connection, category: &Category) -> StorageResult<()> {
        conn.execute(
            "INSERT INTO category (id, name, is_default, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                category.id,
                category.name,
                category.is_default as i32,
                format_datetime(category.created_at),
            ],
        )?;
        Ok(())
    }
}

/// Names that would read as a study scope instead of a category
pub fn is_reserved_name(name: &str) -> bool {
    let name = name.trim();
    name == SCOPE_ALL || name == SCOPE_WRONG
}

fn validate_name(name: &str) -> StorageResult<String> {
    let name = clean_text(name)
        .ok_or_else(|| StorageError::Validation("category name is empty".to_string()))?;
    if is_reserved_name(&name) {
        return Err(StorageError::Validation(format!(
            "'{name}' is reserved for a study scope"
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DatabaseManager, NewWord};

    #[test]
    fn test_create_and_list_categories() {
        let db = DatabaseManager::in_memory().unwrap();
        let repo = db.categories();

        let animals = repo.create_category(" Animals ").unwrap();
        let food = repo.create_category("Food").unwrap();
        assert_eq!(animals.name, "Animals");

        let names: Vec<String> = repo
            .list_categories()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Default", "Animals", "Food"]);
        assert_eq!(repo.find_by_name("Food").unwrap().map(|c| c.id), Some(food.id));
    }

    #[test]
    fn test_duplicate_name_conflicts() {
        let db = DatabaseManager::in_memory().unwrap();
        let repo = db.categories();

        repo.create_category("Verbs").unwrap();
        let err = repo.create_category("Verbs").unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        let err = repo.create_category("Default").unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        let err = repo.create_category("  ").unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
    }

    #[test]
    fn test_scope_names_are_reserved() {
        let db = DatabaseManager::in_memory().unwrap();
        let repo = db.categories();

        for name in ["all", " wrong "] {
            let err = repo.create_category(name).unwrap_err();
            assert!(matches!(err, StorageError::Validation(_)));
        }

        let verbs = repo.create_category("Verbs").unwrap();
        let err = repo.rename_category(&verbs.id, "wrong").unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));

        // only the exact scope strings are taken
        assert!(repo.create_category("All").is_ok());
        assert!(repo.create_category("wrong words").is_ok());
        assert!(!is_reserved_name("Wrong"));
    }

    #[test]
    fn test_rename_category() {
        let db = DatabaseManager::in_memory().unwrap();
        let repo = db.categories();

        let verbs = repo.create_category("Verbs").unwrap();
        repo.create_category("Nouns").unwrap();

        let renamed = repo.rename_category(&verbs.id, "Actions").unwrap();
        assert_eq!(renamed.name, "Actions");

        // renaming to its own name is fine, to another's is not
        assert!(repo.rename_category(&verbs.id, "Actions").is_ok());
        let err = repo.rename_category(&verbs.id, "Nouns").unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
    }

    #[test]
    fn test_delete_category_moves_words_to_default() {
        let db = DatabaseManager::in_memory().unwrap();
        let repo = db.categories();
        let words = db.words();

        let travel = repo.create_category("Travel").unwrap();
        words.add_word(NewWord::new("train", "電車", &travel.id)).unwrap();
        words.add_word(NewWord::new("ticket", "切符", &travel.id)).unwrap();

        let moved = repo.delete_category(&travel.id).unwrap();
        assert_eq!(moved, 2);
        assert!(repo.get_category(&travel.id).unwrap().is_none());
        assert_eq!(words.count_words_by_category(DEFAULT_CATEGORY_ID).unwrap(), 2);
    }

    #[test]
    fn test_default_category_is_protected() {
        let db = DatabaseManager::in_memory().unwrap();
        let err = db.categories().delete_category(DEFAULT_CATEGORY_ID).unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));

        let err = db.categories().delete_category("missing").unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
