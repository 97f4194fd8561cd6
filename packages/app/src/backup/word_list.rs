//! CSV word lists
//!
//! Columns: `source_text,phonetic,translation,category`. The category column
//! holds a category *name*; unknown names are created on import and a blank
//! one means the default category. Rows naming the `all` or `wrong` scope as
//! their category are skipped. Counters are not part of the format, so
//! imported words always start outside the wrong pool.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use wordcard_algo::sanitize::{clean_optional_text, clean_text};

use crate::backup::{BackupResult, ImportReport};
use crate::storage::category::is_reserved_name;
use crate::storage::{
    CategoryRepository, DatabaseManager, NewWord, WordRepository, DEFAULT_CATEGORY_ID,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvWordRow {
    #[serde(default)]
    pub source_text: String,
    #[serde(default)]
    pub phonetic: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub category: String,
}

/// Write every word as CSV; returns the number of rows written
pub fn export_csv<W: Write>(db: &DatabaseManager, writer: W) -> BackupResult<usize> {
    let names: HashMap<String, String> = db
        .categories()
        .list_categories()?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let words = db.words().list_words()?;

    let mut csv_writer = csv::Writer::from_writer(writer);
    for word in &words {
        csv_writer.serialize(CsvWordRow {
            source_text: word.source_text.clone(),
            phonetic: word.phonetic.clone().unwrap_or_default(),
            translation: word.translation.clone(),
            category: names.get(&word.category_id).cloned().unwrap_or_default(),
        })?;
    }
    csv_writer.flush()?;

    tracing::info!(rows = words.len(), "words exported to csv");
    Ok(words.len())
}

/// Append words from CSV
///
/// Rows without source text or translation are skipped, as are rows that
/// repeat a word already present in the same category. All inserts happen in
/// one transaction.
pub fn import_csv<R: Read>(db: &DatabaseManager, reader: R) -> BackupResult<ImportReport> {
    let mut report = ImportReport::default();
    let mut rows = Vec::new();

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    for (line, record) in csv_reader.deserialize::<CsvWordRow>().enumerate() {
        match record {
            Ok(row) => rows.push(row),
            Err(err) => {
                // header is line 1
                tracing::warn!(line = line + 2, error = %err, "skipping unreadable csv row");
                report.rows_skipped += 1;
            }
        }
    }

    let report = db.transaction(move |conn| {
        let mut category_ids: HashMap<String, String> = HashMap::new();
        let mut existing: HashSet<(String, String)> = WordRepository::list_words_internal(conn)?
            .into_iter()
            .map(|w| (w.category_id, w.source_text))
            .collect();

        for row in rows {
            let (Some(source_text), Some(translation)) =
                (clean_text(&row.source_text), clean_text(&row.translation))
            else {
                report.rows_skipped += 1;
                continue;
            };

            let category_name = clean_text(&row.category);
            if category_name.as_deref().is_some_and(is_reserved_name) {
                tracing::warn!(
                    category = %row.category,
                    "skipping row with a reserved category name"
                );
                report.rows_skipped += 1;
                continue;
            }

            let category_id = match category_name {
                None => DEFAULT_CATEGORY_ID.to_string(),
                Some(name) => match category_ids.get(&name) {
                    Some(id) => id.clone(),
                    None => {
                        let found = CategoryRepository::find_by_name_internal(conn, &name)?;
                        let id = match found {
                            Some(category) => category.id,
                            None => {
                                report.categories_created += 1;
                                CategoryRepository::create_category_internal(conn, &name)?.id
                            }
                        };
                        category_ids.insert(name, id.clone());
                        id
                    }
                },
            };

            if !existing.insert((category_id.clone(), source_text.clone())) {
                report.duplicates += 1;
                continue;
            }

            let mut word = NewWord::new(source_text, translation, category_id);
            word.phonetic = clean_optional_text(Some(row.phonetic.as_str()));
            WordRepository::add_word_internal(conn, word)?;
            report.words_imported += 1;
        }

        Ok(report)
    })?;

    tracing::info!(
        imported = report.words_imported,
        categories = report.categories_created,
        skipped = report.rows_skipped,
        duplicates = report.duplicates,
        "words imported from csv"
    );
    Ok(report)
}

pub fn export_csv_file(db: &DatabaseManager, path: impl AsRef<Path>) -> BackupResult<usize> {
    export_csv(db, File::create(path.as_ref())?)
}

pub fn import_csv_file(db: &DatabaseManager, path: impl AsRef<Path>) -> BackupResult<ImportReport> {
    import_csv(db, File::open(path.as_ref())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_creates_categories_and_skips_bad_rows() {
        let db = DatabaseManager::in_memory().unwrap();
        let data = "\
source_text,phonetic,translation,category
apple,/ˈæp.əl/,pomme,Fruit
pear,,poire,Fruit
,,orphan,Fruit
dog,,,Animals
table,,table,
";
        let report = import_csv(&db, data.as_bytes()).unwrap();
        assert_eq!(report.words_imported, 3);
        assert_eq!(report.categories_created, 1);
        assert_eq!(report.rows_skipped, 2);

        let fruit = db.categories().find_by_name("Fruit").unwrap().unwrap();
        assert_eq!(db.words().count_words_by_category(&fruit.id).unwrap(), 2);
        assert_eq!(db.words().count_words_by_category(DEFAULT_CATEGORY_ID).unwrap(), 1);
        assert!(db.categories().find_by_name("Animals").unwrap().is_none());

        let words = db.words().list_words().unwrap();
        assert_eq!(words[0].phonetic.as_deref(), Some("/ˈæp.əl/"));
        assert_eq!(words[1].phonetic, None);
    }

    #[test]
    fn test_reserved_category_rows_are_skipped() {
        let db = DatabaseManager::in_memory().unwrap();
        let data = "\
source_text,phonetic,translation,category
one,,un,all
two,,deux,wrong
three,,trois,Numbers
";
        let report = import_csv(&db, data.as_bytes()).unwrap();
        assert_eq!(report.words_imported, 1);
        assert_eq!(report.rows_skipped, 2);
        assert_eq!(report.categories_created, 1);
        assert!(db.categories().find_by_name("all").unwrap().is_none());
        assert!(db.categories().find_by_name("wrong").unwrap().is_none());
    }

    #[test]
    fn test_reimport_reports_duplicates() {
        let db = DatabaseManager::in_memory().unwrap();
        let data = "source_text,phonetic,translation,category\nsun,,soleil,Sky\nmoon,,lune,Sky\n";

        import_csv(&db, data.as_bytes()).unwrap();
        let again = import_csv(&db, data.as_bytes()).unwrap();
        assert_eq!(again.words_imported, 0);
        assert_eq!(again.duplicates, 2);
        assert_eq!(again.categories_created, 0);
        assert_eq!(db.words().list_words().unwrap().len(), 2);
    }

    #[test]
    fn test_export_then_import_into_empty_library() {
        let source = DatabaseManager::in_memory().unwrap();
        let colors = source.categories().create_category("Colors").unwrap();
        source
            .words()
            .add_word(NewWord::new("red", "rouge", &colors.id).with_phonetic("/rɛd/"))
            .unwrap();
        source
            .words()
            .add_word(NewWord::new("cat, small", "chaton", DEFAULT_CATEGORY_ID))
            .unwrap();

        let mut buffer = Vec::new();
        assert_eq!(export_csv(&source, &mut buffer).unwrap(), 2);
        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("source_text,phonetic,translation,category"));
        assert!(text.contains("\"cat, small\""));

        let target = DatabaseManager::in_memory().unwrap();
        let report = import_csv(&target, buffer.as_slice()).unwrap();
        assert_eq!(report.words_imported, 2);

        let words = target.words().list_words().unwrap();
        let red = words.iter().find(|w| w.source_text == "red").unwrap();
        assert_eq!(red.phonetic.as_deref(), Some("/rɛd/"));
        assert_ne!(red.category_id, DEFAULT_CATEGORY_ID);
        let cat = words.iter().find(|w| w.source_text == "cat, small").unwrap();
        assert_eq!(cat.category_id, DEFAULT_CATEGORY_ID);
    }
}
