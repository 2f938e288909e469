//! Relational backend over an existing SQLite database file.

use super::{
    lookup_category, resolve_category, CategoryLoader, DataAccessError, ItemLoader,
    LoaderContext, RowWarning,
};
use crate::inventory::{CategoryMap, Item};
use chrono::NaiveDate;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, Row};
use std::path::{Path, PathBuf};

pub const KEY: &str = "SQLite";

/// Tables the loaders read from.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS category (
    id             INTEGER PRIMARY KEY,
    name           TEXT NOT NULL,
    implementation TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS item (
    id          INTEGER PRIMARY KEY,
    name        TEXT NOT NULL,
    category_id INTEGER,
    quality     INTEGER,
    base_price  REAL,
    due_date    TEXT,
    day         TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS item_day ON item(day);
";

const DATE_FORMAT: &str = "%Y-%m-%d";

const CATEGORY_QUERY: &str = "SELECT name, implementation FROM category ORDER BY id";

const ITEM_QUERY: &str = "
SELECT IFNULL(c.name, '') AS category, i.name, i.quality, i.base_price, i.due_date
FROM item i
LEFT JOIN category c ON c.id = i.category_id
WHERE i.day = ?1
ORDER BY i.id";

pub struct SqliteCategoryLoader {
    path: PathBuf,
    context: LoaderContext,
}

impl SqliteCategoryLoader {
    pub fn new(path: impl Into<PathBuf>, context: LoaderContext) -> Self {
        Self {
            path: path.into(),
            context,
        }
    }
}

impl CategoryLoader for SqliteCategoryLoader {
    fn fetch_categories(&self) -> Result<CategoryMap, DataAccessError> {
        let resource = self.path.display().to_string();
        let conn = open(&self.path)?;
        let access = |err: rusqlite::Error| DataAccessError::new(resource.as_str(), err);

        let mut stmt = conn.prepare(CATEGORY_QUERY).map_err(access)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                ))
            })
            .map_err(access)?;

        let mut categories = CategoryMap::new();
        let mut total = 0usize;
        for row in rows {
            let (name, implementation) = row.map_err(access)?;
            total += 1;
            if let Some(category) = resolve_category(&name, &implementation, &self.context) {
                categories.insert(category);
            }
        }

        tracing::debug!(
            resource = %resource,
            rows = total,
            accepted = categories.len(),
            "loaded categories"
        );
        Ok(categories)
    }
}

pub struct SqliteItemLoader {
    path: PathBuf,
    context: LoaderContext,
}

impl SqliteItemLoader {
    pub fn new(path: impl Into<PathBuf>, context: LoaderContext) -> Self {
        Self {
            path: path.into(),
            context,
        }
    }
}

/// One `item` row before validation.
struct ItemRow {
    category: String,
    name: String,
    quality: Option<i32>,
    base_price: Option<f64>,
    due_date: String,
    line: String,
}

impl ItemRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let line = (0..5)
            .map(|idx| row.get_ref(idx).map(render))
            .collect::<rusqlite::Result<Vec<_>>>()?
            .join(";");

        Ok(Self {
            category: row.get(0)?,
            name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            quality: row.get(2).ok(),
            base_price: row.get(3).ok(),
            due_date: row.get::<_, Option<String>>(4).ok().flatten().unwrap_or_default(),
            line,
        })
    }
}

fn render(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(v) => v.to_string(),
        ValueRef::Real(v) => v.to_string(),
        ValueRef::Text(v) | ValueRef::Blob(v) => String::from_utf8_lossy(v).into_owned(),
    }
}

impl ItemLoader for SqliteItemLoader {
    fn fetch_items(
        &self,
        start: NaiveDate,
        categories: &CategoryMap,
    ) -> Result<Vec<Item>, DataAccessError> {
        let resource = self.path.display().to_string();
        let conn = open(&self.path)?;
        let access = |err: rusqlite::Error| DataAccessError::new(resource.as_str(), err);
        let reporter = self.context.reporter();

        let mut stmt = conn.prepare(ITEM_QUERY).map_err(access)?;
        let rows = stmt
            .query_map(params![start.format(DATE_FORMAT).to_string()], ItemRow::from_row)
            .map_err(access)?;

        let mut items = Vec::new();
        let mut total = 0usize;
        for row in rows {
            let row = row.map_err(access)?;
            total += 1;

            let Some(category) = lookup_category(categories, &row.category, &row.line, reporter)
            else {
                continue;
            };

            let (Some(quality), Some(base_price)) = (
                row.quality,
                row.base_price.filter(|p| p.is_finite() && *p >= 0.0),
            ) else {
                tracing::debug!(line = %row.line, "invalid number in item row");
                reporter.warning(&RowWarning::InvalidNumber { line: row.line });
                continue;
            };

            let Ok(due_date) = NaiveDate::parse_from_str(row.due_date.trim(), DATE_FORMAT) else {
                tracing::debug!(line = %row.line, "invalid date in item row");
                reporter.warning(&RowWarning::InvalidDate { line: row.line });
                continue;
            };

            items.push(Item::new(
                category, row.name, quality, base_price, due_date, start,
            ));
        }

        tracing::debug!(
            resource = %resource,
            %start,
            rows = total,
            accepted = items.len(),
            "loaded items"
        );
        Ok(items)
    }
}

fn open(path: &Path) -> Result<Connection, DataAccessError> {
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|err| DataAccessError::new(path.display().to_string(), err))
}

pub(crate) fn category_loader(payload: &str, context: &LoaderContext) -> Box<dyn CategoryLoader> {
    Box::new(SqliteCategoryLoader::new(payload, context.clone()))
}

pub(crate) fn item_loader(payload: &str, context: &LoaderContext) -> Box<dyn ItemLoader> {
    Box::new(SqliteItemLoader::new(payload, context.clone()))
}
