//! Semicolon separated sources: a file on disk or the standard input.
//!
//! The first line is a header and always skipped. Category rows are
//! `name;implementation`, item rows `category;name;quality;basePrice;dueDate`.

use super::{
    lookup_category, resolve_category, CategoryLoader, DataAccessError, Dataset, ItemLoader,
    LoaderContext, RowWarning,
};
use crate::inventory::{CategoryMap, Item};
use crate::view::Reporter;
use chrono::NaiveDate;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

pub const FILE_KEY: &str = "CSVFile";
pub const PIPE_KEY: &str = "CSVPipeInput";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Where the rows come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvSource {
    File(PathBuf),
    Stdin,
}

impl CsvSource {
    pub fn label(&self) -> String {
        match self {
            CsvSource::File(path) => path.display().to_string(),
            CsvSource::Stdin => "standard input".to_string(),
        }
    }

    fn open(&self) -> Result<Box<dyn Read>, DataAccessError> {
        match self {
            CsvSource::File(path) => {
                let file = File::open(path).map_err(|err| DataAccessError::new(self.label(), err))?;
                Ok(Box::new(BufReader::new(file)))
            }
            CsvSource::Stdin => Ok(Box::new(std::io::stdin().lock())),
        }
    }
}

pub struct CsvCategoryLoader {
    source: CsvSource,
    context: LoaderContext,
}

impl CsvCategoryLoader {
    pub fn new(source: CsvSource, context: LoaderContext) -> Self {
        Self { source, context }
    }

    pub fn source(&self) -> &CsvSource {
        &self.source
    }

    /// Reads from `reader` in place of opening the configured source.
    pub fn fetch_from<R: Read>(&self, reader: R) -> Result<CategoryMap, DataAccessError> {
        read_categories(reader, &self.source.label(), &self.context)
    }
}

impl CategoryLoader for CsvCategoryLoader {
    fn fetch_categories(&self) -> Result<CategoryMap, DataAccessError> {
        self.fetch_from(self.source.open()?)
    }
}

pub struct CsvItemLoader {
    source: CsvSource,
    context: LoaderContext,
}

impl CsvItemLoader {
    pub fn new(source: CsvSource, context: LoaderContext) -> Self {
        Self { source, context }
    }

    pub fn source(&self) -> &CsvSource {
        &self.source
    }

    /// Reads from `reader` in place of opening the configured source.
    pub fn fetch_from<R: Read>(
        &self,
        reader: R,
        start: NaiveDate,
        categories: &CategoryMap,
    ) -> Result<Vec<Item>, DataAccessError> {
        read_items(
            reader,
            &self.source.label(),
            start,
            categories,
            self.context.reporter(),
        )
    }
}

impl ItemLoader for CsvItemLoader {
    fn fetch_items(
        &self,
        start: NaiveDate,
        categories: &CategoryMap,
    ) -> Result<Vec<Item>, DataAccessError> {
        self.fetch_from(self.source.open()?, start, categories)
    }
}

pub(crate) fn file_category_loader(
    payload: &str,
    context: &LoaderContext,
) -> Box<dyn CategoryLoader> {
    Box::new(CsvCategoryLoader::new(
        CsvSource::File(PathBuf::from(payload)),
        context.clone(),
    ))
}

// The payload of the pipe sources is ignored.
pub(crate) fn pipe_category_loader(
    _payload: &str,
    context: &LoaderContext,
) -> Box<dyn CategoryLoader> {
    Box::new(stdin_category_loader(context))
}

fn stdin_category_loader(context: &LoaderContext) -> CsvCategoryLoader {
    CsvCategoryLoader::new(CsvSource::Stdin, context.clone())
}

pub(crate) fn file_item_loader(payload: &str, context: &LoaderContext) -> Box<dyn ItemLoader> {
    Box::new(CsvItemLoader::new(
        CsvSource::File(PathBuf::from(payload)),
        context.clone(),
    ))
}

pub(crate) fn pipe_item_loader(_payload: &str, context: &LoaderContext) -> Box<dyn ItemLoader> {
    Box::new(stdin_item_loader(context))
}

fn stdin_item_loader(context: &LoaderContext) -> CsvItemLoader {
    CsvItemLoader::new(CsvSource::Stdin, context.clone())
}

/// Reads category rows, resolving each implementation key through the rule
/// registry of `context`.
pub fn read_categories<R: Read>(
    reader: R,
    resource: &str,
    context: &LoaderContext,
) -> Result<CategoryMap, DataAccessError> {
    let rows = read_rows(reader, resource)?;
    let total = rows.len();
    let mut categories = CategoryMap::new();

    for fields in rows {
        let [name, implementation] = fields.as_slice() else {
            report_field_count(Dataset::Categories, &fields, context.reporter());
            continue;
        };

        if let Some(category) = resolve_category(name, implementation, context) {
            if categories.insert(category).is_some() {
                tracing::warn!(category = %name, resource, "duplicate category row replaces an earlier one");
            }
        }
    }

    tracing::debug!(
        resource,
        rows = total,
        accepted = categories.len(),
        "loaded categories"
    );
    Ok(categories)
}

/// Reads item rows, each joining the simulation on `start`.
pub fn read_items<R: Read>(
    reader: R,
    resource: &str,
    start: NaiveDate,
    categories: &CategoryMap,
    reporter: &dyn Reporter,
) -> Result<Vec<Item>, DataAccessError> {
    let rows = read_rows(reader, resource)?;
    let total = rows.len();

    let items: Vec<Item> = rows
        .iter()
        .filter_map(|fields| item_from_fields(fields, start, categories, reporter))
        .collect();

    tracing::debug!(
        resource,
        rows = total,
        accepted = items.len(),
        "loaded items"
    );
    Ok(items)
}

fn item_from_fields(
    fields: &[String],
    start: NaiveDate,
    categories: &CategoryMap,
    reporter: &dyn Reporter,
) -> Option<Item> {
    let [category, name, quality, base_price, due_date] = fields else {
        report_field_count(Dataset::Items, fields, reporter);
        return None;
    };

    let line = fields.join(";");
    let category = lookup_category(categories, category, &line, reporter)?;

    let (Some(quality), Some(base_price)) = (parse_quality(quality), parse_base_price(base_price))
    else {
        tracing::debug!(%line, "invalid number in item row");
        reporter.warning(&RowWarning::InvalidNumber { line });
        return None;
    };

    let Ok(due_date) = NaiveDate::parse_from_str(due_date.trim(), DATE_FORMAT) else {
        tracing::debug!(%line, "invalid date in item row");
        reporter.warning(&RowWarning::InvalidDate { line });
        return None;
    };

    Some(Item::new(
        category,
        name.as_str(),
        quality,
        base_price,
        due_date,
        start,
    ))
}

fn parse_quality(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}

fn parse_base_price(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price >= 0.0)
}

fn report_field_count(dataset: Dataset, fields: &[String], reporter: &dyn Reporter) {
    let line = fields.join(";");
    tracing::debug!(%dataset, %line, "wrong field count");
    reporter.warning(&RowWarning::FieldCount {
        dataset,
        expected: dataset.field_count(),
        actual: fields.len(),
        line,
    });
}

/// Data rows in input order, header excluded. Blank lines are kept as a
/// single empty field so they are reported like any short row.
fn read_rows<R: Read>(mut reader: R, resource: &str) -> Result<Vec<Vec<String>>, DataAccessError> {
    let mut input = Vec::new();
    reader
        .read_to_end(&mut input)
        .map_err(|err| DataAccessError::new(resource, err))?;

    // csv drops empty lines, so they are set aside here and put back in place.
    let mut blank = Vec::new();
    let mut data = Vec::with_capacity(input.len());
    for line in lines(&input).skip(HEADER_LINES) {
        blank.push(line.is_empty());
        if !line.is_empty() {
            data.extend_from_slice(line);
            data.push(b'\n');
        }
    }

    let mut records = csv::ReaderBuilder::new()
        .delimiter(b';')
        .terminator(csv::Terminator::Any(b'\n'))
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(data.as_slice())
        .into_records();

    let mut rows = Vec::with_capacity(blank.len());
    for is_blank in blank {
        if is_blank {
            rows.push(vec![String::new()]);
        } else if let Some(record) = records.next() {
            let record = record.map_err(|err| DataAccessError::new(resource, err))?;
            rows.push(record.iter().map(str::to_string).collect());
        }
    }

    Ok(rows)
}

const HEADER_LINES: usize = 1;

/// Lines as a line reader sees them: a final newline does not open another
/// and a carriage return before a newline is dropped.
fn lines(input: &[u8]) -> impl Iterator<Item = &[u8]> {
    let input = input.strip_suffix(b"\n").unwrap_or(input);
    input
        .split(|byte| *byte == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Cheese, GeneralProduct, RuleRegistry, Wine};
    use crate::view::RecordingView;
    use std::io::Cursor;
    use std::sync::Arc;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 1).expect("valid start")
    }

    fn context(view: &Arc<RecordingView>) -> LoaderContext {
        LoaderContext::new(view.clone(), Arc::new(RuleRegistry::with_builtin()))
    }

    fn categories(view: &Arc<RecordingView>) -> CategoryMap {
        read_categories(
            Cursor::new("name;class\ngeneral;GeneralProduct\ncheese;Cheese\nwine;Wine\n"),
            "inline",
            &context(view),
        )
        .expect("categories load")
    }

    #[test]
    fn category_rows_resolve_their_rules() {
        let view = Arc::new(RecordingView::new());
        let csv = "name;class\n\
general;GeneralProduct\n\
cheese;Cheese\n\
wine;Wine\n\
error;X\n\
onlyonefield\n";

        let map = read_categories(Cursor::new(csv), "inline", &context(&view))
            .expect("categories load");

        assert_eq!(map.names(), vec!["cheese", "general", "wine"]);
        assert_eq!(
            map.get("cheese").map(|c| c.rule().implementation()),
            Some(Cheese::KEY)
        );
        assert_eq!(
            view.warnings(),
            vec![
                RowWarning::UnknownRule {
                    implementation: "X".to_string(),
                    category: "error".to_string(),
                },
                RowWarning::FieldCount {
                    dataset: Dataset::Categories,
                    expected: 2,
                    actual: 1,
                    line: "onlyonefield".to_string(),
                },
            ]
        );
    }

    #[test]
    fn item_rows_report_each_kind_of_problem() {
        let view = Arc::new(RecordingView::new());
        let categories = categories(&view);
        let csv = "type;name;quality;basePrice;dueDate\n\
general;Brot;0;1.15;2024-12-05\n\
onlyonefield\n\
noType;Brot;0;1.15;2024-12-05\n\
general;Brot;zero;1.15;2024-12-05\n\
general;Brot;0;free;2024-12-05\n\
general;Brot;0;1.15;05.12.2024\n\
wine;Rotwein;10;5.00;2025-01-01\n";

        let items = read_items(Cursor::new(csv), "inline", start(), &categories, view.as_ref())
            .expect("items load");

        let names: Vec<&str> = items.iter().map(Item::name).collect();
        assert_eq!(names, vec!["Brot", "Rotwein"]);
        assert_eq!(
            items[0].category().rule().implementation(),
            GeneralProduct::KEY
        );
        assert_eq!(items[1].category().rule().implementation(), Wine::KEY);

        assert_eq!(
            view.warnings(),
            vec![
                RowWarning::FieldCount {
                    dataset: Dataset::Items,
                    expected: 5,
                    actual: 1,
                    line: "onlyonefield".to_string(),
                },
                RowWarning::UnknownCategory {
                    category: "noType".to_string(),
                    line: "noType;Brot;0;1.15;2024-12-05".to_string(),
                },
                RowWarning::InvalidNumber {
                    line: "general;Brot;zero;1.15;2024-12-05".to_string(),
                },
                RowWarning::InvalidNumber {
                    line: "general;Brot;0;free;2024-12-05".to_string(),
                },
                RowWarning::InvalidDate {
                    line: "general;Brot;0;1.15;05.12.2024".to_string(),
                },
            ]
        );
    }

    #[test]
    fn negative_base_price_is_not_a_valid_number() {
        let view = Arc::new(RecordingView::new());
        let categories = categories(&view);
        let items = read_items(
            Cursor::new("header\ngeneral;Brot;0;-1.15;2024-12-05\n"),
            "inline",
            start(),
            &categories,
            view.as_ref(),
        )
        .expect("items load");

        assert!(items.is_empty());
        assert_eq!(view.warnings().len(), 1);
    }

    #[test]
    fn empty_input_yields_nothing_and_no_warnings() {
        let view = Arc::new(RecordingView::new());
        let map = read_categories(Cursor::new(""), "inline", &context(&view))
            .expect("empty categories load");
        let items = read_items(Cursor::new(""), "inline", start(), &map, view.as_ref())
            .expect("empty items load");

        assert!(map.is_empty());
        assert!(items.is_empty());
        assert!(view.events().is_empty());
    }

    #[test]
    fn header_line_is_skipped_even_if_it_looks_like_data() {
        let view = Arc::new(RecordingView::new());
        let map = read_categories(
            Cursor::new("general;GeneralProduct\ncheese;Cheese\n"),
            "inline",
            &context(&view),
        )
        .expect("categories load");

        assert_eq!(map.names(), vec!["cheese"]);
    }

    #[test]
    fn missing_file_is_a_data_access_error() {
        let view = Arc::new(RecordingView::new());
        let loader = CsvCategoryLoader::new(
            CsvSource::File(PathBuf::from("./does-not-exist.csv")),
            context(&view),
        );

        let error = loader
            .fetch_categories()
            .expect_err("missing file must fail");
        assert_eq!(error.resource, "./does-not-exist.csv");
        assert!(view.warnings().is_empty());
    }

    #[test]
    fn file_source_reads_rows_from_disk() {
        let path = std::env::temp_dir().join(format!(
            "shelf-life-delimited-{}.csv",
            std::process::id()
        ));
        std::fs::write(&path, "name;class\ngeneral;GeneralProduct\n").expect("write temp csv");

        let view = Arc::new(RecordingView::new());
        let loader = file_category_loader(path.to_str().expect("utf-8 path"), &context(&view));
        let map = loader.fetch_categories();
        std::fs::remove_file(&path).ok();

        assert_eq!(map.expect("file loads").names(), vec!["general"]);
    }

    #[test]
    fn blank_lines_are_short_rows() {
        let view = Arc::new(RecordingView::new());
        let map = read_categories(
            Cursor::new("h\ngeneral;GeneralProduct\n\nonlyonefield\n\n"),
            "inline",
            &context(&view),
        )
        .expect("categories load");

        let blank = RowWarning::FieldCount {
            dataset: Dataset::Categories,
            expected: 2,
            actual: 1,
            line: String::new(),
        };
        assert_eq!(map.names(), vec!["general"]);
        assert_eq!(
            view.warnings(),
            vec![
                blank.clone(),
                RowWarning::FieldCount {
                    dataset: Dataset::Categories,
                    expected: 2,
                    actual: 1,
                    line: "onlyonefield".to_string(),
                },
                blank,
            ]
        );
    }

    #[test]
    fn blank_header_line_is_still_the_header() {
        let view = Arc::new(RecordingView::new());
        let map = read_categories(
            Cursor::new("\ngeneral;GeneralProduct\r\n"),
            "inline",
            &context(&view),
        )
        .expect("categories load");

        assert_eq!(map.names(), vec!["general"]);
        assert!(view.warnings().is_empty());
    }

    #[test]
    fn pipe_loaders_read_the_injected_stream() {
        let view = Arc::new(RecordingView::new());
        let ctx = context(&view);

        let categories = stdin_category_loader(&ctx);
        assert_eq!(categories.source(), &CsvSource::Stdin);
        let map = categories
            .fetch_from(Cursor::new("name;class\nwine;Wine\n"))
            .expect("piped categories load");

        let items = stdin_item_loader(&ctx);
        assert_eq!(items.source(), &CsvSource::Stdin);
        let loaded = items
            .fetch_from(
                Cursor::new(
                    "type;name;quality;basePrice;dueDate\nwine;Rotwein;10;5.00;2025-01-01\n",
                ),
                start(),
                &map,
            )
            .expect("piped items load");

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].category().rule().implementation(), Wine::KEY);
        assert!(view.warnings().is_empty());
    }

    #[test]
    fn due_date_at_the_calendar_floor_loads_flagged_for_removal() {
        let view = Arc::new(RecordingView::new());
        let categories = categories(&view);
        let items = read_items(
            Cursor::new("header\ncheese;Gouda;50;1.0;-262143-01-01\n"),
            "inline",
            start(),
            &categories,
            view.as_ref(),
        )
        .expect("items load");

        assert_eq!(items.len(), 1);
        assert!(items[0].should_remove());
        assert!(view.warnings().is_empty());
    }
}
