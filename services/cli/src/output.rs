//! Renderers for the report on stdout and the diagnostics on stderr.

use chrono::NaiveDate;
use serde::Serialize;
use shelf_life::inventory::{Item, ItemView};
use shelf_life::loaders::RowWarning;
use shelf_life::view::{InventoryView, Reporter};
use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::Mutex;

const REMOVE_MARKER: &str = "\t<- Aus Regal entfernen!";

fn price(value: f64) -> String {
    format!("{value:.2}€")
}

fn write_locked<W: Write>(target: &Mutex<W>, text: &str) {
    let mut writer = target.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let written = writer.write_all(text.as_bytes());
    if let Err(err) = written.and_then(|()| writer.flush()) {
        tracing::warn!(error = %err, "could not write report output");
    }
}

/// Tab separated tables as read by people at the shelf.
pub struct ConsoleView<O, E> {
    out: Mutex<O>,
    err: Mutex<E>,
}

impl ConsoleView<io::Stdout, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> ConsoleView<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self {
            out: Mutex::new(out),
            err: Mutex::new(err),
        }
    }

    pub fn into_parts(self) -> (O, E) {
        let out = self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
        let err = self.err.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
        (out, err)
    }
}

pub fn render_inventory(items: &[Item]) -> String {
    let mut text = String::from("=== Inventar ===\nProdukt\tTyp\tBasisPreis\tQualität\tPreis\tVerfallsdatum\n\n");
    for item in items {
        let _ = write!(
            text,
            "{}:\t{}\t{}\t{}\t{}\t{}",
            item.name(),
            item.category().name(),
            price(item.base_price()),
            item.quality(),
            price(item.price()),
            item.due_date().format("%Y-%m-%d"),
        );
        if item.should_remove() {
            text.push_str(REMOVE_MARKER);
        }
        text.push('\n');
    }
    text.push('\n');
    text
}

pub fn render_day(day: NaiveDate, items: &[Item]) -> String {
    let mut text = format!("--- {} ---\nProdukt\tPreis\tQualität\n\n", day.format("%Y-%m-%d"));
    for item in items {
        let _ = write!(text, "{}:\t{}\t{}", item.name(), price(item.price()), item.quality());
        if item.should_remove() {
            text.push_str(REMOVE_MARKER);
        }
        text.push('\n');
    }
    text.push('\n');
    text
}

impl<O: Write + Send, E: Write + Send> Reporter for ConsoleView<O, E> {
    fn warning(&self, warning: &RowWarning) {
        write_locked(&self.err, &format!("[Warning] {warning}\n"));
    }

    fn error(&self, error: &dyn std::error::Error) {
        write_locked(&self.err, &format!("[Error] {error}\n"));
    }
}

impl<O: Write + Send, E: Write + Send> InventoryView for ConsoleView<O, E> {
    fn inventory(&self, items: &[Item]) {
        write_locked(&self.out, &render_inventory(items));
    }

    fn day(&self, day: NaiveDate, items: &[Item]) {
        write_locked(&self.out, &render_day(day, items));
    }

    fn done(&self) {
        write_locked(&self.out, "Done.\n");
    }
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum Event<'a> {
    Inventory {
        items: Vec<ItemView>,
    },
    Day {
        day: NaiveDate,
        items: Vec<ItemView>,
    },
    Done,
    Warning {
        message: String,
        warning: &'a RowWarning,
    },
    Error {
        message: String,
    },
}

/// One JSON object per line and event, everything on stdout.
pub struct JsonLinesView<W> {
    out: Mutex<W>,
}

impl JsonLinesView<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonLinesView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: &Event<'_>) {
        match serde_json::to_string(event) {
            Ok(mut line) => {
                line.push('\n');
                write_locked(&self.out, &line);
            }
            Err(err) => tracing::warn!(error = %err, "could not serialize report event"),
        }
    }
}

fn views(items: &[Item]) -> Vec<ItemView> {
    items.iter().map(Item::to_view).collect()
}

impl<W: Write + Send> Reporter for JsonLinesView<W> {
    fn warning(&self, warning: &RowWarning) {
        self.emit(&Event::Warning {
            message: warning.to_string(),
            warning,
        });
    }

    fn error(&self, error: &dyn std::error::Error) {
        self.emit(&Event::Error {
            message: error.to_string(),
        });
    }
}

impl<W: Write + Send> InventoryView for JsonLinesView<W> {
    fn inventory(&self, items: &[Item]) {
        self.emit(&Event::Inventory {
            items: views(items),
        });
    }

    fn day(&self, day: NaiveDate, items: &[Item]) {
        self.emit(&Event::Day {
            day,
            items: views(items),
        });
    }

    fn done(&self) {
        self.emit(&Event::Done);
    }
}
