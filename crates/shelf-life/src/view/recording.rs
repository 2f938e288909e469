use super::{InventoryView, Reporter};
use crate::inventory::{Item, ItemView};
use crate::loaders::RowWarning;
use chrono::NaiveDate;
use std::sync::Mutex;

/// Everything a view was told, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Inventory(Vec<ItemView>),
    Day(NaiveDate, Vec<ItemView>),
    Done,
    Warning(RowWarning),
    Error(String),
}

/// In-memory view that keeps every event for later inspection.
#[derive(Debug, Default)]
pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.lock().clone()
    }

    pub fn warnings(&self) -> Vec<RowWarning> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                ViewEvent::Warning(warning) => Some(warning.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                ViewEvent::Error(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Items emitted for `day`, if that day was reported.
    pub fn items_on(&self, day: NaiveDate) -> Option<Vec<ItemView>> {
        self.lock().iter().find_map(|event| match event {
            ViewEvent::Day(reported, items) if *reported == day => Some(items.clone()),
            _ => None,
        })
    }

    fn push(&self, event: ViewEvent) {
        self.lock().push(event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ViewEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Reporter for RecordingView {
    fn warning(&self, warning: &RowWarning) {
        self.push(ViewEvent::Warning(warning.clone()));
    }

    fn error(&self, error: &dyn std::error::Error) {
        self.push(ViewEvent::Error(error.to_string()));
    }
}

impl InventoryView for RecordingView {
    fn inventory(&self, items: &[Item]) {
        self.push(ViewEvent::Inventory(
            items.iter().map(Item::to_view).collect(),
        ));
    }

    fn day(&self, day: NaiveDate, items: &[Item]) {
        self.push(ViewEvent::Day(day, items.iter().map(Item::to_view).collect()));
    }

    fn done(&self) {
        self.push(ViewEvent::Done);
    }
}
