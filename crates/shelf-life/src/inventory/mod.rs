mod category;
mod item;

pub use category::{Category, CategoryMap};
pub use item::{Item, ItemView};
