//! rv: browse the records of a CSV or JSON dataset one at a time.
//!
//! [`view::DatasetView`] holds a loaded [`table::Table`], staged filter
//! criteria and a cursor into the matching rows. [`loader`] turns uploaded
//! bytes into tables and [`export`] writes the filtered rows back out. The
//! remaining modules make up the terminal presenter.

pub mod controller;
pub mod domain;
pub mod export;
pub mod filter;
pub mod inputter;
pub mod loader;
pub mod logging;
pub mod model;
pub mod table;
pub mod ui;
pub mod view;

pub use domain::{TVConfig, TVError};
pub use filter::{Criterion, FilterSet};
pub use loader::{FileFormat, parse};
pub use table::{Column, ColumnKind, Table, Value};
pub use view::{DatasetView, Record};
