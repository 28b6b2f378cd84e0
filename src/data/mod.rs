//! Input and output around the planner: workbook ingest, case routing, result export.

pub mod archive;
pub mod availability;
pub mod cases;
pub mod export;
pub mod sponsor;
pub mod synthetic;
pub mod workbook;

pub use availability::{load_groups, AvailabilityBook};
pub use cases::{load_cases, route_cases, RoutedCases};
pub use export::{ExportError, ExportFile};
pub use workbook::{Cell, IngestError, Sheet, Workbook};
