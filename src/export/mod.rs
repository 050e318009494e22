pub mod workbook;

pub use workbook::write_report;
