pub mod format;
pub mod layout;
pub mod pdf;

pub use format::{ascii_filename, document_filename, format_amount};
pub use layout::{compose, ReportLayout};
pub use pdf::render_pdf;
