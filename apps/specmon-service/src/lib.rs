//! Spec monitoring service.
//!
//! Watches the `Ongoing` and `Approved` folders for newly added PDF spec
//! documents, extracts their labeled fields, persists complete records to
//! SQLite, exports approved records to a dated CSV file, and notifies
//! stakeholders by email. The binary in `main.rs` wires these modules
//! together and runs the scheduling loop.

pub mod config;
pub mod csv_export;
pub mod dirsetup;
pub mod mailer;
pub mod pdf;
pub mod pipeline;
pub mod scan;
pub mod store;

pub use config::Settings;
pub use mailer::{Mailer, Notify};
pub use pdf::{DocumentSource, PdfTextSource, UnreadableDocument};
pub use pipeline::IntakePipeline;
pub use store::SpecStore;
