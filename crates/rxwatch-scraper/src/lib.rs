pub mod client;
pub mod dates;
pub mod error;
pub mod grid;
pub mod html;
pub mod labels;
mod retry;
pub mod sources;
pub mod tables;
pub mod title;

pub use client::{FetchClient, FetchedPage};
pub use dates::parse_alert_date;
pub use error::ScraperError;
pub use grid::{expand_grid, table_to_grid, SpannedCell};
pub use labels::extract_label_pairs;
pub use sources::{FdaSource, HealthCanadaSource, NafdacSource};
pub use tables::{classify_grid, first_informative};
pub use title::{decompose_title, TitleParts};
