//! Source adapters.
//!
//! One module per regulatory source. Adapters are plain structs holding an
//! immutable [`rxwatch_core::SourceSpec`]; the fetch client and the
//! oncology gate are injected, so the extraction pipeline is shared and the
//! adapters stay independent of each other.

pub mod fda;
pub mod health_canada;
pub mod nafdac;

pub use fda::FdaSource;
pub use health_canada::HealthCanadaSource;
pub use nafdac::NafdacSource;
