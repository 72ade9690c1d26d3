pub mod alert;
pub mod config;
pub mod filter;
pub mod ident;
pub mod keys;
pub mod sources;

pub use alert::AlertRecord;
pub use config::{AppConfig, ConfigError};
pub use filter::{KeywordFilter, ProductLookup};
pub use ident::RecordIdBuilder;
pub use keys::{normalize_key, normalize_key_or_fallback, FieldKey, ParsedFields};
pub use sources::{load_sources, SourceKind, SourceSpec, SourcesFile};
