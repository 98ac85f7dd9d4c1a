pub mod format;
pub mod loader;
pub mod types;
pub mod writer;

pub use format::TableFormat;
pub use loader::{normalize_rates, DataLoader, LoaderConfig, LoaderError, LoaderResult};
pub use types::{HistoricalSeries, Observation, Prediction};
pub use writer::{PredictionWriter, WriterConfig, WriterError, WriterResult};
