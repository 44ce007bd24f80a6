mod columns;
mod csv;
mod validator;

pub use columns::{RequiredColumn, TIMESTAMP_ALIASES};
pub use csv::CsvConnector;
pub use validator::DataValidator;
