//! Validated value types used across the client.

mod api_url;
pub mod instrument;

pub use api_url::{API_PATH, ApiUrl, Environment, PRODUCTION_URL, TEST_URL};
pub use instrument::{InstrumentKind, OptionType};
