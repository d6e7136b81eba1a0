mod client;
mod errors;
mod query;
pub mod types;
pub use self::client::{Client, RawResponse, API_KEY_PARAM};
pub use self::errors::Error;
pub use self::query::{DateFormat, OddsFormat, OddsQuery};
