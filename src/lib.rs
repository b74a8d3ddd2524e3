// Library root
// -----------
// The binary (`main.rs`) is a thin shell over these modules.
//
// Module responsibilities:
// - `api`: blocking HTTP client for the prime generation service
//   (create, status, result, health) and its wire types.
// - `poll`: fixed-interval wait for a job to finish, over an injectable clock.
// - `config`: environment-driven client settings and poll budgets.
// - `error`: failure taxonomy returned by the client.
// - `ui`: interactive menu and quick run.
pub mod api;
pub mod config;
pub mod error;
pub mod poll;
pub mod ui;

pub use api::{PrimesClient, RequestId, ResultSet, StatusSnapshot};
pub use config::{ClientConfig, PollPolicy};
pub use error::{ClientError, ConfigError};
pub use poll::{Clock, Progress, SystemClock, WaitOutcome};
