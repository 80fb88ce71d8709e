//! Sales-rep client: the product-browsing session and its HTTP backend.
//!
//! - `session`: one product screen (catalog pages + quote overlay)
//! - `worker`: event loop that drives a session from UI events
//! - `http`: reqwest implementation of the backend contract
//! - `navigation`: typed parameters the product screen is opened with

pub mod config;
pub mod http;
pub mod navigation;
pub mod payment;
pub mod session;
pub mod worker;

pub use config::{ClientConfig, ConfigError};
pub use http::{ClientsPage, HttpBackend};
pub use navigation::ProductsRoute;
pub use payment::{PaymentCondition, PaymentMethod, PaymentTerms};
pub use session::{ProductSession, SessionId, SessionSnapshot};
pub use worker::{SessionCommand, SessionHandle, SessionWorker, WorkerError};
