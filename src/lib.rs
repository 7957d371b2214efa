//! Consumes prediction requests from a topic, evaluates the named model and
//! publishes exactly one result per request on the output topic.

pub mod config;
pub mod error;
pub mod handler;
pub mod request;
pub mod service;

pub use config::ServiceConfig;
pub use error::{ConfigErr, PredictionErr};
pub use handler::PredictionRequestHandler;
pub use request::{INPUT_DATA, PMML_MODEL, PredictionRequest, RawInput};
