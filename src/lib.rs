pub mod cognite;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod handler;
pub mod model;
pub mod publisher;
pub mod report;
pub mod resolver;
pub mod signal;

pub use error::HandlerError;
pub use handler::{SineFunction, Stores};
pub use model::{HandlerResponse, InvocationPayload};
