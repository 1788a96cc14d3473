pub mod models;
pub mod reqpad_client;

pub use models::{ClientConfig, RequestExecutionResult};
pub use reqpad_client::ReqpadClient;
