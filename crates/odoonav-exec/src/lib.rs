pub mod adapters;
pub mod contracts;
pub mod fixture;
pub mod odoo;
pub mod xmlrpc;

pub use adapters::build_oracle;
pub use adapters::ChatCompletionsOracle;
pub use adapters::OllamaOracle;
pub use fixture::FixtureError;
pub use fixture::FixtureStore;
pub use odoo::XmlRpcStore;
