pub mod actions;
pub mod config;
pub mod deeplink;
pub mod error;
pub mod fallback;
pub mod intent;
pub mod journal;
pub mod literal;
pub mod model;
pub mod navigator;
pub mod reducer;
pub mod resolver;
pub mod state;
pub mod store;
pub mod vocabulary;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use actions::*;
pub use config::*;
pub use error::*;
pub use intent::IntentOracle;
pub use intent::OracleGuess;
pub use model::*;
pub use navigator::Navigator;
pub use reducer::*;
pub use state::*;
pub use store::Condition;
pub use store::Operator;
pub use store::Record;
pub use store::RecordStore;
pub use store::SearchOptions;
pub use vocabulary::EntityMapper;

pub use journal::*;
