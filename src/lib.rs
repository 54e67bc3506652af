pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod search;
pub mod session;

pub use config::EngineConfig;
pub use error::SearchError;
pub use model::{parse_conversations, Conversation, Message, Role};
pub use search::engine::{search, SearchEngine};
pub use search::{SearchMatch, SearchMatchType, SearchOptions, SearchResults};
pub use session::{Generation, SearchSession};
