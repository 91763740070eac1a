//! Game records and the rules for changing them.

pub mod applier;
mod error;
mod record;

pub use applier::{Commit, PreparedMove, PreparedUndo};
pub use error::GameError;
pub use record::GameRecord;
