//! Chess HTTP client library
//!
//! Provides a high-level async client for the chessgpt server. The
//! [`ChessService`] trait is what applications program against; the
//! [`HttpChessClient`] talks to a real server and `MockChessService`
//! (feature `mock`) stands in for it in tests.
//!
//! # Example
//!
//! ```no_run
//! use chess_client::{ChessService, CreateGameRequest, HttpChessClient};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpChessClient::new("http://127.0.0.1:8000", Duration::from_secs(30))?;
//!     let game = client.create_game(&CreateGameRequest::default()).await?;
//!     println!("Created game: {}", game.id);
//!     Ok(())
//! }
//! ```

mod client;
mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod traits;

pub use client::HttpChessClient;
pub use error::{ClientError, ClientResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockCall, MockChessService};
pub use traits::ChessService;

// Re-export wire types for convenience
pub use chess_proto::*;
