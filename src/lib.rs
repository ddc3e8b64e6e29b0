//! snaptask - task suggestions from photos
//!
//! This crate turns a captured image (or typed text) into up to three
//! short, categorized task titles. Images go through an OCR pass and, if
//! that yields nothing usable, a caption/vision pass against a remote
//! multimodal model; noisy model output is parsed through ordered fallback
//! strategies and sanitized before it reaches the caller.
//!
//! # Example
//!
//! ```rust,no_run
//! use snaptask::{Config, SuggestionEngine};
//!
//! #[tokio::main]
//! async fn main() -> snaptask::Result<()> {
//!     let engine = SuggestionEngine::from_config(Config::from_env())?;
//!
//!     let outcome = engine.suggest_from_image("receipt.jpg", None).await;
//!     for s in &outcome.suggestions {
//!         println!("{} [{}]", s.title, s.category);
//!     }
//!     if let Some(reason) = &outcome.diagnostic {
//!         eprintln!("note: {reason}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Text labelling
//!
//! ```rust
//! use snaptask::{Category, SuggestionEngine};
//!
//! let engine = SuggestionEngine::builder().build().unwrap();
//! let s = engine.suggest_from_text("do the laundry");
//! assert_eq!(s.title, "Do Laundry");
//! assert_eq!(s.category, Category::Personal);
//! ```

pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod image;
pub mod parse;
#[cfg(feature = "relay")]
pub mod relay;
pub mod telemetry;
pub mod transport;
pub mod types;

// Re-export main types at crate root
pub use config::{Config, ExecutionContext};
pub use diagnostics::Diagnostics;
pub use engine::{EngineBuilder, SuggestionEngine};
pub use error::{Result, SuggestError};
pub use gateway::{InferenceGateway, RetryConfig};
pub use image::ImageNormalizer;
pub use parse::suggest_from_text;
pub use transport::{DirectTransport, InferenceTransport, RelayedTransport};

pub use types::{
    AttemptResult, Category, InferenceAttempt, InferenceMode, Route, Suggestion,
    SuggestionOutcome,
};

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
