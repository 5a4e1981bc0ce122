//! sheet-mailer: templated email dispatch driven by spreadsheet rows
//!
//! Reads recipients from the first sheet of a workbook or CSV file, renders
//! an HTML template per recipient and sends it over SMTP.
//!
//! # Features
//!
//! - **Addressing modes**: email by column index, email and name by index
//!   pair, or email and name by header
//! - **Failure isolation**: a bad row, a missing template or a rejected
//!   recipient is recorded for that row and the batch moves on
//! - **Templates**: flat `{{placeholder}}` substitution; unknown placeholders
//!   are left untouched
//!
//! # Example
//!
//! ```no_run
//! use sheet_mailer::batch::{BatchSender, BatchSummary, RowSelection};
//! use sheet_mailer::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("mailer.toml")?;
//!     let sender = BatchSender::from_config(&config).await?;
//!
//!     let outcomes = sender
//!         .send_batch(&RowSelection::Column, "Monthly update", "update.html")
//!         .await;
//!     println!("{}", BatchSummary::from_outcomes(&outcomes));
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling
//! - [`source`]: Spreadsheet loading
//! - [`resolver`]: Row-to-recipient resolution
//! - [`templates`]: Placeholder substitution
//! - [`transport`]: SMTP and in-memory transports
//! - [`batch`]: Per-row dispatch pipeline

pub mod batch;
pub mod config;
pub mod error;
pub mod resolver;
pub mod source;
pub mod templates;
pub mod transport;

// Re-export commonly used types
pub use batch::{BatchSender, BatchSummary, DispatchOutcome, RowSelection};
pub use config::Config;
pub use error::{MailerError, Result};
pub use resolver::{AddressingConfig, RecipientRecord, RecipientResolver};
pub use transport::{EmailTransport, OutgoingMessage, TransportReceipt};
