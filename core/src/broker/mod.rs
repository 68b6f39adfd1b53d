//! # Broker Module
//!
//! TCP front end and request dispatch.
//!
//! - [`server`] accepts connections and runs one sequential
//!   request/response loop per client
//! - [`handler`] turns a decoded request into a response using the
//!   metadata index and partition log storage
//!
//! ```rust,no_run
//! use kraftmq::{BrokerConfig, BrokerServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BrokerConfig::default().with_port(9092);
//!     let server = BrokerServer::new(config)?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod handler;
pub mod server;

pub use handler::RequestProcessor;
pub use server::BrokerServer;
