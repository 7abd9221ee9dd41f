//! Client for the read-only data API.
//!
//! - Query open positions per user, with server-side filters

pub mod positions_client;

pub use positions_client::{DataClient, Position, PositionsQuery, DEFAULT_DATA_API_URL};
