//! HTTP transports for the FactFund collaborators.
//!
//! Both the backend actor and the ledger index are reached through a JSON
//! gateway: `POST {base_url}/call` with `{"method": .., "args": {..}}`. This
//! crate owns everything about that wire format, so the client core only
//! ever sees `Result<T, FundError>`.

pub mod backend;
pub mod client;
pub mod ledger;
pub mod wire;

pub use backend::HttpBackend;
pub use client::GatewayClient;
pub use ledger::HttpLedgerIndex;
