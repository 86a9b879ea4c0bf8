pub mod api;
pub mod core;
pub mod ledger;
pub mod logging;
