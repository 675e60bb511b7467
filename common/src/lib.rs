//! Types shared between the hintsweeper server and its clients.

pub mod format;
pub mod models;
pub mod params;
pub mod protocol;
pub mod results;
