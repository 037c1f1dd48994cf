//! wikiracer - finds chains of hyperlinks between Wikipedia articles
//!
//! Two search frontiers, forward from the source and backward from the
//! target, are expanded concurrently against the MediaWiki API. Discovered
//! links are merged as they arrive until the frontiers meet, at which point
//! all in-flight work is cancelled and the path is reconstructed.

pub mod api;
pub mod config;
pub mod core;
pub mod services;
pub mod source;
pub mod utils;
