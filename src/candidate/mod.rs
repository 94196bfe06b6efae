//! Match ordering and result collectors.
//!
//! Includes the ranking order for match lists and the collectors that turn
//! the scanner's match stream into a search result.

pub mod collect;
pub mod order;
