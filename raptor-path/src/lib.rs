//! Path reconstruction for range-RAPTOR transit searches.
//!
//! Turns the board/alight facts and street legs found by a RAPTOR search
//! into time-shifted, cost-annotated itineraries. Paths can be assembled
//! in travel order or backwards from the destination, and the assembled
//! chain can be forked to explore alternative tails.

pub mod domain;
pub mod path;
pub mod transit;
