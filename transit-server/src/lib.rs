//! Transit itinerary planner server.
//!
//! A web application that answers: "how do I get from here to there by
//! bus or train, leaving around now?"

pub mod domain;
pub mod planner;
pub mod prediction;
pub mod schedule;
pub mod settings;
pub mod spatial;
pub mod web;
