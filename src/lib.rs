//! Shift Report: short situational reports for a restaurant service period.
//!
//! Turns a handful of structured observations (weather, customer mix, peak
//! hours, crowd feel, best sellers) into a two-to-four sentence report using
//! tag-gated phrase pools, a consistency guard, and a final sanitizing pass.
//! No model inference: every sentence comes from a declarative phrasebook.

pub mod core;
pub mod schema;

pub use crate::core::draw::{RandomSource, ScriptedDraws};
pub use crate::core::pipeline::{EngineError, ReportEngine};
pub use crate::schema::record::{ObservationRecord, ServicePeriod};
