pub mod compose;
pub mod config;
pub mod crowd;
pub mod draw;
pub mod guard;
pub mod normalize;
pub mod phrasebook;
pub mod pipeline;
pub mod sanitize;
pub mod timefmt;
