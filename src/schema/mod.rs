pub mod crowd;
pub mod record;
