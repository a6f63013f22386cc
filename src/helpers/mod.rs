pub mod serde_time;
pub mod time;
