pub mod outline;
pub mod transform;
