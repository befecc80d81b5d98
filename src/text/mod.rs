pub mod block;
pub mod engine;
pub mod fit;
pub mod measure;
pub mod names;
pub mod paint;
pub mod segments;
