pub(crate) mod lenient;
pub mod load;
pub mod model;
