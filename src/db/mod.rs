pub mod bitmap;
pub mod registry;
pub mod table;
