pub mod graph;
pub mod seen;
