pub mod dispatcher;
pub mod pipeline;
