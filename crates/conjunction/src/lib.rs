pub mod builder;
pub mod excess;
pub mod summary;
pub mod window;

pub use builder::build_record;
pub use excess::excess_series;
pub use summary::summarize;
pub use window::align_window;
