pub mod detector;
pub mod resolver;

pub use detector::filter_spikes;
pub use resolver::resolve_overlaps;
