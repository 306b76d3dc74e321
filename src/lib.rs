pub mod geo;
pub mod geocode;
pub mod pipeline;
pub mod timeline;
