/// Driver module - the raw GL-style entry points and the layers around them

// Module declarations
pub mod driver;
pub mod capabilities;
pub mod format;
pub mod gl;
pub mod binding_cache;

// Re-export everything from driver.rs
pub use driver::*;

// Re-export from other modules
pub use capabilities::*;
pub use format::*;
pub use binding_cache::*;

// Recording mock driver for tests (no backend required)
#[cfg(test)]
pub mod mock_driver;
