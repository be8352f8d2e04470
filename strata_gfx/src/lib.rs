/*!
# Strata GFX

Graphics-buffer resource management on top of a GL-style driver.

This crate wraps driver buffer objects (vertex, index and uniform buffers,
optionally aliased by a texture-buffer view) behind one interface that works
across driver capability tiers. Drivers are plugged in through the `Driver`
trait; the software backend lives in `strata_gfx_driver_soft`.

## Architecture

- **DeviceContext**: owns the driver, its detected features, the binding cache
  and the format mapping. Shared by every buffer created on it.
- **GraphicsBuffer**: a lazily realized linear GPU buffer (realize, map,
  bind, copy, partial update, release).
- **MapSession**: scoped CPU mapping of a buffer, unmapped on drop.
- **Driver**: raw GL-style entry points implemented by backends.
- **BindingCache**: skips redundant bind calls per target slot.
- **FormatMapping**: element format to native format triple.
*/

// Internal modules
mod error;
pub mod log;
pub mod driver;
pub mod device;
pub mod buffer;

// Main strata namespace module
pub mod strata {
    // Error types
    pub use crate::error::{Error, Result};

    // Device context and configuration
    pub use crate::device::{DeviceConfig, DeviceContext};

    // Logging sub-module (types and logger installation, NOT macros)
    pub mod log {
        pub use crate::log::{
            Logger, LogEntry, LogSeverity, DefaultLogger, set_logger, reset_logger,
        };
    }

    // Driver-facing sub-module
    pub mod driver {
        pub use crate::driver::*;
    }

    // Buffer sub-module
    pub mod buffer {
        pub use crate::buffer::*;
    }
}

// Re-export math library at crate root
pub use glam;
