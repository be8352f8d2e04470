/// Capability and workaround detection
///
/// Capabilities are derived once per device context from the driver's
/// version and extension report. Most are available either through a
/// core version or through an extension; direct state access needs the
/// EXT extension whatever the version.

use bitflags::bitflags;
use crate::driver::DriverInfo;

bitflags! {
    /// Optional driver capabilities that select faster code paths
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        /// Named-object entry points where the first named call creates
        /// the object (EXT semantics, no bind needed)
        const DIRECT_STATE_ACCESS = 1 << 0;
        /// Range maps with invalidation flags
        const MAP_BUFFER_RANGE = 1 << 1;
        /// Device-side buffer to buffer copies
        const COPY_BUFFER = 1 << 2;
        /// Texel-buffer views over buffer storage
        const TEXTURE_BUFFER = 1 << 3;
        /// Three-component 32-bit formats in texel-buffer views
        const TEXTURE_BUFFER_RGB32 = 1 << 4;
    }
}

bitflags! {
    /// Known driver problems that force slower paths
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Workarounds: u32 {
        /// Range maps are broken or slow; always map the whole buffer
        const SLOW_MAP_RANGE = 1 << 0;
    }
}

impl Capabilities {
    /// Derive capabilities from a driver report
    pub fn detect(info: &DriverInfo) -> Self {
        let mut caps = Capabilities::empty();

        // ARB/4.5 DSA only accepts names from glCreate*, never gen'd names
        if info.has_extension("GL_EXT_direct_state_access") {
            caps |= Capabilities::DIRECT_STATE_ACCESS;
        }
        if info.version_at_least(3, 0) || info.has_extension("GL_ARB_map_buffer_range") {
            caps |= Capabilities::MAP_BUFFER_RANGE;
        }
        if info.version_at_least(3, 1) || info.has_extension("GL_ARB_copy_buffer") {
            caps |= Capabilities::COPY_BUFFER;
        }
        if info.version_at_least(3, 1)
            || info.has_extension("GL_EXT_texture_buffer_object")
            || info.has_extension("GL_ARB_texture_buffer_object")
        {
            caps |= Capabilities::TEXTURE_BUFFER;

            if info.version_at_least(4, 0) || info.has_extension("GL_ARB_texture_buffer_object_rgb32") {
                caps |= Capabilities::TEXTURE_BUFFER_RGB32;
            }
        }

        caps
    }
}

impl Workarounds {
    /// Derive workarounds from the vendor string
    pub fn detect(info: &DriverInfo) -> Self {
        let mut workarounds = Workarounds::empty();
        if info.vendor.to_ascii_lowercase().contains("intel") {
            workarounds |= Workarounds::SLOW_MAP_RANGE;
        }
        workarounds
    }
}

/// Capabilities and workarounds in effect for one device context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceFeatures {
    pub capabilities: Capabilities,
    pub workarounds: Workarounds,
}

impl DeviceFeatures {
    pub fn new(capabilities: Capabilities, workarounds: Workarounds) -> Self {
        Self { capabilities, workarounds }
    }

    /// Whether a capability is available
    pub fn has(&self, capability: Capabilities) -> bool {
        self.capabilities.contains(capability)
    }

    /// Whether a workaround is active
    pub fn needs(&self, workaround: Workarounds) -> bool {
        self.workarounds.contains(workaround)
    }
}

#[cfg(test)]
#[path = "capabilities_tests.rs"]
mod tests;
