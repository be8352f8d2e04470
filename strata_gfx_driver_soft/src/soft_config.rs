/// Configuration of the software driver

use strata_gfx::strata::driver::{Capabilities, DriverInfo};

/// Default allocation limit (256 MiB)
pub const DEFAULT_MAX_BUFFER_SIZE: u64 = 256 * 1024 * 1024;

/// What the software driver reports and which limits it enforces
///
/// The driver accepts exactly the entry points its report implies: the
/// capabilities a device context would detect from `version` and
/// `extensions`. Named entry points fail without direct state access,
/// range maps fail without map-buffer-range, and so on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftDriverConfig {
    pub vendor: String,
    pub renderer: String,
    /// Core version (major, minor)
    pub version: (u32, u32),
    pub extensions: Vec<String>,
    /// Allocations above this size fail with OutOfMemory
    pub max_buffer_size: u64,
}

impl Default for SoftDriverConfig {
    fn default() -> Self {
        Self::full()
    }
}

impl SoftDriverConfig {
    /// Core 4.5 plus EXT direct state access: every capability
    pub fn full() -> Self {
        Self {
            extensions: vec!["GL_EXT_direct_state_access".to_string()],
            ..Self::core(4, 5)
        }
    }

    /// Bare core version without extensions
    ///
    /// Core 4.5 alone has no direct state access here: its named entry
    /// points need objects made by glCreate*, which the driver seam lacks.
    pub fn core(major: u32, minor: u32) -> Self {
        Self {
            vendor: "Strata".to_string(),
            renderer: "Strata Soft Rasterless".to_string(),
            version: (major, minor),
            extensions: Vec::new(),
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
        }
    }

    /// Core 2.1 without extensions: no optional capability
    pub fn legacy() -> Self {
        Self::core(2, 1)
    }

    /// Core 2.1 plus the extension behind each requested capability
    pub fn tier(capabilities: Capabilities) -> Self {
        let extensions = [
            (Capabilities::DIRECT_STATE_ACCESS, "GL_EXT_direct_state_access"),
            (Capabilities::MAP_BUFFER_RANGE, "GL_ARB_map_buffer_range"),
            (Capabilities::COPY_BUFFER, "GL_ARB_copy_buffer"),
            (Capabilities::TEXTURE_BUFFER, "GL_ARB_texture_buffer_object"),
            (Capabilities::TEXTURE_BUFFER_RGB32, "GL_ARB_texture_buffer_object_rgb32"),
        ]
        .into_iter()
        .filter(|(capability, _)| capabilities.contains(*capability))
        .map(|(_, extension)| extension.to_string())
        .collect();

        Self { extensions, ..Self::legacy() }
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extensions.push(extension.to_string());
        self
    }

    pub fn with_vendor(mut self, vendor: &str) -> Self {
        self.vendor = vendor.to_string();
        self
    }

    pub fn with_max_buffer_size(mut self, max_buffer_size: u64) -> Self {
        self.max_buffer_size = max_buffer_size;
        self
    }

    /// Driver report built from this config
    pub fn driver_info(&self) -> DriverInfo {
        DriverInfo {
            vendor: self.vendor.clone(),
            renderer: self.renderer.clone(),
            version: self.version,
            extensions: self.extensions.clone(),
        }
    }
}
