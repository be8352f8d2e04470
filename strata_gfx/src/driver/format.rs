/// Element formats and their mapping to native format triples

use crate::driver::gl;

/// Shader-visible element format of a buffer
///
/// Defines the data type and component count of each element when the
/// buffer is read through a texel-buffer view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum ElementFormat {
    // Normalized formats
    R8_UNORM,
    R8G8_UNORM,
    R8G8B8_UNORM,       // no texel-buffer equivalent
    R8G8B8A8_UNORM,
    B8G8R8A8_UNORM,     // no texel-buffer equivalent
    R16_UNORM,
    R16G16_UNORM,
    R16G16B16A16_UNORM,

    // Half float formats
    R16_SFLOAT,
    R16G16_SFLOAT,
    R16G16B16A16_SFLOAT,

    // Float formats
    R32_SFLOAT,
    R32G32_SFLOAT,
    R32G32B32_SFLOAT,
    R32G32B32A32_SFLOAT,

    // Byte formats
    R8_SINT,
    R8_UINT,
    R8G8_SINT,
    R8G8_UINT,
    R8G8B8A8_SINT,
    R8G8B8A8_UINT,

    // Short formats
    R16_SINT,
    R16_UINT,
    R16G16_SINT,
    R16G16_UINT,
    R16G16B16A16_SINT,
    R16G16B16A16_UINT,

    // Int formats
    R32_SINT,
    R32_UINT,
    R32G32_SINT,
    R32G32_UINT,
    R32G32B32_SINT,
    R32G32B32_UINT,
    R32G32B32A32_SINT,
    R32G32B32A32_UINT,
}

impl ElementFormat {
    /// Number of components per element
    pub fn component_count(&self) -> u32 {
        use ElementFormat::*;
        match self {
            R8_UNORM | R16_UNORM | R16_SFLOAT | R32_SFLOAT | R8_SINT | R8_UINT | R16_SINT
            | R16_UINT | R32_SINT | R32_UINT => 1,
            R8G8_UNORM | R16G16_UNORM | R16G16_SFLOAT | R32G32_SFLOAT | R8G8_SINT | R8G8_UINT
            | R16G16_SINT | R16G16_UINT | R32G32_SINT | R32G32_UINT => 2,
            R8G8B8_UNORM | R32G32B32_SFLOAT | R32G32B32_SINT | R32G32B32_UINT => 3,
            R8G8B8A8_UNORM | B8G8R8A8_UNORM | R16G16B16A16_UNORM | R16G16B16A16_SFLOAT
            | R32G32B32A32_SFLOAT | R8G8B8A8_SINT | R8G8B8A8_UINT | R16G16B16A16_SINT
            | R16G16B16A16_UINT | R32G32B32A32_SINT | R32G32B32A32_UINT => 4,
        }
    }

    /// Bytes per component
    pub fn component_size(&self) -> u32 {
        use ElementFormat::*;
        match self {
            R8_UNORM | R8G8_UNORM | R8G8B8_UNORM | R8G8B8A8_UNORM | B8G8R8A8_UNORM | R8_SINT
            | R8_UINT | R8G8_SINT | R8G8_UINT | R8G8B8A8_SINT | R8G8B8A8_UINT => 1,
            R16_UNORM | R16G16_UNORM | R16G16B16A16_UNORM | R16_SFLOAT | R16G16_SFLOAT
            | R16G16B16A16_SFLOAT | R16_SINT | R16_UINT | R16G16_SINT | R16G16_UINT
            | R16G16B16A16_SINT | R16G16B16A16_UINT => 2,
            R32_SFLOAT | R32G32_SFLOAT | R32G32B32_SFLOAT | R32G32B32A32_SFLOAT | R32_SINT
            | R32_UINT | R32G32_SINT | R32G32_UINT | R32G32B32_SINT | R32G32B32_UINT
            | R32G32B32A32_SINT | R32G32B32A32_UINT => 4,
        }
    }

    /// Returns size in bytes of one element
    pub fn size_bytes(&self) -> u32 {
        self.component_count() * self.component_size()
    }
}

/// Native format triple of a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeFormat {
    /// Sized internal storage format
    pub internal_format: u32,
    /// Transfer (pixel) format
    pub format: u32,
    /// Component type
    pub component_type: u32,
}

impl NativeFormat {
    pub const fn new(internal_format: u32, format: u32, component_type: u32) -> Self {
        Self { internal_format, format, component_type }
    }

    /// Three-component 32-bit storage, which texel-buffer views only
    /// accept from GL 4.0 or ARB_texture_buffer_object_rgb32
    pub fn is_rgb32(&self) -> bool {
        matches!(self.internal_format, gl::RGB32F | gl::RGB32I | gl::RGB32UI)
    }
}

/// Format-mapping layer
///
/// Translates an abstract element format into the driver's native triple.
/// Returns None when the driver has no equivalent.
pub trait FormatMapping {
    fn map_format(&self, format: ElementFormat) -> Option<NativeFormat>;
}

/// GL format table
#[derive(Debug, Clone, Copy, Default)]
pub struct GlFormatMapping;

impl FormatMapping for GlFormatMapping {
    fn map_format(&self, format: ElementFormat) -> Option<NativeFormat> {
        use ElementFormat::*;
        let native = match format {
            R8_UNORM => NativeFormat::new(gl::R8, gl::RED, gl::UNSIGNED_BYTE),
            R8G8_UNORM => NativeFormat::new(gl::RG8, gl::RG, gl::UNSIGNED_BYTE),
            R8G8B8A8_UNORM => NativeFormat::new(gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE),
            R16_UNORM => NativeFormat::new(gl::R16, gl::RED, gl::UNSIGNED_SHORT),
            R16G16_UNORM => NativeFormat::new(gl::RG16, gl::RG, gl::UNSIGNED_SHORT),
            R16G16B16A16_UNORM => NativeFormat::new(gl::RGBA16, gl::RGBA, gl::UNSIGNED_SHORT),

            R16_SFLOAT => NativeFormat::new(gl::R16F, gl::RED, gl::HALF_FLOAT),
            R16G16_SFLOAT => NativeFormat::new(gl::RG16F, gl::RG, gl::HALF_FLOAT),
            R16G16B16A16_SFLOAT => NativeFormat::new(gl::RGBA16F, gl::RGBA, gl::HALF_FLOAT),

            R32_SFLOAT => NativeFormat::new(gl::R32F, gl::RED, gl::FLOAT),
            R32G32_SFLOAT => NativeFormat::new(gl::RG32F, gl::RG, gl::FLOAT),
            R32G32B32_SFLOAT => NativeFormat::new(gl::RGB32F, gl::RGB, gl::FLOAT),
            R32G32B32A32_SFLOAT => NativeFormat::new(gl::RGBA32F, gl::RGBA, gl::FLOAT),

            R8_SINT => NativeFormat::new(gl::R8I, gl::RED_INTEGER, gl::BYTE),
            R8_UINT => NativeFormat::new(gl::R8UI, gl::RED_INTEGER, gl::UNSIGNED_BYTE),
            R8G8_SINT => NativeFormat::new(gl::RG8I, gl::RG_INTEGER, gl::BYTE),
            R8G8_UINT => NativeFormat::new(gl::RG8UI, gl::RG_INTEGER, gl::UNSIGNED_BYTE),
            R8G8B8A8_SINT => NativeFormat::new(gl::RGBA8I, gl::RGBA_INTEGER, gl::BYTE),
            R8G8B8A8_UINT => NativeFormat::new(gl::RGBA8UI, gl::RGBA_INTEGER, gl::UNSIGNED_BYTE),

            R16_SINT => NativeFormat::new(gl::R16I, gl::RED_INTEGER, gl::SHORT),
            R16_UINT => NativeFormat::new(gl::R16UI, gl::RED_INTEGER, gl::UNSIGNED_SHORT),
            R16G16_SINT => NativeFormat::new(gl::RG16I, gl::RG_INTEGER, gl::SHORT),
            R16G16_UINT => NativeFormat::new(gl::RG16UI, gl::RG_INTEGER, gl::UNSIGNED_SHORT),
            R16G16B16A16_SINT => NativeFormat::new(gl::RGBA16I, gl::RGBA_INTEGER, gl::SHORT),
            R16G16B16A16_UINT => NativeFormat::new(gl::RGBA16UI, gl::RGBA_INTEGER, gl::UNSIGNED_SHORT),

            R32_SINT => NativeFormat::new(gl::R32I, gl::RED_INTEGER, gl::INT),
            R32_UINT => NativeFormat::new(gl::R32UI, gl::RED_INTEGER, gl::UNSIGNED_INT),
            R32G32_SINT => NativeFormat::new(gl::RG32I, gl::RG_INTEGER, gl::INT),
            R32G32_UINT => NativeFormat::new(gl::RG32UI, gl::RG_INTEGER, gl::UNSIGNED_INT),
            R32G32B32_SINT => NativeFormat::new(gl::RGB32I, gl::RGB_INTEGER, gl::INT),
            R32G32B32_UINT => NativeFormat::new(gl::RGB32UI, gl::RGB_INTEGER, gl::UNSIGNED_INT),
            R32G32B32A32_SINT => NativeFormat::new(gl::RGBA32I, gl::RGBA_INTEGER, gl::INT),
            R32G32B32A32_UINT => NativeFormat::new(gl::RGBA32UI, gl::RGBA_INTEGER, gl::UNSIGNED_INT),

            R8G8B8_UNORM | B8G8R8A8_UNORM => return None,
        };
        Some(native)
    }
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
