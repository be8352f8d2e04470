/// Software texture object (texture-buffer views only)

use strata_gfx::strata::driver::{gl, BufferHandle};

/// Sized internal formats accepted for texture-buffer storage
const TEXTURE_BUFFER_FORMATS: &[u32] = &[
    gl::R8, gl::RG8, gl::RGBA8, gl::R16, gl::RG16, gl::RGBA16,
    gl::R16F, gl::RG16F, gl::RGBA16F, gl::R32F, gl::RG32F, gl::RGB32F, gl::RGBA32F,
    gl::R8I, gl::R8UI, gl::RG8I, gl::RG8UI, gl::RGBA8I, gl::RGBA8UI,
    gl::R16I, gl::R16UI, gl::RG16I, gl::RG16UI, gl::RGBA16I, gl::RGBA16UI,
    gl::R32I, gl::R32UI, gl::RG32I, gl::RG32UI, gl::RGB32I, gl::RGB32UI,
    gl::RGBA32I, gl::RGBA32UI,
];

/// Formats only accepted with the RGB32 texture-buffer capability
const RGB32_FORMATS: &[u32] = &[gl::RGB32F, gl::RGB32I, gl::RGB32UI];

/// Whether `internal_format` can back a texture-buffer view
pub fn is_texture_buffer_format(internal_format: u32, rgb32: bool) -> bool {
    TEXTURE_BUFFER_FORMATS.contains(&internal_format)
        && (rgb32 || !RGB32_FORMATS.contains(&internal_format))
}

/// View attached to a texture: the buffer and the format it is read as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TexelView {
    pub buffer: BufferHandle,
    pub internal_format: u32,
}

#[derive(Debug, Default)]
pub struct SoftTexture {
    view: Option<TexelView>,
}

impl SoftTexture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> Option<TexelView> {
        self.view
    }

    /// Attach buffer storage; NONE detaches
    pub fn attach(&mut self, buffer: BufferHandle, internal_format: u32) {
        self.view = if buffer.is_none() {
            None
        } else {
            Some(TexelView { buffer, internal_format })
        };
    }

    /// Detach if the view reads `buffer`
    pub fn forget_buffer(&mut self, buffer: BufferHandle) {
        if self.view.is_some_and(|view| view.buffer == buffer) {
            self.view = None;
        }
    }
}
