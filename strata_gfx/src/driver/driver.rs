/// Driver trait, object handles and the enums of the raw entry points

use std::fmt;
use std::ptr::NonNull;
use bitflags::bitflags;
use crate::error::Result;

// ===== HANDLES =====

/// Driver name of a buffer object (0 is "no buffer")
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u32);

impl BufferHandle {
    /// The null buffer, used to unbind a slot
    pub const NONE: BufferHandle = BufferHandle(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buffer#{}", self.0)
    }
}

/// Driver name of a texture object (0 is "no texture")
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    /// The null texture, used to unbind a slot
    pub const NONE: TextureHandle = TextureHandle(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "texture#{}", self.0)
    }
}

// ===== ENTRY POINT ENUMS =====

/// Buffer binding slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data
    Array,
    /// Index data
    ElementArray,
    /// Uniform block data
    Uniform,
    /// Source slot of a device-side copy
    CopyRead,
    /// Destination slot of a device-side copy
    CopyWrite,
}

/// Storage usage hint passed at allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageHint {
    StaticDraw,
    DynamicDraw,
}

/// Access requested by a whole-buffer map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapAccess {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

bitflags! {
    /// Access flags of a range map
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MapRangeFlags: u32 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        /// Previous contents of the range may be discarded
        const INVALIDATE_RANGE = 1 << 2;
        /// Previous contents of the whole buffer may be discarded
        const INVALIDATE_BUFFER = 1 << 3;
        const FLUSH_EXPLICIT = 1 << 4;
        const UNSYNCHRONIZED = 1 << 5;
    }
}

// ===== DRIVER INFO =====

/// Identification and version report of a driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverInfo {
    /// Vendor string (e.g. "Intel", "NVIDIA Corporation")
    pub vendor: String,
    /// Renderer string
    pub renderer: String,
    /// Core API version (major, minor)
    pub version: (u32, u32),
    /// Extension names (e.g. "GL_ARB_copy_buffer")
    pub extensions: Vec<String>,
}

impl DriverInfo {
    /// Whether the core version is at least `major.minor`
    pub fn version_at_least(&self, major: u32, minor: u32) -> bool {
        self.version >= (major, minor)
    }

    /// Whether the driver exposes the named extension
    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|ext| ext == name)
    }
}

// ===== DRIVER TRAIT =====

/// Raw GL-style driver entry points
///
/// Implemented by backends (e.g. `SoftDriver`). Entry points mirror the
/// two families of a GL driver: bind-relative calls that act on whatever is
/// bound to a target slot, and named calls (direct state access) that act
/// on a handle. Callers only use entry points whose capability the driver
/// reports; backends may fail the others.
///
/// All calls happen on the thread owning the device context.
///
/// # Safety
///
/// A pointer returned by any `map_*` call must stay valid for reads and
/// writes of the mapped length until the matching `unmap_*` call or until
/// the buffer is deleted, and must not alias any other live mapping.
pub unsafe trait Driver {
    /// Driver identification, version and extensions
    fn info(&self) -> &DriverInfo;

    /// Generate a fresh buffer name (no storage yet)
    fn gen_buffer(&mut self) -> BufferHandle;

    /// Delete buffers; bound slots holding them revert to NONE
    fn delete_buffers(&mut self, handles: &[BufferHandle]);

    /// Bind a buffer (or NONE) to a slot
    fn bind_buffer(&mut self, target: BufferTarget, handle: BufferHandle);

    /// Allocate storage for the buffer bound to `target`
    fn buffer_data(
        &mut self,
        target: BufferTarget,
        size: u64,
        data: Option<&[u8]>,
        usage: UsageHint,
    ) -> Result<()>;

    /// Allocate storage for a named buffer
    fn named_buffer_data(
        &mut self,
        handle: BufferHandle,
        size: u64,
        data: Option<&[u8]>,
        usage: UsageHint,
    ) -> Result<()>;

    /// Overwrite part of the buffer bound to `target`
    fn buffer_sub_data(&mut self, target: BufferTarget, offset: u64, data: &[u8]) -> Result<()>;

    /// Overwrite part of a named buffer
    fn named_buffer_sub_data(&mut self, handle: BufferHandle, offset: u64, data: &[u8]) -> Result<()>;

    /// Map the whole buffer bound to `target`
    fn map_buffer(&mut self, target: BufferTarget, access: MapAccess) -> Result<NonNull<u8>>;

    /// Map a whole named buffer
    fn map_named_buffer(&mut self, handle: BufferHandle, access: MapAccess) -> Result<NonNull<u8>>;

    /// Map a range of the buffer bound to `target`
    fn map_buffer_range(
        &mut self,
        target: BufferTarget,
        offset: u64,
        length: u64,
        flags: MapRangeFlags,
    ) -> Result<NonNull<u8>>;

    /// Map a range of a named buffer
    fn map_named_buffer_range(
        &mut self,
        handle: BufferHandle,
        offset: u64,
        length: u64,
        flags: MapRangeFlags,
    ) -> Result<NonNull<u8>>;

    /// Unmap the buffer bound to `target`
    fn unmap_buffer(&mut self, target: BufferTarget) -> Result<()>;

    /// Unmap a named buffer
    fn unmap_named_buffer(&mut self, handle: BufferHandle) -> Result<()>;

    /// Device-side copy between the buffers bound to two slots
    fn copy_buffer_sub_data(
        &mut self,
        read_target: BufferTarget,
        write_target: BufferTarget,
        read_offset: u64,
        write_offset: u64,
        size: u64,
    ) -> Result<()>;

    /// Generate a fresh texture name
    fn gen_texture(&mut self) -> TextureHandle;

    /// Delete textures; the texture-buffer slot reverts to NONE if it held one
    fn delete_textures(&mut self, handles: &[TextureHandle]);

    /// Bind a texture (or NONE) to the texture-buffer slot
    fn bind_texture_buffer(&mut self, handle: TextureHandle);

    /// Attach buffer storage to the texture bound to the texture-buffer slot
    fn tex_buffer(&mut self, internal_format: u32, buffer: BufferHandle) -> Result<()>;

    /// Attach buffer storage to a named texture
    fn texture_buffer(
        &mut self,
        texture: TextureHandle,
        internal_format: u32,
        buffer: BufferHandle,
    ) -> Result<()>;
}
