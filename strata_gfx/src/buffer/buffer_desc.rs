/// Buffer descriptor and the enums it is built from

use bitflags::bitflags;
use crate::driver::{BufferTarget, ElementFormat, MapAccess, UsageHint};

// ===== USAGE =====

/// Update frequency of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Written once, read many times
    Static,
    /// Rewritten often from the CPU
    Dynamic,
}

impl BufferUsage {
    /// Usage hint passed to the driver at allocation
    pub fn usage_hint(self) -> UsageHint {
        match self {
            BufferUsage::Static => UsageHint::StaticDraw,
            BufferUsage::Dynamic => UsageHint::DynamicDraw,
        }
    }
}

// ===== ACCESS HINT =====

bitflags! {
    /// Who reads and writes the buffer
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessHint: u32 {
        const CPU_READ = 1 << 0;
        const CPU_WRITE = 1 << 1;
        /// Shaders read the buffer (enables the texel-buffer view)
        const GPU_READ = 1 << 2;
        const GPU_WRITE = 1 << 3;
        const GPU_UNORDERED = 1 << 4;
        const GPU_STRUCTURED = 1 << 5;
        const RAW = 1 << 6;
        const DRAW_INDIRECT = 1 << 7;
        const IMMUTABLE = 1 << 8;
    }
}

// ===== KIND =====

/// Binding target class of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
    Uniform,
}

impl BufferKind {
    /// Driver slot the buffer binds to
    pub fn target(self) -> BufferTarget {
        match self {
            BufferKind::Vertex => BufferTarget::Array,
            BufferKind::Index => BufferTarget::ElementArray,
            BufferKind::Uniform => BufferTarget::Uniform,
        }
    }
}

// ===== MAP ACCESS =====

/// Access mode of a CPU mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferAccess {
    ReadOnly,
    WriteOnly,
    ReadWrite,
    /// Write without disturbing ranges the GPU may still read (not supported)
    WriteNoOverwrite,
}

impl BufferAccess {
    /// Whole-buffer map access, None for unsupported modes
    pub fn map_access(self) -> Option<MapAccess> {
        match self {
            BufferAccess::ReadOnly => Some(MapAccess::ReadOnly),
            BufferAccess::WriteOnly => Some(MapAccess::WriteOnly),
            BufferAccess::ReadWrite => Some(MapAccess::ReadWrite),
            BufferAccess::WriteNoOverwrite => None,
        }
    }

    pub fn can_read(self) -> bool {
        matches!(self, BufferAccess::ReadOnly | BufferAccess::ReadWrite)
    }

    pub fn can_write(self) -> bool {
        !matches!(self, BufferAccess::ReadOnly)
    }
}

// ===== BUFFER DESC =====

/// Descriptor for creating a GraphicsBuffer
///
/// Immutable once the buffer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDesc {
    pub usage: BufferUsage,
    pub access_hint: AccessHint,
    /// Size in bytes
    pub size: u64,
    pub kind: BufferKind,
    /// Element format seen by shaders through the texel-buffer view
    pub shader_format: Option<ElementFormat>,
}

impl BufferDesc {
    /// Static buffer of `kind`, GPU-read only, no shader format
    pub fn new(kind: BufferKind, size: u64) -> Self {
        Self {
            usage: BufferUsage::Static,
            access_hint: AccessHint::GPU_READ,
            size,
            kind,
            shader_format: None,
        }
    }

    pub fn vertex(size: u64) -> Self {
        Self::new(BufferKind::Vertex, size)
    }

    pub fn index(size: u64) -> Self {
        Self::new(BufferKind::Index, size)
    }

    pub fn uniform(size: u64) -> Self {
        Self::new(BufferKind::Uniform, size)
    }

    pub fn with_usage(mut self, usage: BufferUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_access_hint(mut self, access_hint: AccessHint) -> Self {
        self.access_hint = access_hint;
        self
    }

    pub fn with_shader_format(mut self, format: ElementFormat) -> Self {
        self.shader_format = Some(format);
        self
    }

    /// Whether a texel-buffer view is wanted for this buffer
    pub fn wants_texel_view(&self) -> bool {
        self.access_hint.contains(AccessHint::GPU_READ) && self.shader_format.is_some()
    }
}
