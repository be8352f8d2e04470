/// SoftDriver - CPU emulation of a GL-style buffer driver
///
/// Emulates the buffer and texture-buffer entry points of a GL driver with
/// GL's error rules: calls on unbound slots, mapped buffers or missing
/// storage fail with INVALID_OPERATION, bad ranges with INVALID_VALUE, and
/// unknown formats with INVALID_ENUM. Errors come back as
/// `Error::BackendError` (or `OutOfMemory`) and are counted in `SoftStats`.
///
/// Entry points outside the configured capability tier fail with
/// `Error::Unsupported`, so code that picks the wrong tier is caught.
/// Three-component 32-bit view formats fail with INVALID_ENUM unless the
/// tier includes `TEXTURE_BUFFER_RGB32`.

use std::cell::RefCell;
use std::ptr::NonNull;
use std::rc::Rc;
use rustc_hash::FxHashMap;
use strata_gfx::strata::driver::{
    BufferHandle, BufferTarget, Capabilities, Driver, DriverInfo, MapAccess, MapRangeFlags,
    TextureHandle, UsageHint,
};
use strata_gfx::strata::{Error, Result};
use strata_gfx::{engine_debug, engine_info, engine_trace};

use crate::name_allocator::NameAllocator;
use crate::soft_buffer::{SoftBuffer, SoftMapping};
use crate::soft_config::SoftDriverConfig;
use crate::soft_stats::{SoftMonitor, SoftStats};
use crate::soft_texture::{is_texture_buffer_format, SoftTexture};

// ============================================================================
// GL error helpers
// ============================================================================

fn gl_error(stats: &mut SoftStats, code: &str, message: String) -> Error {
    stats.gl_errors += 1;
    engine_debug!("strata::soft", "{}: {}", code, message);
    Error::BackendError(format!("{}: {}", code, message))
}

fn live_buffer<'a>(
    buffers: &'a mut FxHashMap<u32, SoftBuffer>,
    stats: &mut SoftStats,
    handle: BufferHandle,
) -> Result<&'a mut SoftBuffer> {
    match buffers.get_mut(&handle.0) {
        Some(buffer) => Ok(buffer),
        None => Err(gl_error(stats, "GL_INVALID_OPERATION", format!("{} does not exist", handle))),
    }
}

fn check_range(stats: &mut SoftStats, offset: u64, length: u64, size: usize) -> Result<(usize, usize)> {
    match offset.checked_add(length) {
        Some(end) if end <= size as u64 => Ok((offset as usize, end as usize)),
        _ => Err(gl_error(stats, "GL_INVALID_VALUE", format!(
            "range {}+{} exceeds buffer size {}", offset, length, size
        ))),
    }
}

// ============================================================================
// Driver state
// ============================================================================

/// Objects, bindings and counters of one software driver
#[derive(Default)]
pub(crate) struct SoftState {
    pub(crate) buffers: FxHashMap<u32, SoftBuffer>,
    pub(crate) textures: FxHashMap<u32, SoftTexture>,
    pub(crate) buffer_names: NameAllocator,
    pub(crate) texture_names: NameAllocator,
    bindings: FxHashMap<BufferTarget, BufferHandle>,
    pub(crate) texture_buffer: TextureHandle,
    pub(crate) stats: SoftStats,
}

impl SoftState {
    pub(crate) fn bound_buffer(&self, target: BufferTarget) -> BufferHandle {
        self.bindings.get(&target).copied().unwrap_or(BufferHandle::NONE)
    }

    fn resolve(&mut self, target: BufferTarget) -> Result<BufferHandle> {
        let handle = self.bound_buffer(target);
        if handle.is_none() {
            return Err(gl_error(&mut self.stats, "GL_INVALID_OPERATION",
                format!("no buffer bound to {:?}", target)));
        }
        Ok(handle)
    }

    // ===== BUFFERS =====

    fn gen_buffer(&mut self) -> BufferHandle {
        let name = self.buffer_names.alloc();
        self.buffers.insert(name, SoftBuffer::new());
        BufferHandle(name)
    }

    fn delete_buffer(&mut self, handle: BufferHandle) {
        if self.buffers.remove(&handle.0).is_none() {
            return;
        }
        self.buffer_names.free(handle.0);
        for bound in self.bindings.values_mut() {
            if *bound == handle {
                *bound = BufferHandle::NONE;
            }
        }
        for texture in self.textures.values_mut() {
            texture.forget_buffer(handle);
        }
    }

    fn bind_buffer(&mut self, target: BufferTarget, handle: BufferHandle) {
        self.stats.bind_calls += 1;
        if !handle.is_none() && !self.buffers.contains_key(&handle.0) {
            self.stats.invalid_binds += 1;
            gl_error(&mut self.stats, "GL_INVALID_OPERATION",
                format!("bind of unknown {} to {:?}", handle, target));
            return;
        }
        self.bindings.insert(target, handle);
    }

    fn allocate(
        &mut self,
        handle: BufferHandle,
        size: u64,
        data: Option<&[u8]>,
        usage: UsageHint,
        max_size: u64,
    ) -> Result<()> {
        let buffer = live_buffer(&mut self.buffers, &mut self.stats, handle)?;
        if buffer.is_mapped() {
            return Err(gl_error(&mut self.stats, "GL_INVALID_OPERATION", format!("{} is mapped", handle)));
        }
        if data.is_some_and(|data| data.len() as u64 != size) {
            return Err(gl_error(&mut self.stats, "GL_INVALID_VALUE",
                format!("data length does not match size {}", size)));
        }
        if size > max_size {
            self.stats.gl_errors += 1;
            engine_debug!("strata::soft", "GL_OUT_OF_MEMORY: {} bytes requested for {}", size, handle);
            return Err(Error::OutOfMemory);
        }

        buffer.allocate(size as usize, data, usage);
        self.stats.allocations += 1;
        self.stats.bytes_allocated += size;
        engine_trace!("strata::soft", "Allocated {} bytes for {} ({:?})", size, handle, usage);
        Ok(())
    }

    fn sub_data(&mut self, handle: BufferHandle, offset: u64, data: &[u8]) -> Result<()> {
        let buffer = live_buffer(&mut self.buffers, &mut self.stats, handle)?;
        if !buffer.is_allocated() || buffer.is_mapped() {
            return Err(gl_error(&mut self.stats, "GL_INVALID_OPERATION",
                format!("{} has no storage or is mapped", handle)));
        }
        let (start, end) = check_range(&mut self.stats, offset, data.len() as u64, buffer.len())?;

        buffer.bytes_mut()[start..end].copy_from_slice(data);
        self.stats.uploads += 1;
        Ok(())
    }

    fn map(
        &mut self,
        handle: BufferHandle,
        offset: u64,
        length: Option<u64>,
        range_flags: Option<MapRangeFlags>,
    ) -> Result<NonNull<u8>> {
        let buffer = live_buffer(&mut self.buffers, &mut self.stats, handle)?;
        if !buffer.is_allocated() || buffer.is_empty() {
            return Err(gl_error(&mut self.stats, "GL_INVALID_OPERATION",
                format!("{} has no storage to map", handle)));
        }
        if buffer.is_mapped() {
            return Err(gl_error(&mut self.stats, "GL_INVALID_OPERATION", format!("{} is already mapped", handle)));
        }
        let length = length.unwrap_or(buffer.len() as u64);
        if length == 0 {
            return Err(gl_error(&mut self.stats, "GL_INVALID_VALUE", "zero-length map".to_string()));
        }
        let (start, end) = check_range(&mut self.stats, offset, length, buffer.len())?;

        if let Some(flags) = range_flags {
            let discards = MapRangeFlags::INVALIDATE_RANGE
                | MapRangeFlags::INVALIDATE_BUFFER
                | MapRangeFlags::UNSYNCHRONIZED;
            if !flags.intersects(MapRangeFlags::READ | MapRangeFlags::WRITE)
                || (flags.contains(MapRangeFlags::READ) && flags.intersects(discards))
            {
                return Err(gl_error(&mut self.stats, "GL_INVALID_OPERATION",
                    format!("invalid range map flags {:?}", flags)));
            }

            if flags.contains(MapRangeFlags::INVALIDATE_BUFFER) {
                buffer.orphan();
                self.stats.orphans += 1;
            } else if flags.contains(MapRangeFlags::INVALIDATE_RANGE) {
                buffer.invalidate(start, end - start);
            }
            self.stats.range_maps += 1;
        } else {
            self.stats.maps += 1;
        }

        buffer.set_mapping(Some(SoftMapping { offset, length, range: range_flags.is_some() }));
        Ok(buffer.pointer(start))
    }

    fn unmap(&mut self, handle: BufferHandle) -> Result<()> {
        let buffer = live_buffer(&mut self.buffers, &mut self.stats, handle)?;
        if !buffer.is_mapped() {
            return Err(gl_error(&mut self.stats, "GL_INVALID_OPERATION", format!("{} is not mapped", handle)));
        }
        buffer.set_mapping(None);
        self.stats.unmaps += 1;
        Ok(())
    }

    fn copy(
        &mut self,
        source: BufferHandle,
        destination: BufferHandle,
        read_offset: u64,
        write_offset: u64,
        size: u64,
    ) -> Result<()> {
        let bytes = {
            let buffer = live_buffer(&mut self.buffers, &mut self.stats, source)?;
            if !buffer.is_allocated() || buffer.is_mapped() {
                return Err(gl_error(&mut self.stats, "GL_INVALID_OPERATION",
                    format!("copy source {} has no storage or is mapped", source)));
            }
            let (start, end) = check_range(&mut self.stats, read_offset, size, buffer.len())?;
            buffer.bytes()[start..end].to_vec()
        };

        if source == destination {
            let overlaps = read_offset < write_offset.saturating_add(size)
                && write_offset < read_offset.saturating_add(size);
            if overlaps {
                return Err(gl_error(&mut self.stats, "GL_INVALID_VALUE",
                    "overlapping copy within one buffer".to_string()));
            }
        }

        let buffer = live_buffer(&mut self.buffers, &mut self.stats, destination)?;
        if !buffer.is_allocated() || buffer.is_mapped() {
            return Err(gl_error(&mut self.stats, "GL_INVALID_OPERATION",
                format!("copy destination {} has no storage or is mapped", destination)));
        }
        let (start, end) = check_range(&mut self.stats, write_offset, size, buffer.len())?;
        buffer.bytes_mut()[start..end].copy_from_slice(&bytes);
        self.stats.device_copies += 1;
        Ok(())
    }

    // ===== TEXTURES =====

    fn gen_texture(&mut self) -> TextureHandle {
        let name = self.texture_names.alloc();
        self.textures.insert(name, SoftTexture::new());
        TextureHandle(name)
    }

    fn delete_texture(&mut self, handle: TextureHandle) {
        if self.textures.remove(&handle.0).is_none() {
            return;
        }
        self.texture_names.free(handle.0);
        if self.texture_buffer == handle {
            self.texture_buffer = TextureHandle::NONE;
        }
    }

    fn bind_texture_buffer(&mut self, handle: TextureHandle) {
        self.stats.bind_calls += 1;
        if !handle.is_none() && !self.textures.contains_key(&handle.0) {
            self.stats.invalid_binds += 1;
            gl_error(&mut self.stats, "GL_INVALID_OPERATION", format!("bind of unknown {}", handle));
            return;
        }
        self.texture_buffer = handle;
    }

    fn attach(
        &mut self,
        texture: TextureHandle,
        internal_format: u32,
        buffer: BufferHandle,
        rgb32: bool,
    ) -> Result<()> {
        if !is_texture_buffer_format(internal_format, rgb32) {
            return Err(gl_error(&mut self.stats, "GL_INVALID_ENUM",
                format!("{:#x} is not a texture-buffer format", internal_format)));
        }
        if !buffer.is_none() && !self.buffers.contains_key(&buffer.0) {
            return Err(gl_error(&mut self.stats, "GL_INVALID_OPERATION", format!("{} does not exist", buffer)));
        }
        match self.textures.get_mut(&texture.0) {
            Some(soft_texture) => {
                soft_texture.attach(buffer, internal_format);
                Ok(())
            }
            None => Err(gl_error(&mut self.stats, "GL_INVALID_OPERATION", format!("{} does not exist", texture))),
        }
    }
}

// ============================================================================
// SoftDriver
// ============================================================================

/// Software implementation of the `Driver` trait
pub struct SoftDriver {
    info: DriverInfo,
    capabilities: Capabilities,
    max_buffer_size: u64,
    state: Rc<RefCell<SoftState>>,
}

impl SoftDriver {
    /// Create a driver reporting `config`
    pub fn new(config: SoftDriverConfig) -> Self {
        let info = config.driver_info();
        let capabilities = Capabilities::detect(&info);

        engine_info!("strata::soft", "Soft driver created: {} ({}.{}), capabilities {:?}",
            info.renderer, info.version.0, info.version.1, capabilities);

        Self {
            info,
            capabilities,
            max_buffer_size: config.max_buffer_size,
            state: Rc::new(RefCell::new(SoftState::default())),
        }
    }

    /// Shared read-only view of the driver's state
    pub fn monitor(&self) -> SoftMonitor {
        SoftMonitor::new(self.state.clone())
    }

    /// Capabilities implied by the driver report
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn accepts_rgb32(&self) -> bool {
        self.capabilities.contains(Capabilities::TEXTURE_BUFFER_RGB32)
    }

    fn require(&self, capability: Capabilities, entry_point: &str) -> Result<()> {
        if self.capabilities.contains(capability) {
            return Ok(());
        }
        let mut state = self.state.borrow_mut();
        state.stats.gl_errors += 1;
        engine_debug!("strata::soft", "{} called without {:?}", entry_point, capability);
        Err(Error::Unsupported(format!("{} requires {:?}", entry_point, capability)))
    }
}

// SAFETY: mapped pointers point into a buffer's word storage, which is only
// replaced by allocate/orphan (both rejected or impossible while mapped) or
// dropped by delete. Each buffer has at most one mapping.
unsafe impl Driver for SoftDriver {
    fn info(&self) -> &DriverInfo {
        &self.info
    }

    fn gen_buffer(&mut self) -> BufferHandle {
        self.state.borrow_mut().gen_buffer()
    }

    fn delete_buffers(&mut self, handles: &[BufferHandle]) {
        let mut state = self.state.borrow_mut();
        for handle in handles {
            state.delete_buffer(*handle);
        }
    }

    fn bind_buffer(&mut self, target: BufferTarget, handle: BufferHandle) {
        self.state.borrow_mut().bind_buffer(target, handle);
    }

    fn buffer_data(&mut self, target: BufferTarget, size: u64, data: Option<&[u8]>, usage: UsageHint) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let handle = state.resolve(target)?;
        state.allocate(handle, size, data, usage, self.max_buffer_size)
    }

    fn named_buffer_data(&mut self, handle: BufferHandle, size: u64, data: Option<&[u8]>, usage: UsageHint) -> Result<()> {
        self.require(Capabilities::DIRECT_STATE_ACCESS, "named_buffer_data")?;
        self.state.borrow_mut().allocate(handle, size, data, usage, self.max_buffer_size)
    }

    fn buffer_sub_data(&mut self, target: BufferTarget, offset: u64, data: &[u8]) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let handle = state.resolve(target)?;
        state.sub_data(handle, offset, data)
    }

    fn named_buffer_sub_data(&mut self, handle: BufferHandle, offset: u64, data: &[u8]) -> Result<()> {
        self.require(Capabilities::DIRECT_STATE_ACCESS, "named_buffer_sub_data")?;
        self.state.borrow_mut().sub_data(handle, offset, data)
    }

    fn map_buffer(&mut self, target: BufferTarget, _access: MapAccess) -> Result<NonNull<u8>> {
        let mut state = self.state.borrow_mut();
        let handle = state.resolve(target)?;
        state.map(handle, 0, None, None)
    }

    fn map_named_buffer(&mut self, handle: BufferHandle, _access: MapAccess) -> Result<NonNull<u8>> {
        self.require(Capabilities::DIRECT_STATE_ACCESS, "map_named_buffer")?;
        self.state.borrow_mut().map(handle, 0, None, None)
    }

    fn map_buffer_range(
        &mut self,
        target: BufferTarget,
        offset: u64,
        length: u64,
        flags: MapRangeFlags,
    ) -> Result<NonNull<u8>> {
        self.require(Capabilities::MAP_BUFFER_RANGE, "map_buffer_range")?;
        let mut state = self.state.borrow_mut();
        let handle = state.resolve(target)?;
        state.map(handle, offset, Some(length), Some(flags))
    }

    fn map_named_buffer_range(
        &mut self,
        handle: BufferHandle,
        offset: u64,
        length: u64,
        flags: MapRangeFlags,
    ) -> Result<NonNull<u8>> {
        self.require(Capabilities::DIRECT_STATE_ACCESS | Capabilities::MAP_BUFFER_RANGE, "map_named_buffer_range")?;
        self.state.borrow_mut().map(handle, offset, Some(length), Some(flags))
    }

    fn unmap_buffer(&mut self, target: BufferTarget) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let handle = state.resolve(target)?;
        state.unmap(handle)
    }

    fn unmap_named_buffer(&mut self, handle: BufferHandle) -> Result<()> {
        self.require(Capabilities::DIRECT_STATE_ACCESS, "unmap_named_buffer")?;
        self.state.borrow_mut().unmap(handle)
    }

    fn copy_buffer_sub_data(
        &mut self,
        read_target: BufferTarget,
        write_target: BufferTarget,
        read_offset: u64,
        write_offset: u64,
        size: u64,
    ) -> Result<()> {
        self.require(Capabilities::COPY_BUFFER, "copy_buffer_sub_data")?;
        let mut state = self.state.borrow_mut();
        let source = state.resolve(read_target)?;
        let destination = state.resolve(write_target)?;
        state.copy(source, destination, read_offset, write_offset, size)
    }

    fn gen_texture(&mut self) -> TextureHandle {
        self.state.borrow_mut().gen_texture()
    }

    fn delete_textures(&mut self, handles: &[TextureHandle]) {
        let mut state = self.state.borrow_mut();
        for handle in handles {
            state.delete_texture(*handle);
        }
    }

    fn bind_texture_buffer(&mut self, handle: TextureHandle) {
        self.state.borrow_mut().bind_texture_buffer(handle);
    }

    fn tex_buffer(&mut self, internal_format: u32, buffer: BufferHandle) -> Result<()> {
        self.require(Capabilities::TEXTURE_BUFFER, "tex_buffer")?;
        let mut state = self.state.borrow_mut();
        let texture = state.texture_buffer;
        if texture.is_none() {
            return Err(gl_error(&mut state.stats, "GL_INVALID_OPERATION",
                "no texture bound to the texture-buffer slot".to_string()));
        }
        state.attach(texture, internal_format, buffer, self.accepts_rgb32())
    }

    fn texture_buffer(&mut self, texture: TextureHandle, internal_format: u32, buffer: BufferHandle) -> Result<()> {
        self.require(Capabilities::DIRECT_STATE_ACCESS | Capabilities::TEXTURE_BUFFER, "texture_buffer")?;
        let rgb32 = self.accepts_rgb32();
        self.state.borrow_mut().attach(texture, internal_format, buffer, rgb32)
    }
}

#[cfg(test)]
#[path = "soft_driver_tests.rs"]
mod tests;
