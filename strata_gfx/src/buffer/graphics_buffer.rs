/// GraphicsBuffer - lazily realized linear GPU buffer
///
/// A GraphicsBuffer owns at most one storage handle and at most one
/// texel-buffer view over that storage. Storage only exists between
/// `realize()` and `release()`; a buffer can be realized again after a
/// release (e.g. after device loss). The view never outlives the storage.
///
/// Every operation picks its code path from the device's capabilities
/// through the strategy lists in `strategy.rs`.

use std::cell::Cell;
use std::rc::Rc;
use crate::buffer::strategy::{self, CopyStrategy, EntryPoint, MapRequest, MapStrategy, TexelViewStrategy};
use crate::buffer::{AccessHint, BufferAccess, BufferDesc, BufferKind, BufferUsage, MapSession};
use crate::device::DeviceContext;
use crate::driver::{BufferHandle, BufferTarget, Capabilities, ElementFormat, MapRangeFlags, TextureHandle};
use crate::error::{Error, Result};
use crate::{engine_bail, engine_debug, engine_err, engine_trace, engine_warn};

pub struct GraphicsBuffer {
    ctx: Rc<DeviceContext>,
    desc: BufferDesc,
    handle: Option<BufferHandle>,
    view: Option<TextureHandle>,
    mapped: Cell<bool>,
}

impl GraphicsBuffer {
    /// Create an unrealized buffer (no driver call)
    pub fn new(ctx: Rc<DeviceContext>, desc: BufferDesc) -> Self {
        Self {
            ctx,
            desc,
            handle: None,
            view: None,
            mapped: Cell::new(false),
        }
    }

    // ===== LIFECYCLE =====

    /// Allocate storage, optionally seeded with `data`
    ///
    /// Creates the texel-buffer view as well when the descriptor asks for
    /// GPU reads with a shader format and the device supports views. A view
    /// the driver rejects is skipped with a warning; realize still succeeds.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the buffer is already realized
    /// - `InvalidResource` if the size is zero or `data` is not `size` bytes
    /// - any driver error; the storage name generated for this call is
    ///   deleted before returning
    pub fn realize(&mut self, data: Option<&[u8]>) -> Result<()> {
        self.ctx.ensure_valid("strata::GraphicsBuffer")?;

        if self.handle.is_some() {
            engine_bail!("strata::GraphicsBuffer",
                Error::InvalidState("buffer is already realized".to_string()));
        }
        if self.desc.size == 0 {
            engine_bail!("strata::GraphicsBuffer",
                Error::InvalidResource("buffer size must be greater than zero".to_string()));
        }
        if let Some(data) = data {
            if data.len() as u64 != self.desc.size {
                engine_bail!("strata::GraphicsBuffer", Error::InvalidResource(format!(
                    "initial data is {} bytes, buffer is {} bytes", data.len(), self.desc.size
                )));
            }
        }

        // ========== STORAGE ==========
        let handle = self.ctx.driver().gen_buffer();
        let size = self.desc.size;
        let hint = self.desc.usage.usage_hint();

        let allocated = match EntryPoint::select(&self.ctx.features()) {
            EntryPoint::Named => self.ctx.driver().named_buffer_data(handle, size, data, hint),
            EntryPoint::Bound => {
                let target = self.target();
                self.ctx.bind_buffer(target, handle, false);
                self.ctx.driver().buffer_data(target, size, data, hint)
            }
        };
        if let Err(e) = allocated {
            self.ctx.delete_buffer(handle);
            return Err(engine_err!("strata::GraphicsBuffer", e));
        }
        self.handle = Some(handle);

        // ========== TEXEL VIEW ==========
        if self.desc.wants_texel_view() {
            self.create_texel_view(handle);
        }

        engine_debug!("strata::GraphicsBuffer", "Realized {} ({:?}, {} bytes, view {:?})",
            handle, self.desc.kind, size, self.view);
        Ok(())
    }

    /// Attach a texel-buffer view to `buffer` if the device can
    ///
    /// The view is optional: whatever goes wrong here leaves the storage
    /// intact and the buffer without a view.
    fn create_texel_view(&mut self, buffer: BufferHandle) {
        let Some(format) = self.desc.shader_format else {
            return;
        };
        let features = self.ctx.features();
        let Some(strategy) = strategy::select::<TexelViewStrategy>(&features, &()) else {
            engine_debug!("strata::GraphicsBuffer",
                "Texture-buffer views unsupported, {} gets no view", buffer);
            return;
        };
        let Some(native) = self.ctx.map_format(format) else {
            engine_warn!("strata::GraphicsBuffer",
                "No native format for {:?}, {} gets no view", format, buffer);
            return;
        };
        if native.is_rgb32() && !features.has(Capabilities::TEXTURE_BUFFER_RGB32) {
            engine_debug!("strata::GraphicsBuffer",
                "{:?} views need RGB32 texture buffers, {} gets no view", format, buffer);
            return;
        }

        let texture = self.ctx.driver().gen_texture();
        let attached = match strategy {
            TexelViewStrategy::Named => {
                self.ctx.driver().texture_buffer(texture, native.internal_format, buffer)
            }
            TexelViewStrategy::Bound => self.ctx.with_raw_texture_buffer(texture, |scope| {
                scope.tex_buffer(native.internal_format, buffer)
            }),
        };
        match attached {
            Ok(()) => self.view = Some(texture),
            Err(e) => {
                self.ctx.delete_texture(texture);
                engine_warn!("strata::GraphicsBuffer",
                    "Texel view for {} rejected ({}), buffer kept without a view", buffer, e);
            }
        }
    }

    /// Delete the view, then the storage
    ///
    /// Idempotent. Once the device context has been shut down the handles
    /// go to the bare driver instead of through the binding cache.
    pub fn release(&mut self) {
        let view = self.view.take();
        let handle = self.handle.take();
        self.mapped.set(false);

        if let Some(view) = view {
            self.ctx.delete_texture(view);
        }
        if let Some(handle) = handle {
            self.ctx.delete_buffer(handle);
            engine_debug!("strata::GraphicsBuffer", "Released {} (view {:?})", handle, view);
        }
    }

    // ===== MAPPING =====

    /// Map the whole buffer for CPU access
    ///
    /// A WriteOnly map of a Dynamic buffer may orphan the storage: the
    /// mapped contents are undefined until written.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the buffer is unrealized or already mapped
    /// - `Unsupported` for `BufferAccess::WriteNoOverwrite`
    /// - any driver error
    pub fn map(&self, access: BufferAccess) -> Result<MapSession<'_>> {
        self.ctx.ensure_valid("strata::GraphicsBuffer")?;
        let handle = self.realized_handle()?;

        if self.mapped.get() {
            engine_bail!("strata::GraphicsBuffer",
                Error::InvalidState(format!("{} is already mapped", handle)));
        }
        let Some(map_access) = access.map_access() else {
            engine_bail!("strata::GraphicsBuffer",
                Error::Unsupported(format!("{:?} mapping", access)));
        };

        let request = MapRequest { access, usage: self.desc.usage };
        let strategy = strategy::select::<MapStrategy>(&self.ctx.features(), &request)
            .unwrap_or(MapStrategy::BoundFull);
        let size = self.desc.size;
        let range_flags = MapRangeFlags::WRITE | MapRangeFlags::INVALIDATE_BUFFER;

        let mapped = match strategy {
            MapStrategy::NamedRange => {
                self.ctx.driver().map_named_buffer_range(handle, 0, size, range_flags)
            }
            MapStrategy::BoundRange => {
                self.ctx.bind_buffer(self.target(), handle, false);
                self.ctx.driver().map_buffer_range(self.target(), 0, size, range_flags)
            }
            MapStrategy::NamedFull => self.ctx.driver().map_named_buffer(handle, map_access),
            MapStrategy::BoundFull => {
                self.ctx.bind_buffer(self.target(), handle, false);
                self.ctx.driver().map_buffer(self.target(), map_access)
            }
        };
        let ptr = mapped.map_err(|e| engine_err!("strata::GraphicsBuffer", e))?;

        self.mapped.set(true);
        engine_trace!("strata::GraphicsBuffer", "Mapped {} {:?} via {:?}", handle, access, strategy);
        Ok(MapSession::new(self, ptr, size as usize, access, strategy))
    }

    /// Close the mapping made with `strategy`
    pub(crate) fn unmap_raw(&self, strategy: MapStrategy) -> Result<()> {
        self.mapped.set(false);
        let Some(handle) = self.handle else {
            return Ok(());
        };

        let result = match strategy.entry_point() {
            EntryPoint::Named => self.ctx.driver().unmap_named_buffer(handle),
            EntryPoint::Bound => {
                self.ctx.bind_buffer(self.target(), handle, false);
                self.ctx.driver().unmap_buffer(self.target())
            }
        };
        result.map_err(|e| engine_err!("strata::GraphicsBuffer", e))
    }

    /// Copy the whole buffer into a new vector
    pub fn read_back(&self) -> Result<Vec<u8>> {
        let session = self.map(BufferAccess::ReadOnly)?;
        let bytes = session.as_slice().to_vec();
        session.unmap()?;
        Ok(bytes)
    }

    // ===== BINDING =====

    /// Bind the storage to the descriptor's target slot
    ///
    /// The driver call is skipped when the binding cache already records
    /// this buffer in the slot, unless `force` is set.
    pub fn active(&self, force: bool) -> Result<()> {
        self.ctx.ensure_valid("strata::GraphicsBuffer")?;
        let handle = self.realized_handle()?;
        self.ctx.bind_buffer(self.target(), handle, force);
        Ok(())
    }

    // ===== TRANSFER =====

    /// Copy `size()` bytes into the start of `dest`
    ///
    /// # Errors
    ///
    /// - `InvalidState` if either buffer is unrealized or mapped
    /// - `InvalidResource` if `dest` is this buffer, belongs to another
    ///   device context, or is smaller than this buffer
    pub fn copy_to_buffer(&self, dest: &GraphicsBuffer) -> Result<()> {
        self.ctx.ensure_valid("strata::GraphicsBuffer")?;

        if std::ptr::eq(self, dest) {
            engine_bail!("strata::GraphicsBuffer",
                Error::InvalidResource("cannot copy a buffer onto itself".to_string()));
        }
        if !Rc::ptr_eq(&self.ctx, &dest.ctx) {
            engine_bail!("strata::GraphicsBuffer",
                Error::InvalidResource("buffers belong to different device contexts".to_string()));
        }
        let source = self.realized_handle()?;
        let destination = dest.realized_handle()?;
        if self.mapped.get() || dest.mapped.get() {
            engine_bail!("strata::GraphicsBuffer",
                Error::InvalidState("cannot copy while a buffer is mapped".to_string()));
        }
        if dest.desc.size < self.desc.size {
            engine_bail!("strata::GraphicsBuffer", Error::InvalidResource(format!(
                "destination is {} bytes, source is {} bytes", dest.desc.size, self.desc.size
            )));
        }

        let strategy = strategy::select::<CopyStrategy>(&self.ctx.features(), &())
            .unwrap_or(CopyStrategy::CpuCopy);
        engine_trace!("strata::GraphicsBuffer", "Copy {} -> {} via {:?}", source, destination, strategy);

        match strategy {
            CopyStrategy::DeviceCopy => {
                self.ctx.bind_buffer(BufferTarget::CopyRead, source, false);
                self.ctx.bind_buffer(BufferTarget::CopyWrite, destination, false);
                self.ctx.driver()
                    .copy_buffer_sub_data(BufferTarget::CopyRead, BufferTarget::CopyWrite, 0, 0, self.desc.size)
                    .map_err(|e| engine_err!("strata::GraphicsBuffer", e))
            }
            CopyStrategy::CpuCopy => {
                // A larger destination keeps its tail, so it must not be invalidated
                let dest_access = if dest.desc.size == self.desc.size {
                    BufferAccess::WriteOnly
                } else {
                    BufferAccess::ReadWrite
                };
                let reader = self.map(BufferAccess::ReadOnly)?;
                let mut writer = dest.map(dest_access)?;
                let len = reader.len();
                writer.as_mut_slice()?[..len].copy_from_slice(reader.as_slice());
                writer.unmap()?;
                reader.unmap()
            }
        }
    }

    /// Overwrite `[offset, offset + data.len())` without mapping
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the buffer is unrealized or mapped
    /// - `InvalidResource` if the range does not fit in the buffer
    pub fn update_subresource(&self, offset: u64, data: &[u8]) -> Result<()> {
        self.ctx.ensure_valid("strata::GraphicsBuffer")?;
        let handle = self.realized_handle()?;

        if self.mapped.get() {
            engine_bail!("strata::GraphicsBuffer",
                Error::InvalidState(format!("{} is mapped", handle)));
        }
        let end = offset.checked_add(data.len() as u64);
        if end.map_or(true, |end| end > self.desc.size) {
            engine_bail!("strata::GraphicsBuffer", Error::InvalidResource(format!(
                "update of {} bytes at offset {} exceeds buffer size {}",
                data.len(), offset, self.desc.size
            )));
        }
        if data.is_empty() {
            return Ok(());
        }

        let result = match EntryPoint::select(&self.ctx.features()) {
            EntryPoint::Named => self.ctx.driver().named_buffer_sub_data(handle, offset, data),
            EntryPoint::Bound => {
                self.ctx.bind_buffer(self.target(), handle, false);
                self.ctx.driver().buffer_sub_data(self.target(), offset, data)
            }
        };
        result.map_err(|e| engine_err!("strata::GraphicsBuffer", e))
    }

    // ===== ACCESSORS =====

    pub fn desc(&self) -> &BufferDesc { &self.desc }

    /// Size in bytes
    pub fn size(&self) -> u64 { self.desc.size }

    pub fn usage(&self) -> BufferUsage { self.desc.usage }

    pub fn access_hint(&self) -> AccessHint { self.desc.access_hint }

    pub fn kind(&self) -> BufferKind { self.desc.kind }

    pub fn shader_format(&self) -> Option<ElementFormat> { self.desc.shader_format }

    /// Storage handle, None until realized
    pub fn handle(&self) -> Option<BufferHandle> { self.handle }

    /// Texel-buffer view handle, None if no view was created
    pub fn view_handle(&self) -> Option<TextureHandle> { self.view }

    pub fn is_realized(&self) -> bool { self.handle.is_some() }

    pub fn is_mapped(&self) -> bool { self.mapped.get() }

    pub fn context(&self) -> &Rc<DeviceContext> { &self.ctx }

    /// Number of shader-format elements the buffer holds
    pub fn texel_count(&self) -> Option<u64> {
        self.desc.shader_format
            .map(|format| self.desc.size / u64::from(format.size_bytes()))
    }

    // ===== INTERNAL =====

    fn target(&self) -> BufferTarget {
        self.desc.kind.target()
    }

    fn realized_handle(&self) -> Result<BufferHandle> {
        match self.handle {
            Some(handle) => Ok(handle),
            None => Err(engine_err!("strata::GraphicsBuffer",
                Error::InvalidState("buffer is not realized".to_string()))),
        }
    }
}

impl Drop for GraphicsBuffer {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
#[path = "graphics_buffer_tests.rs"]
mod tests;
