/// Binding cache - skips redundant bind calls per target slot
///
/// The cache is owned by a device context and mirrors what the driver has
/// bound to each buffer slot and to the texture-buffer slot. Every bind
/// issued through it updates it. Binds that bypass it must go through
/// `ScopedTextureBufferBind`, which restores the cached binding on exit.

use rustc_hash::FxHashMap;
use crate::driver::{BufferHandle, BufferTarget, Driver, TextureHandle};
use crate::error::Result;

/// Counters of bind requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindStats {
    /// Binds forwarded to the driver
    pub issued: u64,
    /// Binds skipped because the slot already held the handle
    pub skipped: u64,
}

/// Per-context cache of slot bindings
#[derive(Debug, Default)]
pub struct BindingCache {
    buffers: FxHashMap<BufferTarget, BufferHandle>,
    texture_buffer: Option<TextureHandle>,
    stats: BindStats,
}

impl BindingCache {
    /// Create an empty cache (every slot holds NONE)
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer currently bound to a slot
    pub fn bound_buffer(&self, target: BufferTarget) -> BufferHandle {
        self.buffers.get(&target).copied().unwrap_or(BufferHandle::NONE)
    }

    /// Texture currently bound to the texture-buffer slot
    pub fn bound_texture_buffer(&self) -> TextureHandle {
        self.texture_buffer.unwrap_or(TextureHandle::NONE)
    }

    /// Bind counters since creation or the last `clear`
    pub fn stats(&self) -> BindStats {
        self.stats
    }

    /// Bind a buffer to a slot
    ///
    /// The driver call is skipped when the slot already holds `handle`,
    /// unless `force` is set. Afterwards the driver's binding for `target`
    /// is `handle` in both cases.
    pub fn bind_buffer(
        &mut self,
        driver: &mut dyn Driver,
        target: BufferTarget,
        handle: BufferHandle,
        force: bool,
    ) {
        if !force && self.bound_buffer(target) == handle {
            self.stats.skipped += 1;
            return;
        }

        driver.bind_buffer(target, handle);
        self.buffers.insert(target, handle);
        self.stats.issued += 1;
        crate::engine_trace!("strata::BindingCache", "bind {:?} <- {}", target, handle);
    }

    /// Bind a texture to the texture-buffer slot
    pub fn bind_texture_buffer(&mut self, driver: &mut dyn Driver, handle: TextureHandle, force: bool) {
        if !force && self.bound_texture_buffer() == handle {
            self.stats.skipped += 1;
            return;
        }

        driver.bind_texture_buffer(handle);
        self.texture_buffer = Some(handle);
        self.stats.issued += 1;
    }

    /// Delete buffers, forgetting every slot that holds one of them
    pub fn delete_buffers(&mut self, driver: &mut dyn Driver, handles: &[BufferHandle]) {
        for bound in self.buffers.values_mut() {
            if handles.contains(bound) {
                *bound = BufferHandle::NONE;
            }
        }
        driver.delete_buffers(handles);
    }

    /// Delete textures, forgetting the texture-buffer slot if it holds one
    pub fn delete_textures(&mut self, driver: &mut dyn Driver, handles: &[TextureHandle]) {
        if handles.contains(&self.bound_texture_buffer()) {
            self.texture_buffer = Some(TextureHandle::NONE);
        }
        driver.delete_textures(handles);
    }

    /// Bind a texture directly, bypassing the cache, for one configuration call
    pub fn raw_texture_buffer_scope<'a>(
        &self,
        driver: &'a mut dyn Driver,
        texture: TextureHandle,
    ) -> ScopedTextureBufferBind<'a> {
        ScopedTextureBufferBind::new(driver, texture, self.bound_texture_buffer())
    }

    /// Forget every binding and reset counters
    pub fn clear(&mut self) {
        self.buffers.clear();
        self.texture_buffer = None;
        self.stats = BindStats::default();
    }
}

/// Raw texture-buffer bind that the cache does not see
///
/// Contract: the cache must still be correct once this guard is gone. The
/// guard binds `texture` on creation and rebinds the handle the cache
/// recorded (`restore`) on drop, so callers must not touch the
/// texture-buffer slot through the cache while it is alive.
pub struct ScopedTextureBufferBind<'a> {
    driver: &'a mut dyn Driver,
    restore: TextureHandle,
}

impl<'a> ScopedTextureBufferBind<'a> {
    fn new(driver: &'a mut dyn Driver, texture: TextureHandle, restore: TextureHandle) -> Self {
        driver.bind_texture_buffer(texture);
        Self { driver, restore }
    }

    /// Attach buffer storage to the scoped texture
    pub fn tex_buffer(&mut self, internal_format: u32, buffer: BufferHandle) -> Result<()> {
        self.driver.tex_buffer(internal_format, buffer)
    }
}

impl Drop for ScopedTextureBufferBind<'_> {
    fn drop(&mut self) {
        self.driver.bind_texture_buffer(self.restore);
    }
}

#[cfg(test)]
#[path = "binding_cache_tests.rs"]
mod tests;
