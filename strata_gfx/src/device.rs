/// Device context - owns the driver and everything buffers share
///
/// A DeviceContext is created once per driver and handed to buffers as
/// `Rc<DeviceContext>`. It holds:
/// - the driver (behind a RefCell, all calls happen on one thread)
/// - the capabilities and workarounds detected at creation
/// - the binding cache (explicit per-context object, never global)
/// - the format-mapping layer
/// - a validity flag cleared by `shutdown()`
///
/// Buffers outlive neither the driver nor the context: each buffer keeps
/// its own `Rc`, so the driver is dropped after the last buffer.

use std::cell::{Cell, RefCell, RefMut};
use std::rc::Rc;
use crate::buffer::{BufferDesc, GraphicsBuffer};
use crate::driver::{
    BindStats, BindingCache, BufferHandle, BufferTarget, Capabilities, DeviceFeatures, Driver,
    DriverInfo, ElementFormat, FormatMapping, GlFormatMapping, NativeFormat,
    ScopedTextureBufferBind, TextureHandle, Workarounds,
};
use crate::error::{Error, Result};
use crate::{engine_bail, engine_info};

// ===== CONFIGURATION =====

/// Options applied when a device context is created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Capabilities masked out of the driver's report (forces lower tiers)
    pub disabled_capabilities: Capabilities,
    /// Workarounds enabled regardless of detection
    pub forced_workarounds: Workarounds,
    /// Run vendor-string workaround detection
    pub detect_workarounds: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            disabled_capabilities: Capabilities::empty(),
            forced_workarounds: Workarounds::empty(),
            detect_workarounds: true,
        }
    }
}

impl DeviceConfig {
    /// Config that masks out the given capabilities
    pub fn without(capabilities: Capabilities) -> Self {
        Self { disabled_capabilities: capabilities, ..Self::default() }
    }
}

// ===== DEVICE CONTEXT =====

/// Shared state of every buffer created on one driver
pub struct DeviceContext {
    driver: RefCell<Box<dyn Driver>>,
    info: DriverInfo,
    features: DeviceFeatures,
    format_mapping: Box<dyn FormatMapping>,
    bindings: RefCell<BindingCache>,
    valid: Cell<bool>,
}

impl DeviceContext {
    /// Create a context using the GL format table
    ///
    /// # Errors
    ///
    /// Returns `InitializationFailed` if the driver reports no core version.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use strata_gfx::strata::{DeviceConfig, DeviceContext};
    /// use strata_gfx_driver_soft::{SoftDriver, SoftDriverConfig};
    ///
    /// let ctx = DeviceContext::new(SoftDriver::new(SoftDriverConfig::full()), DeviceConfig::default())?;
    /// # Ok::<(), strata_gfx::strata::Error>(())
    /// ```
    pub fn new<D: Driver + 'static>(driver: D, config: DeviceConfig) -> Result<Rc<Self>> {
        Self::with_format_mapping(driver, config, GlFormatMapping)
    }

    /// Create a context with a custom format-mapping layer
    pub fn with_format_mapping<D, M>(driver: D, config: DeviceConfig, format_mapping: M) -> Result<Rc<Self>>
    where
        D: Driver + 'static,
        M: FormatMapping + 'static,
    {
        let info = driver.info().clone();
        if info.version.0 == 0 {
            engine_bail!("strata::DeviceContext", Error::InitializationFailed(format!(
                "driver '{}' reported no core version", info.renderer
            )));
        }

        let capabilities = Capabilities::detect(&info) - config.disabled_capabilities;
        let mut workarounds = config.forced_workarounds;
        if config.detect_workarounds {
            workarounds |= Workarounds::detect(&info);
        }
        let features = DeviceFeatures::new(capabilities, workarounds);

        engine_info!("strata::DeviceContext",
            "Device context created on {} / {} ({}.{}), capabilities {:?}, workarounds {:?}",
            info.vendor, info.renderer, info.version.0, info.version.1,
            features.capabilities, features.workarounds);

        Ok(Rc::new(Self {
            driver: RefCell::new(Box::new(driver)),
            info,
            features,
            format_mapping: Box::new(format_mapping),
            bindings: RefCell::new(BindingCache::new()),
            valid: Cell::new(true),
        }))
    }

    /// Create a buffer and realize it immediately
    pub fn create_buffer(self: &Rc<Self>, desc: BufferDesc, data: Option<&[u8]>) -> Result<GraphicsBuffer> {
        let mut buffer = GraphicsBuffer::new(self.clone(), desc);
        buffer.realize(data)?;
        Ok(buffer)
    }

    // ===== ACCESSORS =====

    /// Capabilities and workarounds in effect
    pub fn features(&self) -> DeviceFeatures { self.features }

    pub fn capabilities(&self) -> Capabilities { self.features.capabilities }

    pub fn workarounds(&self) -> Workarounds { self.features.workarounds }

    /// Driver report captured at creation
    pub fn driver_info(&self) -> &DriverInfo { &self.info }

    /// False once `shutdown()` has run
    pub fn is_valid(&self) -> bool { self.valid.get() }

    /// Bind counters of the binding cache
    pub fn bind_stats(&self) -> BindStats {
        self.bindings.borrow().stats()
    }

    /// Buffer the cache records for a slot
    pub fn bound_buffer(&self, target: BufferTarget) -> BufferHandle {
        self.bindings.borrow().bound_buffer(target)
    }

    /// Texture the cache records for the texture-buffer slot
    pub fn bound_texture_buffer(&self) -> TextureHandle {
        self.bindings.borrow().bound_texture_buffer()
    }

    /// Invalidate the context
    ///
    /// Buffers still alive can only be released afterwards; their storage
    /// is deleted through the bare driver and the cache is left alone.
    pub fn shutdown(&self) {
        if !self.valid.replace(false) {
            return;
        }
        self.bindings.borrow_mut().clear();
        engine_info!("strata::DeviceContext", "Device context shut down");
    }

    // ===== INTERNAL =====

    /// Fail with InvalidState once the context has been shut down
    pub(crate) fn ensure_valid(&self, source: &str) -> Result<()> {
        if !self.is_valid() {
            engine_bail!(source, Error::InvalidState("device context has been shut down".to_string()));
        }
        Ok(())
    }

    pub(crate) fn driver(&self) -> RefMut<'_, Box<dyn Driver>> {
        self.driver.borrow_mut()
    }

    /// Bind a buffer through the cache
    pub(crate) fn bind_buffer(&self, target: BufferTarget, handle: BufferHandle, force: bool) {
        let mut driver = self.driver.borrow_mut();
        self.bindings.borrow_mut().bind_buffer(driver.as_mut(), target, handle, force);
    }

    /// Run `f` with a texture bound directly to the texture-buffer slot
    pub(crate) fn with_raw_texture_buffer<R>(
        &self,
        texture: TextureHandle,
        f: impl FnOnce(&mut ScopedTextureBufferBind<'_>) -> R,
    ) -> R {
        let mut driver = self.driver.borrow_mut();
        let bindings = self.bindings.borrow();
        let mut scope = bindings.raw_texture_buffer_scope(driver.as_mut(), texture);
        f(&mut scope)
    }

    /// Delete storage; bypasses the cache once the context is invalid
    pub(crate) fn delete_buffer(&self, handle: BufferHandle) {
        let mut driver = self.driver.borrow_mut();
        if self.is_valid() {
            self.bindings.borrow_mut().delete_buffers(driver.as_mut(), &[handle]);
        } else {
            driver.delete_buffers(&[handle]);
        }
    }

    pub(crate) fn delete_texture(&self, handle: TextureHandle) {
        let mut driver = self.driver.borrow_mut();
        if self.is_valid() {
            self.bindings.borrow_mut().delete_textures(driver.as_mut(), &[handle]);
        } else {
            driver.delete_textures(&[handle]);
        }
    }

    pub(crate) fn map_format(&self, format: ElementFormat) -> Option<NativeFormat> {
        self.format_mapping.map_format(format)
    }
}

#[cfg(test)]
#[path = "device_tests.rs"]
mod tests;
