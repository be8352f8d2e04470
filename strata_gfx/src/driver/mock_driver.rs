/// Mock Driver for unit tests (no backend required)
///
/// Records every entry point call as a string and keeps just enough state
/// (names, bindings, byte storage) to let buffers be realized, mapped and
/// copied. The state is shared through `Rc<RefCell<_>>` so tests can inspect
/// it after the driver has moved into a device context.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::ptr::NonNull;
use std::rc::Rc;
use rustc_hash::FxHashMap;

use crate::driver::{
    BufferHandle, BufferTarget, Driver, DriverInfo, MapAccess, MapRangeFlags, TextureHandle,
    UsageHint,
};
use crate::error::{Error, Result};

// ============================================================================
// Mock State
// ============================================================================

#[derive(Debug, Default)]
pub struct MockState {
    /// Every call, in order
    pub calls: Vec<String>,
    pub live_buffers: BTreeSet<u32>,
    pub live_textures: BTreeSet<u32>,
    /// Storage words per buffer name, plus the byte size
    storage: FxHashMap<u32, (Vec<u128>, usize)>,
    bound: FxHashMap<BufferTarget, BufferHandle>,
    pub texture_buffer: TextureHandle,
    /// (buffer, internal format) attached to each texture
    pub views: FxHashMap<u32, (BufferHandle, u32)>,
    pub last_range_flags: Option<MapRangeFlags>,
    /// Fail every allocation with OutOfMemory
    pub fail_allocations: bool,
    /// Reject every texel-view attach with a backend error
    pub fail_views: bool,
    next_name: u32,
}

impl MockState {
    /// Number of recorded calls starting with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.calls.iter().filter(|call| call.starts_with(prefix)).count()
    }

    /// Contents of a buffer's storage
    pub fn bytes(&self, handle: BufferHandle) -> Option<Vec<u8>> {
        self.storage
            .get(&handle.0)
            .map(|(words, len)| bytemuck::cast_slice::<u128, u8>(words)[..*len].to_vec())
    }

    pub fn bound(&self, target: BufferTarget) -> BufferHandle {
        self.bound.get(&target).copied().unwrap_or(BufferHandle::NONE)
    }

    fn next(&mut self) -> u32 {
        self.next_name += 1;
        self.next_name
    }

    fn resolve(&self, target: BufferTarget) -> Result<BufferHandle> {
        let handle = self.bound(target);
        if handle.is_none() {
            return Err(Error::BackendError(format!("no buffer bound to {:?}", target)));
        }
        Ok(handle)
    }

    fn allocate(&mut self, handle: BufferHandle, size: u64, data: Option<&[u8]>) -> Result<()> {
        if self.fail_allocations {
            return Err(Error::OutOfMemory);
        }
        let len = size as usize;
        let mut words = vec![0u128; len.div_ceil(16)];
        if let Some(data) = data {
            bytemuck::cast_slice_mut::<u128, u8>(&mut words)[..len].copy_from_slice(data);
        }
        self.storage.insert(handle.0, (words, len));
        Ok(())
    }

    fn write(&mut self, handle: BufferHandle, offset: u64, data: &[u8]) -> Result<()> {
        let (words, len) = self.storage.get_mut(&handle.0)
            .ok_or_else(|| Error::BackendError(format!("{} has no storage", handle)))?;
        let start = offset as usize;
        let end = start + data.len();
        if end > *len {
            return Err(Error::BackendError("write out of range".to_string()));
        }
        bytemuck::cast_slice_mut::<u128, u8>(words)[start..end].copy_from_slice(data);
        Ok(())
    }

    fn pointer(&mut self, handle: BufferHandle) -> Result<NonNull<u8>> {
        let (words, _) = self.storage.get_mut(&handle.0)
            .ok_or_else(|| Error::BackendError(format!("{} has no storage", handle)))?;
        Ok(NonNull::new(words.as_mut_ptr() as *mut u8).unwrap_or(NonNull::dangling()))
    }
}

// ============================================================================
// Mock Driver
// ============================================================================

pub struct MockDriver {
    info: DriverInfo,
    state: Rc<RefCell<MockState>>,
}

impl MockDriver {
    pub fn new(info: DriverInfo) -> Self {
        Self { info, state: Rc::new(RefCell::new(MockState::default())) }
    }

    /// Mock reporting a core version and extensions
    pub fn with_version(vendor: &str, version: (u32, u32), extensions: &[&str]) -> Self {
        Self::new(DriverInfo {
            vendor: vendor.to_string(),
            renderer: "mock".to_string(),
            version,
            extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
        })
    }

    /// Mock with every capability (core 4.5 plus EXT direct state access)
    pub fn full() -> Self {
        Self::with_version("Mock", (4, 5), &["GL_EXT_direct_state_access"])
    }

    /// Mock with no optional capability (core 2.1)
    pub fn legacy() -> Self {
        Self::with_version("Mock", (2, 1), &[])
    }

    /// Shared state handle
    pub fn state(&self) -> Rc<RefCell<MockState>> {
        self.state.clone()
    }

    fn record(&self, call: String) {
        self.state.borrow_mut().calls.push(call);
    }
}

unsafe impl Driver for MockDriver {
    fn info(&self) -> &DriverInfo {
        &self.info
    }

    fn gen_buffer(&mut self) -> BufferHandle {
        let mut state = self.state.borrow_mut();
        let name = state.next();
        state.live_buffers.insert(name);
        state.calls.push("gen_buffer".to_string());
        BufferHandle(name)
    }

    fn delete_buffers(&mut self, handles: &[BufferHandle]) {
        let mut state = self.state.borrow_mut();
        for handle in handles {
            state.live_buffers.remove(&handle.0);
            state.storage.remove(&handle.0);
            for bound in state.bound.values_mut() {
                if *bound == *handle {
                    *bound = BufferHandle::NONE;
                }
            }
        }
        let names: Vec<u32> = handles.iter().map(|h| h.0).collect();
        state.calls.push(format!("delete_buffers({:?})", names));
    }

    fn bind_buffer(&mut self, target: BufferTarget, handle: BufferHandle) {
        let mut state = self.state.borrow_mut();
        state.bound.insert(target, handle);
        state.calls.push(format!("bind_buffer({:?}, {})", target, handle.0));
    }

    fn buffer_data(&mut self, target: BufferTarget, size: u64, data: Option<&[u8]>, usage: UsageHint) -> Result<()> {
        self.record(format!("buffer_data({:?}, {}, {:?})", target, size, usage));
        let mut state = self.state.borrow_mut();
        let handle = state.resolve(target)?;
        state.allocate(handle, size, data)
    }

    fn named_buffer_data(&mut self, handle: BufferHandle, size: u64, data: Option<&[u8]>, usage: UsageHint) -> Result<()> {
        self.record(format!("named_buffer_data({}, {}, {:?})", handle.0, size, usage));
        self.state.borrow_mut().allocate(handle, size, data)
    }

    fn buffer_sub_data(&mut self, target: BufferTarget, offset: u64, data: &[u8]) -> Result<()> {
        self.record(format!("buffer_sub_data({:?}, {}, {})", target, offset, data.len()));
        let mut state = self.state.borrow_mut();
        let handle = state.resolve(target)?;
        state.write(handle, offset, data)
    }

    fn named_buffer_sub_data(&mut self, handle: BufferHandle, offset: u64, data: &[u8]) -> Result<()> {
        self.record(format!("named_buffer_sub_data({}, {}, {})", handle.0, offset, data.len()));
        self.state.borrow_mut().write(handle, offset, data)
    }

    fn map_buffer(&mut self, target: BufferTarget, access: MapAccess) -> Result<NonNull<u8>> {
        self.record(format!("map_buffer({:?}, {:?})", target, access));
        let mut state = self.state.borrow_mut();
        let handle = state.resolve(target)?;
        state.pointer(handle)
    }

    fn map_named_buffer(&mut self, handle: BufferHandle, access: MapAccess) -> Result<NonNull<u8>> {
        self.record(format!("map_named_buffer({}, {:?})", handle.0, access));
        self.state.borrow_mut().pointer(handle)
    }

    fn map_buffer_range(&mut self, target: BufferTarget, offset: u64, length: u64, flags: MapRangeFlags) -> Result<NonNull<u8>> {
        self.record(format!("map_buffer_range({:?}, {}, {})", target, offset, length));
        let mut state = self.state.borrow_mut();
        state.last_range_flags = Some(flags);
        let handle = state.resolve(target)?;
        state.pointer(handle)
    }

    fn map_named_buffer_range(&mut self, handle: BufferHandle, offset: u64, length: u64, flags: MapRangeFlags) -> Result<NonNull<u8>> {
        self.record(format!("map_named_buffer_range({}, {}, {})", handle.0, offset, length));
        let mut state = self.state.borrow_mut();
        state.last_range_flags = Some(flags);
        state.pointer(handle)
    }

    fn unmap_buffer(&mut self, target: BufferTarget) -> Result<()> {
        self.record(format!("unmap_buffer({:?})", target));
        self.state.borrow().resolve(target).map(|_| ())
    }

    fn unmap_named_buffer(&mut self, handle: BufferHandle) -> Result<()> {
        self.record(format!("unmap_named_buffer({})", handle.0));
        Ok(())
    }

    fn copy_buffer_sub_data(
        &mut self,
        read_target: BufferTarget,
        write_target: BufferTarget,
        read_offset: u64,
        write_offset: u64,
        size: u64,
    ) -> Result<()> {
        self.record(format!(
            "copy_buffer_sub_data({:?}, {:?}, {}, {}, {})",
            read_target, write_target, read_offset, write_offset, size
        ));
        let mut state = self.state.borrow_mut();
        let source = state.resolve(read_target)?;
        let destination = state.resolve(write_target)?;
        let bytes = state.bytes(source)
            .ok_or_else(|| Error::BackendError("copy source has no storage".to_string()))?;
        let start = read_offset as usize;
        let end = start + size as usize;
        state.write(destination, write_offset, &bytes[start..end])
    }

    fn gen_texture(&mut self) -> TextureHandle {
        let mut state = self.state.borrow_mut();
        let name = state.next();
        state.live_textures.insert(name);
        state.calls.push("gen_texture".to_string());
        TextureHandle(name)
    }

    fn delete_textures(&mut self, handles: &[TextureHandle]) {
        let mut state = self.state.borrow_mut();
        for handle in handles {
            state.live_textures.remove(&handle.0);
            state.views.remove(&handle.0);
            if state.texture_buffer == *handle {
                state.texture_buffer = TextureHandle::NONE;
            }
        }
        let names: Vec<u32> = handles.iter().map(|h| h.0).collect();
        state.calls.push(format!("delete_textures({:?})", names));
    }

    fn bind_texture_buffer(&mut self, handle: TextureHandle) {
        let mut state = self.state.borrow_mut();
        state.texture_buffer = handle;
        state.calls.push(format!("bind_texture_buffer({})", handle.0));
    }

    fn tex_buffer(&mut self, internal_format: u32, buffer: BufferHandle) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(format!("tex_buffer({:#x}, {})", internal_format, buffer.0));
        let texture = state.texture_buffer;
        if texture.is_none() {
            return Err(Error::BackendError("no texture bound to the texture-buffer slot".to_string()));
        }
        if state.fail_views {
            return Err(Error::BackendError(format!("{:#x} rejected", internal_format)));
        }
        state.views.insert(texture.0, (buffer, internal_format));
        Ok(())
    }

    fn texture_buffer(&mut self, texture: TextureHandle, internal_format: u32, buffer: BufferHandle) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(format!("texture_buffer({}, {:#x}, {})", texture.0, internal_format, buffer.0));
        if state.fail_views {
            return Err(Error::BackendError(format!("{:#x} rejected", internal_format)));
        }
        state.views.insert(texture.0, (buffer, internal_format));
        Ok(())
    }
}
