/// Scoped CPU mapping of a GraphicsBuffer
///
/// A MapSession borrows its buffer, so the buffer cannot be released,
/// re-realized or dropped while the mapping is open. The mapping is closed
/// by `unmap()`, which reports the driver result, or by drop.

use std::fmt;
use std::ptr::NonNull;
use bytemuck::Pod;
use crate::buffer::{BufferAccess, GraphicsBuffer, MapStrategy};
use crate::error::{Error, Result};
use crate::{engine_bail, engine_err};

pub struct MapSession<'a> {
    buffer: &'a GraphicsBuffer,
    ptr: NonNull<u8>,
    len: usize,
    access: BufferAccess,
    strategy: MapStrategy,
    open: bool,
}

impl<'a> MapSession<'a> {
    pub(crate) fn new(
        buffer: &'a GraphicsBuffer,
        ptr: NonNull<u8>,
        len: usize,
        access: BufferAccess,
        strategy: MapStrategy,
    ) -> Self {
        Self { buffer, ptr, len, access, strategy, open: true }
    }

    /// Access mode requested at map time
    pub fn access(&self) -> BufferAccess { self.access }

    /// Strategy the mapping was made with
    pub fn strategy(&self) -> MapStrategy { self.strategy }

    /// Mapped length in bytes (the buffer size)
    pub fn len(&self) -> usize { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Mapped bytes
    ///
    /// After an invalidating map the contents are undefined until written.
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: the driver keeps `ptr` valid for `len` bytes until unmap,
        // and the session is the only handle to this mapping.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Mapped bytes, writable
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` for a ReadOnly mapping.
    pub fn as_mut_slice(&mut self) -> Result<&mut [u8]> {
        if !self.access.can_write() {
            engine_bail!("strata::MapSession",
                Error::InvalidState("mapping is read-only".to_string()));
        }
        // SAFETY: see `as_slice`; `&mut self` makes the borrow unique.
        Ok(unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) })
    }

    /// Mapped bytes viewed as `T` elements
    ///
    /// # Errors
    ///
    /// Returns `InvalidResource` when the mapped length is not a multiple
    /// of `size_of::<T>()` or the mapping is not aligned for `T`.
    pub fn as_pod<T: Pod>(&self) -> Result<&[T]> {
        bytemuck::try_cast_slice(self.as_slice()).map_err(|e| {
            engine_err!("strata::MapSession", Error::InvalidResource(format!(
                "cannot view {} mapped bytes as [{}]: {}",
                self.len, std::any::type_name::<T>(), e
            )))
        })
    }

    /// Writable mapped bytes viewed as `T` elements
    pub fn as_pod_mut<T: Pod>(&mut self) -> Result<&mut [T]> {
        let len = self.len;
        let bytes = self.as_mut_slice()?;
        bytemuck::try_cast_slice_mut(bytes).map_err(|e| {
            engine_err!("strata::MapSession", Error::InvalidResource(format!(
                "cannot view {} mapped bytes as [{}]: {}",
                len, std::any::type_name::<T>(), e
            )))
        })
    }

    /// Close the mapping and report the driver result
    pub fn unmap(mut self) -> Result<()> {
        self.close()
    }

    fn close(&mut self) -> Result<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.buffer.unmap_raw(self.strategy)
    }
}

impl fmt::Debug for MapSession<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapSession")
            .field("buffer", &self.buffer.handle())
            .field("len", &self.len)
            .field("access", &self.access)
            .field("strategy", &self.strategy)
            .finish()
    }
}

impl Drop for MapSession<'_> {
    fn drop(&mut self) {
        // Failures are already logged by the buffer
        let _ = self.close();
    }
}
