/// Call statistics and the shared monitor of a software driver

use std::cell::RefCell;
use std::rc::Rc;
use colored::*;
use strata_gfx::strata::driver::{BufferHandle, BufferTarget, TextureHandle, UsageHint};

use crate::soft_buffer::SoftMapping;
use crate::soft_driver::SoftState;
use crate::soft_texture::TexelView;

/// Counters of driver activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SoftStats {
    /// Bind calls that reached the driver (buffer and texture slots)
    pub bind_calls: u64,
    /// Binds of names that were never generated or already deleted
    pub invalid_binds: u64,
    pub allocations: u64,
    pub bytes_allocated: u64,
    /// Partial uploads (sub-data calls)
    pub uploads: u64,
    /// Whole-buffer maps
    pub maps: u64,
    pub range_maps: u64,
    /// Range maps that swapped in fresh storage
    pub orphans: u64,
    pub unmaps: u64,
    pub device_copies: u64,
    /// Calls rejected with a GL-style error
    pub gl_errors: u64,
}

/// Read-only view of a software driver's state
///
/// Stays usable after the driver has moved into a device context, which
/// is how tests observe handle accounting and storage contents.
#[derive(Clone)]
pub struct SoftMonitor {
    state: Rc<RefCell<SoftState>>,
}

impl SoftMonitor {
    pub(crate) fn new(state: Rc<RefCell<SoftState>>) -> Self {
        Self { state }
    }

    /// Number of live buffer names
    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffer_names.len() as usize
    }

    /// Number of live texture names
    pub fn live_textures(&self) -> usize {
        self.state.borrow().texture_names.len() as usize
    }

    /// Whether every buffer and texture name has been deleted
    pub fn is_idle(&self) -> bool {
        let state = self.state.borrow();
        state.buffer_names.is_empty() && state.texture_names.is_empty()
    }

    pub fn stats(&self) -> SoftStats {
        self.state.borrow().stats
    }

    /// Copy of a buffer's storage
    ///
    /// None if it has no storage, or while it is mapped: the mapping may
    /// hold the only mutable reference to the bytes.
    pub fn buffer_contents(&self, handle: BufferHandle) -> Option<Vec<u8>> {
        let state = self.state.borrow();
        state.buffers.get(&handle.0)
            .filter(|buffer| buffer.is_allocated() && !buffer.is_mapped())
            .map(|buffer| buffer.bytes().to_vec())
    }

    /// Usage hint of a buffer's storage, None if it has none
    pub fn buffer_usage(&self, handle: BufferHandle) -> Option<UsageHint> {
        self.state.borrow().buffers.get(&handle.0).and_then(|buffer| buffer.usage())
    }

    /// Current mapping of a buffer
    pub fn mapping(&self, handle: BufferHandle) -> Option<SoftMapping> {
        self.state.borrow().buffers.get(&handle.0).and_then(|buffer| buffer.mapping())
    }

    pub fn is_mapped(&self, handle: BufferHandle) -> bool {
        self.mapping(handle).is_some()
    }

    /// Buffer the driver has bound to a slot
    pub fn bound_buffer(&self, target: BufferTarget) -> BufferHandle {
        self.state.borrow().bound_buffer(target)
    }

    /// Texture the driver has bound to the texture-buffer slot
    pub fn bound_texture_buffer(&self) -> TextureHandle {
        self.state.borrow().texture_buffer
    }

    /// View attached to a texture
    pub fn texture_view(&self, texture: TextureHandle) -> Option<TexelView> {
        self.state.borrow().textures.get(&texture.0).and_then(|t| t.view())
    }

    /// Print live objects and counters to the console
    pub fn print_report(&self) {
        let stats = self.stats();

        println!("\n{}", "=== Soft Driver Report ===".bright_blue().bold());
        println!("  {} {}", "Live buffers:".white().bold(), self.live_buffers());
        println!("  {} {}", "Live textures:".white().bold(), self.live_textures());
        println!("  {} {} ({} bytes)", "Allocations:".cyan(), stats.allocations, stats.bytes_allocated);
        println!("  {} {}", "Uploads:".cyan(), stats.uploads);
        println!("  {} {} full, {} range ({} orphaned), {} unmaps",
            "Maps:".cyan(), stats.maps, stats.range_maps, stats.orphans, stats.unmaps);
        println!("  {} {}", "Device copies:".cyan(), stats.device_copies);
        println!("  {} {}", "Bind calls:".cyan(), stats.bind_calls);

        if stats.invalid_binds > 0 {
            println!("  {} {}", "Invalid binds:".yellow().bold(), stats.invalid_binds);
        }
        if stats.gl_errors > 0 {
            println!("  {} {}", "GL errors:".red().bold(), stats.gl_errors);
        }

        println!("{}\n", "==========================".bright_blue().bold());
    }
}
