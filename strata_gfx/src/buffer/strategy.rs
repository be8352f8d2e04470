/// Capability-gated strategy lists
///
/// Every buffer operation that can run several ways declares its variants
/// as an enum whose `TIERS` list is ordered fastest first. `select` walks
/// the list once per operation and returns the first variant the device
/// supports. Adding a tier means adding a variant and its predicate; the
/// operations themselves only match on the chosen variant.

use std::fmt;
use crate::buffer::{BufferAccess, BufferUsage};
use crate::driver::{Capabilities, DeviceFeatures, Workarounds};

/// One way of carrying out an operation
pub trait Strategy: Copy + fmt::Debug + 'static {
    /// Per-call inputs the predicates look at
    type Request;

    /// Candidates, fastest first
    const TIERS: &'static [Self];

    /// Whether this tier can run on `features` for `request`
    fn is_applicable(&self, features: &DeviceFeatures, request: &Self::Request) -> bool;
}

/// First applicable tier, None if no tier applies
pub fn select<S: Strategy>(features: &DeviceFeatures, request: &S::Request) -> Option<S> {
    S::TIERS.iter().copied().find(|tier| tier.is_applicable(features, request))
}

// ===== ENTRY POINT =====

/// Named (no bind) or bind-relative driver entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    Named,
    Bound,
}

impl Strategy for EntryPoint {
    type Request = ();

    const TIERS: &'static [Self] = &[EntryPoint::Named, EntryPoint::Bound];

    fn is_applicable(&self, features: &DeviceFeatures, _request: &()) -> bool {
        match self {
            EntryPoint::Named => features.has(Capabilities::DIRECT_STATE_ACCESS),
            EntryPoint::Bound => true,
        }
    }
}

impl EntryPoint {
    /// Entry point family for plain upload/allocate/unmap calls
    pub fn select(features: &DeviceFeatures) -> Self {
        select(features, &()).unwrap_or(EntryPoint::Bound)
    }
}

// ===== MAP =====

/// Inputs of a map strategy choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapRequest {
    pub access: BufferAccess,
    pub usage: BufferUsage,
}

/// How a buffer gets mapped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapStrategy {
    /// Named range map invalidating the whole buffer
    NamedRange,
    /// Bound range map invalidating the whole buffer
    BoundRange,
    /// Named whole-buffer map
    NamedFull,
    /// Bound whole-buffer map
    BoundFull,
}

impl Strategy for MapStrategy {
    type Request = MapRequest;

    const TIERS: &'static [Self] = &[
        MapStrategy::NamedRange,
        MapStrategy::BoundRange,
        MapStrategy::NamedFull,
        MapStrategy::BoundFull,
    ];

    fn is_applicable(&self, features: &DeviceFeatures, request: &MapRequest) -> bool {
        if self.uses_range() && !Self::range_allowed(features, request) {
            return false;
        }
        match self.entry_point() {
            EntryPoint::Named => features.has(Capabilities::DIRECT_STATE_ACCESS),
            EntryPoint::Bound => true,
        }
    }
}

impl MapStrategy {
    /// Entry point family used to map and later unmap
    pub fn entry_point(self) -> EntryPoint {
        match self {
            MapStrategy::NamedRange | MapStrategy::NamedFull => EntryPoint::Named,
            MapStrategy::BoundRange | MapStrategy::BoundFull => EntryPoint::Bound,
        }
    }

    /// Whether the strategy maps through the invalidating range call
    pub fn uses_range(self) -> bool {
        matches!(self, MapStrategy::NamedRange | MapStrategy::BoundRange)
    }

    // Contents are discarded, so only full write-only maps of dynamic buffers qualify
    fn range_allowed(features: &DeviceFeatures, request: &MapRequest) -> bool {
        features.has(Capabilities::MAP_BUFFER_RANGE)
            && !features.needs(Workarounds::SLOW_MAP_RANGE)
            && request.access == BufferAccess::WriteOnly
            && request.usage == BufferUsage::Dynamic
    }
}

// ===== COPY =====

/// How buffer-to-buffer copies run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStrategy {
    /// Single device-side copy between the copy slots
    DeviceCopy,
    /// Map both buffers and copy on the CPU
    CpuCopy,
}

impl Strategy for CopyStrategy {
    type Request = ();

    const TIERS: &'static [Self] = &[CopyStrategy::DeviceCopy, CopyStrategy::CpuCopy];

    fn is_applicable(&self, features: &DeviceFeatures, _request: &()) -> bool {
        match self {
            CopyStrategy::DeviceCopy => features.has(Capabilities::COPY_BUFFER),
            CopyStrategy::CpuCopy => true,
        }
    }
}

// ===== TEXEL VIEW =====

/// How a texel-buffer view gets attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexelViewStrategy {
    /// Attach storage to the named texture
    Named,
    /// Bind the texture directly, attach, restore the cached binding
    Bound,
}

impl Strategy for TexelViewStrategy {
    type Request = ();

    const TIERS: &'static [Self] = &[TexelViewStrategy::Named, TexelViewStrategy::Bound];

    fn is_applicable(&self, features: &DeviceFeatures, _request: &()) -> bool {
        if !features.has(Capabilities::TEXTURE_BUFFER) {
            return false;
        }
        match self {
            TexelViewStrategy::Named => features.has(Capabilities::DIRECT_STATE_ACCESS),
            TexelViewStrategy::Bound => true,
        }
    }
}

#[cfg(test)]
#[path = "strategy_tests.rs"]
mod tests;
