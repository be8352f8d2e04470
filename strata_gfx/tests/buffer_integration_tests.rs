//! Integration tests for GraphicsBuffer on the software driver
//!
//! Every capability tier must give the same observable results; only the
//! driver calls differ. No GPU required.
//!
//! Run with: cargo test --test buffer_integration_tests


use strata_gfx::glam::Vec4;
use strata_gfx::strata::buffer::{
    AccessHint, BufferAccess, BufferDesc, BufferUsage, GraphicsBuffer, MapStrategy,
};
use strata_gfx::strata::driver::{
    gl, BufferTarget, Capabilities, ElementFormat, FormatMapping, GlFormatMapping, NativeFormat, UsageHint,
    Workarounds,
};
use strata_gfx::strata::{DeviceConfig, DeviceContext, Error};
use strata_gfx_driver_soft::{SoftDriver, SoftDriverConfig, TexelView, POISON};
use soft_test_utils::{
    all_tiers, full_context, legacy_context, pattern, soft_context, soft_context_with, tier_context,
};

fn dynamic_vertex(size: u64) -> BufferDesc {
    BufferDesc::vertex(size).with_usage(BufferUsage::Dynamic)
}

fn texel_desc(size: u64) -> BufferDesc {
    BufferDesc::vertex(size).with_shader_format(ElementFormat::R32G32B32A32_SFLOAT)
}

// ============================================================================
// LIFECYCLE
// ============================================================================

#[test]
fn test_integration_realize_uploads_initial_data() {
    for (name, config) in all_tiers() {
        let (ctx, monitor) = soft_context(config);
        let data = pattern(48, 3);

        let buffer = ctx.create_buffer(BufferDesc::index(48), Some(&data)).unwrap();

        let handle = buffer.handle().unwrap();
        assert_eq!(monitor.buffer_contents(handle), Some(data), "tier {}", name);
        assert_eq!(monitor.buffer_usage(handle), Some(UsageHint::StaticDraw), "tier {}", name);
    }
}

#[test]
fn test_integration_realize_without_data_keeps_size() {
    let (ctx, monitor) = legacy_context();
    let buffer = ctx.create_buffer(dynamic_vertex(20), None).unwrap();

    let contents = monitor.buffer_contents(buffer.handle().unwrap()).unwrap();
    assert_eq!(contents.len(), 20);
    assert_eq!(monitor.buffer_usage(buffer.handle().unwrap()), Some(UsageHint::DynamicDraw));
}

#[test]
fn test_integration_every_handle_is_returned() {
    for (name, config) in all_tiers() {
        let (ctx, monitor) = soft_context(config);
        {
            let _plain = ctx.create_buffer(BufferDesc::uniform(64), None).unwrap();
            let _viewed = ctx.create_buffer(texel_desc(64), None).unwrap();
            assert_eq!(monitor.live_buffers(), 2, "tier {}", name);
        }
        assert!(monitor.is_idle(), "tier {} leaked driver objects", name);
    }
}

#[test]
fn test_integration_release_twice_and_realize_again() {
    let (ctx, monitor) = full_context();
    let mut buffer = ctx.create_buffer(texel_desc(32), None).unwrap();

    buffer.release();
    buffer.release();
    assert!(monitor.is_idle());
    assert!(!buffer.is_realized());

    let data = pattern(32, 100);
    buffer.realize(Some(&data)).unwrap();
    assert_eq!(buffer.read_back().unwrap(), data);
    assert!(buffer.view_handle().is_some());
}

#[test]
fn test_integration_out_of_memory_leaks_nothing() {
    let (ctx, monitor) = soft_context(SoftDriverConfig::legacy().with_max_buffer_size(64));

    let result = ctx.create_buffer(BufferDesc::vertex(128), None);

    assert_eq!(result.err(), Some(Error::OutOfMemory));
    assert!(monitor.is_idle());
}

#[test]
fn test_integration_zero_size_is_rejected() {
    let (ctx, monitor) = full_context();
    let result = ctx.create_buffer(BufferDesc::vertex(0), None);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert_eq!(monitor.stats().allocations, 0);
}

// ============================================================================
// TEXEL VIEWS
// ============================================================================

#[test]
fn test_integration_texel_view_follows_capability() {
    for (name, config) in all_tiers() {
        let (ctx, monitor) = soft_context(config);
        let buffer = ctx.create_buffer(texel_desc(64), None).unwrap();

        let expected = ctx.capabilities().contains(Capabilities::TEXTURE_BUFFER);
        assert_eq!(buffer.view_handle().is_some(), expected, "tier {}", name);

        if let Some(view) = buffer.view_handle() {
            let attached = TexelView { buffer: buffer.handle().unwrap(), internal_format: gl::RGBA32F };
            assert_eq!(monitor.texture_view(view), Some(attached), "tier {}", name);
        }
        assert_eq!(monitor.bound_texture_buffer(), ctx.bound_texture_buffer(), "tier {}", name);
    }
}

#[test]
fn test_integration_no_view_without_gpu_read() {
    let (ctx, monitor) = full_context();
    let desc = texel_desc(64).with_access_hint(AccessHint::CPU_WRITE);

    let buffer = ctx.create_buffer(desc, None).unwrap();

    assert!(buffer.view_handle().is_none());
    assert_eq!(monitor.live_textures(), 0);
}

#[test]
fn test_integration_no_view_without_texel_format() {
    let (ctx, monitor) = full_context();
    let desc = BufferDesc::vertex(64).with_shader_format(ElementFormat::B8G8R8A8_UNORM);

    let buffer = ctx.create_buffer(desc, None).unwrap();

    assert!(buffer.is_realized());
    assert!(buffer.view_handle().is_none());
    assert_eq!(monitor.live_textures(), 0);
}

/// GL table, except RGBA32F maps to RGB8, which texel views reject
struct Rgb8Mapping;

impl FormatMapping for Rgb8Mapping {
    fn map_format(&self, format: ElementFormat) -> Option<NativeFormat> {
        match format {
            ElementFormat::R32G32B32A32_SFLOAT => Some(NativeFormat::new(0x8051, gl::RGB, gl::UNSIGNED_BYTE)),
            other => GlFormatMapping.map_format(other),
        }
    }
}

#[test]
fn test_integration_rejected_view_format_keeps_buffer() {
    let driver = SoftDriver::new(SoftDriverConfig::full());
    let monitor = driver.monitor();
    let ctx = DeviceContext::with_format_mapping(driver, DeviceConfig::default(), Rgb8Mapping).unwrap();
    let data = pattern(64, 11);

    let buffer = ctx.create_buffer(texel_desc(64), Some(&data)).unwrap();

    assert!(buffer.is_realized());
    assert_eq!(buffer.view_handle(), None);
    assert_eq!(monitor.live_buffers(), 1);
    assert_eq!(monitor.live_textures(), 0);
    assert_eq!(buffer.read_back().unwrap(), data);
}

#[test]
fn test_integration_rgb32_view_follows_capability() {
    let desc = BufferDesc::vertex(48).with_shader_format(ElementFormat::R32G32B32_SFLOAT);
    let tiers = [
        ("core 3.1", SoftDriverConfig::core(3, 1), false),
        ("texture_buffer", SoftDriverConfig::tier(Capabilities::TEXTURE_BUFFER), false),
        (
            "texture_buffer_rgb32",
            SoftDriverConfig::tier(Capabilities::TEXTURE_BUFFER | Capabilities::TEXTURE_BUFFER_RGB32),
            true,
        ),
        ("core 4.0", SoftDriverConfig::core(4, 0), true),
        ("full", SoftDriverConfig::full(), true),
    ];

    for (name, config, has_view) in tiers {
        let (ctx, monitor) = soft_context(config);
        let buffer = ctx.create_buffer(desc, None).unwrap();

        assert!(buffer.is_realized(), "tier {}", name);
        assert_eq!(buffer.view_handle().is_some(), has_view, "tier {}", name);
        assert_eq!(monitor.live_textures(), usize::from(has_view), "tier {}", name);
        assert_eq!(monitor.stats().gl_errors, 0, "tier {}", name);
    }
}

#[test]
fn test_integration_core_4_5_without_ext_dsa_uses_bound_calls() {
    let (ctx, monitor) = soft_context(SoftDriverConfig::core(4, 5));
    let data = pattern(32, 5);

    let buffer = ctx.create_buffer(texel_desc(32), Some(&data)).unwrap();
    buffer.update_subresource(0, &[1, 2, 3, 4]).unwrap();

    assert!(!ctx.capabilities().contains(Capabilities::DIRECT_STATE_ACCESS));
    assert!(buffer.view_handle().is_some());
    assert_eq!(&buffer.read_back().unwrap()[..4], &[1, 2, 3, 4]);
    assert_eq!(monitor.stats().gl_errors, 0);
}

#[test]
fn test_integration_texel_count() {
    let (ctx, _monitor) = legacy_context();
    let buffer = ctx.create_buffer(texel_desc(64), None).unwrap();
    assert_eq!(buffer.texel_count(), Some(4));
}

// ============================================================================
// MAPPING
// ============================================================================

#[test]
fn test_integration_map_round_trip() {
    for (name, config) in all_tiers() {
        let (ctx, monitor) = soft_context(config);
        let buffer = ctx.create_buffer(dynamic_vertex(40), None).unwrap();
        let data = pattern(40, 7);

        let mut session = buffer.map(BufferAccess::WriteOnly).unwrap();
        session.as_mut_slice().unwrap().copy_from_slice(&data);
        session.unmap().unwrap();

        assert_eq!(buffer.read_back().unwrap(), data, "tier {}", name);
        assert!(!monitor.is_mapped(buffer.handle().unwrap()), "tier {}", name);
    }
}

#[test]
fn test_integration_fast_path_orphans_storage() {
    let (ctx, monitor) = full_context();
    let buffer = ctx.create_buffer(dynamic_vertex(16), Some(&[1; 16])).unwrap();

    let mut session = buffer.map(BufferAccess::WriteOnly).unwrap();
    assert_eq!(session.strategy(), MapStrategy::NamedRange);
    session.as_mut_slice().unwrap()[..4].copy_from_slice(&[9, 9, 9, 9]);
    session.unmap().unwrap();

    let contents = buffer.read_back().unwrap();
    assert_eq!(&contents[..4], &[9, 9, 9, 9]);
    assert!(contents[4..].iter().all(|byte| *byte == POISON));
    assert_eq!(monitor.stats().orphans, 1);
}

#[test]
fn test_integration_bound_fast_path() {
    let (ctx, monitor) = tier_context(Capabilities::MAP_BUFFER_RANGE);
    let buffer = ctx.create_buffer(dynamic_vertex(16), None).unwrap();

    let session = buffer.map(BufferAccess::WriteOnly).unwrap();
    assert_eq!(session.strategy(), MapStrategy::BoundRange);
    drop(session);

    assert_eq!(monitor.stats().range_maps, 1);
    assert_eq!(monitor.stats().unmaps, 1);
    assert_eq!(monitor.bound_buffer(BufferTarget::Array), buffer.handle().unwrap());
}

#[test]
fn test_integration_fallback_preserves_contents() {
    let (ctx, monitor) = legacy_context();
    let buffer = ctx.create_buffer(dynamic_vertex(8), Some(&[1; 8])).unwrap();

    let mut session = buffer.map(BufferAccess::WriteOnly).unwrap();
    assert_eq!(session.strategy(), MapStrategy::BoundFull);
    session.as_mut_slice().unwrap()[0] = 2;
    session.unmap().unwrap();

    assert_eq!(buffer.read_back().unwrap(), vec![2, 1, 1, 1, 1, 1, 1, 1]);
    assert_eq!(monitor.stats().orphans, 0);
}

#[test]
fn test_integration_static_buffer_never_orphans() {
    let (ctx, monitor) = full_context();
    let buffer = ctx.create_buffer(BufferDesc::vertex(8), Some(&[5; 8])).unwrap();

    let session = buffer.map(BufferAccess::WriteOnly).unwrap();
    assert_eq!(session.strategy(), MapStrategy::NamedFull);
    session.unmap().unwrap();

    assert_eq!(buffer.read_back().unwrap(), vec![5; 8]);
    assert_eq!(monitor.stats().orphans, 0);
}

#[test]
fn test_integration_intel_avoids_range_maps() {
    let (ctx, monitor) = soft_context(SoftDriverConfig::full().with_vendor("Intel"));
    assert!(ctx.workarounds().contains(Workarounds::SLOW_MAP_RANGE));
    let buffer = ctx.create_buffer(dynamic_vertex(8), None).unwrap();

    let session = buffer.map(BufferAccess::WriteOnly).unwrap();

    assert_eq!(session.strategy(), MapStrategy::NamedFull);
    drop(session);
    assert_eq!(monitor.stats().range_maps, 0);
}

#[test]
fn test_integration_disabled_capability_is_not_used() {
    let (ctx, monitor) = soft_context_with(
        SoftDriverConfig::full(),
        DeviceConfig::without(Capabilities::MAP_BUFFER_RANGE | Capabilities::DIRECT_STATE_ACCESS),
    );
    let buffer = ctx.create_buffer(dynamic_vertex(8), None).unwrap();

    let session = buffer.map(BufferAccess::WriteOnly).unwrap();

    assert_eq!(session.strategy(), MapStrategy::BoundFull);
    drop(session);
    assert_eq!(monitor.stats().range_maps, 0);
    assert_eq!(monitor.stats().gl_errors, 0);
}

#[test]
fn test_integration_dropped_session_unmaps() {
    let (ctx, monitor) = full_context();
    let buffer = ctx.create_buffer(dynamic_vertex(8), None).unwrap();
    {
        let _session = buffer.map(BufferAccess::ReadWrite).unwrap();
        assert!(monitor.is_mapped(buffer.handle().unwrap()));
        assert!(buffer.is_mapped());
    }
    assert!(!monitor.is_mapped(buffer.handle().unwrap()));
    assert!(!buffer.is_mapped());
}

#[test]
fn test_integration_second_map_is_rejected() {
    let (ctx, monitor) = full_context();
    let buffer = ctx.create_buffer(dynamic_vertex(8), None).unwrap();

    let _session = buffer.map(BufferAccess::ReadOnly).unwrap();
    let second = buffer.map(BufferAccess::ReadOnly);

    assert!(matches!(second, Err(Error::InvalidState(_))));
    assert_eq!(monitor.stats().gl_errors, 0);
}

#[test]
fn test_integration_vec4_through_mapping() {
    for (name, config) in all_tiers() {
        let (ctx, _monitor) = soft_context(config);
        let buffer = ctx.create_buffer(BufferDesc::uniform(32).with_usage(BufferUsage::Dynamic), None).unwrap();

        let mut session = buffer.map(BufferAccess::WriteOnly).unwrap();
        let vectors = session.as_pod_mut::<Vec4>().unwrap();
        vectors[0] = Vec4::new(1.0, 2.0, 3.0, 4.0);
        vectors[1] = Vec4::splat(0.5);
        session.unmap().unwrap();

        let session = buffer.map(BufferAccess::ReadOnly).unwrap();
        assert_eq!(session.as_pod::<Vec4>().unwrap(), &[Vec4::new(1.0, 2.0, 3.0, 4.0), Vec4::splat(0.5)],
            "tier {}", name);
    }
}

#[test]
fn test_integration_read_only_session_refuses_writes() {
    let (ctx, _monitor) = legacy_context();
    let buffer = ctx.create_buffer(BufferDesc::vertex(8), None).unwrap();

    let mut session = buffer.map(BufferAccess::ReadOnly).unwrap();

    assert!(matches!(session.as_mut_slice(), Err(Error::InvalidState(_))));
}

// ============================================================================
// BINDING
// ============================================================================

#[test]
fn test_integration_active_binds_kind_target() {
    let (ctx, monitor) = full_context();
    let vertices = ctx.create_buffer(BufferDesc::vertex(16), None).unwrap();
    let indices = ctx.create_buffer(BufferDesc::index(16), None).unwrap();
    let uniforms = ctx.create_buffer(BufferDesc::uniform(16), None).unwrap();

    vertices.active(false).unwrap();
    indices.active(false).unwrap();
    uniforms.active(false).unwrap();

    assert_eq!(monitor.bound_buffer(BufferTarget::Array), vertices.handle().unwrap());
    assert_eq!(monitor.bound_buffer(BufferTarget::ElementArray), indices.handle().unwrap());
    assert_eq!(monitor.bound_buffer(BufferTarget::Uniform), uniforms.handle().unwrap());
}

#[test]
fn test_integration_redundant_binds_are_skipped() {
    let (ctx, monitor) = full_context();
    let buffer = ctx.create_buffer(BufferDesc::vertex(16), None).unwrap();
    let before = monitor.stats().bind_calls;

    buffer.active(false).unwrap();
    buffer.active(false).unwrap();
    assert_eq!(monitor.stats().bind_calls, before + 1);

    buffer.active(true).unwrap();
    assert_eq!(monitor.stats().bind_calls, before + 2);
    assert_eq!(ctx.bind_stats().skipped, 1);
}

#[test]
fn test_integration_unrealized_buffer_cannot_bind() {
    let (ctx, monitor) = full_context();
    let buffer = GraphicsBuffer::new(ctx.clone(), BufferDesc::vertex(16));

    assert!(matches!(buffer.active(false), Err(Error::InvalidState(_))));
    assert_eq!(monitor.stats().bind_calls, 0);
}

#[test]
fn test_integration_no_invalid_binds_after_release() {
    for (name, config) in all_tiers() {
        let (ctx, monitor) = soft_context(config);
        let mut first = ctx.create_buffer(BufferDesc::vertex(16), None).unwrap();
        first.active(false).unwrap();
        first.release();

        // The recycled name must be bound again rather than skipped
        let second = ctx.create_buffer(BufferDesc::vertex(16), None).unwrap();
        second.active(false).unwrap();

        assert_eq!(monitor.bound_buffer(BufferTarget::Array), second.handle().unwrap(), "tier {}", name);
        assert_eq!(monitor.stats().invalid_binds, 0, "tier {}", name);
    }
}

// ============================================================================
// COPY
// ============================================================================

#[test]
fn test_integration_copy_keeps_destination_tail() {
    for (name, config) in all_tiers() {
        let (ctx, monitor) = soft_context(config);
        let source = ctx.create_buffer(BufferDesc::vertex(16), Some(&pattern(16, 1))).unwrap();
        let dest = ctx.create_buffer(dynamic_vertex(24), Some(&[0xEE; 24])).unwrap();

        source.copy_to_buffer(&dest).unwrap();

        let mut expected = pattern(16, 1);
        expected.extend_from_slice(&[0xEE; 8]);
        assert_eq!(dest.read_back().unwrap(), expected, "tier {}", name);

        let device_copy = ctx.capabilities().contains(Capabilities::COPY_BUFFER);
        assert_eq!(monitor.stats().device_copies, u64::from(device_copy), "tier {}", name);
    }
}

#[test]
fn test_integration_copy_same_size() {
    for (name, config) in all_tiers() {
        let (ctx, _monitor) = soft_context(config);
        let source = ctx.create_buffer(BufferDesc::uniform(32), Some(&pattern(32, 50))).unwrap();
        let dest = ctx.create_buffer(BufferDesc::uniform(32).with_usage(BufferUsage::Dynamic), None).unwrap();

        source.copy_to_buffer(&dest).unwrap();

        assert_eq!(dest.read_back().unwrap(), pattern(32, 50), "tier {}", name);
    }
}

#[test]
fn test_integration_device_copy_matches_cpu_copy() {
    let copy_into_larger = |device: DeviceConfig| {
        let (ctx, monitor) = soft_context_with(SoftDriverConfig::full(), device);
        let source = ctx.create_buffer(BufferDesc::vertex(24), Some(&pattern(24, 9))).unwrap();
        let dest = ctx.create_buffer(dynamic_vertex(32), Some(&[3; 32])).unwrap();
        source.copy_to_buffer(&dest).unwrap();
        (dest.read_back().unwrap(), monitor.stats().device_copies)
    };

    let (on_device, device_copies) = copy_into_larger(DeviceConfig::default());
    let (on_cpu, cpu_device_copies) = copy_into_larger(DeviceConfig::without(Capabilities::COPY_BUFFER));

    assert_eq!(on_device, on_cpu);
    assert_eq!((device_copies, cpu_device_copies), (1, 0));
}

#[test]
fn test_integration_copy_rejects_smaller_destination() {
    let (ctx, monitor) = full_context();
    let source = ctx.create_buffer(BufferDesc::vertex(16), None).unwrap();
    let dest = ctx.create_buffer(BufferDesc::vertex(8), None).unwrap();

    assert!(matches!(source.copy_to_buffer(&dest), Err(Error::InvalidResource(_))));
    assert_eq!(monitor.stats().device_copies, 0);
}

#[test]
fn test_integration_copy_rejects_other_context() {
    let (ctx_a, _monitor_a) = full_context();
    let (ctx_b, _monitor_b) = full_context();
    let source = ctx_a.create_buffer(BufferDesc::vertex(16), None).unwrap();
    let dest = ctx_b.create_buffer(BufferDesc::vertex(16), None).unwrap();

    assert!(matches!(source.copy_to_buffer(&dest), Err(Error::InvalidResource(_))));
}

#[test]
fn test_integration_copy_rejects_mapped_buffer() {
    let (ctx, _monitor) = legacy_context();
    let source = ctx.create_buffer(BufferDesc::vertex(16), None).unwrap();
    let dest = ctx.create_buffer(BufferDesc::vertex(16), None).unwrap();

    let _session = dest.map(BufferAccess::ReadOnly).unwrap();

    assert!(matches!(source.copy_to_buffer(&dest), Err(Error::InvalidState(_))));
}

// ============================================================================
// UPDATE
// ============================================================================

#[test]
fn test_integration_update_matches_mapped_write() {
    for (name, config) in all_tiers() {
        let (ctx, _monitor) = soft_context(config);
        let initial = pattern(32, 0);
        let updated = ctx.create_buffer(BufferDesc::vertex(32), Some(&initial)).unwrap();
        let mapped = ctx.create_buffer(BufferDesc::vertex(32), Some(&initial)).unwrap();
        let patch = [0xAA; 6];

        updated.update_subresource(10, &patch).unwrap();

        let mut session = mapped.map(BufferAccess::ReadWrite).unwrap();
        session.as_mut_slice().unwrap()[10..16].copy_from_slice(&patch);
        session.unmap().unwrap();

        assert_eq!(updated.read_back().unwrap(), mapped.read_back().unwrap(), "tier {}", name);
    }
}

#[test]
fn test_integration_full_update_matches_write_only_map() {
    for (name, config) in all_tiers() {
        let (ctx, _monitor) = soft_context(config);
        let data = pattern(64, 200);
        let updated = ctx.create_buffer(dynamic_vertex(64), None).unwrap();
        let mapped = ctx.create_buffer(dynamic_vertex(64), None).unwrap();

        updated.update_subresource(0, &data).unwrap();

        let mut session = mapped.map(BufferAccess::WriteOnly).unwrap();
        session.as_mut_slice().unwrap().copy_from_slice(&data);
        session.unmap().unwrap();

        assert_eq!(updated.read_back().unwrap(), data, "tier {}", name);
        assert_eq!(mapped.read_back().unwrap(), data, "tier {}", name);
    }
}

#[test]
fn test_integration_update_out_of_range() {
    let (ctx, monitor) = full_context();
    let buffer = ctx.create_buffer(BufferDesc::vertex(16), None).unwrap();

    assert!(matches!(buffer.update_subresource(12, &[0; 8]), Err(Error::InvalidResource(_))));
    assert!(matches!(buffer.update_subresource(u64::MAX, &[0; 2]), Err(Error::InvalidResource(_))));
    assert_eq!(monitor.stats().uploads, 0);
}

#[test]
fn test_integration_empty_update_is_a_no_op() {
    let (ctx, monitor) = legacy_context();
    let buffer = ctx.create_buffer(BufferDesc::vertex(16), None).unwrap();

    buffer.update_subresource(16, &[]).unwrap();

    assert_eq!(monitor.stats().uploads, 0);
}

// ============================================================================
// SHUTDOWN
// ============================================================================

#[test]
fn test_integration_shutdown_rejects_use_and_frees_on_drop() {
    let (ctx, monitor) = full_context();
    let buffer = ctx.create_buffer(texel_desc(16), None).unwrap();
    let other = ctx.create_buffer(BufferDesc::vertex(16), None).unwrap();

    ctx.shutdown();

    assert!(!ctx.is_valid());
    assert!(matches!(buffer.map(BufferAccess::ReadOnly), Err(Error::InvalidState(_))));
    assert!(matches!(buffer.active(true), Err(Error::InvalidState(_))));
    assert!(matches!(buffer.update_subresource(0, &[1]), Err(Error::InvalidState(_))));
    assert!(matches!(buffer.copy_to_buffer(&other), Err(Error::InvalidState(_))));
    assert!(matches!(ctx.create_buffer(BufferDesc::vertex(16), None), Err(Error::InvalidState(_))));
    assert_eq!(monitor.live_buffers(), 2);

    drop(buffer);
    drop(other);
    assert!(monitor.is_idle());
}
