//! Static contract checks on the preprocessed shader set.
//!
//! These run without a GPU: they pin the binding slots and entry points the
//! Rust pipeline code was written against, so a shader edit that moves a
//! binding fails here instead of at device validation time.

use lucerna_rendering::ShaderSet;

#[test]
fn test_scene_shader_binding_slots() {
    let set = ShaderSet::preprocess().unwrap();

    // Group 0 is the shared scene group: camera, lights, params, counts,
    // indices, in that order.
    for binding in [
        "@group(0) @binding(0) var<uniform> camera",
        "@group(0) @binding(1) var<storage, read> light_set",
        "@group(0) @binding(2) var<uniform> params",
        "@group(0) @binding(3) var<storage, read> cluster_counts",
        "@group(0) @binding(4) var<storage, read> cluster_indices",
        "@group(1) @binding(0) var<uniform> model",
        "@group(2) @binding(0) var material_texture",
        "@group(2) @binding(1) var material_sampler",
    ] {
        assert!(
            set.scene.contains(binding),
            "scene shader lost binding: {binding}"
        );
    }
}

#[test]
fn test_deferred_shader_reuses_scene_group() {
    let set = ShaderSet::preprocess().unwrap();

    // Same slots as the scene group minus the camera, plus the G-buffer
    // textures at group 1.
    for binding in [
        "@group(0) @binding(1) var<storage, read> light_set",
        "@group(0) @binding(2) var<uniform> params",
        "@group(0) @binding(3) var<storage, read> cluster_counts",
        "@group(0) @binding(4) var<storage, read> cluster_indices",
        "@group(1) @binding(0) var gbuffer_position",
        "@group(1) @binding(1) var gbuffer_normal",
        "@group(1) @binding(2) var gbuffer_albedo",
    ] {
        assert!(
            set.deferred_shading.contains(binding),
            "deferred shader lost binding: {binding}"
        );
    }
}

#[test]
fn test_compute_shader_bindings_and_access() {
    let set = ShaderSet::preprocess().unwrap();

    assert!(set.move_lights.contains("@group(0) @binding(0) var<uniform> uniforms"));
    assert!(set.move_lights.contains("@group(0) @binding(1) var<storage, read_write> light_set"));

    // Clustering is the only pass allowed write access to cluster buffers.
    assert!(set.clustering.contains("@group(0) @binding(2) var<storage, read_write> cluster_counts"));
    assert!(set.clustering.contains("@group(0) @binding(3) var<storage, read_write> cluster_indices"));
    assert!(!set.scene.contains("read_write"));
    assert!(!set.deferred_shading.contains("read_write"));
}

#[test]
fn test_entry_points_exist() {
    let set = ShaderSet::preprocess().unwrap();

    assert!(set.move_lights.contains("fn main("));
    assert!(set.clustering.contains("fn main("));
    assert!(set.scene.contains("fn vs_main("));
    assert!(set.scene.contains("fn fs_forward("));
    assert!(set.scene.contains("fn fs_gbuffer("));
    assert!(set.deferred_shading.contains("fn vs_fullscreen("));
    assert!(set.deferred_shading.contains("fn fs_shade("));
}

#[test]
fn test_shared_prelude_defines_cluster_helpers_once() {
    let set = ShaderSet::preprocess().unwrap();

    for source in [&set.scene, &set.deferred_shading, &set.clustering] {
        assert_eq!(source.matches("fn cluster_linear_index").count(), 1);
    }
    // Both consumers shade through the same cluster lookup and the same
    // lighting function, which is what keeps their output consistent.
    for source in [&set.scene, &set.deferred_shading] {
        assert!(source.contains("cluster_for_fragment(params"));
        assert_eq!(source.matches("fn shade_point_light").count(), 1);
        assert!(source.contains("shade_point_light(light"));
    }
}
