//! WGSL sources and pipeline-constant substitution.
//!
//! Shader bodies are embedded at build time. Before compilation every body
//! gets the shared `common.wgsl` prelude prepended and its `${name}`
//! placeholders expanded from a constant table. Expansion is strict: a
//! placeholder with no table entry is a hard error at pipeline construction,
//! never a silently miscompiled shader.

use thiserror::Error;

/// Shared structs and cluster helpers, prepended to every shader.
const COMMON: &str = include_str!("shaders/common.wgsl");
const MOVE_LIGHTS: &str = include_str!("shaders/move_lights.wgsl");
const CLUSTERING: &str = include_str!("shaders/clustering.wgsl");
const SCENE: &str = include_str!("shaders/scene.wgsl");
const DEFERRED_SHADING: &str = include_str!("shaders/deferred_shading.wgsl");

/// Threads per workgroup in the 1D light animation dispatch.
pub const MOVE_LIGHTS_WORKGROUP_SIZE: u32 = 128;

/// Workgroup shape of the 3D cluster assignment dispatch.
pub const CLUSTERING_WORKGROUP: [u32; 3] = [4, 4, 4];

/// Bind group slot of the shared scene resources.
pub const GROUP_SCENE: u32 = 0;
/// Bind group slot of per-object model uniforms.
pub const GROUP_MODEL: u32 = 1;
/// Bind group slot of material texture and sampler.
pub const GROUP_MATERIAL: u32 = 2;
/// Bind group slot of the G-buffer in the deferred shading pass.
pub const GROUP_GBUFFER: u32 = 1;

/// Shader preprocessing failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShaderError {
    /// A `${name}` placeholder had no entry in the constant table.
    #[error("shader references unknown constant ${{{0}}}")]
    UnknownConstant(String),
    /// A `${` opened with no closing brace.
    #[error("unterminated ${{...}} placeholder in shader source")]
    UnterminatedPlaceholder,
}

/// Expands `${name}` placeholders from `constants`, failing on any leftover.
fn expand(source: &str, constants: &[(&str, String)]) -> Result<String, ShaderError> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or(ShaderError::UnterminatedPlaceholder)?;
        let name = &after[..end];
        let value = constants
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
            .ok_or_else(|| ShaderError::UnknownConstant(name.to_owned()))?;
        out.push_str(value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn constant_table() -> Vec<(&'static str, String)> {
    vec![
        (
            "move_lights_workgroup_size",
            MOVE_LIGHTS_WORKGROUP_SIZE.to_string(),
        ),
        ("clustering_workgroup_x", CLUSTERING_WORKGROUP[0].to_string()),
        ("clustering_workgroup_y", CLUSTERING_WORKGROUP[1].to_string()),
        ("clustering_workgroup_z", CLUSTERING_WORKGROUP[2].to_string()),
        ("group_scene", GROUP_SCENE.to_string()),
        ("group_model", GROUP_MODEL.to_string()),
        ("group_material", GROUP_MATERIAL.to_string()),
        ("group_gbuffer", GROUP_GBUFFER.to_string()),
    ]
}

/// Fully preprocessed WGSL sources, ready for module creation.
#[derive(Debug)]
pub struct ShaderSet {
    /// Light animation compute shader.
    pub move_lights: String,
    /// Cluster assignment compute shader.
    pub clustering: String,
    /// Scene vertex stage plus Forward+ and G-buffer fragment stages.
    pub scene: String,
    /// Fullscreen deferred lighting resolve.
    pub deferred_shading: String,
}

impl ShaderSet {
    /// Preprocesses all shaders with the built-in constant table.
    ///
    /// # Errors
    ///
    /// Returns a [`ShaderError`] if any source references an unknown
    /// constant or carries a malformed placeholder.
    pub fn preprocess() -> Result<Self, ShaderError> {
        let constants = constant_table();
        let build = |body: &str| -> Result<String, ShaderError> {
            let mut source = String::with_capacity(COMMON.len() + body.len() + 1);
            source.push_str(COMMON);
            source.push('\n');
            source.push_str(body);
            expand(&source, &constants)
        };
        Ok(Self {
            move_lights: build(MOVE_LIGHTS)?,
            clustering: build(CLUSTERING)?,
            scene: build(SCENE)?,
            deferred_shading: build(DEFERRED_SHADING)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_shaders_expand_cleanly() {
        let set = ShaderSet::preprocess().unwrap();
        for source in [
            &set.move_lights,
            &set.clustering,
            &set.scene,
            &set.deferred_shading,
        ] {
            assert!(!source.contains("${"));
            assert!(source.contains("struct ClusterParams"));
        }
    }

    #[test]
    fn test_workgroup_sizes_substituted() {
        let set = ShaderSet::preprocess().unwrap();
        assert!(set.move_lights.contains("@workgroup_size(128)"));
        assert!(set.clustering.contains("@workgroup_size(4, 4, 4)"));
    }

    #[test]
    fn test_unknown_constant_is_rejected() {
        let err = expand("let x = ${nope};", &[]).unwrap_err();
        assert_eq!(err, ShaderError::UnknownConstant("nope".to_owned()));
    }

    #[test]
    fn test_unterminated_placeholder_is_rejected() {
        let err = expand("let x = ${oops", &[]).unwrap_err();
        assert_eq!(err, ShaderError::UnterminatedPlaceholder);
    }

    #[test]
    fn test_expansion_replaces_all_occurrences() {
        let constants = [("n", "7".to_owned())];
        let out = expand("${n} + ${n}", &constants).unwrap();
        assert_eq!(out, "7 + 7");
    }
}
