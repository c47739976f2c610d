// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Material descriptors derived from placement colors.

use serde::Serialize;

/// Alpha below which a mesh is rendered as translucent
pub const OPAQUE_ALPHA_THRESHOLD: f32 = 0.99;

/// Render state for one mesh unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    /// Linear RGB, each channel in [0, 1]
    pub color: [f32; 3],
    /// Alpha, in [0, 1]
    pub opacity: f32,
    /// Rendered in the blended pass
    pub transparent: bool,
    /// Writes to the depth buffer; off for translucent meshes
    pub depth_write: bool,
    /// Render back faces too; set together with `transparent`
    pub double_sided: bool,
}

impl Material {
    /// Derive a material from an unclamped RGBA color.
    pub fn from_rgba(rgba: [f32; 4]) -> Self {
        let [r, g, b, a] = rgba;
        let opacity = clamp_channel(a, 1.0);
        let transparent = opacity < OPAQUE_ALPHA_THRESHOLD;

        Self {
            color: [clamp_channel(r, 0.0), clamp_channel(g, 0.0), clamp_channel(b, 0.0)],
            opacity,
            transparent,
            depth_write: !transparent,
            double_sided: transparent,
        }
    }

    /// Color with opacity as a packed RGBA array
    #[inline]
    pub fn rgba(&self) -> [f32; 4] {
        [self.color[0], self.color[1], self.color[2], self.opacity]
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::from_rgba([1.0, 1.0, 1.0, 1.0])
    }
}

/// Clamp to [0, 1]; NaN becomes `nan_default`
#[inline]
fn clamp_channel(value: f32, nan_default: f32) -> f32 {
    if value.is_nan() {
        nan_default
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_out_of_range_channels() {
        let material = Material::from_rgba([-0.2, 1.5, 0.5, 2.0]);
        assert_eq!(material.color, [0.0, 1.0, 0.5]);
        assert_eq!(material.opacity, 1.0);
        assert!(material.color.iter().all(|c| (0.0..=1.0).contains(c)));
    }

    #[test]
    fn test_transparency_threshold() {
        let opaque = Material::from_rgba([0.5, 0.5, 0.5, 1.0]);
        assert!(!opaque.transparent);
        assert!(opaque.depth_write);
        assert!(!opaque.double_sided);

        let glass = Material::from_rgba([0.5, 0.5, 0.5, 0.5]);
        assert!(glass.transparent);
        assert!(!glass.depth_write);
        assert_eq!(glass.opacity, 0.5);

        let nearly = Material::from_rgba([0.5, 0.5, 0.5, 0.995]);
        assert!(!nearly.transparent);
        assert!(nearly.depth_write);

        let boundary = Material::from_rgba([0.5, 0.5, 0.5, 0.99]);
        assert!(!boundary.transparent);
    }

    #[test]
    fn test_nan_channels() {
        let material = Material::from_rgba([f32::NAN, 0.2, 0.3, f32::NAN]);
        assert_eq!(material.color[0], 0.0);
        assert_eq!(material.opacity, 1.0);
        assert!(!material.transparent);
    }

    #[test]
    fn test_negative_alpha_is_fully_transparent() {
        let material = Material::from_rgba([1.0, 1.0, 1.0, -0.5]);
        assert_eq!(material.opacity, 0.0);
        assert!(material.transparent);
    }
}
