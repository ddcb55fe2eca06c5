//! Minimal vector/matrix helpers for camera and clustering math.
//!
//! Matrices are `[[f32; 4]; 4]` in column-major order (WGSL `mat4x4f`
//! convention): `m[i]` is column `i`, and `bytemuck` uploads it unchanged.
//! Depth convention is WebGPU (NDC z in `[0, 1]`, view space looks down -Z).

/// Column-major 4x4 matrix.
pub type Mat4 = [[f32; 4]; 4];

/// 3-component vector.
pub type Vec3 = [f32; 3];

/// The identity matrix.
pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Component-wise subtraction.
#[inline]
#[must_use]
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Cross product.
#[inline]
#[must_use]
pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Dot product.
#[inline]
#[must_use]
pub fn dot(a: Vec3, b: Vec3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Normalizes a vector; degenerate input falls back to +Y.
#[must_use]
pub fn normalize(v: Vec3) -> Vec3 {
    let l = dot(v, v).sqrt();
    if l < 1e-10 {
        return [0.0, 1.0, 0.0];
    }
    [v[0] / l, v[1] / l, v[2] / l]
}

/// Right-handed view matrix looking from `eye` toward `target`.
#[must_use]
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let f = normalize(sub(target, eye));
    let r = normalize(cross(f, up));
    let u = cross(r, f);

    [
        [r[0], u[0], -f[0], 0.0],
        [r[1], u[1], -f[1], 0.0],
        [r[2], u[2], -f[2], 0.0],
        [-dot(r, eye), -dot(u, eye), dot(f, eye), 1.0],
    ]
}

/// Perspective projection with WebGPU depth range (0 at near, 1 at far).
#[must_use]
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = 1.0 / (fov_y / 2.0).tan();
    [
        [f / aspect, 0.0, 0.0, 0.0],
        [0.0, f, 0.0, 0.0],
        [0.0, 0.0, far / (near - far), -1.0],
        [0.0, 0.0, (near * far) / (near - far), 0.0],
    ]
}

/// Analytic inverse of [`perspective`] built from the same parameters.
///
/// Cheaper and better conditioned than a general 4x4 inverse, and it keeps
/// the host and shader unprojection bit-identical in construction.
#[must_use]
pub fn perspective_inverse(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = 1.0 / (fov_y / 2.0).tan();
    let p22 = far / (near - far);
    let p32 = (near * far) / (near - far);
    [
        [aspect / f, 0.0, 0.0, 0.0],
        [0.0, 1.0 / f, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0 / p32],
        [0.0, 0.0, -1.0, p22 / p32],
    ]
}

/// Matrix product `a * b`.
#[must_use]
pub fn multiply(a: Mat4, b: Mat4) -> Mat4 {
    let mut result = [[0.0; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                result[i][j] += a[k][j] * b[i][k];
            }
        }
    }
    result
}

/// Transforms a 4-component vector by a matrix.
#[must_use]
pub fn transform(m: &Mat4, v: [f32; 4]) -> [f32; 4] {
    let mut out = [0.0; 4];
    for (col, vc) in m.iter().zip(v) {
        for (o, mc) in out.iter_mut().zip(col) {
            *o += mc * vc;
        }
    }
    out
}

/// Transforms a point (w = 1) without perspective divide.
#[must_use]
pub fn transform_point(m: &Mat4, p: Vec3) -> Vec3 {
    let v = transform(m, [p[0], p[1], p[2], 1.0]);
    [v[0], v[1], v[2]]
}

/// Transforms a point (w = 1) and applies the perspective divide.
#[must_use]
pub fn project_point(m: &Mat4, p: Vec3) -> Vec3 {
    let v = transform(m, [p[0], p[1], p[2], 1.0]);
    [v[0] / v[3], v[1] / v[3], v[2] / v[3]]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_near(a: f32, b: f32, eps: f32) {
        assert!((a - b).abs() < eps, "{a} != {b}");
    }

    #[test]
    fn test_look_at_origin_is_identity() {
        let m = look_at([0.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]);
        for (i, col) in m.iter().enumerate() {
            for (j, v) in col.iter().enumerate() {
                assert_near(*v, IDENTITY[i][j], 1e-6);
            }
        }
    }

    #[test]
    fn test_perspective_depth_range() {
        let p = perspective(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);

        // Near plane maps to NDC z = 0, far plane to z = 1.
        let near_pt = project_point(&p, [0.0, 0.0, -0.1]);
        let far_pt = project_point(&p, [0.0, 0.0, -100.0]);
        assert_near(near_pt[2], 0.0, 1e-5);
        assert_near(far_pt[2], 1.0, 1e-5);
    }

    #[test]
    fn test_perspective_inverse_roundtrip() {
        let fov = 1.2;
        let p = perspective(fov, 16.0 / 9.0, 0.1, 1000.0);
        let inv = perspective_inverse(fov, 16.0 / 9.0, 0.1, 1000.0);

        let view_pt = [1.5, -0.75, -42.0];
        let ndc = project_point(&p, view_pt);
        let back = project_point(&inv, ndc);
        for i in 0..3 {
            assert_near(back[i], view_pt[i], 1e-3);
        }
    }

    #[test]
    fn test_multiply_identity() {
        let p = perspective(1.0, 1.5, 0.1, 10.0);
        let m = multiply(p, IDENTITY);
        assert_eq!(m, p);
    }

    #[test]
    fn test_view_transforms_eye_to_origin() {
        let eye = [3.0, 4.0, 5.0];
        let view = look_at(eye, [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let at_origin = transform_point(&view, eye);
        for c in at_origin {
            assert_near(c, 0.0, 1e-5);
        }
    }
}
