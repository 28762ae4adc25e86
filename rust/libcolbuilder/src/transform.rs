use cgmath::{Deg, Euler, InnerSpace, Matrix3, Quaternion, Rad, Rotation3};
use col::types::{MatrixF, Point3F};

/// Translation, rotation and scale of an affine matrix without shear.
#[derive(Debug, Clone, Copy)]
pub struct Decomposed {
    pub translation: Point3F,
    pub rotation: Quaternion<f32>,
    pub scale: Point3F,
}

pub fn transform_point(matrix: &MatrixF, point: Point3F) -> Point3F {
    (*matrix * point.extend(1.0)).truncate()
}

pub fn decompose(matrix: &MatrixF) -> Decomposed {
    let translation = matrix.w.truncate();
    let x = matrix.x.truncate();
    let y = matrix.y.truncate();
    let z = matrix.z.truncate();
    let scale = Point3F::new(x.magnitude(), y.magnitude(), z.magnitude());

    let axis = |v: Point3F, s: f32| if s == 0.0 { v } else { v / s };
    let basis = Matrix3::from_cols(axis(x, scale.x), axis(y, scale.y), axis(z, scale.z));

    Decomposed {
        translation,
        rotation: Quaternion::from(basis),
        scale,
    }
}

/// Orientation of an empty in game space. Empties stay Z-up after the
/// hierarchy is rotated, so a quarter turn about X is added back.
pub fn game_rotation(rotation: Quaternion<f32>) -> Euler<Rad<f32>> {
    euler_xyz(&Matrix3::from(rotation * Quaternion::from_angle_x(Deg(90.0))))
}

/// Angles of `m = Rz * Ry * Rx`, the order the host stores object rotation
/// in. Of the two equivalent solutions the one with the smaller total angle
/// is returned.
pub fn euler_xyz(m: &Matrix3<f32>) -> Euler<Rad<f32>> {
    let cy = m.x.x.hypot(m.x.y);
    let (first, second) = if cy > 16.0 * f32::EPSILON {
        (
            [m.y.z.atan2(m.z.z), (-m.x.z).atan2(cy), m.x.y.atan2(m.x.x)],
            [
                (-m.y.z).atan2(-m.z.z),
                (-m.x.z).atan2(-cy),
                (-m.x.y).atan2(-m.x.x),
            ],
        )
    } else {
        // gimbal lock, z folds into x
        let locked = [(-m.z.y).atan2(m.y.y), (-m.x.z).atan2(cy), 0.0];
        (locked, locked)
    };

    let total = |angles: &[f32; 3]| angles.iter().map(|a| a.abs()).sum::<f32>();
    let [x, y, z] = if total(&first) <= total(&second) {
        first
    } else {
        second
    };
    Euler::new(Rad(x), Rad(y), Rad(z))
}

pub fn degrees(angle: Rad<f32>) -> f32 {
    Deg::from(angle).0
}
