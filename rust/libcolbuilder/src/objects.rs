use crate::scene::*;
use crate::transform::{decompose, degrees, game_rotation};
use cgmath::Matrix4;
use col::collision::Collision;
use col::special::SpecialObject;
use col::types::*;
use col::water_box::WaterBox;

const IDENTITY_EPSILON: f32 = 0.001;

/// Adds the special objects and water boxes found among `root` and its
/// descendants. Positions are relative to the root's world translation while
/// rotation and scale stay in world space.
pub fn add_special_objects(
    root: &SceneObject,
    transform: MatrixF,
    collision: &mut Collision,
) -> ColResult<()> {
    let relative = transform * Matrix4::from_translation(-root.matrix_local.w.truncate());
    visit(root, root.matrix_local, &relative, collision)?;
    log::debug!(
        "{}: {} special objects, {} water boxes",
        collision.name,
        collision.specials.len(),
        collision.water_boxes.len()
    );
    Ok(())
}

fn visit(
    obj: &SceneObject,
    world: MatrixF,
    relative: &MatrixF,
    collision: &mut Collision,
) -> ColResult<()> {
    if let ObjectData::Empty(empty) = &obj.data {
        let parts = decompose(&(*relative * world));
        let rotation = game_rotation(parts.rotation);
        match &empty.role {
            EmptyRole::None => {}
            EmptyRole::Special(settings) => {
                let yaw = settings.set_yaw.then(|| degrees(rotation.y));
                let param = (settings.set_yaw && settings.set_bparam).then(|| settings.bparam.as_str());
                collision.specials.push(SpecialObject::from_flags(
                    &settings.preset,
                    parts.translation,
                    yaw,
                    param,
                ));
            }
            EmptyRole::WaterBox(kind) => {
                let (x, y, z) = (rotation.x.0, rotation.y.0, rotation.z.0);
                if x.abs() > IDENTITY_EPSILON
                    || y.abs() > IDENTITY_EPSILON
                    || z.abs() > IDENTITY_EPSILON
                {
                    return Err(ColError::NonIdentityRotation {
                        object: obj.name.clone(),
                        x: degrees(rotation.x),
                        y: degrees(rotation.y),
                        z: degrees(rotation.z),
                    });
                }
                collision.water_boxes.push(WaterBox::new(
                    *kind,
                    parts.translation,
                    parts.scale,
                    empty.display_size,
                ));
            }
        }
    }

    for child in &obj.children {
        visit(child, world * child.matrix_local, relative, collision)?;
    }
    Ok(())
}
