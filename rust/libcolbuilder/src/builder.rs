use crate::scene::*;
use crate::transform::transform_point;
use col::collision::{Collision, SpecialParam};
use col::surface::SurfaceType;
use col::types::*;
use linked_hash_map::LinkedHashMap;

pub trait ProgressEventListener {
    fn progress(&mut self, current: u32, total: u32, status: String, finish_status: String);
}

/// Listener for callers that do not display progress.
pub struct SilentProgress;

impl ProgressEventListener for SilentProgress {
    fn progress(&mut self, _current: u32, _total: u32, _status: String, _finish_status: String) {}
}

#[derive(Clone, Debug)]
pub struct Triangle {
    pub verts: [Vec3I; 3],
    pub special_param: Option<SpecialParam>,
    pub room: u8,
}

/// Surface resolved from a material slot, shared by every face using it.
#[derive(Clone, Debug)]
struct ResolvedMaterial {
    surface: SurfaceType,
    special_param: Option<SpecialParam>,
}

/// Collects rounded triangles grouped by surface, then interns their
/// vertices into a `Collision`.
pub struct CollisionBuilder {
    groups: LinkedHashMap<SurfaceType, Vec<Triangle>>,
    skipped: usize,
}

impl CollisionBuilder {
    pub fn new() -> CollisionBuilder {
        CollisionBuilder {
            groups: LinkedHashMap::new(),
            skipped: 0,
        }
    }

    /// Adds a triangle unless it has no area once rounded. Returns whether
    /// the triangle was kept.
    pub fn add_triangle(
        &mut self,
        surface: SurfaceType,
        verts: [Vec3I; 3],
        special_param: Option<SpecialParam>,
        room: u8,
    ) -> bool {
        if verts[0].normal_length_squared(&verts[1], &verts[2]) <= 0 {
            self.skipped += 1;
            return false;
        }
        self.groups
            .entry(surface)
            .or_insert_with(Vec::new)
            .push(Triangle {
                verts,
                special_param,
                room,
            });
        true
    }

    /// Classifies every face of `obj` under `transform`. Children are
    /// visited depth first with their local matrix composed onto `transform`.
    pub fn add_object(
        &mut self,
        obj: &SceneObject,
        transform: MatrixF,
        include_children: bool,
    ) -> ColResult<()> {
        if let ObjectData::Mesh(mesh) = &obj.data {
            if !obj.ignore_collision {
                self.add_mesh(obj, mesh, &transform)?;
            }
        }

        if include_children {
            for child in &obj.children {
                self.add_object(child, transform * child.matrix_local, include_children)?;
            }
        }

        Ok(())
    }

    fn add_mesh(&mut self, obj: &SceneObject, mesh: &Mesh, transform: &MatrixF) -> ColResult<()> {
        if mesh.materials.is_empty() {
            return Err(ColError::MissingMaterial {
                object: obj.name.clone(),
            });
        }

        let mut resolved: Vec<Option<ResolvedMaterial>> = vec![None; mesh.materials.len()];
        let skipped_before = self.skipped;

        for face in &mesh.faces {
            let material = match resolved.get_mut(face.material_index) {
                Some(Some(material)) => material.clone(),
                Some(slot) => {
                    let material = resolve_material(&mesh.materials[face.material_index])?;
                    *slot = Some(material.clone());
                    material
                }
                None => {
                    return Err(ColError::InvalidIndex {
                        object: obj.name.clone(),
                        what: "material",
                        index: face.material_index,
                        count: mesh.materials.len(),
                    })
                }
            };

            for corners in face.triangles() {
                let mut verts = [Vec3I::new(0, 0, 0); 3];
                for (vert, corner) in verts.iter_mut().zip(corners.iter()) {
                    let index = *corner as usize;
                    let point = mesh.vertices.get(index).ok_or_else(|| ColError::InvalidIndex {
                        object: obj.name.clone(),
                        what: "vertex",
                        index,
                        count: mesh.vertices.len(),
                    })?;
                    *vert = Vec3I::from_point(transform_point(transform, *point))?;
                }

                self.add_triangle(
                    material.surface.clone(),
                    verts,
                    material.special_param.clone(),
                    obj.room,
                );
            }
        }

        if self.skipped > skipped_before {
            log::debug!(
                "Ignored {} denormalized triangles in {}",
                self.skipped - skipped_before,
                obj.name
            );
        }

        Ok(())
    }

    pub fn triangle_count(&self) -> usize {
        self.groups.values().map(|tris| tris.len()).sum()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped
    }

    /// Interns vertices group by group, so vertex order follows surface
    /// order first and face order second.
    pub fn build(
        self,
        name: &str,
        progress_report_callback: &mut dyn ProgressEventListener,
    ) -> ColResult<Collision> {
        if self.groups.is_empty() {
            return Err(ColError::NoCollisionData);
        }

        let total = self.triangle_count() as u32;
        let mut current = 0;
        let mut collision = Collision::new(name);
        for (surface, triangles) in self.groups {
            for triangle in triangles {
                collision.add_triangle(
                    surface.clone(),
                    triangle.verts,
                    triangle.special_param,
                    triangle.room,
                )?;
                current += 1;
                progress_report_callback.progress(
                    current,
                    total,
                    "Building collision".to_owned(),
                    "Built collision".to_owned(),
                );
            }
        }

        log::debug!(
            "{}: {} vertices, {} triangles in {} surface groups",
            name,
            collision.vertices.len(),
            total,
            collision.triangles.len()
        );

        Ok(collision)
    }
}

fn resolve_material(material: &CollisionMaterial) -> ColResult<ResolvedMaterial> {
    let surface = SurfaceType::resolve(&material.collision_type, &material.custom_value)?;
    let special_param = if material.use_collision_param {
        if !surface.uses_force_param() {
            log::warn!(
                "Material {} sets a collision parameter, but {} does not read one",
                material.name,
                surface
            );
        }
        Some(SpecialParam::parse(&material.collision_param)?)
    } else {
        None
    };
    Ok(ResolvedMaterial {
        surface,
        special_param,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Matrix4, SquareMatrix, Vector3};
    use col::collision::CollisionTriangle;
    use col::io::Writable;
    use col::types::VertexIndex;

    fn plane(materials: Vec<CollisionMaterial>) -> Mesh {
        Mesh {
            vertices: vec![
                Point3F::new(0.0, 0.0, 0.0),
                Point3F::new(1.0, 0.0, 0.0),
                Point3F::new(1.0, 0.0, 1.0),
                Point3F::new(0.0, 0.0, 1.0),
            ],
            faces: vec![Face::new(&[0, 1, 2, 3], 0)],
            materials,
        }
    }

    fn build(obj: &SceneObject, transform: MatrixF) -> ColResult<Collision> {
        let mut builder = CollisionBuilder::new();
        builder.add_object(obj, transform, true)?;
        builder.build("test_collision", &mut SilentProgress)
    }

    #[test]
    fn quad_becomes_two_triangles() {
        let obj = SceneObject::mesh(
            "floor",
            plane(vec![CollisionMaterial::new("m", "SURFACE_DEFAULT")]),
        );
        let collision = build(&obj, Matrix4::from_scale(100.0)).unwrap();
        assert_eq!(collision.vertices.len(), 4);
        assert_eq!(collision.triangle_count(), 2);
        assert_eq!(collision.vertices[2].position, Vec3I::new(100, 0, 100));
        let tris = collision.triangles.values().next().unwrap();
        assert_eq!(tris[1].indices, [VertexIndex(0), VertexIndex(2), VertexIndex(3)]);
    }

    #[test]
    fn missing_material_is_an_error() {
        let obj = SceneObject::mesh("floor", plane(vec![]));
        assert!(matches!(
            build(&obj, Matrix4::identity()),
            Err(ColError::MissingMaterial { object }) if object == "floor"
        ));
    }

    #[test]
    fn degenerate_triangles_are_skipped() {
        let mesh = Mesh {
            vertices: vec![
                Point3F::new(0.0, 0.0, 0.0),
                Point3F::new(1.0, 1.0, 1.0),
                Point3F::new(2.0, 2.0, 2.0),
                Point3F::new(0.001, 0.0, 0.0),
                Point3F::new(0.0, 0.001, 0.0),
            ],
            // collinear, then collapsed by rounding
            faces: vec![Face::new(&[0, 1, 2], 0), Face::new(&[0, 3, 4], 0)],
            materials: vec![CollisionMaterial::new("m", "SURFACE_DEFAULT")],
        };
        let obj = SceneObject::mesh("sliver", mesh);
        let mut builder = CollisionBuilder::new();
        builder.add_object(&obj, Matrix4::identity(), true).unwrap();
        assert_eq!(builder.skipped_count(), 2);
        assert_eq!(builder.triangle_count(), 0);
        assert!(matches!(
            builder.build("sliver", &mut SilentProgress),
            Err(ColError::NoCollisionData)
        ));
    }

    #[test]
    fn vertices_follow_surface_order() {
        let mesh = Mesh {
            vertices: vec![
                Point3F::new(0.0, 0.0, 0.0),
                Point3F::new(1.0, 0.0, 0.0),
                Point3F::new(0.0, 0.0, 1.0),
                Point3F::new(5.0, 0.0, 0.0),
                Point3F::new(6.0, 0.0, 0.0),
                Point3F::new(5.0, 0.0, 1.0),
                Point3F::new(9.0, 0.0, 0.0),
            ],
            faces: vec![
                Face::new(&[0, 1, 2], 0),
                Face::new(&[3, 4, 5], 1),
                Face::new(&[0, 2, 6], 0),
            ],
            materials: vec![
                CollisionMaterial::new("ice", "SURFACE_ICE"),
                CollisionMaterial::new("hard", "SURFACE_HARD"),
            ],
        };
        let collision = build(&SceneObject::mesh("mixed", mesh), Matrix4::identity()).unwrap();
        let surfaces: Vec<&str> = collision.triangles.keys().map(|s| s.symbol()).collect();
        assert_eq!(surfaces, vec!["SURFACE_ICE", "SURFACE_HARD"]);
        // the second ice face is interned before the hard face
        assert_eq!(collision.vertices[3].position, Vec3I::new(9, 0, 0));
        assert_eq!(collision.vertices[4].position, Vec3I::new(5, 0, 0));
    }

    #[test]
    fn children_compose_transforms_and_keep_their_room() {
        let child = SceneObject::mesh(
            "child",
            plane(vec![CollisionMaterial::new("m", "SURFACE_DEFAULT")]),
        )
        .with_matrix(Matrix4::from_translation(Vector3::new(10.0, 0.0, 0.0)))
        .with_room(3);
        let mut root = SceneObject::mesh(
            "root",
            plane(vec![CollisionMaterial::new("m", "SURFACE_DEFAULT")]),
        )
        .with_child(child);
        // the root's own matrix is part of the editor's transform, not ours
        root.matrix_local = Matrix4::from_translation(Vector3::new(0.0, 50.0, 0.0));

        let collision = build(&root, Matrix4::from_scale(2.0)).unwrap();
        assert_eq!(collision.vertices.len(), 8);
        assert_eq!(collision.vertices[0].position, Vec3I::new(0, 0, 0));
        assert_eq!(collision.vertices[4].position, Vec3I::new(20, 0, 0));
        let rooms: Vec<u8> = collision.triangles.values().flatten().map(|t| t.room).collect();
        assert_eq!(rooms, vec![0, 0, 3, 3]);

        let mut builder = CollisionBuilder::new();
        builder.add_object(&root, Matrix4::identity(), false).unwrap();
        assert_eq!(builder.triangle_count(), 2);
    }

    #[test]
    fn ignored_objects_still_visit_children() {
        let mut root = SceneObject::mesh(
            "root",
            plane(vec![CollisionMaterial::new("m", "SURFACE_DEFAULT")]),
        )
        .with_child(SceneObject::mesh(
            "child",
            plane(vec![CollisionMaterial::new("m", "SURFACE_DEFAULT")]),
        ));
        root.ignore_collision = true;
        let collision = build(&root, Matrix4::identity()).unwrap();
        assert_eq!(collision.triangle_count(), 2);
    }

    #[test]
    fn materials_carry_custom_surfaces_and_params() {
        let mesh = plane(vec![CollisionMaterial::new("wind", "Custom")
            .with_custom_value("0x2C")
            .with_param("0x0180")]);
        let collision = build(&SceneObject::mesh("wind", mesh), Matrix4::identity()).unwrap();
        let (surface, tris) = collision.triangles.iter().next().unwrap();
        assert_eq!(surface.code(), 0x2C);
        assert_eq!(surface.symbol(), "0x2C");
        assert!(tris
            .iter()
            .all(|t: &CollisionTriangle| t.special_param.as_ref().map(|p| p.value) == Some(0x0180)));
        assert_eq!(collision.to_binary().unwrap().len(), collision.size());
    }

    #[test]
    fn bad_face_indices_are_errors() {
        let mut mesh = plane(vec![CollisionMaterial::new("m", "SURFACE_DEFAULT")]);
        mesh.faces.push(Face::new(&[0, 1, 9], 0));
        assert!(matches!(
            build(&SceneObject::mesh("bad", mesh), Matrix4::identity()),
            Err(ColError::InvalidIndex { what: "vertex", index: 9, .. })
        ));

        let mut mesh = plane(vec![CollisionMaterial::new("m", "SURFACE_DEFAULT")]);
        mesh.faces[0].material_index = 2;
        assert!(matches!(
            build(&SceneObject::mesh("bad", mesh), Matrix4::identity()),
            Err(ColError::InvalidIndex { what: "material", .. })
        ));
    }

    #[test]
    fn same_input_gives_same_output() {
        let obj = SceneObject::mesh(
            "floor",
            plane(vec![CollisionMaterial::new("m", "SURFACE_NOT_SLIPPERY")]),
        );
        let a = build(&obj, Matrix4::from_scale(37.5)).unwrap();
        let b = build(&obj, Matrix4::from_scale(37.5)).unwrap();
        assert_eq!(a.to_bytes().unwrap(), b.to_bytes().unwrap());
        assert_eq!(a.to_c().unwrap(), b.to_c().unwrap());
    }
}
