use col::types::{MatrixF, Point3F};
use col::water_box::WaterBoxType;
use cgmath::SquareMatrix;

/// Collision settings of one material slot.
#[derive(Debug, Clone)]
pub struct CollisionMaterial {
    pub name: String,
    /// A surface symbol such as `SURFACE_DEFAULT`, or `Custom`.
    pub collision_type: String,
    /// Numeric surface value, read when `collision_type` is `Custom`.
    pub custom_value: String,
    pub use_collision_param: bool,
    pub collision_param: String,
}

#[derive(Debug, Clone)]
pub struct Face {
    pub vertices: Vec<u32>,
    pub material_index: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Point3F>,
    pub faces: Vec<Face>,
    pub materials: Vec<CollisionMaterial>,
}

#[derive(Debug, Clone)]
pub struct SpecialSettings {
    pub preset: String,
    pub set_yaw: bool,
    pub set_bparam: bool,
    pub bparam: String,
}

#[derive(Debug, Clone)]
pub enum EmptyRole {
    None,
    Special(SpecialSettings),
    WaterBox(WaterBoxType),
}

#[derive(Debug, Clone)]
pub struct Empty {
    pub display_size: f32,
    pub role: EmptyRole,
}

#[derive(Debug, Clone)]
pub enum ObjectData {
    Mesh(Mesh),
    Empty(Empty),
}

/// One node of the flattened, rotation-normalized hierarchy handed over by
/// the editor. The root's `matrix_local` is its world matrix.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub matrix_local: MatrixF,
    pub data: ObjectData,
    pub room: u8,
    pub ignore_collision: bool,
    pub children: Vec<SceneObject>,
}

impl CollisionMaterial {
    pub fn new(name: &str, collision_type: &str) -> Self {
        CollisionMaterial {
            name: name.to_owned(),
            collision_type: collision_type.to_owned(),
            custom_value: String::new(),
            use_collision_param: false,
            collision_param: String::new(),
        }
    }

    pub fn with_param(mut self, param: &str) -> Self {
        self.use_collision_param = true;
        self.collision_param = param.to_owned();
        self
    }

    pub fn with_custom_value(mut self, value: &str) -> Self {
        self.custom_value = value.to_owned();
        self
    }
}

impl Face {
    pub fn new(vertices: &[u32], material_index: usize) -> Self {
        Face {
            vertices: vertices.to_vec(),
            material_index,
        }
    }

    /// Fan triangulation from the first corner. Faces with fewer than three
    /// corners produce nothing.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        let first = self.vertices.first().copied().unwrap_or_default();
        self.vertices
            .windows(2)
            .skip(1)
            .map(move |pair| [first, pair[0], pair[1]])
    }
}

impl SceneObject {
    fn new(name: &str, data: ObjectData) -> Self {
        SceneObject {
            name: name.to_owned(),
            matrix_local: MatrixF::identity(),
            data,
            room: 0,
            ignore_collision: false,
            children: vec![],
        }
    }

    pub fn mesh(name: &str, mesh: Mesh) -> Self {
        SceneObject::new(name, ObjectData::Mesh(mesh))
    }

    pub fn empty(name: &str, display_size: f32, role: EmptyRole) -> Self {
        SceneObject::new(name, ObjectData::Empty(Empty { display_size, role }))
    }

    pub fn with_matrix(mut self, matrix_local: MatrixF) -> Self {
        self.matrix_local = matrix_local;
        self
    }

    pub fn with_room(mut self, room: u8) -> Self {
        self.room = room;
        self
    }

    pub fn with_child(mut self, child: SceneObject) -> Self {
        self.children.push(child);
        self
    }
}
