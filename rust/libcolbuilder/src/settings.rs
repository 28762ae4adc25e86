use col::types::MatrixF;

/// Where C output lands inside a decomp checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderType {
    Actor,
    Level,
    /// Write only the collision directory, touch no group files.
    Custom,
}

/// Everything an export call needs, passed explicitly instead of being read
/// from editor state.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub name: String,
    /// Blender units to game units.
    pub scale: f32,
    pub include_children: bool,
    pub include_specials: bool,
    pub write_rooms: bool,
    pub header_type: HeaderType,
    pub group_name: Option<String>,
    pub level_name: String,
    pub custom_export: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            name: "collision".to_owned(),
            scale: 100.0,
            include_children: true,
            include_specials: false,
            write_rooms: false,
            header_type: HeaderType::Actor,
            group_name: None,
            level_name: "bob".to_owned(),
            custom_export: false,
        }
    }
}

impl ExportSettings {
    pub fn transform(&self) -> MatrixF {
        MatrixF::from_nonuniform_scale(self.scale, self.scale, self.scale)
    }
}
