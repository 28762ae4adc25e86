// C library

use std::{
    collections::HashMap,
    ffi::{c_char, CStr, CString},
    fs::OpenOptions,
    path::Path,
    sync::Arc,
    thread,
    time::Instant,
};

use cgmath::SquareMatrix;
use col::{
    types::{ColError, MatrixF, Point3F},
    water_box::WaterBoxType,
};
use colbuilder::{
    builder::ProgressEventListener,
    export::{export_collision_binary, export_collision_c, export_collision_insertable},
    scene::*,
    settings::{ExportSettings, HeaderType},
};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

pub const STATUS_OK: i32 = 0;
pub const STATUS_EXPORT_FAILED: i32 = 1;
pub const STATUS_INVALID_ARGUMENT: i32 = -1;

type ListenerCallback = unsafe extern "C" fn(bool, u32, u32, *const c_char, *const c_char);
type ErrorCallback = unsafe extern "C" fn(*const c_char);

fn c_string(value: &str) -> CString {
    CString::new(value.replace('\0', "")).unwrap_or_default()
}

struct ConsoleProgressListener {
    thread_tx: Option<std::sync::mpsc::Sender<(bool, u32, u32, String, String)>>,
    listener_cb: ListenerCallback,
}

impl ConsoleProgressListener {
    fn new(listener_cb: ListenerCallback) -> Self {
        ConsoleProgressListener {
            thread_tx: None,
            listener_cb,
        }
    }

    fn init(&mut self) -> thread::JoinHandle<()> {
        let (sender, receiver) = std::sync::mpsc::channel();
        self.thread_tx = Some(sender);
        thread::spawn(move || {
            let progress_bar = MultiProgress::new();
            let mut progress_types: HashMap<String, (ProgressBar, Instant)> = HashMap::new();
            while let Ok((stop, current, total, status, finish_status)) = receiver.recv() {
                if stop {
                    break;
                }
                if total == 0 {
                    let _ = progress_bar.println(status);
                } else if let Some((bar, last_updated)) = progress_types.get_mut(&status) {
                    let now = Instant::now();
                    if now.duration_since(*last_updated).as_millis() < 100 && total != current {
                        continue;
                    }
                    *last_updated = now;

                    bar.set_length(total as u64);
                    bar.set_position(current as u64);
                    if current == total {
                        bar.finish_with_message(finish_status);
                    }
                } else {
                    let style =
                        ProgressStyle::with_template("{msg} {bar:40.cyan/blue} {pos:>7}/{len:7}")
                            .unwrap_or_else(|_| ProgressStyle::default_bar());
                    let bar = progress_bar.add(ProgressBar::new(total as u64));
                    bar.set_style(style);
                    bar.set_position(current as u64);
                    bar.set_message(status.clone());
                    progress_types.insert(status, (bar, Instant::now()));
                }
            }
        })
    }

    fn stop(&self) {
        unsafe {
            let empty = c_string("");
            (self.listener_cb)(true, 0, 0, empty.as_ptr(), empty.as_ptr());
        }
        if let Some(tx) = &self.thread_tx {
            let _ = tx.send((true, 0, 0, String::new(), String::new()));
        }
    }
}

impl ProgressEventListener for ConsoleProgressListener {
    fn progress(&mut self, current: u32, total: u32, status: String, finish_status: String) {
        unsafe {
            let stat = c_string(&status);
            let fin = c_string(&finish_status);
            (self.listener_cb)(false, current, total, stat.as_ptr(), fin.as_ptr());
        }
        if let Some(tx) = &self.thread_tx {
            let _ = tx.send((false, current, total, status, finish_status));
        }
    }
}

struct PendingObject {
    parent: i32,
    object: SceneObject,
}

/// Objects handed over by the host, in creation order. A handle is the index
/// into `objects`; parents must be created before their children.
pub struct ColBuilderImpl {
    objects: Vec<PendingObject>,
}

impl ColBuilderImpl {
    fn add(&mut self, parent: i32, object: SceneObject) -> i32 {
        if parent >= self.objects.len() as i32 {
            log::warn!("{}: parent {} does not exist", object.name, parent);
            return STATUS_INVALID_ARGUMENT;
        }
        self.objects.push(PendingObject { parent, object });
        (self.objects.len() - 1) as i32
    }

    fn mesh_mut(&mut self, handle: i32) -> Option<&mut Mesh> {
        let pending = self.objects.get_mut(usize::try_from(handle).ok()?)?;
        match &mut pending.object.data {
            ObjectData::Mesh(mesh) => Some(mesh),
            ObjectData::Empty(_) => None,
        }
    }

    /// Links every object under its parent and returns the first top level
    /// object.
    fn assemble(&self) -> Option<SceneObject> {
        let mut slots: Vec<Option<SceneObject>> =
            self.objects.iter().map(|p| Some(p.object.clone())).collect();
        for index in (0..slots.len()).rev() {
            let parent = self.objects[index].parent;
            if parent < 0 {
                continue;
            }
            if let Some(child) = slots[index].take() {
                if let Some(parent) = slots[parent as usize].as_mut() {
                    parent.children.insert(0, child);
                }
            }
        }
        let mut roots = slots.into_iter().flatten();
        let root = roots.next();
        let extra = roots.count();
        if extra > 0 {
            log::warn!("Ignoring {} objects outside the exported hierarchy", extra);
        }
        root
    }
}

/// Mirrors `ExportSettings` for the host. Null strings fall back to defaults.
#[repr(C)]
pub struct ColExportSettings {
    pub name: *const c_char,
    pub scale: f32,
    pub include_children: bool,
    pub include_specials: bool,
    pub write_rooms: bool,
    /// 0 = actor, 1 = level, anything else = custom.
    pub header_type: i32,
    pub group_name: *const c_char,
    pub level_name: *const c_char,
    pub custom_export: bool,
}

unsafe fn read_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_owned())
}

unsafe fn read_point(ptr: *const f32) -> Point3F {
    if ptr.is_null() {
        return Point3F::new(0.0, 0.0, 0.0);
    }
    Point3F::new(*ptr, *ptr.offset(1), *ptr.offset(2))
}

/// Reads 16 floats in column-major order.
unsafe fn read_matrix(ptr: *const f32) -> MatrixF {
    if ptr.is_null() {
        return MatrixF::identity();
    }
    MatrixF::from(*(ptr as *const [[f32; 4]; 4]))
}

unsafe fn read_settings(raw: *const ColExportSettings) -> Option<ExportSettings> {
    let raw = raw.as_ref()?;
    let defaults = ExportSettings::default();
    Some(ExportSettings {
        name: read_str(raw.name).unwrap_or(defaults.name),
        scale: raw.scale,
        include_children: raw.include_children,
        include_specials: raw.include_specials,
        write_rooms: raw.write_rooms,
        header_type: match raw.header_type {
            0 => HeaderType::Actor,
            1 => HeaderType::Level,
            _ => HeaderType::Custom,
        },
        group_name: read_str(raw.group_name),
        level_name: read_str(raw.level_name).unwrap_or(defaults.level_name),
        custom_export: raw.custom_export,
    })
}

unsafe fn report(error_cb: ErrorCallback, error: &ColError) -> i32 {
    log::error!("{}", error);
    let message = c_string(&error.to_string());
    error_cb(message.as_ptr());
    STATUS_EXPORT_FAILED
}

/// Runs an export with a console progress listener attached.
unsafe fn run_export<T>(
    ptr: *const ColBuilderImpl,
    listener_cb: ListenerCallback,
    error_cb: ErrorCallback,
    export: impl FnOnce(&SceneObject, &mut ConsoleProgressListener) -> Result<T, ColError>,
) -> Result<T, i32> {
    let root = match ptr.as_ref().and_then(|builder| builder.assemble()) {
        Some(root) => root,
        None => return Err(report(error_cb, &ColError::NoCollisionData)),
    };

    let mut listener = ConsoleProgressListener::new(listener_cb);
    let join_handler = listener.init();
    let result = export(&root, &mut listener);
    listener.stop();
    let _ = join_handler.join();

    result.map_err(|error| report(error_cb, &error))
}

#[no_mangle]
pub extern "C" fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

#[no_mangle]
pub extern "C" fn new_colbuilder() -> *const ColBuilderImpl {
    Arc::into_raw(Arc::new(ColBuilderImpl { objects: vec![] }))
}

#[no_mangle]
pub unsafe extern "C" fn dispose_colbuilder(ptr: *const ColBuilderImpl) {
    Arc::decrement_strong_count(ptr);
}

#[no_mangle]
pub unsafe extern "C" fn add_mesh_object(
    ptr: *mut ColBuilderImpl,
    parent: i32,
    name: *const c_char,
    matrix_local: *const f32,
    room: u8,
    ignore_collision: bool,
) -> i32 {
    let Some(builder) = ptr.as_mut() else {
        return STATUS_INVALID_ARGUMENT;
    };
    let mut object = SceneObject::mesh(&read_str(name).unwrap_or_default(), Mesh::default())
        .with_matrix(read_matrix(matrix_local))
        .with_room(room);
    object.ignore_collision = ignore_collision;
    builder.add(parent, object)
}

#[no_mangle]
pub unsafe extern "C" fn add_empty_object(
    ptr: *mut ColBuilderImpl,
    parent: i32,
    name: *const c_char,
    matrix_local: *const f32,
) -> i32 {
    let Some(builder) = ptr.as_mut() else {
        return STATUS_INVALID_ARGUMENT;
    };
    let object = SceneObject::empty(&read_str(name).unwrap_or_default(), 1.0, EmptyRole::None)
        .with_matrix(read_matrix(matrix_local));
    builder.add(parent, object)
}

#[no_mangle]
pub unsafe extern "C" fn add_special_object(
    ptr: *mut ColBuilderImpl,
    parent: i32,
    name: *const c_char,
    matrix_local: *const f32,
    preset: *const c_char,
    set_yaw: bool,
    set_bparam: bool,
    bparam: *const c_char,
) -> i32 {
    let Some(builder) = ptr.as_mut() else {
        return STATUS_INVALID_ARGUMENT;
    };
    let role = EmptyRole::Special(SpecialSettings {
        preset: read_str(preset).unwrap_or_default(),
        set_yaw,
        set_bparam,
        bparam: read_str(bparam).unwrap_or_default(),
    });
    let object = SceneObject::empty(&read_str(name).unwrap_or_default(), 1.0, role)
        .with_matrix(read_matrix(matrix_local));
    builder.add(parent, object)
}

#[no_mangle]
pub unsafe extern "C" fn add_water_box_object(
    ptr: *mut ColBuilderImpl,
    parent: i32,
    name: *const c_char,
    matrix_local: *const f32,
    toxic_haze: bool,
    display_size: f32,
) -> i32 {
    let Some(builder) = ptr.as_mut() else {
        return STATUS_INVALID_ARGUMENT;
    };
    let kind = if toxic_haze {
        WaterBoxType::ToxicHaze
    } else {
        WaterBoxType::Water
    };
    let object = SceneObject::empty(
        &read_str(name).unwrap_or_default(),
        display_size,
        EmptyRole::WaterBox(kind),
    )
    .with_matrix(read_matrix(matrix_local));
    builder.add(parent, object)
}

/// Returns the material's slot index on the object.
#[no_mangle]
pub unsafe extern "C" fn add_material(
    ptr: *mut ColBuilderImpl,
    object: i32,
    name: *const c_char,
    collision_type: *const c_char,
    custom_value: *const c_char,
    use_collision_param: bool,
    collision_param: *const c_char,
) -> i32 {
    let Some(mesh) = ptr.as_mut().and_then(|b| b.mesh_mut(object)) else {
        return STATUS_INVALID_ARGUMENT;
    };
    let mut material = CollisionMaterial::new(
        &read_str(name).unwrap_or_default(),
        &read_str(collision_type).unwrap_or_default(),
    )
    .with_custom_value(&read_str(custom_value).unwrap_or_default());
    if use_collision_param {
        material = material.with_param(&read_str(collision_param).unwrap_or_default());
    }
    mesh.materials.push(material);
    (mesh.materials.len() - 1) as i32
}

#[no_mangle]
pub unsafe extern "C" fn add_vertex(ptr: *mut ColBuilderImpl, object: i32, pos: *const f32) -> i32 {
    let Some(mesh) = ptr.as_mut().and_then(|b| b.mesh_mut(object)) else {
        return STATUS_INVALID_ARGUMENT;
    };
    mesh.vertices.push(read_point(pos));
    (mesh.vertices.len() - 1) as i32
}

#[no_mangle]
pub unsafe extern "C" fn add_face(
    ptr: *mut ColBuilderImpl,
    object: i32,
    indices: *const u32,
    count: u32,
    material_index: u32,
) -> i32 {
    let Some(mesh) = ptr.as_mut().and_then(|b| b.mesh_mut(object)) else {
        return STATUS_INVALID_ARGUMENT;
    };
    if indices.is_null() {
        return STATUS_INVALID_ARGUMENT;
    }
    let corners = std::slice::from_raw_parts(indices, count as usize);
    mesh.faces.push(Face::new(corners, material_index as usize));
    STATUS_OK
}

#[no_mangle]
pub unsafe extern "C" fn export_c(
    ptr: *const ColBuilderImpl,
    settings: *const ColExportSettings,
    base_dir: *const c_char,
    listener_cb: ListenerCallback,
    error_cb: ErrorCallback,
) -> i32 {
    let (Some(settings), Some(base_dir)) = (read_settings(settings), read_str(base_dir)) else {
        return STATUS_INVALID_ARGUMENT;
    };
    let result = run_export(ptr, listener_cb, error_cb, |root, listener| {
        export_collision_c(
            root,
            settings.transform(),
            &settings,
            Path::new(&base_dir),
            listener,
        )
    });
    match result {
        Ok(_) => STATUS_OK,
        Err(status) => status,
    }
}

/// Patches the ROM at `rom_path` in place. On success `out_range` receives
/// the start and end address.
#[no_mangle]
pub unsafe extern "C" fn export_binary(
    ptr: *const ColBuilderImpl,
    settings: *const ColExportSettings,
    rom_path: *const c_char,
    start_address: u32,
    end_address: u32,
    out_range: *mut u32,
    listener_cb: ListenerCallback,
    error_cb: ErrorCallback,
) -> i32 {
    let (Some(settings), Some(rom_path)) = (read_settings(settings), read_str(rom_path)) else {
        return STATUS_INVALID_ARGUMENT;
    };
    let result = run_export(ptr, listener_cb, error_cb, |root, listener| {
        let mut rom = OpenOptions::new().read(true).write(true).open(&rom_path)?;
        export_collision_binary(
            root,
            settings.transform(),
            &settings,
            &mut rom,
            start_address,
            end_address,
            listener,
        )
    });
    match result {
        Ok((start, end)) => {
            if !out_range.is_null() {
                *out_range = start;
                *out_range.offset(1) = end;
            }
            STATUS_OK
        }
        Err(status) => status,
    }
}

#[no_mangle]
pub unsafe extern "C" fn export_insertable(
    ptr: *const ColBuilderImpl,
    settings: *const ColExportSettings,
    path: *const c_char,
    listener_cb: ListenerCallback,
    error_cb: ErrorCallback,
) -> i32 {
    let (Some(settings), Some(path)) = (read_settings(settings), read_str(path)) else {
        return STATUS_INVALID_ARGUMENT;
    };
    let result = run_export(ptr, listener_cb, error_cb, |root, listener| {
        let mut file = std::fs::File::create(&path)?;
        export_collision_insertable(root, settings.transform(), &settings, &mut file, listener)
    });
    match result {
        Ok(_) => STATUS_OK,
        Err(status) => status,
    }
}
