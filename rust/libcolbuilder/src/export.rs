use crate::builder::{CollisionBuilder, ProgressEventListener};
use crate::objects::add_special_objects;
use crate::scene::SceneObject;
use crate::settings::{ExportSettings, HeaderType};
use col::collision::Collision;
use col::insertable::{InsertableBinary, InsertableType};
use col::types::*;
use std::fs;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

/// Largest address an insertable payload may reach.
pub const INSERTABLE_LIMIT: u32 = 0xFFFFFF;

/// Classifies `root` (and its children when enabled) and assembles the
/// collision record, gathering specials when requested.
pub fn export_collision_common(
    root: &SceneObject,
    transform: MatrixF,
    settings: &ExportSettings,
    progress: &mut dyn ProgressEventListener,
) -> ColResult<Collision> {
    let mut builder = CollisionBuilder::new();
    builder.add_object(root, transform, settings.include_children)?;

    let name = format!("{}_collision", to_alnum(&settings.name));
    let mut collision = builder.build(&name, progress)?;
    if settings.include_specials {
        add_special_objects(root, transform, &mut collision)?;
    }
    Ok(collision)
}

/// Patches the collision into `rom` at `start_address` (aligned to 8).
/// Nothing is written when the data would end past `end_address`.
pub fn export_collision_binary<W>(
    root: &SceneObject,
    transform: MatrixF,
    settings: &ExportSettings,
    rom: &mut W,
    start_address: u32,
    end_address: u32,
    progress: &mut dyn ProgressEventListener,
) -> ColResult<(u32, u32)>
where
    W: Write + Seek,
{
    let mut collision = export_collision_common(root, transform, settings, progress)?;
    let (start, end) = collision.set_addr(start_address)?;
    if end > end_address {
        return Err(ColError::RangeOverflow {
            end: end.into(),
            max: end_address.into(),
        });
    }
    collision.save_binary(rom)?;
    Ok((start, end))
}

/// Writes the collision as a standalone insertable file and returns the
/// payload.
pub fn export_collision_insertable<W>(
    root: &SceneObject,
    transform: MatrixF,
    settings: &ExportSettings,
    to: &mut W,
    progress: &mut dyn ProgressEventListener,
) -> ColResult<Vec<u8>>
where
    W: Write,
{
    let mut collision = export_collision_common(root, transform, settings, progress)?;
    let (start, end) = collision.set_addr(0)?;
    if end > INSERTABLE_LIMIT {
        return Err(ColError::RangeOverflow {
            end: end.into(),
            max: INSERTABLE_LIMIT.into(),
        });
    }
    let data = collision.to_binary()?;
    InsertableBinary::new(InsertableType::Collision, start, data.clone()).save(to)?;
    Ok(data)
}

/// Directory the collision folder goes into.
pub fn export_dir(base_dir: &Path, settings: &ExportSettings) -> PathBuf {
    if settings.custom_export {
        return base_dir.to_path_buf();
    }
    match settings.header_type {
        HeaderType::Actor => base_dir.join("actors"),
        HeaderType::Level => base_dir.join("levels").join(&settings.level_name),
        HeaderType::Custom => base_dir.to_path_buf(),
    }
}

/// Writes `<dir>/<name>/collision.inc.c`, the optional `rooms.inc.c` and
/// `collision_header.h`, then registers them in the actor group or level
/// files. Returns the header text.
pub fn export_collision_c(
    root: &SceneObject,
    transform: MatrixF,
    settings: &ExportSettings,
    base_dir: &Path,
    progress: &mut dyn ProgressEventListener,
) -> ColResult<String> {
    let group_name = match (settings.header_type, &settings.group_name) {
        (HeaderType::Actor, Some(group)) if !group.is_empty() => Some(group.as_str()),
        (HeaderType::Actor, _) => return Err(ColError::MissingGroupName),
        _ => None,
    };

    let dir = export_dir(base_dir, settings);
    let name = to_alnum(&settings.name);
    let col_dir = dir.join(&name);
    fs::create_dir_all(&col_dir)?;

    let collision = export_collision_common(root, transform, settings, progress)?;
    let mut c_data = collision.to_c()?;
    fs::write(col_dir.join("collision.inc.c"), &c_data.source)?;
    if settings.write_rooms {
        let rooms = collision.to_c_rooms();
        fs::write(col_dir.join("rooms.inc.c"), &rooms.source)?;
        c_data.append(&rooms);
    }
    let header = c_data.header;
    fs::write(col_dir.join("collision_header.h"), &header)?;

    let (group_c, group_h, prefix) = match settings.header_type {
        HeaderType::Actor => {
            let group = group_name.unwrap_or_default();
            (
                dir.join(format!("{}.c", group)),
                dir.join(format!("{}.h", group)),
                name.clone(),
            )
        }
        HeaderType::Level => (
            dir.join("leveldata.c"),
            dir.join("header.h"),
            format!("levels/{}/{}", settings.level_name, name),
        ),
        HeaderType::Custom => return Ok(header),
    };

    write_if_not_found(
        &group_c,
        &format!("\n#include \"{}/collision.inc.c\"", prefix),
        "",
    )?;
    let rooms_include = format!("\n#include \"{}/rooms.inc.c\"", prefix);
    if settings.write_rooms {
        write_if_not_found(&group_c, &rooms_include, "")?;
    } else {
        delete_if_found(&group_c, &rooms_include)?;
    }
    write_if_not_found(
        &group_h,
        &format!("\n#include \"{}/collision_header.h\"", prefix),
        "\n#endif",
    )?;

    log::info!("Exported {} to {}", collision.name, col_dir.display());
    Ok(header)
}

/// Adds `value` to the file unless it is already there. With a footer the
/// value goes right before the footer's last occurrence, otherwise it is
/// appended.
pub fn write_if_not_found(path: &Path, value: &str, footer: &str) -> ColResult<()> {
    if !path.exists() {
        return Err(ColError::MissingFile {
            path: path.display().to_string(),
        });
    }
    let mut data = fs::read_to_string(path)?;
    if data.contains(value) {
        return Ok(());
    }
    if footer.is_empty() {
        data.push_str(value);
    } else {
        let at = data.rfind(footer).ok_or_else(|| ColError::MissingFooter {
            path: path.display().to_string(),
            footer: footer.to_owned(),
        })?;
        data.insert_str(at, &format!("{}\n", value));
    }
    fs::write(path, data)?;
    Ok(())
}

/// Removes every occurrence of `value`. A missing file is left alone.
pub fn delete_if_found(path: &Path, value: &str) -> ColResult<()> {
    if !path.exists() {
        return Ok(());
    }
    let data = fs::read_to_string(path)?;
    if data.contains(value) {
        fs::write(path, data.replace(value, ""))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn include_goes_before_last_footer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("group0.h");
        fs::write(&path, "#ifndef A\n#endif\n#ifndef B\n#endif\n").unwrap();

        write_if_not_found(&path, "\n#include \"x.h\"", "\n#endif").unwrap();
        write_if_not_found(&path, "\n#include \"x.h\"", "\n#endif").unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "#ifndef A\n#endif\n#ifndef B\n#include \"x.h\"\n\n#endif\n"
        );
    }

    #[test]
    fn include_is_appended_without_footer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("group0.c");
        fs::write(&path, "#include \"a.c\"").unwrap();
        write_if_not_found(&path, "\n#include \"b.c\"", "").unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "#include \"a.c\"\n#include \"b.c\""
        );
    }

    #[test]
    fn include_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.c");
        assert!(matches!(
            write_if_not_found(&missing, "x", ""),
            Err(ColError::MissingFile { .. })
        ));
        assert!(delete_if_found(&missing, "x").is_ok());

        let path = dir.path().join("header.h");
        fs::write(&path, "no guard").unwrap();
        assert!(matches!(
            write_if_not_found(&path, "x", "\n#endif"),
            Err(ColError::MissingFooter { .. })
        ));
    }

    #[test]
    fn delete_removes_every_occurrence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leveldata.c");
        fs::write(&path, "a\n#include \"r\"b\n#include \"r\"").unwrap();
        delete_if_found(&path, "\n#include \"r\"").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "ab");
    }

    #[test]
    fn export_dir_follows_header_type() {
        let base = Path::new("/decomp");
        let mut settings = ExportSettings::default();
        assert_eq!(export_dir(base, &settings), base.join("actors"));
        settings.header_type = HeaderType::Level;
        settings.level_name = "wf".to_owned();
        assert_eq!(export_dir(base, &settings), base.join("levels").join("wf"));
        settings.custom_export = true;
        assert_eq!(export_dir(base, &settings), base);
    }
}
