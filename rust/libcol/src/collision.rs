use crate::c_data::CData;
use crate::io::*;
use crate::special::SpecialObject;
use crate::surface::SurfaceType;
use crate::types::*;
use crate::water_box::WaterBox;
use bytes::BufMut;
use col_derive::Writable;
use itertools::Itertools;
use linked_hash_map::LinkedHashMap;
use std::io::{Seek, SeekFrom, Write};

pub const TERRAIN_LOAD_VERTICES: u16 = 0x0040;
pub const TERRAIN_LOAD_CONTINUE: u16 = 0x0041;
pub const TERRAIN_LOAD_END: u16 = 0x0042;
pub const TERRAIN_LOAD_OBJECTS: u16 = 0x0043;
pub const TERRAIN_LOAD_ENVIRONMENT: u16 = 0x0044;

const ROOMS_PER_LINE: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Writable)]
pub struct CollisionVertex {
    pub position: Vec3I,
}

/// Extra per-triangle halfword read by force surfaces (first byte is a speed
/// index, second byte a rotation). The literal is kept so the C text repeats
/// what the artist typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialParam {
    pub value: u16,
    pub literal: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionTriangle {
    pub indices: [VertexIndex; 3],
    pub special_param: Option<SpecialParam>,
    pub room: u8,
}

/// Collision data of one exported object: deduplicated vertices, triangles
/// grouped by surface in first-seen order, and the optional special object
/// and water box sections.
#[derive(Debug, Clone)]
pub struct Collision {
    pub name: String,
    pub start_address: u32,
    pub vertices: Vec<CollisionVertex>,
    pub triangles: LinkedHashMap<SurfaceType, Vec<CollisionTriangle>>,
    pub specials: Vec<SpecialObject>,
    pub water_boxes: Vec<WaterBox>,
}

impl SpecialParam {
    /// Parses the hexadecimal parameter, with or without a `0x` prefix.
    pub fn parse(literal: &str) -> ColResult<SpecialParam> {
        let trimmed = literal.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let value = u16::from_str_radix(digits, 16).map_err(|_| ColError::InvalidLiteral {
            what: "Collision parameter",
            literal: literal.to_owned(),
        })?;
        Ok(SpecialParam {
            value,
            literal: trimmed.to_owned(),
        })
    }
}

impl Writable for SpecialParam {
    fn write(&self, to: &mut dyn BufMut) -> ColResult<()> {
        self.value.write(to)
    }
}

impl CollisionVertex {
    pub fn to_c(&self) -> String {
        format!("COL_VERTEX({}),\n", self.position)
    }
}

impl CollisionTriangle {
    pub fn size(&self) -> usize {
        match self.special_param {
            Some(_) => 8,
            None => 6,
        }
    }

    pub fn to_c(&self) -> String {
        let [a, b, c] = self.indices;
        match &self.special_param {
            None => format!("COL_TRI({}, {}, {}),\n", a, b, c),
            Some(param) => format!(
                "COL_TRI_SPECIAL({}, {}, {}, {}),\n",
                a,
                b,
                c,
                param.literal
            ),
        }
    }
}

impl Writable for CollisionTriangle {
    fn write(&self, to: &mut dyn BufMut) -> ColResult<()> {
        for index in &self.indices {
            index.write(to)?;
        }
        self.special_param.write(to)
    }
}

impl Collision {
    pub fn new(name: &str) -> Collision {
        Collision {
            name: name.to_owned(),
            start_address: 0,
            vertices: vec![],
            triangles: LinkedHashMap::new(),
            specials: vec![],
            water_boxes: vec![],
        }
    }

    /// Returns the index of `position`, appending it if it has not been seen.
    pub fn intern_vertex(&mut self, position: Vec3I) -> ColResult<VertexIndex> {
        let index = match self.vertices.iter().position(|v| v.position == position) {
            Some(index) => index,
            None => {
                self.vertices.push(CollisionVertex { position });
                self.vertices.len() - 1
            }
        };
        u16::try_from(index)
            .map(VertexIndex)
            .map_err(|_| ColError::ValueOutOfRange {
                what: "Vertex index",
                value: index as i64,
            })
    }

    pub fn add_triangle(
        &mut self,
        surface: SurfaceType,
        positions: [Vec3I; 3],
        special_param: Option<SpecialParam>,
        room: u8,
    ) -> ColResult<()> {
        let indices = [
            self.intern_vertex(positions[0])?,
            self.intern_vertex(positions[1])?,
            self.intern_vertex(positions[2])?,
        ];
        self.triangles
            .entry(surface)
            .or_insert_with(Vec::new)
            .push(CollisionTriangle {
                indices,
                special_param,
                room,
            });
        Ok(())
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.values().map(|tris| tris.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Byte length of `to_binary()`.
    pub fn size(&self) -> usize {
        let vertices = 4 + 6 * self.vertices.len();
        let triangles: usize = self
            .triangles
            .values()
            .map(|tris| 4 + tris.iter().map(|t| t.size()).sum::<usize>())
            .sum();
        let specials = if self.specials.is_empty() {
            0
        } else {
            4 + self.specials.iter().map(|s| s.size()).sum::<usize>()
        };
        let water_boxes = if self.water_boxes.is_empty() {
            0
        } else {
            4 + self.water_boxes.iter().map(|w| w.size()).sum::<usize>()
        };
        vertices + triangles + 2 + specials + water_boxes + 2
    }

    /// Aligns the start to 8 bytes and returns the `[start, end)` range the
    /// data will occupy. The range has to fit the 32-bit address space.
    pub fn set_addr(&mut self, start_address: u32) -> ColResult<(u32, u32)> {
        let start = u64::from(start_address).next_multiple_of(8);
        let end = start + self.size() as u64;
        if end > u64::from(u32::MAX) {
            return Err(ColError::RangeOverflow {
                end,
                max: u64::from(u32::MAX),
            });
        }
        self.start_address = start as u32;
        log::info!(
            "Collision {}: {:#x}, {}",
            self.name,
            self.start_address,
            end - start
        );
        Ok((start as u32, end as u32))
    }

    /// Encodes everything before seeking, so a failure leaves `to` untouched.
    pub fn save_binary<W>(&self, to: &mut W) -> ColResult<()>
    where
        W: Write + Seek,
    {
        let data = self.to_binary()?;
        to.seek(SeekFrom::Start(self.start_address as u64))?;
        to.write_all(&data)?;
        Ok(())
    }

    pub fn to_binary(&self) -> ColResult<Vec<u8>> {
        self.to_bytes()
    }

    pub fn rooms_name(&self) -> String {
        format!("{}_rooms", self.name)
    }

    /// C source of the record. Values are range checked the same way the
    /// binary writer checks them, so both formats accept the same data.
    pub fn to_c(&self) -> ColResult<CData> {
        let mut data = CData::new();
        data.header = format!("extern const Collision {}[];\n", self.name);

        let source = &mut data.source;
        source.push_str(&format!("const Collision {}[] = {{\n", self.name));
        source.push_str("\tCOL_INIT(),\n");
        source.push_str(&format!(
            "\tCOL_VERTEX_INIT({}),\n",
            to_count(self.vertices.len())?
        ));
        for vertex in &self.vertices {
            source.push('\t');
            source.push_str(&vertex.to_c());
        }
        for (surface, triangles) in self.triangles.iter() {
            source.push_str(&format!(
                "\tCOL_TRI_INIT({}, {}),\n",
                surface.symbol(),
                to_count(triangles.len())?
            ));
            for triangle in triangles {
                source.push('\t');
                source.push_str(&triangle.to_c());
            }
        }
        source.push_str("\tCOL_TRI_STOP(),\n");
        if !self.specials.is_empty() {
            source.push_str(&format!(
                "\tCOL_SPECIAL_INIT({}),\n",
                to_count(self.specials.len())?
            ));
            for special in &self.specials {
                source.push('\t');
                source.push_str(&special.to_c()?);
            }
        }
        if !self.water_boxes.is_empty() {
            source.push_str(&format!(
                "\tCOL_WATER_BOX_INIT({}),\n",
                to_count(self.water_boxes.len())?
            ));
            for water_box in &self.water_boxes {
                source.push('\t');
                source.push_str(&water_box.to_c()?);
            }
        }
        source.push_str("\tCOL_END()\n};\n");
        Ok(data)
    }

    /// Room of every triangle, in the same order `to_binary` writes them.
    pub fn to_c_rooms(&self) -> CData {
        let mut data = CData::new();
        data.header = format!("extern const u8 {}[];\n", self.rooms_name());
        data.source = format!("const u8 {}[] = {{\n\t", self.rooms_name());

        let rooms = self.triangles.values().flatten().map(|t| t.room);
        for line in &rooms.chunks(ROOMS_PER_LINE) {
            let line: Vec<u8> = line.collect();
            for room in &line {
                data.source.push_str(&format!("{}, ", room));
            }
            if line.len() == ROOMS_PER_LINE {
                data.source.push_str("\n\t");
            }
        }
        data.source.push_str("\n};\n");
        data
    }
}

impl Writable for Collision {
    fn write(&self, to: &mut dyn BufMut) -> ColResult<()> {
        write_section(TERRAIN_LOAD_VERTICES, &self.vertices, to)?;
        for (surface, triangles) in self.triangles.iter() {
            surface.code().write(to)?;
            write_vec(triangles, to)?;
        }
        TERRAIN_LOAD_CONTINUE.write(to)?;
        if !self.specials.is_empty() {
            write_section(TERRAIN_LOAD_OBJECTS, &self.specials, to)?;
        }
        if !self.water_boxes.is_empty() {
            write_section(TERRAIN_LOAD_ENVIRONMENT, &self.water_boxes, to)?;
        }
        TERRAIN_LOAD_END.write(to)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::special::SpecialObject;
    use crate::water_box::WaterBoxType;
    use std::io::Cursor;

    fn single_triangle() -> Collision {
        let mut collision = Collision::new("test_collision");
        collision
            .add_triangle(
                SurfaceType::named("SURFACE_DEFAULT").unwrap(),
                [
                    Vec3I::new(0, 0, 0),
                    Vec3I::new(10, 0, 0),
                    Vec3I::new(0, 10, 0),
                ],
                None,
                0,
            )
            .unwrap();
        collision
    }

    #[test]
    fn single_triangle_binary() {
        let collision = single_triangle();
        let expected: Vec<u8> = vec![
            0x00, 0x40, 0x00, 0x03, //
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
            0x00, 0x0A, 0x00, 0x00, 0x00, 0x00, //
            0x00, 0x00, 0x00, 0x0A, 0x00, 0x00, //
            0x00, 0x00, 0x00, 0x01, //
            0x00, 0x00, 0x00, 0x01, 0x00, 0x02, //
            0x00, 0x41, 0x00, 0x42,
        ];
        let binary = collision.to_binary().unwrap();
        assert_eq!(binary, expected);
        assert_eq!(binary.len(), 36);
        assert_eq!(collision.size(), 36);
    }

    #[test]
    fn single_triangle_c() {
        let data = single_triangle().to_c().unwrap();
        assert_eq!(data.header, "extern const Collision test_collision[];\n");
        assert_eq!(
            data.source,
            "const Collision test_collision[] = {\n\
             \tCOL_INIT(),\n\
             \tCOL_VERTEX_INIT(3),\n\
             \tCOL_VERTEX(0, 0, 0),\n\
             \tCOL_VERTEX(10, 0, 0),\n\
             \tCOL_VERTEX(0, 10, 0),\n\
             \tCOL_TRI_INIT(SURFACE_DEFAULT, 1),\n\
             \tCOL_TRI(0, 1, 2),\n\
             \tCOL_TRI_STOP(),\n\
             \tCOL_END()\n\
             };\n"
        );
    }

    #[test]
    fn shared_positions_share_an_index() {
        let mut collision = single_triangle();
        collision
            .add_triangle(
                SurfaceType::named("SURFACE_DEFAULT").unwrap(),
                [
                    Vec3I::new(10, 0, 0),
                    Vec3I::new(10, 10, 0),
                    Vec3I::new(0, 10, 0),
                ],
                None,
                0,
            )
            .unwrap();
        assert_eq!(collision.vertices.len(), 4);
        let tris = &collision.triangles[&SurfaceType::named("SURFACE_DEFAULT").unwrap()];
        assert_eq!(tris[1].indices, [VertexIndex(1), VertexIndex(3), VertexIndex(2)]);
    }

    #[test]
    fn surface_sections_follow_first_seen_order() {
        let mut collision = Collision::new("order");
        let tri = |o: i16| {
            [
                Vec3I::new(o, 0, 0),
                Vec3I::new(o + 1, 0, 0),
                Vec3I::new(o, 1, 0),
            ]
        };
        let ice = SurfaceType::named("SURFACE_ICE").unwrap();
        let hard = SurfaceType::named("SURFACE_HARD").unwrap();
        collision.add_triangle(ice.clone(), tri(0), None, 0).unwrap();
        collision.add_triangle(hard.clone(), tri(5), None, 0).unwrap();
        collision.add_triangle(ice.clone(), tri(10), None, 0).unwrap();

        let source = collision.to_c().unwrap().source;
        let ice_at = source.find("COL_TRI_INIT(SURFACE_ICE, 2)").unwrap();
        let hard_at = source.find("COL_TRI_INIT(SURFACE_HARD, 1)").unwrap();
        assert!(ice_at < hard_at);

        // vertices: 9 * 6 + 4 header, then ice group first
        let binary = collision.to_binary().unwrap();
        let group_start = 4 + 9 * 6;
        assert_eq!(&binary[group_start..group_start + 4], &[0x00, 0x2E, 0x00, 0x02]);
        let hard_start = group_start + 4 + 2 * 6;
        assert_eq!(&binary[hard_start..hard_start + 4], &[0x00, 0x30, 0x00, 0x01]);
    }

    #[test]
    fn special_param_adds_a_halfword_per_triangle() {
        let mut collision = Collision::new("force");
        let water = SurfaceType::named("SURFACE_FLOWING_WATER").unwrap();
        collision
            .add_triangle(
                water.clone(),
                [Vec3I::new(0, 0, 0), Vec3I::new(1, 0, 0), Vec3I::new(0, 1, 0)],
                Some(SpecialParam::parse("0x0140").unwrap()),
                0,
            )
            .unwrap();
        collision
            .add_triangle(
                water,
                [Vec3I::new(0, 0, 0), Vec3I::new(0, 1, 0), Vec3I::new(0, 0, 1)],
                None,
                0,
            )
            .unwrap();

        let binary = collision.to_binary().unwrap();
        assert_eq!(binary.len(), collision.size());
        // 4 vertices
        let group = 4 + 4 * 6;
        assert_eq!(
            &binary[group..group + 4 + 8 + 6],
            &[
                0x00, 0x0E, 0x00, 0x02, //
                0x00, 0x00, 0x00, 0x01, 0x00, 0x02, 0x01, 0x40, //
                0x00, 0x00, 0x00, 0x02, 0x00, 0x03,
            ]
        );
        let source = collision.to_c().unwrap().source;
        assert!(source.contains("\tCOL_TRI_SPECIAL(0, 1, 2, 0x0140),\n"));
        assert!(source.contains("\tCOL_TRI(0, 2, 3),\n"));
    }

    #[test]
    fn specials_and_water_boxes_sections() {
        let mut collision = single_triangle();
        let origin = Point3F::new(0.0, 0.0, 0.0);
        collision.specials.push(SpecialObject::new("0", origin));
        collision.specials.push(SpecialObject::new("1", origin).with_yaw(90.0));
        collision
            .specials
            .push(SpecialObject::new("2", origin).with_yaw_and_param(90.0, "3"));
        collision.water_boxes.push(WaterBox::new(
            WaterBoxType::Water,
            origin,
            Point3F::new(1.0, 1.0, 1.0),
            10.0,
        ));

        let binary = collision.to_binary().unwrap();
        assert_eq!(binary.len(), collision.size());
        assert_eq!(binary.len(), 36 + 4 + (8 + 10 + 12) + 4 + 12);

        let specials = 34;
        assert_eq!(&binary[specials..specials + 4], &[0x00, 0x43, 0x00, 0x03]);
        let water = specials + 4 + 30;
        assert_eq!(&binary[water..water + 4], &[0x00, 0x44, 0x00, 0x01]);
        assert_eq!(&binary[binary.len() - 2..], &[0x00, 0x42]);

        let source = collision.to_c().unwrap().source;
        let lines: Vec<&str> = source.lines().collect();
        let at = lines.iter().position(|l| *l == "\tCOL_SPECIAL_INIT(3),").unwrap();
        assert_eq!(lines[at + 1], "\tSPECIAL_OBJECT(0, 0, 0, 0),");
        assert_eq!(lines[at + 2], "\tSPECIAL_OBJECT_WITH_YAW(1, 0, 0, 0, 90),");
        assert_eq!(
            lines[at + 3],
            "\tSPECIAL_OBJECT_WITH_YAW_AND_PARAM(2, 0, 0, 0, 90, 3),"
        );
        assert_eq!(lines[at + 4], "\tCOL_WATER_BOX_INIT(1),");
        assert_eq!(lines[at + 5], "\tCOL_WATER_BOX(0x00, -10, -10, 10, 10, 10),");
        assert_eq!(lines[at + 6], "\tCOL_END()");
    }

    #[test]
    fn set_addr_aligns_to_eight_bytes() {
        let mut collision = single_triangle();
        assert_eq!(collision.set_addr(0x1001).unwrap(), (0x1008, 0x1008 + 36));
        assert_eq!(collision.set_addr(0x1008).unwrap(), (0x1008, 0x1008 + 36));
        assert_eq!(collision.set_addr(0x100F).unwrap(), (0x1010, 0x1010 + 36));
        assert_eq!(collision.set_addr(0).unwrap(), (0, 36));
    }

    #[test]
    fn set_addr_past_the_address_space_is_an_error() {
        let mut collision = single_triangle();
        collision.set_addr(0x40).unwrap();
        assert!(matches!(
            collision.set_addr(0xFFFF_FFF9),
            Err(ColError::RangeOverflow { end, max: 0xFFFF_FFFF }) if end == 0x1_0000_0000 + 36
        ));
        assert!(collision.set_addr(0xFFFF_FFE0).is_err());
        assert_eq!(collision.start_address, 0x40);
        assert_eq!(
            collision.set_addr(0xFFFF_FFD8).unwrap(),
            (0xFFFF_FFD8, 0xFFFF_FFFC)
        );
    }

    #[test]
    fn c_text_is_range_checked_like_the_binary() {
        let mut collision = single_triangle();
        collision
            .specials
            .push(SpecialObject::new("1", Point3F::new(0.0, 90000.0, 0.0)));
        assert!(matches!(
            collision.to_c(),
            Err(ColError::ValueOutOfRange { value: 90000, .. })
        ));
        assert!(collision.to_binary().is_err());

        let mut collision = single_triangle();
        collision.water_boxes.push(WaterBox::new(
            WaterBoxType::Water,
            Point3F::new(0.0, 0.0, 0.0),
            Point3F::new(1000.0, 1.0, 1.0),
            100.0,
        ));
        assert!(matches!(
            collision.to_c(),
            Err(ColError::ValueOutOfRange { value: -100000, .. })
        ));
        assert!(collision.to_binary().is_err());
    }

    #[test]
    fn save_binary_writes_at_start_address() {
        let mut collision = single_triangle();
        collision.set_addr(3).unwrap();
        let mut rom = Cursor::new(vec![0xFFu8; 64]);
        collision.save_binary(&mut rom).unwrap();
        let rom = rom.into_inner();
        assert_eq!(&rom[..8], &[0xFF; 8]);
        assert_eq!(&rom[8..44], collision.to_binary().unwrap().as_slice());
        assert_eq!(&rom[44..], &[0xFF; 20]);
    }

    #[test]
    fn failed_encoding_leaves_target_untouched() {
        let mut collision = single_triangle();
        collision
            .specials
            .push(SpecialObject::new("special_null_start", Point3F::new(0.0, 0.0, 0.0)));
        let mut rom = Cursor::new(vec![0xFFu8; 64]);
        assert!(collision.save_binary(&mut rom).is_err());
        assert_eq!(rom.position(), 0);
        assert!(rom.into_inner().iter().all(|b| *b == 0xFF));
    }

    #[test]
    fn rooms_wrap_every_eight_triangles() {
        let mut collision = Collision::new("rooms");
        let surface = SurfaceType::named("SURFACE_DEFAULT").unwrap();
        for i in 0..9i16 {
            collision
                .add_triangle(
                    surface.clone(),
                    [
                        Vec3I::new(i, 0, 0),
                        Vec3I::new(i, 1, 0),
                        Vec3I::new(i, 0, 1),
                    ],
                    None,
                    (i % 3) as u8,
                )
                .unwrap();
        }
        let data = collision.to_c_rooms();
        assert_eq!(data.header, "extern const u8 rooms_rooms[];\n");
        assert_eq!(
            data.source,
            "const u8 rooms_rooms[] = {\n\t0, 1, 2, 0, 1, 2, 0, 1, \n\t2, \n};\n"
        );
    }

    #[test]
    fn special_param_parsing() {
        assert_eq!(SpecialParam::parse("0x1234").unwrap().value, 0x1234);
        assert_eq!(SpecialParam::parse("ff").unwrap().value, 0xFF);
        assert_eq!(SpecialParam::parse("0x0140").unwrap().literal, "0x0140");
        assert!(SpecialParam::parse("0x10000").is_err());
        assert!(SpecialParam::parse("speed").is_err());
    }
}
