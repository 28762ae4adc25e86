use crate::io::*;
use crate::types::*;
use bytes::BufMut;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterBoxType {
    Water,
    ToxicHaze,
}

impl WaterBoxType {
    pub fn code(&self) -> u8 {
        match self {
            WaterBoxType::Water => 0x00,
            WaterBoxType::ToxicHaze => 0x32,
        }
    }

    pub fn literal(&self) -> &'static str {
        match self {
            WaterBoxType::Water => "0x00",
            WaterBoxType::ToxicHaze => "0x32",
        }
    }
}

/// Axis aligned liquid region: a rectangle on the ground plane and the
/// height of its surface.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterBox {
    pub kind: WaterBoxType,
    /// (x, z) of the low corner.
    pub low: (f32, f32),
    /// (x, z) of the high corner.
    pub high: (f32, f32),
    pub height: f32,
}

impl WaterBox {
    /// `translation` is already in the game's Y-up space while `scale` is
    /// still the object's Z-up local scale, so local Y spans the game's Z
    /// axis and local Z is the depth.
    pub fn new(
        kind: WaterBoxType,
        translation: Point3F,
        scale: Point3F,
        display_size: f32,
    ) -> WaterBox {
        WaterBox {
            kind,
            low: (
                translation.x - scale.x * display_size,
                translation.z - scale.y * display_size,
            ),
            high: (
                translation.x + scale.x * display_size,
                translation.z + scale.y * display_size,
            ),
            height: translation.y + scale.z * display_size,
        }
    }

    fn rounded(&self) -> ColResult<[i16; 5]> {
        Ok([
            round_to_i16("Water box", self.low.0)?,
            round_to_i16("Water box", self.low.1)?,
            round_to_i16("Water box", self.high.0)?,
            round_to_i16("Water box", self.high.1)?,
            round_to_i16("Water box", self.height)?,
        ])
    }

    pub fn size(&self) -> usize {
        12
    }

    pub fn to_c(&self) -> ColResult<String> {
        let [low_x, low_z, high_x, high_z, height] = self.rounded()?;
        Ok(format!(
            "COL_WATER_BOX({}, {}, {}, {}, {}, {}),\n",
            self.kind.literal(),
            low_x,
            low_z,
            high_x,
            high_z,
            height
        ))
    }
}

impl Writable for WaterBox {
    fn write(&self, to: &mut dyn BufMut) -> ColResult<()> {
        let fields = self.rounded()?;
        0u8.write(to)?;
        self.kind.code().write(to)?;
        for field in fields {
            field.write(to)?;
        }
        Ok(())
    }
}
