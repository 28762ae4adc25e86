use crate::io::*;
use crate::types::*;
use bytes::BufMut;

/// Trailing optional fields of a special object. The parameter can only be
/// present together with the yaw; the record length depends on which
/// variant is used.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecialExtra {
    None,
    /// Yaw in degrees.
    Yaw(f32),
    /// Yaw in degrees and the behavior parameter literal.
    YawAndParam(f32, String),
}

/// A preset object placed by the terrain loader alongside the collision.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecialObject {
    /// Preset as it is written in C: a preset symbol or a numeric literal.
    pub preset: String,
    pub position: Point3F,
    pub extra: SpecialExtra,
}

impl SpecialObject {
    pub fn new(preset: &str, position: Point3F) -> SpecialObject {
        SpecialObject {
            preset: preset.to_owned(),
            position,
            extra: SpecialExtra::None,
        }
    }

    pub fn with_yaw(mut self, yaw_degrees: f32) -> SpecialObject {
        self.extra = SpecialExtra::Yaw(yaw_degrees);
        self
    }

    pub fn with_yaw_and_param(mut self, yaw_degrees: f32, param: &str) -> SpecialObject {
        self.extra = SpecialExtra::YawAndParam(yaw_degrees, param.to_owned());
        self
    }

    /// Builds the trailing fields from the object's flags. The parameter is
    /// dropped when the yaw is not set.
    pub fn from_flags(
        preset: &str,
        position: Point3F,
        yaw_degrees: Option<f32>,
        param: Option<&str>,
    ) -> SpecialObject {
        let special = SpecialObject::new(preset, position);
        match (yaw_degrees, param) {
            (Some(yaw), Some(param)) => special.with_yaw_and_param(yaw, param),
            (Some(yaw), None) => special.with_yaw(yaw),
            (None, _) => special,
        }
    }

    pub fn rounded_position(&self) -> (i64, i64, i64) {
        (
            round_half_even(self.position.x),
            round_half_even(self.position.y),
            round_half_even(self.position.z),
        )
    }

    pub fn rounded_yaw(&self) -> Option<i64> {
        match &self.extra {
            SpecialExtra::None => None,
            SpecialExtra::Yaw(yaw) | SpecialExtra::YawAndParam(yaw, _) => {
                Some(round_half_even(*yaw))
            }
        }
    }

    pub fn size(&self) -> usize {
        match self.extra {
            SpecialExtra::None => 8,
            SpecialExtra::Yaw(_) => 10,
            SpecialExtra::YawAndParam(..) => 12,
        }
    }

    /// Position and yaw as they are stored, rejecting values that do not fit
    /// a halfword.
    fn halfwords(&self) -> ColResult<([u16; 3], Option<u16>)> {
        let (x, y, z) = self.rounded_position();
        let position = [
            to_halfword("Special position", x)?,
            to_halfword("Special position", y)?,
            to_halfword("Special position", z)?,
        ];
        let yaw = match self.rounded_yaw() {
            Some(yaw) => Some(to_halfword("Special yaw", yaw)?),
            None => None,
        };
        Ok((position, yaw))
    }

    /// Presets and parameters are written as given. Only the position and
    /// yaw are range checked.
    pub fn to_c(&self) -> ColResult<String> {
        self.halfwords()?;
        let (x, y, z) = self.rounded_position();
        let yaw = self.rounded_yaw().unwrap_or_default();
        Ok(match &self.extra {
            SpecialExtra::None => {
                format!("SPECIAL_OBJECT({}, {}, {}, {}),\n", self.preset, x, y, z)
            }
            SpecialExtra::Yaw(_) => format!(
                "SPECIAL_OBJECT_WITH_YAW({}, {}, {}, {}, {}),\n",
                self.preset, x, y, z, yaw
            ),
            SpecialExtra::YawAndParam(_, param) => format!(
                "SPECIAL_OBJECT_WITH_YAW_AND_PARAM({}, {}, {}, {}, {}, {}),\n",
                self.preset, x, y, z, yaw, param
            ),
        })
    }
}

impl Writable for SpecialObject {
    fn write(&self, to: &mut dyn BufMut) -> ColResult<()> {
        // Validate the whole record before touching the buffer.
        let preset = to_halfword("Special preset", parse_int_literal("Special preset", &self.preset)?)?;
        let (position, yaw) = self.halfwords()?;
        let param = match &self.extra {
            SpecialExtra::YawAndParam(_, param) => Some(to_halfword(
                "Special parameter",
                parse_int_literal("Special parameter", param)?,
            )?),
            _ => None,
        };

        preset.write(to)?;
        for component in position {
            component.write(to)?;
        }
        yaw.write(to)?;
        param.write(to)?;
        Ok(())
    }
}
