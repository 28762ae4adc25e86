use crate::io::*;
use crate::types::*;
use bytes::BufMut;
use std::io::Write;

/// Data type tags of the insertable binary container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertableType {
    DisplayList = 0,
    Geolayout = 1,
    Animation = 2,
    Collision = 3,
}

/// A payload plus the information needed to relocate it later: the address it
/// was laid out at and the offsets of any pointers inside it.
#[derive(Debug, Clone)]
pub struct InsertableBinary {
    pub data_type: InsertableType,
    pub pointer_offsets: Vec<u32>,
    pub start_address: u32,
    pub data: Vec<u8>,
}

impl InsertableBinary {
    pub fn new(data_type: InsertableType, start_address: u32, data: Vec<u8>) -> Self {
        InsertableBinary {
            data_type,
            pointer_offsets: vec![],
            start_address,
            data,
        }
    }

    pub fn save<W: Write>(&self, to: &mut W) -> ColResult<()> {
        to.write_all(&self.to_bytes()?)?;
        Ok(())
    }
}

impl Writable for InsertableBinary {
    fn write(&self, to: &mut dyn BufMut) -> ColResult<()> {
        (self.data_type as u32).write(to)?;
        (self.data.len() as u32).write(to)?;
        self.start_address.write(to)?;
        (self.pointer_offsets.len() as u32).write(to)?;
        for pointer in &self.pointer_offsets {
            pointer.write(to)?;
        }
        to.put_slice(&self.data);
        Ok(())
    }
}
