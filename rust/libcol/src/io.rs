use crate::types::*;
use bytes::BufMut;

/// A record with a fixed big-endian encoding.
pub trait Writable {
    fn write(&self, to: &mut dyn BufMut) -> ColResult<()>;

    fn to_bytes(&self) -> ColResult<Vec<u8>> {
        let mut buf = vec![];
        self.write(&mut buf)?;
        Ok(buf)
    }
}

/// Writes a two byte section marker followed by the two byte item count and
/// every item in order.
pub fn write_section<T>(marker: u16, items: &[T], to: &mut dyn BufMut) -> ColResult<()>
where
    T: Writable,
{
    marker.write(to)?;
    write_vec(items, to)
}

pub fn write_vec<T>(items: &[T], to: &mut dyn BufMut) -> ColResult<()>
where
    T: Writable,
{
    write_count(items.len(), to)?;
    for item in items {
        item.write(to)?;
    }

    Ok(())
}

pub fn write_count(count: usize, to: &mut dyn BufMut) -> ColResult<()> {
    to_count(count)?.write(to)
}

impl<T> Writable for Option<T>
where
    T: Writable,
{
    fn write(&self, to: &mut dyn BufMut) -> ColResult<()> {
        match self {
            Some(value) => value.write(to),
            None => Ok(()),
        }
    }
}

macro_rules! primitive_writable {
    ($ty: ty, $write_fn: ident) => {
        impl Writable for $ty {
            fn write(&self, to: &mut dyn BufMut) -> ColResult<()> {
                Ok(to.$write_fn(*self))
            }
        }
    };
}

primitive_writable!(u8, put_u8);
primitive_writable!(u16, put_u16);
primitive_writable!(u32, put_u32);
primitive_writable!(i16, put_i16);
