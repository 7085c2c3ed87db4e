//! Parcel wire codec
//!
//! Values are written as little-endian 4-byte words. Strings carry a byte
//! length followed by UTF-8 data padded to a word boundary. Structured
//! parcelables are prefixed with their total size so that readers and writers
//! built from different schema versions can still talk to each other: unknown
//! trailing fields are skipped, missing trailing fields keep their defaults.

use crate::status::{ExceptionCode, Result, Status};

const WORD: usize = 4;

/// Growable parcel being written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parcel {
    buf: Vec<u8>,
}

impl Parcel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write_i32(i32::from(v));
    }

    pub fn write_str(&mut self, s: &str) -> Result<()> {
        let len = i32::try_from(s.len()).map_err(|_| Status::bad_parcelable("string too long"))?;
        self.write_i32(len);
        self.buf.extend_from_slice(s.as_bytes());
        self.pad();
        Ok(())
    }

    /// Write any value implementing [`Parcelable`]
    pub fn write<T: Parcelable>(&mut self, v: &T) -> Result<()> {
        v.write_to_parcel(self)
    }

    /// Write a size-prefixed structured parcelable
    ///
    /// `f` writes the fields. The size word is patched once they are known.
    pub fn write_sized(&mut self, f: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        let start = self.buf.len();
        self.write_i32(0);
        f(self)?;
        let size = i32::try_from(self.buf.len() - start)
            .map_err(|_| Status::bad_parcelable("parcelable too large"))?;
        self.buf[start..start + WORD].copy_from_slice(&size.to_le_bytes());
        Ok(())
    }

    /// Write the reply header for a successful call
    pub fn write_no_exception(&mut self) {
        self.write_i32(ExceptionCode::NONE.0);
    }

    /// Write the reply header for a failed call
    pub fn write_status(&mut self, status: &Status) -> Result<()> {
        let code = status.exception_code();
        self.write_i32(code.0);
        if code == ExceptionCode::NONE {
            return Ok(());
        }
        self.write_str(status.message().unwrap_or_default())?;
        if code == ExceptionCode::SERVICE_SPECIFIC {
            self.write_i32(status.service_specific_error().unwrap_or_default());
        }
        Ok(())
    }

    fn pad(&mut self) {
        let rem = self.buf.len() % WORD;
        if rem != 0 {
            self.buf.resize(self.buf.len() + WORD - rem, 0);
        }
    }
}

/// Cursor over a received parcel
#[derive(Debug, Clone)]
pub struct ParcelReader<'a> {
    data: &'a [u8],
    pos: usize,
    // End of the innermost structured parcelable being read
    limit: usize,
}

impl<'a> ParcelReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            limit: data.len(),
        }
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.limit - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.limit)
            .ok_or_else(|| Status::bad_parcelable("read past end of parcel"))?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let b = self.take(WORD)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_i32()? != 0)
    }

    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_i32()?;
        if len < 0 {
            return Err(Status::new_exception(
                ExceptionCode::NULL_POINTER,
                Some("unexpected null string"),
            ));
        }
        let len = len as usize;
        let padded = len.div_ceil(WORD) * WORD;
        let bytes = self.take(padded)?;
        String::from_utf8(bytes[..len].to_vec())
            .map_err(|_| Status::bad_parcelable("string is not valid UTF-8"))
    }

    /// Read any value implementing [`Parcelable`]
    pub fn read<T: Parcelable>(&mut self) -> Result<T> {
        T::read_from_parcel(self)
    }

    /// Read a size-prefixed structured parcelable
    ///
    /// Inside `f`, reads are bounded by the declared size: reading a field the
    /// writer did not send fails, which [`ParcelReader::read_field`] turns into
    /// a default. Whatever `f` leaves unread is skipped.
    pub fn read_sized<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let start = self.pos;
        let size = self.read_i32()?;
        if size < WORD as i32 {
            return Err(Status::bad_parcelable("parcelable size too small"));
        }
        let end = start
            .checked_add(size as usize)
            .filter(|&end| end <= self.limit)
            .ok_or_else(|| Status::bad_parcelable("parcelable size past end of parcel"))?;

        let outer = std::mem::replace(&mut self.limit, end);
        let value = f(self);
        self.limit = outer;
        self.pos = end;
        value
    }

    /// Read one field of a structured parcelable, or its default if the writer
    /// stopped before it
    pub fn read_field<T: Parcelable + Default>(&mut self) -> Result<T> {
        if self.remaining() == 0 {
            return Ok(T::default());
        }
        self.read()
    }

    /// Read a reply header, returning the call status
    pub fn read_status(&mut self) -> Result<()> {
        let code = ExceptionCode(self.read_i32()?);
        if code == ExceptionCode::NONE {
            return Ok(());
        }
        let message = self.read_string()?;
        let message = (!message.is_empty()).then_some(message.as_str());
        if code == ExceptionCode::SERVICE_SPECIFIC {
            let service_code = self.read_i32()?;
            return Err(Status::new_service_specific(service_code, message));
        }
        Err(Status::new_exception(code, message))
    }
}

/// Value that can be marshaled into and out of a parcel
pub trait Parcelable: Sized {
    fn write_to_parcel(&self, parcel: &mut Parcel) -> Result<()>;

    fn read_from_parcel(reader: &mut ParcelReader<'_>) -> Result<Self>;
}

impl Parcelable for i32 {
    fn write_to_parcel(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write_i32(*self);
        Ok(())
    }

    fn read_from_parcel(reader: &mut ParcelReader<'_>) -> Result<Self> {
        reader.read_i32()
    }
}

impl Parcelable for bool {
    fn write_to_parcel(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write_bool(*self);
        Ok(())
    }

    fn read_from_parcel(reader: &mut ParcelReader<'_>) -> Result<Self> {
        reader.read_bool()
    }
}

impl Parcelable for String {
    fn write_to_parcel(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write_str(self)
    }

    fn read_from_parcel(reader: &mut ParcelReader<'_>) -> Result<Self> {
        reader.read_string()
    }
}

impl Parcelable for Vec<i32> {
    fn write_to_parcel(&self, parcel: &mut Parcel) -> Result<()> {
        let len =
            i32::try_from(self.len()).map_err(|_| Status::bad_parcelable("array too long"))?;
        parcel.write_i32(len);
        for v in self {
            parcel.write_i32(*v);
        }
        Ok(())
    }

    fn read_from_parcel(reader: &mut ParcelReader<'_>) -> Result<Self> {
        let len = reader.read_i32()?;
        if len < 0 {
            return Err(Status::new_exception(
                ExceptionCode::NULL_POINTER,
                Some("unexpected null array"),
            ));
        }
        let len = len as usize;
        // A corrupt length must not trigger a huge allocation
        if len > reader.remaining() / WORD {
            return Err(Status::bad_parcelable("array length past end of parcel"));
        }
        (0..len).map(|_| reader.read_i32()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i32_little_endian() {
        let mut p = Parcel::new();
        p.write_i32(-2);
        p.write_i32(0x0102_0304);
        assert_eq!(p.as_bytes(), &[0xfe, 0xff, 0xff, 0xff, 4, 3, 2, 1]);
    }

    #[test]
    fn test_string_padding() {
        let mut p = Parcel::new();
        p.write_str("abcde").unwrap();
        p.write_i32(7);
        // length word + 5 bytes padded to 8
        assert_eq!(p.len(), 4 + 8 + 4);

        let mut r = ParcelReader::new(p.as_bytes());
        assert_eq!(r.read_string().unwrap(), "abcde");
        assert_eq!(r.read_i32().unwrap(), 7);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_empty_string() {
        let mut p = Parcel::new();
        p.write_str("").unwrap();
        assert_eq!(p.len(), 4);
        assert_eq!(ParcelReader::new(p.as_bytes()).read_string().unwrap(), "");
    }

    #[test]
    fn test_null_string_rejected() {
        let mut p = Parcel::new();
        p.write_i32(-1);
        let err = ParcelReader::new(p.as_bytes()).read_string().unwrap_err();
        assert_eq!(err.exception_code(), ExceptionCode::NULL_POINTER);
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let mut p = Parcel::new();
        p.write_i32(2);
        p.write_i32(i32::from_le_bytes([0xc3, 0x28, 0, 0]));
        let err = ParcelReader::new(p.as_bytes()).read_string().unwrap_err();
        assert_eq!(err.exception_code(), ExceptionCode::BAD_PARCELABLE);
    }

    #[test]
    fn test_truncated_read() {
        let mut r = ParcelReader::new(&[1, 2, 3]);
        let err = r.read_i32().unwrap_err();
        assert_eq!(err.exception_code(), ExceptionCode::BAD_PARCELABLE);
    }

    #[test]
    fn test_bool_nonzero_is_true() {
        let mut p = Parcel::new();
        p.write_i32(5);
        p.write_bool(false);
        let mut r = ParcelReader::new(p.as_bytes());
        assert!(r.read_bool().unwrap());
        assert!(!r.read_bool().unwrap());
    }

    #[test]
    fn test_int_array() {
        let mut p = Parcel::new();
        p.write(&vec![80, 40]).unwrap();
        let v: Vec<i32> = ParcelReader::new(p.as_bytes()).read().unwrap();
        assert_eq!(v, vec![80, 40]);
    }

    #[test]
    fn test_int_array_bogus_length() {
        let mut p = Parcel::new();
        p.write_i32(1_000_000);
        p.write_i32(1);
        let err = ParcelReader::new(p.as_bytes()).read::<Vec<i32>>().unwrap_err();
        assert_eq!(err.exception_code(), ExceptionCode::BAD_PARCELABLE);
    }

    #[test]
    fn test_sized_skips_unknown_trailing_fields() {
        let mut p = Parcel::new();
        p.write_sized(|p| {
            p.write_i32(1);
            p.write_i32(2);
            p.write_str("newer field")
        })
        .unwrap();
        p.write_i32(99);

        let mut r = ParcelReader::new(p.as_bytes());
        let first = r.read_sized(|r| r.read_i32()).unwrap();
        assert_eq!(first, 1);
        assert_eq!(r.read_i32().unwrap(), 99);
    }

    #[test]
    fn test_sized_defaults_missing_fields() {
        let mut p = Parcel::new();
        p.write_sized(|p| {
            p.write_i32(3);
            Ok(())
        })
        .unwrap();

        let mut r = ParcelReader::new(p.as_bytes());
        let (a, b) = r
            .read_sized(|r| Ok((r.read_field::<i32>()?, r.read_field::<i32>()?)))
            .unwrap();
        assert_eq!((a, b), (3, 0));
    }

    #[test]
    fn test_sized_rejects_bad_size() {
        let mut p = Parcel::new();
        p.write_i32(2);
        let err = ParcelReader::new(p.as_bytes())
            .read_sized(|r| r.read_i32())
            .unwrap_err();
        assert_eq!(err.exception_code(), ExceptionCode::BAD_PARCELABLE);

        let mut p = Parcel::new();
        p.write_i32(64);
        let err = ParcelReader::new(p.as_bytes())
            .read_sized(|r| r.read_i32())
            .unwrap_err();
        assert_eq!(err.exception_code(), ExceptionCode::BAD_PARCELABLE);
    }

    #[test]
    fn test_status_header() {
        let mut p = Parcel::new();
        p.write_status(&Status::new_service_specific(1, Some("write stop")))
            .unwrap();
        let err = ParcelReader::new(p.as_bytes()).read_status().unwrap_err();
        assert_eq!(err, Status::new_service_specific(1, Some("write stop")));

        let mut p = Parcel::new();
        p.write_status(&Status::unsupported("nope")).unwrap();
        let err = ParcelReader::new(p.as_bytes()).read_status().unwrap_err();
        assert_eq!(err.exception_code(), ExceptionCode::UNSUPPORTED_OPERATION);
        assert_eq!(err.message(), Some("nope"));

        let mut p = Parcel::new();
        p.write_no_exception();
        assert!(ParcelReader::new(p.as_bytes()).read_status().is_ok());
    }
}
