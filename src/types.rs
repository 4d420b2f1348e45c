use std::ops::{Deref, DerefMut};

use bytes::Buf;
use font_types::Tag;

use crate::error::{Error, bail_if};
use crate::options::SignaturePolicy;

pub const WOFF1_SIG: Tag = Tag::new(b"wOFF");

/// WOFF 1.0 header
///
/// <https://www.w3.org/TR/WOFF/#WOFFHeader>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WoffHeader {
    /// b"wOFF" (anything when parsed leniently)
    pub signature: Tag,
    /// The "sfnt version" of the input font.
    pub flavor: Tag,
    /// Total size of the WOFF file.
    pub length: u32,
    /// Number of entries in directory of font tables.
    pub num_tables: u16,
    /// Reserved; set to 0.
    pub reserved: u16,
    /// Total size needed for the uncompressed font data, including the sfnt header, directory, and font tables (including padding).
    pub total_sfnt_size: u32,
    /// Major version of the WOFF file.
    pub major_version: u16,
    /// Minor version of the WOFF file.
    pub minor_version: u16,
    /// Offset to metadata block, from beginning of WOFF file.
    pub meta_offset: u32,
    /// Length of compressed metadata block.
    pub meta_length: u32,
    /// Uncompressed size of metadata block.
    pub meta_orig_length: u32,
    /// Offset to private data block, from beginning of WOFF file.
    pub priv_offset: u32,
    /// Length of private data block.
    pub priv_length: u32,
}

impl WoffHeader {
    /// Size of the header in bytes
    pub const SIZE: usize = 44;

    pub fn parse(input: &mut impl Buf, signature_policy: SignaturePolicy) -> Result<Self, Error> {
        bail_if!(
            input.remaining() < Self::SIZE,
            Error::Truncated { what: "WOFF header" }
        );

        let signature = Tag::from_u32(input.try_get_u32()?);
        bail_if!(
            signature_policy == SignaturePolicy::Strict && signature != WOFF1_SIG,
            Error::BadSignature { found: signature }
        );

        Ok(Self {
            signature,
            flavor: Tag::from_u32(input.try_get_u32()?),
            length: input.try_get_u32()?,
            num_tables: input.try_get_u16()?,
            reserved: input.try_get_u16()?,
            total_sfnt_size: input.try_get_u32()?,
            major_version: input.try_get_u16()?,
            minor_version: input.try_get_u16()?,
            meta_offset: input.try_get_u32()?,
            meta_length: input.try_get_u32()?,
            meta_orig_length: input.try_get_u32()?,
            priv_offset: input.try_get_u32()?,
            priv_length: input.try_get_u32()?,
        })
    }

    /// Size of the table directory that follows the header, in bytes
    pub fn table_directory_size(&self) -> usize {
        self.num_tables as usize * TableDirectoryEntry::SIZE
    }
}

/// The WOFF table directory, in the order the entries appear in the file.
#[derive(Debug, Clone, Default)]
pub struct TableDirectory {
    pub tables: Vec<TableDirectoryEntry>,
}

impl Deref for TableDirectory {
    type Target = Vec<TableDirectoryEntry>;
    fn deref(&self) -> &Self::Target {
        &self.tables
    }
}
impl DerefMut for TableDirectory {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.tables
    }
}

impl TableDirectory {
    pub fn parse_woff1(input: &mut impl Buf, num_tables: usize) -> Result<Self, Error> {
        bail_if!(
            input.remaining() < num_tables * TableDirectoryEntry::SIZE,
            Error::Truncated {
                what: "table directory"
            }
        );

        let mut tables = Vec::with_capacity(num_tables);
        for _ in 0..num_tables {
            tables.push(TableDirectoryEntry::parse(input)?);
        }
        Ok(Self { tables })
    }

    /// Check that every table lies within an input of `input_len` bytes.
    pub fn check_bounds(&self, input_len: u64) -> Result<(), Error> {
        for table in self.iter() {
            let end = table.woff_offset as u64 + table.woff_length as u64;
            bail_if!(
                end > input_len,
                Error::invalid_directory(
                    table.tag,
                    format!(
                        "data at {}..{end} lies outside the {input_len}-byte input",
                        table.woff_offset
                    ),
                )
            );
        }
        Ok(())
    }
}

/// <https://www.w3.org/TR/WOFF/#TableDirectory>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDirectoryEntry {
    /// 4-byte sfnt table identifier.
    pub tag: Tag,
    /// Offset to the data, from beginning of WOFF file.
    pub woff_offset: u32,
    /// Length of the compressed data, excluding padding.
    pub woff_length: u32,
    /// Length of the uncompressed table, excluding padding.
    pub orig_length: u32,
    /// Checksum of the uncompressed table.
    pub orig_checksum: u32,
}

impl TableDirectoryEntry {
    /// Size of a single entry in bytes
    pub const SIZE: usize = 20;

    pub fn parse(input: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            tag: Tag::from_u32(input.try_get_u32()?),
            woff_offset: input.try_get_u32()?,
            woff_length: input.try_get_u32()?,
            orig_length: input.try_get_u32()?,
            orig_checksum: input.try_get_u32()?,
        })
    }

    /// Whether the table data is zlib-compressed.
    ///
    /// WOFF stores a table uncompressed exactly when its stored length equals its original length.
    pub fn is_compressed(&self) -> bool {
        self.woff_length != self.orig_length
    }
}

#[cfg(test)]
mod tests {
    use bytes::BufMut;

    use super::*;

    fn header_bytes(signature: &[u8; 4], num_tables: u16) -> Vec<u8> {
        let mut out = Vec::new();
        out.put_slice(signature);
        out.put_slice(b"OTTO");
        out.put_u32(1234);
        out.put_u16(num_tables);
        out.put_u16(0);
        out.put_u32(5678);
        out.put_u16(1);
        out.put_u16(2);
        out.put_u32(0);
        out.put_u32(0);
        out.put_u32(0);
        out.put_u32(0);
        out.put_u32(0);
        out
    }

    #[test]
    fn parses_header_fields() {
        let bytes = header_bytes(b"wOFF", 3);
        let header = WoffHeader::parse(&mut &bytes[..], SignaturePolicy::Strict).unwrap();
        assert_eq!(header.flavor, Tag::new(b"OTTO"));
        assert_eq!(header.length, 1234);
        assert_eq!(header.num_tables, 3);
        assert_eq!(header.total_sfnt_size, 5678);
        assert_eq!((header.major_version, header.minor_version), (1, 2));
        assert_eq!(header.table_directory_size(), 60);
    }

    #[test]
    fn signature_policy_is_honoured() {
        let bytes = header_bytes(b"wOF2", 1);
        let err = WoffHeader::parse(&mut &bytes[..], SignaturePolicy::Strict).unwrap_err();
        assert!(matches!(err, Error::BadSignature { found } if found == Tag::new(b"wOF2")));

        let header = WoffHeader::parse(&mut &bytes[..], SignaturePolicy::Lenient).unwrap();
        assert_eq!(header.signature, Tag::new(b"wOF2"));
    }

    #[test]
    fn short_header_is_truncated() {
        let bytes = header_bytes(b"wOFF", 1);
        let err = WoffHeader::parse(&mut &bytes[..40], SignaturePolicy::Strict).unwrap_err();
        assert!(matches!(err, Error::Truncated { .. }));
    }

    #[test]
    fn directory_keeps_file_order_and_checks_bounds() {
        let mut bytes = Vec::new();
        for (tag, offset) in [(b"name", 100u32), (b"cmap", 120)] {
            bytes.put_slice(tag);
            bytes.put_u32(offset);
            bytes.put_u32(10);
            bytes.put_u32(12);
            bytes.put_u32(0xDEAD_BEEF);
        }
        let directory = TableDirectory::parse_woff1(&mut &bytes[..], 2).unwrap();
        assert_eq!(directory[0].tag, Tag::new(b"name"));
        assert_eq!(directory[1].tag, Tag::new(b"cmap"));
        assert!(directory[0].is_compressed());

        directory.check_bounds(130).unwrap();
        let err = directory.check_bounds(129).unwrap_err();
        assert!(matches!(err, Error::InvalidDirectory { tag, .. } if tag == Tag::new(b"cmap")));

        let err = TableDirectory::parse_woff1(&mut &bytes[..30], 2).unwrap_err();
        assert!(matches!(err, Error::Truncated { .. }));
    }
}
