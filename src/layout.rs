//! Layout of the reconstructed SFNT file
//!
//! <https://learn.microsoft.com/en-us/typography/opentype/spec/otff#table-directory>

use bytes::BufMut;
use font_types::Tag;

use crate::Round4;
use crate::error::{Error, bail_if, u32_will_overflow};
use crate::types::{TableDirectory, WoffHeader};

pub const SFNT_HEADER_SIZE: u32 = 12;
pub const SFNT_ENTRY_SIZE: u32 = 16;

/// The SFNT offset table (everything before the table records)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SfntHeader {
    pub flavor: Tag,
    pub num_tables: u16,
    pub search_range: u16,
    pub entry_selector: u16,
    pub range_shift: u16,
}

impl SfntHeader {
    pub fn new(flavor: Tag, num_tables: u16) -> Self {
        // No power of two fits below zero tables, so an empty font gets all-zero search fields.
        if num_tables == 0 {
            return Self {
                flavor,
                num_tables,
                search_range: 0,
                entry_selector: 0,
                range_shift: 0,
            };
        }

        let mut max_pow2: u32 = 0;
        while 1u32 << (max_pow2 + 1) <= (num_tables as u32) {
            max_pow2 += 1;
        }
        let search_range = (1u32 << max_pow2) << 4;
        let range_shift = ((num_tables as u32) << 4) - search_range;

        // Both fields are 16 bits wide in the file. They only wrap for fonts with 4096+ tables.
        Self {
            flavor,
            num_tables,
            search_range: search_range as u16,
            entry_selector: max_pow2 as u16,
            range_shift: range_shift as u16,
        }
    }

    pub fn write(&self, output: &mut impl BufMut) {
        output.put_u32(u32::from_be_bytes(self.flavor.to_be_bytes())); // sfnt version
        output.put_u16(self.num_tables); // num_tables
        output.put_u16(self.search_range); // searchRange
        output.put_u16(self.entry_selector); // entrySelector
        output.put_u16(self.range_shift); // rangeShift
    }
}

/// A single entry of the output table directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SfntTableRecord {
    pub tag: Tag,
    pub checksum: u32,
    /// Offset of the table body from the start of the SFNT file
    pub offset: u32,
    pub length: u32,
}

impl SfntTableRecord {
    pub fn write(&self, output: &mut impl BufMut) {
        output.put_u32(u32::from_be_bytes(self.tag.to_be_bytes()));
        output.put_u32(self.checksum);
        output.put_u32(self.offset);
        output.put_u32(self.length);
    }

    /// Offset just past the table body, before padding
    pub fn end(&self) -> u32 {
        self.offset + self.length
    }

    /// Number of zero bytes written after the body to reach a 4-byte boundary
    pub fn padding(&self) -> u32 {
        let end = self.end();
        let padded = Round4!(end);
        padded - end
    }
}

/// Where every table of the output lands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SfntLayout {
    pub header: SfntHeader,
    /// Table records in WOFF directory order
    pub records: Vec<SfntTableRecord>,
    /// Size of the complete output, including the padding after the last table
    pub total_size: u32,
}

impl SfntLayout {
    /// Assign each table an output offset.
    ///
    /// Tables are packed in directory order right after the table directory. Each body is padded
    /// with zeroes up to a 4-byte boundary after it is written; no padding is ever inserted before one.
    pub fn compute(header: &WoffHeader, tables: &TableDirectory) -> Result<Self, Error> {
        let sfnt_header = SfntHeader::new(header.flavor, header.num_tables);

        // Tables start right after the header and one 16-byte record per table
        let mut offset = SFNT_HEADER_SIZE + SFNT_ENTRY_SIZE * tables.len() as u32;

        let mut records = Vec::with_capacity(tables.len());
        for table in tables.iter() {
            bail_if!(
                u32_will_overflow(offset, table.orig_length)
                    || u32_will_overflow(offset + table.orig_length, 3),
                Error::invalid_directory(table.tag, "table does not fit in a 32-bit SFNT")
            );

            records.push(SfntTableRecord {
                tag: table.tag,
                checksum: table.orig_checksum,
                offset,
                length: table.orig_length,
            });

            offset += table.orig_length;
            offset = Round4!(offset);
        }

        Ok(Self {
            header: sfnt_header,
            records,
            total_size: offset,
        })
    }

    /// Size of the SFNT header plus the table directory
    pub fn directory_size(&self) -> usize {
        (SFNT_HEADER_SIZE + SFNT_ENTRY_SIZE * self.records.len() as u32) as usize
    }

    /// Serialize the SFNT header followed by every table record.
    pub fn write_directory(&self, output: &mut impl BufMut) {
        self.header.write(output);
        for record in &self.records {
            record.write(output);
        }
    }
}
