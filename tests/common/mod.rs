//! Builds small WOFF files in memory.

#![allow(dead_code)]

use std::io::Write as _;

use flate2::{Compression, write::ZlibEncoder};

pub struct TestTable {
    pub tag: [u8; 4],
    pub data: Vec<u8>,
    pub compressed: bool,
    pub checksum: u32,
}

impl TestTable {
    pub fn raw(tag: &[u8; 4], data: &[u8]) -> Self {
        Self {
            tag: *tag,
            data: data.to_vec(),
            compressed: false,
            checksum: 0,
        }
    }

    pub fn compressed(tag: &[u8; 4], data: &[u8]) -> Self {
        Self {
            compressed: true,
            ..Self::raw(tag, data)
        }
    }

    pub fn with_checksum(mut self, checksum: u32) -> Self {
        self.checksum = checksum;
        self
    }

    fn stored(&self) -> Vec<u8> {
        if self.compressed {
            zlib(&self.data)
        } else {
            self.data.clone()
        }
    }
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// A WOFF whose tables are stored back to back after the directory, each at a 4-byte boundary.
pub fn build_woff(flavor: &[u8; 4], tables: &[TestTable]) -> Vec<u8> {
    let stored: Vec<Vec<u8>> = tables.iter().map(TestTable::stored).collect();
    let entries = tables.iter().zip(&stored).map(|(table, data)| {
        (table.tag, data.len() as u32, table.data.len() as u32, table.checksum)
    });
    build_woff_with_entries(flavor, b"wOFF", entries.collect(), &stored)
}

/// Like [`build_woff`], but with full control over the directory lengths and signature.
pub fn build_woff_with_entries(
    flavor: &[u8; 4],
    signature: &[u8; 4],
    entries: Vec<([u8; 4], u32, u32, u32)>,
    bodies: &[Vec<u8>],
) -> Vec<u8> {
    let mut offset = 44 + 20 * entries.len();
    let mut directory = Vec::new();
    let mut data = Vec::new();
    for ((tag, comp_length, orig_length, checksum), body) in entries.iter().zip(bodies) {
        directory.extend_from_slice(tag);
        directory.extend_from_slice(&(offset as u32).to_be_bytes());
        directory.extend_from_slice(&comp_length.to_be_bytes());
        directory.extend_from_slice(&orig_length.to_be_bytes());
        directory.extend_from_slice(&checksum.to_be_bytes());

        data.extend_from_slice(body);
        while data.len() % 4 != 0 {
            data.push(0);
        }
        offset = 44 + 20 * entries.len() + data.len();
    }

    let mut woff = Vec::new();
    woff.extend_from_slice(signature);
    woff.extend_from_slice(flavor);
    woff.extend_from_slice(&(offset as u32).to_be_bytes()); // length
    woff.extend_from_slice(&(entries.len() as u16).to_be_bytes());
    woff.extend_from_slice(&0u16.to_be_bytes()); // reserved
    woff.extend_from_slice(&0u32.to_be_bytes()); // totalSfntSize
    woff.extend_from_slice(&1u16.to_be_bytes()); // majorVersion
    woff.extend_from_slice(&0u16.to_be_bytes()); // minorVersion
    woff.extend_from_slice(&[0; 20]); // metadata and private blocks
    woff.extend_from_slice(&directory);
    woff.extend_from_slice(&data);
    woff
}

#[derive(Debug, PartialEq, Eq)]
pub struct Record {
    pub tag: [u8; 4],
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

fn be_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_be_bytes(bytes[at..at + 4].try_into().unwrap())
}

/// Table records of an SFNT file.
pub fn sfnt_records(sfnt: &[u8]) -> Vec<Record> {
    let num_tables = u16::from_be_bytes([sfnt[4], sfnt[5]]) as usize;
    (0..num_tables)
        .map(|i| {
            let at = 12 + 16 * i;
            Record {
                tag: sfnt[at..at + 4].try_into().unwrap(),
                checksum: be_u32(sfnt, at + 4),
                offset: be_u32(sfnt, at + 8),
                length: be_u32(sfnt, at + 12),
            }
        })
        .collect()
}

/// Body of the table tagged `tag`.
pub fn sfnt_table<'a>(sfnt: &'a [u8], tag: &[u8; 4]) -> &'a [u8] {
    let record = sfnt_records(sfnt)
        .into_iter()
        .find(|record| &record.tag == tag)
        .unwrap();
    &sfnt[record.offset as usize..(record.offset + record.length) as usize]
}
