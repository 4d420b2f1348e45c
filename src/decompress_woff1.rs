use std::error::Error as StdError;
use std::io::{Read, Seek, SeekFrom, Write};

use log::{debug, warn};

use crate::{
    error::{Error, bail_if, read_error},
    layout::SfntLayout,
    options::ConvertOptions,
    types::{TableDirectory, TableDirectoryEntry, WoffHeader},
};

/// Inflates `compressed_data`, which is expected to expand to `size_hint` bytes.
pub type ZDecompressor<'a> =
    dyn FnMut(&[u8], usize) -> Result<Vec<u8>, Box<dyn StdError + Send + Sync>> + 'a;

#[cfg(feature = "z")]
fn decompress_z(
    compressed_data: &[u8],
    size_hint: usize,
) -> Result<Vec<u8>, Box<dyn StdError + Send + Sync>> {
    use flate2::{Decompress, FlushDecompress, Status};
    // One spare byte so that a stream longer than declared shows up as a length mismatch
    let mut output: Vec<u8> = Vec::with_capacity(size_hint + 1);
    let mut decompressor = Decompress::new(true);
    let status =
        decompressor.decompress_vec(compressed_data, &mut output, FlushDecompress::Finish)?;
    if status != Status::StreamEnd {
        return Err("zlib stream is incomplete".into());
    }
    Ok(output)
}

#[cfg(feature = "z")]
/// Decompress a WOFF1 file held in memory using the built-in zlib decompressor
pub fn decompress_woff1(raw_woff_data: &[u8]) -> Result<Vec<u8>, Error> {
    decompress_woff1_with_options(raw_woff_data, &ConvertOptions::default())
}

#[cfg(feature = "z")]
pub fn decompress_woff1_with_options(
    raw_woff_data: &[u8],
    options: &ConvertOptions,
) -> Result<Vec<u8>, Error> {
    use std::io::Cursor;
    let mut out = Cursor::new(Vec::new());
    convert_with_options(&mut Cursor::new(raw_woff_data), &mut out, options)?;
    Ok(out.into_inner())
}

#[cfg(feature = "z")]
/// Convert the WOFF read from `input` into an SFNT written to `output`
///
/// `input` must be positioned at the start of the WOFF. Table offsets in the output are relative to
/// the position of `output` when the conversion starts. On error, `output` may hold a partial font.
pub fn convert<R, W>(input: &mut R, output: &mut W) -> Result<(), Error>
where
    R: Read + Seek,
    W: Write + Seek,
{
    convert_with_options(input, output, &ConvertOptions::default())
}

#[cfg(feature = "z")]
pub fn convert_with_options<R, W>(
    input: &mut R,
    output: &mut W,
    options: &ConvertOptions,
) -> Result<(), Error>
where
    R: Read + Seek,
    W: Write + Seek,
{
    convert_with_custom_z(input, output, options, &mut decompress_z)
}

/// Convert a WOFF using a custom zlib decompressor passed as a closure
pub fn convert_with_custom_z<R, W>(
    input: &mut R,
    output: &mut W,
    options: &ConvertOptions,
    decompress_z: &mut ZDecompressor<'_>,
) -> Result<(), Error>
where
    R: Read + Seek,
    W: Write + Seek,
{
    // Parse header and table directory
    let mut header_data = [0u8; WoffHeader::SIZE];
    input
        .read_exact(&mut header_data)
        .map_err(read_error("WOFF header"))?;
    let header = WoffHeader::parse(&mut &header_data[..], options.signature)?;

    let mut directory_data = vec![0u8; header.table_directory_size()];
    input
        .read_exact(&mut directory_data)
        .map_err(read_error("table directory"))?;
    let table_directory =
        TableDirectory::parse_woff1(&mut &directory_data[..], header.num_tables as usize)?;

    let input_len = input.seek(SeekFrom::End(0))?;
    if header.length as u64 != input_len {
        warn!(
            "WOFF header declares {} bytes but the input has {input_len}",
            header.length
        );
    }
    table_directory.check_bounds(input_len)?;

    // First pass: decide where every table goes
    let layout = SfntLayout::compute(&header, &table_directory)?;
    if header.total_sfnt_size != layout.total_size {
        warn!(
            "WOFF header declares an SFNT of {} bytes but the tables need {}",
            header.total_sfnt_size, layout.total_size
        );
    }

    // Write the SFNT header and table directory
    let base = output.stream_position()?;
    let mut directory_out = Vec::with_capacity(layout.directory_size());
    layout.write_directory(&mut directory_out);
    output.write_all(&directory_out)?;

    // Second pass: copy each table body to its place, inflating where needed
    for (table, record) in table_directory.iter().zip(&layout.records) {
        debug!(
            "{}: {} -> {} bytes at {}{}",
            table.tag,
            table.woff_length,
            table.orig_length,
            record.offset,
            if table.is_compressed() { " (zlib)" } else { "" }
        );

        let table_data = read_table(input, table)?;
        let table_data = if table.is_compressed() {
            let decompressed_data = decompress_z(&table_data, table.orig_length as usize)
                .map_err(|err| Error::decompression_failed(table.tag, err))?;
            bail_if!(
                decompressed_data.len() != table.orig_length as usize,
                Error::decompression_failed(
                    table.tag,
                    format!(
                        "inflated to {} bytes, expected {}",
                        decompressed_data.len(),
                        table.orig_length
                    ),
                )
            );
            decompressed_data
        } else {
            table_data
        };

        output.seek(SeekFrom::Start(base + record.offset as u64))?;
        output.write_all(&table_data)?;

        // Pad output to 4 bytes
        output.write_all(&[0u8; 3][..record.padding() as usize])?;
    }

    output.flush()?;
    Ok(())
}

fn read_table<R: Read + Seek>(
    input: &mut R,
    table: &TableDirectoryEntry,
) -> Result<Vec<u8>, Error> {
    input.seek(SeekFrom::Start(table.woff_offset as u64))?;
    let mut table_data = Vec::with_capacity(table.woff_length as usize);
    let read = input
        .by_ref()
        .take(table.woff_length as u64)
        .read_to_end(&mut table_data)?;
    bail_if!(
        read != table.woff_length as usize,
        Error::Truncated { what: "table data" }
    );
    Ok(table_data)
}

