//! Pure Rust WOFF to SFNT converter
//!
//! Turns a WOFF 1.0 font back into the TrueType/OpenType file it wraps: the table directory is
//! rebuilt in the order the WOFF lists it, zlib-compressed tables are inflated, and every table is
//! padded to a 4-byte boundary. Checksums are carried over from the WOFF, not recomputed.
//!
//! ```no_run
//! # fn main() -> Result<(), unwoff::Error> {
//! let woff = std::fs::read("font.woff").unwrap();
//! let otf = unwoff::decompress_woff1(&woff)?;
//! std::fs::write("font.otf", otf).unwrap();
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "z")]
pub mod batch;
mod decompress_woff1;
mod error;
pub mod layout;
pub mod options;
pub mod types;

#[cfg(feature = "z")]
pub use batch::{BatchReport, convert_dir, convert_file, default_target};
#[cfg(feature = "z")]
pub use decompress_woff1::{
    convert, convert_with_options, decompress_woff1, decompress_woff1_with_options,
};
pub use decompress_woff1::{ZDecompressor, convert_with_custom_z};
pub use error::{Error, Result};
pub use options::{BatchOptions, ConvertOptions, SignaturePolicy};

// Round a value up to the nearest multiple of 4. Don't round the value in the
// case that rounding up overflows.
//
// Implemented as a macro to make it generic over the type without horrible type bounds
macro_rules! Round4 {
    ($value:expr) => {
        match $value.checked_add(3) {
            Some(value_plus_3) => value_plus_3 & !3,
            None => $value,
        }
    };
}
use Round4;
