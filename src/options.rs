//! Conversion settings

/// How strictly the WOFF signature is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignaturePolicy {
    /// Reject any input that does not start with `wOFF`.
    #[default]
    Strict,
    /// Accept any four bytes as the signature.
    Lenient,
}

/// Settings for a single conversion.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    pub signature: SignaturePolicy,
}

impl ConvertOptions {
    pub fn lenient() -> Self {
        Self {
            signature: SignaturePolicy::Lenient,
        }
    }
}

/// Settings for converting a directory tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Settings applied to every file.
    pub convert: ConvertOptions,
    /// Maximum number of files converted at once. `None` uses one worker per CPU.
    pub jobs: Option<usize>,
}
