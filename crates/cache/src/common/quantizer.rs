//! Bucket quantization of large counts into narrow fields.

/// Maps raw values onto `bits`-wide buckets of `quantum` units each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quantizer {
    max_value: u64,
    quantum: u64,
}

impl Quantizer {
    /// Creates a quantizer whose largest bucket is `2^bits - 1`.
    pub const fn new(bits: u32, quantum: u64) -> Self {
        Self {
            max_value: (1 << bits) - 1,
            quantum,
        }
    }

    /// Bucket of `raw`, saturating at the largest bucket.
    #[inline]
    pub const fn quantize(&self, raw: u64) -> u64 {
        let bucket = raw / self.quantum;
        if bucket > self.max_value {
            self.max_value
        } else {
            bucket
        }
    }

    /// Smallest raw value falling into bucket `quantized`.
    #[inline]
    pub const fn unquantize(&self, quantized: u64) -> u64 {
        quantized * self.quantum
    }

    /// Largest bucket.
    #[inline]
    pub const fn max_value(&self) -> u64 {
        self.max_value
    }

    /// Raw units per bucket.
    #[inline]
    pub const fn quantum(&self) -> u64 {
        self.quantum
    }
}
