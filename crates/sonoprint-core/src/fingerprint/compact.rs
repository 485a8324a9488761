//! Compact 32-bit digest: MD5 over four byte-quantised summaries

use md5::{Digest, Md5};

/// Scalar summaries feeding the compact digest
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompactSummary {
    pub mfcc_mean: f64,
    pub chroma_mean: f64,
    pub rms_mean: f64,
    pub zcr_mean: f64,
}

impl CompactSummary {
    /// `trunc(x * 1000)` reduced modulo 256 (always non-negative)
    fn quantize(x: f64) -> i64 {
        ((x * 1000.0) as i64).rem_euclid(256)
    }

    /// Decimal text of the four quantised summaries
    pub fn text(&self) -> String {
        [self.mfcc_mean, self.chroma_mean, self.rms_mean, self.zcr_mean]
            .iter()
            .map(|&x| Self::quantize(x).to_string())
            .collect()
    }

    /// The digest as an integer: MD5 of [`Self::text`] modulo 2^32
    pub fn key(&self) -> u32 {
        let hash = Md5::digest(self.text().as_bytes());
        u32::from_be_bytes([hash[12], hash[13], hash[14], hash[15]])
    }

    /// The digest as 8 lowercase hex digits
    pub fn digest(&self) -> String {
        format!("{:08x}", self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_wraps_negative_values() {
        let summary = CompactSummary {
            mfcc_mean: -0.5,
            chroma_mean: 0.5,
            rms_mean: 0.125,
            zcr_mean: 0.0,
        };
        assert_eq!(summary.text(), "122441250");
    }

    #[test]
    fn test_key_is_low_32_bits_of_md5() {
        let summary = CompactSummary {
            mfcc_mean: 0.0,
            chroma_mean: 0.0,
            rms_mean: 0.0,
            zcr_mean: 0.0,
        };
        // MD5("0000") = 4a7d1ed414474e4033ac29ccb8653d9b
        assert_eq!(summary.text(), "0000");
        assert_eq!(summary.digest(), "b8653d9b");
        assert_eq!(summary.key(), 0xb865_3d9b);
    }
}
