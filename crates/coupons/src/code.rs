//! Coupon code value object.

use couponapi_core::ValueObject;

use crate::error::CouponError;

/// Normalized coupon code: exactly six ASCII letters or digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CouponCode(String);

impl CouponCode {
    /// Required length after normalization.
    pub const LEN: usize = 6;

    /// Strip every character that is not an ASCII letter or digit.
    ///
    /// `"ABC-123"` becomes `"ABC123"`. Case is preserved.
    pub fn normalize(raw: &str) -> String {
        raw.chars().filter(char::is_ascii_alphanumeric).collect()
    }

    /// Normalize `raw` and enforce the length rule.
    pub fn parse(raw: &str) -> Result<Self, CouponError> {
        let normalized = Self::normalize(raw);
        // Only ASCII survives normalization, so byte length == char count.
        if normalized.len() != Self::LEN {
            return Err(CouponError::InvalidCodeLength);
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl ValueObject for CouponCode {}

impl core::fmt::Display for CouponCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CouponCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
