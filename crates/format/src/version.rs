/// World file format version, the signed 32-bit value at offset 0.
///
/// Known layout changes inside the supported range:
/// - 88: oldest layout this reader understands
/// - 135: header gains the 7-byte `relogic` signature and a file-type tag
/// - 156: newest layout this reader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormatVersion(pub i32);

impl FormatVersion {
    pub const MIN_SUPPORTED: Self = Self(88);
    pub const MAX_SUPPORTED: Self = Self(156);
    pub const V135: Self = Self(135);

    pub fn is_supported(self) -> bool {
        (Self::MIN_SUPPORTED..=Self::MAX_SUPPORTED).contains(&self)
    }

    /// Whether the header carries the signature block (magic + file type) before the gap.
    pub fn has_signature(self) -> bool {
        self >= Self::V135
    }
}

impl std::fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_range_is_inclusive() {
        assert!(!FormatVersion(87).is_supported());
        assert!(FormatVersion(88).is_supported());
        assert!(FormatVersion(156).is_supported());
        assert!(!FormatVersion(157).is_supported());
        assert!(!FormatVersion(-1).is_supported());
    }

    #[test]
    fn signature_starts_at_135() {
        assert!(!FormatVersion(134).has_signature());
        assert!(FormatVersion(135).has_signature());
    }
}
