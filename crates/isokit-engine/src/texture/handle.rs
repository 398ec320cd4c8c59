use core::fmt;

/// Opaque texture handle.
///
/// Zero is the invalid sentinel; every live handle is non-zero and unique for the
/// lifetime of the process.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
pub struct TextureHandle(u32);

impl TextureHandle {
    pub const INVALID: TextureHandle = TextureHandle(0);

    #[inline]
    pub(crate) const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw integer value, for logging and debugging only.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Debug for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "TextureHandle({})", self.0)
        } else {
            f.write_str("TextureHandle(INVALID)")
        }
    }
}
