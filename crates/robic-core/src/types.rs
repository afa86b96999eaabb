use serde::{Deserialize, Serialize};

/// Identifies which script/object is evaluating an expression.
///
/// The evaluator never interprets it; it is handed through unchanged to
/// every variable lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContextId(pub i32);

/// Language format version a script was authored against, packed as
/// `(major << 8) | minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldVersion(pub u16);

impl WorldVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self(((major as u16) << 8) | minor as u16)
    }

    /// First version allowing `(expr)` splices inside message text.
    pub const INLINE_EXPRESSIONS: Self = Self::new(2, 68);
    /// First version recognizing the ternary conditional.
    pub const TERNARY: Self = Self::new(2, 90);
    /// Newest format this engine speaks.
    pub const CURRENT: Self = Self::new(2, 92);

    pub const fn major(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn minor(self) -> u8 {
        self.0 as u8
    }
}

impl Default for WorldVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}
