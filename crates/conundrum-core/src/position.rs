//! Long or short side of an embedded option.

/// Long or short position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Position {
    /// The coupon holder owns the option.
    #[default]
    Long,
    /// The coupon holder has sold the option.
    Short,
}

impl Position {
    /// Return the sign (+1 for Long, -1 for Short).
    pub fn sign(&self) -> f64 {
        match self {
            Position::Long => 1.0,
            Position::Short => -1.0,
        }
    }

    /// The opposite side.
    pub fn flipped(&self) -> Self {
        match self {
            Position::Long => Position::Short,
            Position::Short => Position::Long,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Long => write!(f, "Long"),
            Position::Short => write!(f, "Short"),
        }
    }
}
