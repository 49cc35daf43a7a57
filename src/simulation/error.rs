use std::fmt;

/// Broad classification used by callers to pick an exit code or HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad dataset, generator parameters or draw count. Nothing was simulated.
    InvalidInput,
    /// The interval table failed its partition guarantee.
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    EmptyDataset,
    /// All counts are zero, so probabilities would divide by zero.
    ZeroTotal,
    CountOverflow,
    DrawCountOutOfRange { requested: u32, min: u32, max: u32 },
    InvalidDrawBounds { min: u32, max: u32 },
    InvalidGenerator(String),
    InvalidScale(u32),
    IntervalNotFound { digit: u32 },
}

impl SimulationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IntervalNotFound { .. } => ErrorKind::Internal,
            _ => ErrorKind::InvalidInput,
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        self.kind() == ErrorKind::InvalidInput
    }
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDataset => write!(f, "historical dataset is empty"),
            Self::ZeroTotal => write!(f, "historical counts sum to zero (division by zero)"),
            Self::CountOverflow => write!(f, "historical counts overflow a 64-bit total"),
            Self::DrawCountOutOfRange { requested, min, max } => {
                write!(f, "draw count {requested} is outside {min}..={max}")
            }
            Self::InvalidDrawBounds { min, max } => {
                write!(f, "draw bounds {min}..={max} must be non-empty and start at 1 or more")
            }
            Self::InvalidGenerator(msg) => write!(f, "invalid generator parameters: {msg}"),
            Self::InvalidScale(scale) => write!(f, "interval scale must be at least 1, got {scale}"),
            Self::IntervalNotFound { digit } => {
                write!(f, "no interval contains digit {digit}; interval table is inconsistent")
            }
        }
    }
}

impl std::error::Error for SimulationError {}
