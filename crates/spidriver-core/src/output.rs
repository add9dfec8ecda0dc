//! Digital outputs driven by the bridge

use crate::error::SpiDriverError;
use core::fmt;
use core::str::FromStr;

/// A digital pin controlled by the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Output {
    /// Auxiliary output A
    A,
    /// Auxiliary output B
    B,
    /// SPI chip select
    ChipSelect,
}

impl Output {
    /// All outputs in status order
    pub const ALL: [Output; 3] = [Output::A, Output::B, Output::ChipSelect];
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::A => write!(f, "A"),
            Output::B => write!(f, "B"),
            Output::ChipSelect => write!(f, "CS"),
        }
    }
}

impl FromStr for Output {
    type Err = SpiDriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a" => Ok(Output::A),
            "b" => Ok(Output::B),
            "cs" | "chipselect" => Ok(Output::ChipSelect),
            _ => Err(SpiDriverError::InvalidArgument(format!(
                "unknown output '{}', expected a, b or cs",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output() {
        assert_eq!("a".parse::<Output>().unwrap(), Output::A);
        assert_eq!("B".parse::<Output>().unwrap(), Output::B);
        assert_eq!("CS".parse::<Output>().unwrap(), Output::ChipSelect);
        assert_eq!("ChipSelect".parse::<Output>().unwrap(), Output::ChipSelect);
        assert!(matches!(
            "c".parse::<Output>(),
            Err(SpiDriverError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_display_roundtrips() {
        for output in Output::ALL {
            assert_eq!(output.to_string().parse::<Output>().unwrap(), output);
        }
    }
}
