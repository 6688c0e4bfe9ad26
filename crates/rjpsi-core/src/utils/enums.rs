use std::{fmt::Display, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::RjpsiError;

/// File formats supported for the flat analysis table.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// An Apache Parquet file with one column per field.
    #[default]
    Parquet,
    /// A ROOT file holding a single flat `TTree`.
    Root,
}

impl OutputFormat {
    /// Guess the format from a file extension, if it is recognized.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Parquet => write!(f, "Parquet"),
            OutputFormat::Root => write!(f, "ROOT"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = RjpsiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "parquet" | "pq" => Ok(Self::Parquet),
            "root" | "ttree" => Ok(Self::Root),
            _ => Err(RjpsiError::ParseError {
                name: s.to_string(),
                object: "OutputFormat".to_string(),
            }),
        }
    }
}

/// Precision for writing floating-point columns.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FloatPrecision {
    /// 32-bit floats.
    F32,
    /// 64-bit floats.
    #[default]
    F64,
}

impl Display for FloatPrecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FloatPrecision::F32 => write!(f, "f32"),
            FloatPrecision::F64 => write!(f, "f64"),
        }
    }
}

impl FromStr for FloatPrecision {
    type Err = RjpsiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "f32" | "float" | "single" | "32" => Ok(Self::F32),
            "f64" | "double" | "64" => Ok(Self::F64),
            _ => Err(RjpsiError::ParseError {
                name: s.to_string(),
                object: "FloatPrecision".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            OutputFormat::from_path("out/rows.parquet"),
            Some(OutputFormat::Parquet)
        );
        assert_eq!(
            OutputFormat::from_path("out/rows.ROOT"),
            Some(OutputFormat::Root)
        );
        assert_eq!(OutputFormat::from_path("rows.csv"), None);
        assert_eq!(OutputFormat::from_path("rows"), None);
    }

    #[test]
    fn test_parse_errors_name_the_object() {
        let err = "hdf5".parse::<OutputFormat>().unwrap_err();
        assert!(matches!(
            err,
            RjpsiError::ParseError { ref name, ref object } if name == "hdf5" && object == "OutputFormat"
        ));
        assert_eq!("Double".parse::<FloatPrecision>().unwrap(), FloatPrecision::F64);
        assert!("f16".parse::<FloatPrecision>().is_err());
    }
}
