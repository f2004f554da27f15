//!
//! # Serialization & Deserialization Utilities
//!
//! Configuration records and layout libraries alike are written to and read from
//! JSON, YAML, or TOML via the [SerializationFormat] enum and [SerdeFile] trait.
//!

// Standard Lib Imports
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

// Crates.io Imports
use serde::de::DeserializeOwned;
use serde::Serialize;
use textwrap::dedent;

/// # Enumerated First-Class-Supported Serialization Formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializationFormat {
    Json,
    Yaml,
    Toml,
}
impl SerializationFormat {
    /// Infer the format from the extension of `fname`, if recognized
    pub fn from_path(fname: impl AsRef<Path>) -> Option<Self> {
        let ext = fname.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
    /// Convert any [serde::Serialize] data to a serialized string
    pub fn to_string(&self, data: &impl Serialize) -> Result<String, Error> {
        match *self {
            Self::Json => Ok(serde_json::to_string_pretty(data)?),
            Self::Yaml => Ok(serde_yaml::to_string(data)?),
            Self::Toml => Ok(toml::to_string(data)?),
        }
    }
    /// Parse string `s`.
    /// Leading indentation common to all lines is removed first,
    /// so inline literals in tests and docs can be indented freely.
    pub fn from_str<T: DeserializeOwned>(&self, s: &str) -> Result<T, Error> {
        let s = dedent(s);
        match *self {
            Self::Json => Ok(serde_json::from_str(&s)?),
            Self::Yaml => Ok(serde_yaml::from_str(&s)?),
            Self::Toml => Ok(toml::from_str(&s)?),
        }
    }
    /// Save `data` to file `fname`
    pub fn save(&self, data: &impl Serialize, fname: impl AsRef<Path>) -> Result<(), Error> {
        let mut file = BufWriter::new(std::fs::File::create(fname)?);
        let s = self.to_string(data)?;
        file.write_all(s.as_bytes())?;
        file.flush()?;
        Ok(())
    }
    /// Load from file at path `fname`
    pub fn open<T: DeserializeOwned>(&self, fname: impl AsRef<Path>) -> Result<T, Error> {
        let file = std::fs::File::open(&fname)?;
        let mut file = BufReader::new(file);
        let rv: T = match *self {
            Self::Json => serde_json::from_reader(file)?,
            Self::Yaml => serde_yaml::from_reader(file)?,
            Self::Toml => {
                // No reader-based TOML parsing; read it all in first
                let mut s = String::new();
                file.read_to_string(&mut s)?;
                toml::from_str(&s)?
            }
        };
        Ok(rv)
    }
}

/// Serialization to & from file trait
///
/// Fully default-implemented: an empty `impl SerdeFile for MyConfig {}`
/// suffices for any type with [serde] support.
///
pub trait SerdeFile: Serialize + DeserializeOwned {
    /// Save in `fmt`-format to file `fname`
    fn save(&self, fmt: SerializationFormat, fname: impl AsRef<Path>) -> Result<(), Error> {
        fmt.save(self, fname)
    }
    /// Open from `fmt`-format file `fname`
    fn open(fname: impl AsRef<Path>, fmt: SerializationFormat) -> Result<Self, Error> {
        fmt.open(fname)
    }
    /// Open from file `fname`, inferring its format from the file extension
    fn load(fname: impl AsRef<Path>) -> Result<Self, Error> {
        let fmt = SerializationFormat::from_path(&fname).ok_or_else(|| {
            Error::msg(format!(
                "Cannot infer serialization format of {:?}",
                fname.as_ref()
            ))
        })?;
        fmt.open(fname)
    }
}

/// Wrapper over other errors
#[derive(Debug)]
pub struct Error(Box<dyn std::error::Error + Send + Sync>);
impl Error {
    /// Create an [Error] from a string message
    pub fn msg(s: impl Into<String>) -> Self {
        let s: String = s.into();
        Self(s.into())
    }
}
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for Error {}
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self(Box::new(e))
    }
}
impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Self(Box::new(e))
    }
}
impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Self(Box::new(e))
    }
}
impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self(Box::new(e))
    }
}
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self(Box::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Grid {
        grid_size: f64,
        name: String,
    }
    impl SerdeFile for Grid {}

    #[test]
    fn format_from_path() {
        assert_eq!(
            SerializationFormat::from_path("tech.yml"),
            Some(SerializationFormat::Yaml)
        );
        assert_eq!(
            SerializationFormat::from_path("tech.TOML"),
            Some(SerializationFormat::Toml)
        );
        assert_eq!(SerializationFormat::from_path("tech.gds"), None);
        assert_eq!(SerializationFormat::from_path("tech"), None);
    }
    #[test]
    fn string_round_trip() -> Result<(), Error> {
        let g = Grid {
            grid_size: 0.001,
            name: "sin".into(),
        };
        for fmt in [
            SerializationFormat::Json,
            SerializationFormat::Yaml,
            SerializationFormat::Toml,
        ] {
            let s = fmt.to_string(&g)?;
            let g2: Grid = fmt.from_str(&s)?;
            assert_eq!(g, g2);
        }
        Ok(())
    }
    #[test]
    fn indented_yaml() -> Result<(), Error> {
        let g: Grid = SerializationFormat::Yaml.from_str(
            r#"
            grid_size: 0.005
            name: soi
            "#,
        )?;
        assert_eq!(g.name, "soi");
        assert_eq!(g.grid_size, 0.005);
        Ok(())
    }
}
