//! Plugin facade trait definitions

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Four-component plugin version (major.minor.patch.build)
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub build: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32, build: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            build,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.patch, self.build
        )
    }
}

impl FromStr for Version {
    type Err = Error;

    /// Parses one to four dot-separated components; missing ones are zero.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = [0u32; 4];
        let mut count = 0;

        for component in s.trim().split('.') {
            if count == parts.len() {
                return Err(Error::Config(format!(
                    "Version '{}' has more than four components",
                    s
                )));
            }
            parts[count] = component
                .parse()
                .map_err(|e| Error::Config(format!("Invalid version '{}': {}", s, e)))?;
            count += 1;
        }

        Ok(Self::new(parts[0], parts[1], parts[2], parts[3]))
    }
}

/// Plugin metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMetadata {
    pub name: String,
    pub version: Version,
}

/// Main plugin facade trait
///
/// A plugin library exports one object implementing this trait (or a trait
/// built on top of it) through its factory symbols. The facade is owned by the
/// library: callers only ever see `&self`, and the object is dropped when the
/// loader invokes the destroy symbol.
pub trait Plugin {
    /// Stable plugin name
    fn name(&self) -> &str;

    /// Stable plugin version
    fn version(&self) -> Version;

    /// Snapshot of name and version
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata {
            name: self.name().to_string(),
            version: self.version(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl Plugin for Fixed {
        fn name(&self) -> &str {
            "Example"
        }

        fn version(&self) -> Version {
            Version::new(1, 3, 4, 2)
        }
    }

    #[test]
    fn test_version_display() {
        assert_eq!(Version::new(1, 3, 4, 2).to_string(), "1.3.4.2");
        assert_eq!(Version::default().to_string(), "0.0.0.0");
    }

    #[test]
    fn test_version_parse() {
        assert_eq!("1.3.4.2".parse::<Version>().unwrap(), Version::new(1, 3, 4, 2));
        assert_eq!("2.1".parse::<Version>().unwrap(), Version::new(2, 1, 0, 0));
        assert_eq!(" 7 ".parse::<Version>().unwrap(), Version::new(7, 0, 0, 0));
    }

    #[test]
    fn test_version_parse_rejects_garbage() {
        assert!("1.2.3.4.5".parse::<Version>().is_err());
        assert!("1.x".parse::<Version>().is_err());
        assert!("".parse::<Version>().is_err());
    }

    #[test]
    fn test_version_ordering() {
        assert!(Version::new(1, 3, 4, 2) < Version::new(1, 3, 5, 0));
        assert!(Version::new(2, 0, 0, 0) > Version::new(1, 99, 99, 99));
    }

    #[test]
    fn test_default_metadata() {
        let metadata = Fixed.metadata();
        assert_eq!(metadata.name, "Example");
        assert_eq!(metadata.version, Version::new(1, 3, 4, 2));

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["version"]["build"], 2);
    }
}
