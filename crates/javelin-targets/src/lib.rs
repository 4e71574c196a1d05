//! Host detection and build-variant naming for javelin.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Directory name of the device-common variant.
pub const DEVICE_VARIANT: &str = "android_common";

/// A host operating system that host variants can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HostOs {
    Linux,
    Darwin,
    Windows,
}

impl HostOs {
    /// All host operating systems javelin knows how to name.
    pub const ALL: [HostOs; 3] = [HostOs::Linux, HostOs::Darwin, HostOs::Windows];

    /// The identifier used in variant directory names (e.g. `"linux"`).
    pub fn as_str(self) -> &'static str {
        match self {
            HostOs::Linux => "linux",
            HostOs::Darwin => "darwin",
            HostOs::Windows => "windows",
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostOs {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HostOs::ALL
            .into_iter()
            .find(|os| os.as_str() == s)
            .ok_or_else(|| TargetError::UnknownHostOs {
                name: s.to_owned(),
                known: HostOs::ALL.map(HostOs::as_str).join(", "),
            })
    }
}

/// Detect the operating system javelin is running on.
///
/// # Errors
/// Returns an error if the current OS has no host variant.
pub fn host_os() -> Result<HostOs, TargetError> {
    match std::env::consts::OS {
        "linux" => Ok(HostOs::Linux),
        "macos" => Ok(HostOs::Darwin),
        "windows" => Ok(HostOs::Windows),
        os => Err(TargetError::UnsupportedHost { os: os.to_owned() }),
    }
}

/// A build variant: the axis a module is independently resolved and built for.
///
/// Ordering puts the device variant first, then hosts in [`HostOs`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variant {
    /// The device-common variant (`android_common`).
    Device,
    /// The common variant for one host operating system (`<os>_common`).
    Host(HostOs),
}

impl Variant {
    /// Whether this is a host variant.
    pub fn is_host(self) -> bool {
        matches!(self, Variant::Host(_))
    }

    /// The directory name used under `.intermediates/<module>/`.
    pub fn dir_name(self) -> String {
        match self {
            Variant::Device => DEVICE_VARIANT.to_owned(),
            Variant::Host(os) => format!("{os}_common"),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dir_name())
    }
}

impl FromStr for Variant {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == DEVICE_VARIANT {
            return Ok(Variant::Device);
        }
        match s.strip_suffix("_common") {
            Some(os) => Ok(Variant::Host(os.parse()?)),
            None => Err(TargetError::UnknownVariant { name: s.to_owned() }),
        }
    }
}

impl Serialize for Variant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.dir_name())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("unsupported host: {os} has no host variant")]
    UnsupportedHost { os: String },
    #[error("unknown host OS \"{name}\" (known: {known})")]
    UnknownHostOs { name: String, known: String },
    #[error("unknown variant \"{name}\" (expected android_common or <os>_common)")]
    UnknownVariant { name: String },
}
