//! Wire names for the symbolic values exchanged with the registry.
//!
//! Every enum here maps each variant to exactly one canonical wire string.
//! The tables are exhaustive `match`es, so adding a variant without a name
//! is a compile error rather than a runtime gap.

use std::fmt;
use std::str::FromStr;

/// Who may query a submitted artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub const ALL: [Visibility; 2] = [Visibility::Public, Visibility::Private];

    pub fn name(self) -> &'static str {
        match self {
            Visibility::Public => "PUBLIC",
            Visibility::Private => "PRIVATE",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.name() == name)
    }

    /// Maps the `--public` CLI flag onto a visibility.
    pub fn for_flag(public: bool) -> Self {
        if public {
            Visibility::Public
        } else {
            Visibility::Private
        }
    }
}

/// The attestor's declared trust verdict for an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Trusted,
    Untrusted,
    Unknown,
    Unsupported,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Trusted,
        Status::Untrusted,
        Status::Unknown,
        Status::Unsupported,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Status::Trusted => "TRUSTED",
            Status::Untrusted => "UNTRUSTED",
            Status::Unknown => "UNKNOWN",
            Status::Unsupported => "UNSUPPORTED",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

/// Verification level of the publisher behind an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Disabled,
    Unknown,
    EmailVerified,
    SocialVerified,
    IdVerified,
    LocationVerified,
    Vchain,
}

impl Level {
    pub const ALL: [Level; 7] = [
        Level::Disabled,
        Level::Unknown,
        Level::EmailVerified,
        Level::SocialVerified,
        Level::IdVerified,
        Level::LocationVerified,
        Level::Vchain,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Level::Disabled => "DISABLED",
            Level::Unknown => "UNKNOWN",
            Level::EmailVerified => "EMAIL_VERIFIED",
            Level::SocialVerified => "SOCIAL_VERIFIED",
            Level::IdVerified => "ID_VERIFIED",
            Level::LocationVerified => "LOCATION_VERIFIED",
            Level::Vchain => "VCHAIN",
        }
    }

    pub fn value(self) -> i64 {
        match self {
            Level::Disabled => -1,
            Level::Unknown => 0,
            Level::EmailVerified => 1,
            Level::SocialVerified => 2,
            Level::IdVerified => 3,
            Level::LocationVerified => 4,
            Level::Vchain => 99,
        }
    }

    /// Numbers the registry sends that we have no name for render as `Unknown`.
    pub fn from_value(value: i64) -> Self {
        Self::ALL
            .into_iter()
            .find(|l| l.value() == value)
            .unwrap_or(Level::Unknown)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} name: {name}")]
pub struct UnknownName {
    pub kind: &'static str,
    pub name: String,
}

macro_rules! wire_name_impls {
    ($ty:ident, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownName;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ty::from_name(s).ok_or_else(|| UnknownName {
                    kind: $kind,
                    name: s.to_string(),
                })
            }
        }
    };
}

wire_name_impls!(Visibility, "visibility");
wire_name_impls!(Status, "status");

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
