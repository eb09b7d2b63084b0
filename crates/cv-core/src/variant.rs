use std::fmt;
use std::str::FromStr;

/// The runtime integration mode a build targets.
///
/// Fixed for the duration of one compilation. It decides which runtime
/// module the generated code imports and whether system inheritance is
/// honored at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Variant {
    /// The 2D runtime. Systems may extend `RenderSystem` or `BehaviorSystem`.
    #[default]
    TwoD,
    /// The 3D runtime. Every system extends the library `System` base.
    ThreeD,
}

impl Variant {
    /// Name of the runtime module generated code imports from.
    pub fn module_name(self) -> &'static str {
        match self {
            Variant::TwoD => "psykick2d",
            Variant::ThreeD => "psykick3d",
        }
    }

    /// Whether declared system parents (`extends ...`) are honored.
    pub fn honors_system_inheritance(self) -> bool {
        matches!(self, Variant::TwoD)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::TwoD => write!(f, "2d"),
            Variant::ThreeD => write!(f, "3d"),
        }
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "2d" => Ok(Variant::TwoD),
            "3d" => Ok(Variant::ThreeD),
            other => Err(format!("unknown target variant: \"{other}\" (expected 2d or 3d)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_2d() {
        assert_eq!(Variant::default(), Variant::TwoD);
    }

    #[test]
    fn parse_case_insensitive() {
        assert_eq!("2D".parse::<Variant>().unwrap(), Variant::TwoD);
        assert_eq!("3d".parse::<Variant>().unwrap(), Variant::ThreeD);
        assert!("4d".parse::<Variant>().is_err());
    }

    #[test]
    fn module_names() {
        assert_eq!(Variant::TwoD.module_name(), "psykick2d");
        assert_eq!(Variant::ThreeD.module_name(), "psykick3d");
    }

    #[test]
    fn display_round_trips() {
        for variant in [Variant::TwoD, Variant::ThreeD] {
            assert_eq!(variant.to_string().parse::<Variant>().unwrap(), variant);
        }
    }
}
