//! Compiler configuration.

use std::fmt;
use std::str::FromStr;

/// A code generation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Target {
    Json,
    #[default]
    Swift,
    TypeScript,
    Flow,
}

impl Target {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Swift => "swift",
            Self::TypeScript => "typescript",
            Self::Flow => "flow",
        }
    }

    /// Targets that always decode through `__typename`.
    pub const fn forces_typename(self) -> bool {
        matches!(self, Self::Swift)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "swift" => Ok(Self::Swift),
            "ts" | "typescript" => Ok(Self::TypeScript),
            "flow" => Ok(Self::Flow),
            other => Err(format!("unsupported target `{other}`")),
        }
    }
}

/// Options read by the selection compiler and the emitters.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Keep custom scalar names instead of mapping them to a generic type.
    pub passthrough_custom_scalars: bool,
    /// Prefix for custom scalar type names. Non-empty implies passthrough.
    pub custom_scalars_prefix: String,
    /// Inject `__typename` into every non-root selection set.
    pub add_typename: bool,
    /// Grouping namespace, read by emitters that support one.
    pub namespace: Option<String>,
    /// Merge the fields of spread fragments into the spreading selection set.
    pub merge_in_fields_from_fragment_spreads: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            passthrough_custom_scalars: false,
            custom_scalars_prefix: String::new(),
            add_typename: false,
            namespace: None,
            merge_in_fields_from_fragment_spreads: true,
        }
    }
}

impl CompilerOptions {
    /// Default options adjusted for a target.
    pub fn for_target(target: Target) -> Self {
        Self::default().with_target(target)
    }

    /// Applies the settings a target forces.
    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        if target.forces_typename() {
            self.add_typename = true;
        }
        self
    }

    /// Returns true if custom scalars keep their (prefixed) names.
    pub fn passthrough_custom_scalars(&self) -> bool {
        self.passthrough_custom_scalars || !self.custom_scalars_prefix.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_names() {
        assert_eq!("ts".parse::<Target>(), Ok(Target::TypeScript));
        assert_eq!("typescript".parse::<Target>(), Ok(Target::TypeScript));
        assert_eq!("flow".parse::<Target>(), Ok(Target::Flow));
        assert!("kotlin".parse::<Target>().is_err());
    }

    #[test]
    fn test_swift_forces_typename() {
        assert!(CompilerOptions::for_target(Target::Swift).add_typename);
        assert!(!CompilerOptions::for_target(Target::Json).add_typename);
        assert!(CompilerOptions::for_target(Target::Json).merge_in_fields_from_fragment_spreads);
    }

    #[test]
    fn test_prefix_implies_passthrough() {
        let options = CompilerOptions {
            custom_scalars_prefix: "GQL".to_string(),
            ..CompilerOptions::default()
        };
        assert!(options.passthrough_custom_scalars());
        assert!(!CompilerOptions::default().passthrough_custom_scalars());
    }
}
