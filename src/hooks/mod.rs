//! Bundled hooks
//!
//! Ready-made hooks for provider quirks, selectable by name from the command line.

pub mod aws;

use crate::error::{DeclareError, DeclareResult};
use crate::registry::Registry;
use clap::ValueEnum;

/// Hooks the command line can install
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[non_exhaustive]
pub enum BundledHook {
    /// Fill optional `aws_security_group` rule attributes with `null`
    AwsSecurityGroupRules,
}

impl BundledHook {
    /// Register this hook on `registry`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The hook cannot be registered
    #[inline]
    pub fn install(self, registry: &Registry) -> DeclareResult<()> {
        match self {
            Self::AwsSecurityGroupRules => aws::install_security_group_rules_hook(registry),
        }
    }

    /// Look a hook up by its command-line name
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No bundled hook has that name
    #[inline]
    pub fn from_name(name: &str) -> DeclareResult<Self> {
        <Self as ValueEnum>::from_str(name, true)
            .map_err(|_| DeclareError::configuration(format!("Unknown hook: '{name}'")))
    }
}
