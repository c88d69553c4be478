use crate::error::DeclareError;
use crate::hooks::BundledHook;
use crate::registry::Variant;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for tfdeclare
#[derive(Parser, Debug, Clone)]
#[command(name = "tfdeclare")]
#[command(about = "Compile YAML Terraform declarations into one main.tf.json document")]
#[command(long_about = None)]
#[command(version)]
#[non_exhaustive]
pub struct Args {
    /// Directory holding the *.tf.yaml declaration files
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Path of the compiled document
    #[arg(short, long, value_name = "PATH", default_value = "main.tf.json")]
    pub output: PathBuf,

    /// Also read declaration files from subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Activate a variant while declaring (selects <NAME>_variant overrides)
    #[arg(long, value_name = "NAME")]
    pub variant: Option<String>,

    /// Bundled hook to install before compiling (can be specified multiple times)
    #[arg(long = "hook", value_enum, value_name = "HOOK")]
    pub hooks: Vec<BundledHook>,

    /// Print the compiled document instead of writing it
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// The variant selected on the command line
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The variant name is blank
    #[inline]
    pub fn variant(&self) -> anyhow::Result<Option<Variant>> {
        let Some(name) = self.variant.as_deref() else {
            return Ok(None);
        };
        if name.trim().is_empty() {
            return Err(DeclareError::configuration("Variant name cannot be empty").into());
        }
        Ok(Some(Variant::new(name)))
    }
}
