//! Compile operation coordination

use crate::cli::Args;
use crate::config::load_declarations;
use crate::error::DeclareError;
use crate::hooks::BundledHook;
use crate::operations::declare::declare_file;
use crate::operations::discovery::discover_declaration_files;
use crate::registry::{Registry, Variant};
use crate::system::System;
use anyhow::{Context as _, Result};
use std::path::PathBuf;
use tracing::{debug, info};

/// What a compile run produced
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct CompileSummary {
    /// Declaration files read, in declaration order
    pub files: Vec<PathBuf>,

    /// Objects declared across all files
    pub objects: usize,

    /// The rendered document
    pub document: String,

    /// Where the document was written (`None` for dry runs)
    pub output: Option<PathBuf>,
}

/// Coordinates discovery, declaration, compilation and output
#[non_exhaustive]
#[expect(clippy::module_name_repetitions, reason = "CompileOperation")]
pub struct CompileOperation<'src> {
    directory: PathBuf,
    output: PathBuf,
    recursive: bool,
    variant: Option<Variant>,
    hooks: Vec<BundledHook>,
    dry_run: bool,
    system: &'src dyn System,
}

impl<'src> CompileOperation<'src> {
    /// Create a compile operation from CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The variant name is blank
    #[inline]
    pub fn new(args: &Args, system: &'src dyn System) -> Result<Self> {
        let variant = args.variant()?;
        let mut hooks = args.hooks.clone();
        hooks.dedup();

        Ok(Self {
            directory: args.dir.clone(),
            output: args.output.clone(),
            recursive: args.recursive,
            variant,
            hooks,
            dry_run: args.dry_run,
            system,
        })
    }

    /// Run the operation
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No declaration file is found
    /// - A declaration file cannot be loaded or declared
    /// - Compilation or rendering fails
    /// - The document cannot be written
    #[inline]
    pub fn execute(&self) -> Result<CompileSummary> {
        let files = discover_declaration_files(self.system, &self.directory, self.recursive)?;
        info!(
            "Processing: {}",
            files
                .iter()
                .map(|file| file.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let registry = Registry::new();
        for hook in &self.hooks {
            debug!("Installing hook {hook:?}");
            hook.install(&registry)?;
        }

        let objects = {
            let _variant = self
                .variant
                .clone()
                .map(|variant| registry.enter_variant(variant));

            let mut objects = 0;
            for path in &files {
                let file = load_declarations(self.system, path)?;
                objects += declare_file(&registry, &file)
                    .with_context(|| format!("Failed to declare objects from {}", path.display()))?;
            }
            objects
        };

        let document = registry
            .compile()?
            .to_json_pretty()
            .map_err(|e| DeclareError::programmer(format!("Failed to render document: {e}")))?;

        let output = if self.dry_run {
            info!("Dry run, not writing {}", self.output.display());
            None
        } else {
            info!("Writing {}", self.output.display());
            self.write_output(&document)?;
            Some(self.output.clone())
        };

        Ok(CompileSummary {
            files,
            objects,
            document,
            output,
        })
    }

    fn write_output(&self, document: &str) -> Result<()> {
        if let Some(parent) = self.output.parent()
            && !parent.as_os_str().is_empty()
            && !self.system.is_dir(parent)
        {
            self.system.create_dir_all(parent).map_err(|e| {
                DeclareError::filesystem(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        let mut contents = document.to_owned();
        contents.push('\n');
        self.system
            .write(&self.output, contents.as_bytes())
            .map_err(|e| {
                DeclareError::filesystem(format!("Failed to write {}: {e}", self.output.display()))
            })?;
        Ok(())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::system::MockSystem;
    use clap::Parser as _;
    use serde_json::{Value, json};

    fn args(extra: &[&str]) -> Args {
        Args::try_parse_from(
            ["tfdeclare", "--dir", "/work", "--output", "/out/main.tf.json"]
                .into_iter()
                .chain(extra.iter().copied()),
        )
        .unwrap()
    }

    #[test]
    fn writes_compiled_document() {
        let system = MockSystem::new()
            .with_file(
                "/work/main.tf.yaml",
                b"variables:\n  - name: region\n    attributes: { default: us-east-1 }\n",
            )
            .unwrap();

        let summary = CompileOperation::new(&args(&[]), &system)
            .unwrap()
            .execute()
            .unwrap();

        assert_eq!(summary.objects, 1);
        assert_eq!(summary.output, Some(PathBuf::from("/out/main.tf.json")));
        let written: Value =
            serde_json::from_str(&system.file_contents("/out/main.tf.json").unwrap()).unwrap();
        assert_eq!(written, json!({"variable": {"region": {"default": "us-east-1"}}}));
    }

    #[test]
    fn dry_run_writes_nothing() {
        let system = MockSystem::new()
            .with_file("/work/main.tf.yaml", b"outputs:\n  - name: x\n")
            .unwrap();

        let summary = CompileOperation::new(&args(&["--dry-run"]), &system)
            .unwrap()
            .execute()
            .unwrap();

        assert!(summary.output.is_none());
        assert!(system.file_contents("/out/main.tf.json").is_none());
        assert!(summary.document.contains("\"output\""));
    }

    #[test]
    fn variant_applies_while_declaring() {
        let system = MockSystem::new()
            .with_file(
                "/work/main.tf.yaml",
                b"variables:\n  - name: size\n    attributes:\n      default: 1\n      prod_variant: { default: 3 }\n",
            )
            .unwrap();

        let summary = CompileOperation::new(&args(&["--variant", "prod", "--dry-run"]), &system)
            .unwrap()
            .execute()
            .unwrap();

        let document: Value = serde_json::from_str(&summary.document).unwrap();
        assert_eq!(document["variable"]["size"], json!({"default": 3}));
    }
}
