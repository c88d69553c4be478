//! Declaring the contents of a declaration file on a registry

use crate::config::{DeclarationFile, NamedDeclaration, TypedDeclaration};
use crate::error::DeclareResult;
use crate::objects::Kind;
use crate::registry::Registry;
use tracing::debug;

/// Declare every object of `file` on `registry`
///
/// Objects are declared section by section: terraform settings, providers
/// (with the objects scoped under each), variables, outputs, modules, data
/// sources, then resources. Returns the number of objects declared.
///
/// # Errors
///
/// Returns an error if:
/// - A declaration is rejected by the registry
/// - A provider scope cannot be entered
#[inline]
pub fn declare_file(registry: &Registry, file: &DeclarationFile) -> DeclareResult<usize> {
    let mut declared = 0_usize;

    if let Some(terraform) = file.terraform.as_ref() {
        registry.terraform(terraform.clone())?;
        declared += 1;
    }

    for provider in &file.providers {
        let object = registry.provider(&provider.name, provider.attributes.clone())?;
        declared += 1;

        if provider.has_scoped_objects() {
            let _scope = registry.enter_provider(&object)?;
            declared += declare_typed(registry, Kind::Data, &provider.data)?;
            declared += declare_typed(registry, Kind::Resource, &provider.resources)?;
        }
    }

    declared += declare_named(registry, Kind::Variable, &file.variables)?;
    declared += declare_named(registry, Kind::Output, &file.outputs)?;
    declared += declare_named(registry, Kind::Module, &file.modules)?;
    declared += declare_typed(registry, Kind::Data, &file.data)?;
    declared += declare_typed(registry, Kind::Resource, &file.resources)?;

    debug!("Declared {declared} objects");
    Ok(declared)
}

fn declare_named(registry: &Registry, kind: Kind, declarations: &[NamedDeclaration]) -> DeclareResult<usize> {
    for declaration in declarations {
        registry.declare_named(kind, &declaration.name, declaration.attributes.clone())?;
    }
    Ok(declarations.len())
}

fn declare_typed(registry: &Registry, kind: Kind, declarations: &[TypedDeclaration]) -> DeclareResult<usize> {
    for declaration in declarations {
        registry.declare_typed(
            kind,
            &declaration.object_type,
            &declaration.name,
            declaration.attributes.clone(),
        )?;
    }
    Ok(declarations.len())
}
