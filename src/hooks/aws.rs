//! Hooks for the AWS provider

use crate::error::DeclareResult;
use crate::objects::{Attributes, Kind};
use crate::registry::Registry;
use serde_json::Value;

/// Resource type the security group rule hook applies to
pub const SECURITY_GROUP_TYPE: &str = "aws_security_group";

/// Rule attributes the provider treats as required once rules are written as JSON
pub const SECURITY_GROUP_RULE_OPTIONAL_ATTRS: [&str; 6] = [
    "cidr_blocks",
    "ipv6_cidr_blocks",
    "prefix_list_ids",
    "security_groups",
    "self",
    "description",
];

/// Give every inline `ingress`/`egress` rule an explicit `null` for each
/// optional attribute it leaves out
///
/// Rules that are not mappings, and directions that are not lists (such as a
/// reference expression), are left untouched.
///
/// # Errors
///
/// Never fails; the signature matches a typed hook.
#[inline]
pub fn fill_in_security_group_rule_attrs(_name: &str, mut attrs: Attributes) -> DeclareResult<Attributes> {
    for direction in ["ingress", "egress"] {
        let Some(&mut Value::Array(ref mut rules)) = attrs.get_mut(direction) else {
            continue;
        };
        for rule in rules.iter_mut().filter_map(Value::as_object_mut) {
            for attr in SECURITY_GROUP_RULE_OPTIONAL_ATTRS {
                rule.entry(attr).or_insert(Value::Null);
            }
        }
    }
    Ok(attrs)
}

/// Register [`fill_in_security_group_rule_attrs`] for `aws_security_group` resources
///
/// # Errors
///
/// Returns an error if:
/// - The hook cannot be registered
#[inline]
pub fn install_security_group_rules_hook(registry: &Registry) -> DeclareResult<()> {
    registry.add_typed_hook(Kind::Resource, SECURITY_GROUP_TYPE, fill_in_security_group_rule_attrs)
}
