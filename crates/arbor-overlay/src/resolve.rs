//! # Instance-Type Resolution
//!
//! The decision table resolving a source child's concrete instance type
//! from its element definition, evaluated in fixed priority order:
//!
//! 1. Contained entity: the child's own intrinsic indicator names the type.
//! 2. Contradictory indicator: diagnostic, but the indicator still wins.
//! 3. Choice element: the name suffix selects among the declared types.
//! 4. `TypeAttr` representation: an explicit type-indicating child or the
//!    declared default selects among multiple candidates.
//! 5. Single declared type: used directly.
//!
//! Resolution failures flow through the policy channel: a diagnostic is
//! delivered and `None` is resolved, except under the strict policy where
//! the diagnostic escalates to a fatal error.

use arbor_model::{ElementDefinition, Representation, Severity, SourceNode};

use crate::node::OverlayContext;
use crate::OverlayError;

/// Find the element definition matching a source child's name.
///
/// An exact name match wins. Failing that, choice elements match when the
/// child's name starts with the declared base name — first declaration
/// wins. A longest-match search is deliberately not attempted, so sibling
/// choice declarations sharing a name prefix can shadow each other; keep
/// choice base names unambiguous within one type.
pub(crate) fn find_by_suffixed_name<'a>(
    definitions: &'a [ElementDefinition],
    name: &str,
) -> Option<&'a ElementDefinition> {
    if let Some(exact) = definitions.iter().find(|d| d.name == name) {
        return Some(exact);
    }

    definitions
        .iter()
        .find(|d| d.is_choice && name.starts_with(&d.name))
}

/// Resolve the concrete instance type of a source child occupying the
/// given element definition.
pub(crate) fn resolve_instance_type(
    ctx: &OverlayContext,
    current: &dyn SourceNode,
    info: &ElementDefinition,
) -> Result<Option<String>, OverlayError> {
    let indicator = current.kind_indicator();

    if info.is_resource {
        if indicator.is_none() {
            ctx.raise(
                Severity::Error,
                format!(
                    "element '{}' should contain a resource, but does not actually contain one",
                    current.name()
                ),
                Some(current.location().to_owned()),
            )?;
        }
        return Ok(indicator.map(str::to_owned));
    }

    if let Some(kind) = indicator {
        // The declaration says plain content, the instance self-describes
        // as a resource. The indicator still wins for typed access.
        ctx.raise(
            Severity::Error,
            format!(
                "element '{}' is not a contained resource, but seems to contain a resource of type '{kind}'",
                current.name()
            ),
            Some(current.location().to_owned()),
        )?;
        return Ok(Some(kind.to_owned()));
    }

    if info.is_choice {
        let suffix = &current.name()[info.name.len()..];

        if suffix.is_empty() {
            ctx.raise(
                Severity::Error,
                format!(
                    "choice element '{}' is not suffixed with a type",
                    current.name()
                ),
                Some(current.location().to_owned()),
            )?;
            return Ok(None);
        }

        let matched = info
            .types
            .iter()
            .filter(|t| t.is_reference)
            .find(|t| t.name.eq_ignore_ascii_case(suffix))
            .map(|t| t.name.clone());

        if matched.is_none() {
            ctx.raise(
                Severity::Error,
                format!(
                    "choice element '{}' is suffixed with unexpected type '{suffix}'",
                    current.name()
                ),
                Some(current.location().to_owned()),
            )?;
        }
        return Ok(matched);
    }

    if info.representation == Representation::TypeAttr && info.types.len() > 1 {
        let named = current
            .children(Some("type"))
            .next()
            .and_then(|c| c.text().map(str::to_owned));

        return Ok(match named {
            Some(named) => info
                .types
                .iter()
                .find(|t| canonical_tail(&t.name) == named)
                .map(|t| t.name.clone()),
            None => info.default_type.clone(),
        });
    }

    if info.types.len() == 1 {
        return Ok(info.types.first().map(|t| t.name.clone()));
    }

    ctx.raise(
        Severity::Error,
        format!(
            "element '{}' declares {} candidate types and no way to choose between them",
            info.name,
            info.types.len()
        ),
        Some(current.location().to_owned()),
    )?;
    Ok(None)
}

/// The trailing path segment of a canonical type identifier, or the
/// identifier itself when it has no path.
fn canonical_tail(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}
