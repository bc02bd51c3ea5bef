//! Route selection
//!
//! The route lists given on the command line mean different things depending
//! on the provider selector: with `all` they name the routes to report, with a
//! specific provider they name routes to leave out of that provider's set.

use crate::catalog::RouteCatalog;
use crate::provider::{ProviderSelector, ProviderTable};
use crate::types::Result;
use std::collections::HashSet;

/// Outcome of a selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Target route names, in report order
    pub targets: Vec<String>,
    /// Requested names that are not in the catalog
    pub unresolved: Vec<String>,
}

/// Names from comma-separated groups that exist in the catalog, in the
/// order given
///
/// Unknown names are logged and returned separately; they never fail the run.
pub fn resolve_route_names<S: AsRef<str>>(
    catalog: &RouteCatalog,
    groups: &[S],
) -> (Vec<String>, Vec<String>) {
    let mut found = Vec::new();
    let mut unresolved = Vec::new();

    let names = groups
        .iter()
        .flat_map(|group| group.as_ref().split(','))
        .map(str::trim)
        .filter(|name| !name.is_empty());

    for name in names {
        if catalog.contains(name) {
            found.push(name.to_string());
        } else {
            log::warn!("Route {:?} not found, skipping", name);
            unresolved.push(name.to_string());
        }
    }

    (found, unresolved)
}

/// Select routes by explicit inclusion
///
/// No groups selects the whole catalog.
pub fn select_by_inclusion<S: AsRef<str>>(catalog: &RouteCatalog, groups: &[S]) -> Selection {
    if groups.is_empty() {
        return Selection {
            targets: catalog.names().map(str::to_string).collect(),
            unresolved: Vec::new(),
        };
    }

    let (targets, unresolved) = resolve_route_names(catalog, groups);
    Selection {
        targets,
        unresolved,
    }
}

/// Select the routes preferring `provider`, minus the routes named in
/// `groups`
pub fn select_by_exclusion_with_provider<S: AsRef<str>>(
    catalog: &RouteCatalog,
    providers: &ProviderTable,
    provider: &str,
    groups: &[S],
) -> Result<Selection> {
    let code = providers.resolve(provider)?;
    log::debug!("Provider {} resolves to DSP code {:?}", provider, code);

    let (excluded, unresolved) = resolve_route_names(catalog, groups);
    let excluded: HashSet<&str> = excluded.iter().map(String::as_str).collect();

    let targets = catalog
        .routes()
        .filter(|route| route.info.dspcode == code)
        .filter(|route| !excluded.contains(route.info.name.as_str()))
        .map(|route| route.info.name.clone())
        .collect();

    Ok(Selection {
        targets,
        unresolved,
    })
}

/// Compute the target routes for a provider selector and route groups
pub fn select<S: AsRef<str>>(
    catalog: &RouteCatalog,
    providers: &ProviderTable,
    selector: &ProviderSelector,
    groups: &[S],
) -> Result<Selection> {
    let selection = match selector {
        ProviderSelector::All => select_by_inclusion(catalog, groups),
        ProviderSelector::Named(name) => {
            select_by_exclusion_with_provider(catalog, providers, name, groups)?
        }
    };
    log::info!(
        "Selected {} of {} routes ({} unresolved)",
        selection.targets.len(),
        catalog.len(),
        selection.unresolved.len()
    );
    Ok(selection)
}
