use std::collections::{BTreeSet, HashMap};

use crate::error::LedgerError;
use crate::types::{Migration, MigrationId};

/// Order every available migration so that each comes after all of its
/// dependencies. Ties are broken by declaration order, so the result is
/// deterministic for a given catalog.
pub fn resolve_order(available: &[Migration]) -> Result<Vec<&Migration>, LedgerError> {
    let mut index: HashMap<&MigrationId, usize> = HashMap::with_capacity(available.len());
    for (i, migration) in available.iter().enumerate() {
        if index.insert(&migration.id, i).is_some() {
            return Err(LedgerError::DuplicateMigration(migration.id.clone()));
        }
    }

    let mut pending_deps = vec![0usize; available.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); available.len()];
    for (i, migration) in available.iter().enumerate() {
        for dependency in &migration.dependencies {
            let &d = index
                .get(dependency)
                .ok_or_else(|| LedgerError::MissingDependency {
                    migration: migration.id.clone(),
                    dependency: dependency.clone(),
                })?;
            pending_deps[i] += 1;
            dependents[d].push(i);
        }
    }

    // Kahn's algorithm over declaration indices.
    let mut ready: BTreeSet<usize> = pending_deps
        .iter()
        .enumerate()
        .filter(|(_, n)| **n == 0)
        .map(|(i, _)| i)
        .collect();
    let mut order = Vec::with_capacity(available.len());
    while let Some(i) = ready.pop_first() {
        order.push(&available[i]);
        for &j in &dependents[i] {
            pending_deps[j] -= 1;
            if pending_deps[j] == 0 {
                ready.insert(j);
            }
        }
    }

    if order.len() < available.len() {
        let involved = pending_deps
            .iter()
            .enumerate()
            .filter(|(_, n)| **n > 0)
            .map(|(i, _)| available[i].id.clone())
            .collect();
        return Err(LedgerError::Cycle { involved });
    }
    Ok(order)
}

/// Pending migrations in apply order.
///
/// Validates the whole graph first, so a cycle or dangling reference anywhere
/// in `available` fails the plan even if the affected migrations are already
/// applied. Also rejects a history where an applied migration depends on one
/// that is not applied.
pub fn plan<'a>(
    applied: &BTreeSet<MigrationId>,
    available: &'a [Migration],
) -> Result<Vec<&'a Migration>, LedgerError> {
    let order = resolve_order(available)?;

    for migration in order.iter().filter(|m| applied.contains(&m.id)) {
        if let Some(dependency) = migration
            .dependencies
            .iter()
            .find(|d| !applied.contains(*d))
        {
            return Err(LedgerError::InconsistentHistory {
                migration: migration.id.clone(),
                dependency: dependency.clone(),
            });
        }
    }

    Ok(order
        .into_iter()
        .filter(|m| !applied.contains(&m.id))
        .collect())
}
