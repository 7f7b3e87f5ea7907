//! File assembly: walk the containment tree and let every generator
//! contribute to the shared set of output files.

use crate::collection::ComponentCollection;
use hookwright_core::util::readable_name;
use hookwright_generators::{BuildContext, ComponentScope};
use hookwright_types::{ComponentId, Result};
use tracing::{debug, trace};

/// Visit components depth first in containment order, a component before
/// the components it contains, and collect their contributions in `ctx`.
pub fn assemble(collection: &ComponentCollection, ctx: &mut BuildContext<'_>) -> Result<()> {
    let root = collection.root_id()?.clone();
    let mut stack = vec![root];
    let mut visited = 0usize;

    while let Some(id) = stack.pop() {
        let scope = scope_of(collection, &id)?;
        trace!(id = %id, base_path = %scope.base_path, "Contributing");
        ctx.enter(scope);
        collection.get(&id)?.contribute(ctx)?;
        visited += 1;

        // Reversed so the first contained component is visited first.
        for child in collection.containment_children(&id)?.iter().rev() {
            stack.push(child.clone());
        }
    }

    debug!(components = visited, files = ctx.artifacts().len(), "Assembled files");
    Ok(())
}

/// Where a component's output goes: the nearest containing root and the
/// directory it lives in below the top root.
pub fn scope_of(collection: &ComponentCollection, id: &ComponentId) -> Result<ComponentScope> {
    let roots = collection.containing_roots(id)?;

    let mut base = Vec::new();
    for root in &roots {
        let directory = collection.get(root)?.root_directory();
        if !directory.is_empty() {
            base.push(directory);
        }
    }

    let (root_name, root_label) = match roots.last() {
        Some(root) => {
            let data = collection.get(root)?.data();
            let name = data.string_of("root_name");
            let label = match data.str_of("readable_name") {
                Some(label) if !label.is_empty() => label.to_string(),
                _ => readable_name(&name),
            };
            (name, label)
        }
        None => {
            let name = collection.root_name(id)?.to_string();
            let label = readable_name(&name);
            (name, label)
        }
    };

    Ok(ComponentScope {
        id: id.clone(),
        base_path: base.join("/"),
        root_name,
        root_label,
    })
}
