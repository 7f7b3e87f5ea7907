//! The component collection: an arena of resolved generators plus the two
//! graphs over it.
//!
//! The request graph records who asked for whom. It is complete once the
//! collector finishes. The containment tree says whose output each component's
//! output belongs to. It is built once from the complete request graph by
//! [`ComponentCollection::assemble_containment_tree`], after which the
//! collection is frozen.

use hookwright_generators::{ContainmentStep, Generator};
use hookwright_types::{ComponentId, GenerationError, LogicError, Result};
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::{debug, trace};

/// A request edge: `requester` asked for a component under `local_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEdge {
    /// Requesting component
    pub requester: ComponentId,
    /// Name the requester used, with the occurrence suffix for repeats
    pub local_name: String,
}

#[derive(Debug)]
struct Entry {
    generator: Box<dyn Generator>,
    root_name: String,
    request_path: String,
    requester: Option<ComponentId>,
    requested: IndexMap<String, ComponentId>,
}

#[derive(Debug, Default)]
struct ContainmentTree {
    parents: HashMap<ComponentId, ComponentId>,
    children: HashMap<ComponentId, Vec<ComponentId>>,
}

/// All generator instances of one generation run.
#[derive(Debug, Default)]
pub struct ComponentCollection {
    entries: IndexMap<ComponentId, Entry>,
    root: Option<ComponentId>,
    containment: Option<ContainmentTree>,
}

impl ComponentCollection {
    /// An empty, unlocked collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new component.
    ///
    /// `root_name` is the machine name of the root the component belongs to.
    /// The first component added without a request edge becomes the root.
    pub fn add_component(
        &mut self,
        id: ComponentId,
        generator: Box<dyn Generator>,
        root_name: impl Into<String>,
        request: Option<RequestEdge>,
    ) -> Result<()> {
        if self.is_locked() {
            return Err(LogicError::CollectionLocked(id.to_string()).into());
        }
        if let Some(existing) = self.entries.get(&id) {
            let new_path = match &request {
                Some(edge) => self.child_path(&edge.requester, &edge.local_name)?,
                None => id.component_type().to_string(),
            };
            return Err(LogicError::DuplicateId {
                id: id.to_string(),
                existing_path: existing.request_path.clone(),
                new_path,
                reason: "component added twice".to_string(),
            }
            .into());
        }

        let (request_path, requester) = match request {
            Some(edge) => {
                let path = self.child_path(&edge.requester, &edge.local_name)?;
                self.entry_mut(&edge.requester)?
                    .requested
                    .insert(edge.local_name, id.clone());
                (path, Some(edge.requester))
            }
            None => {
                if let Some(root) = &self.root {
                    return Err(LogicError::DuplicateId {
                        id: id.to_string(),
                        existing_path: self.request_path(root)?.to_string(),
                        new_path: id.component_type().to_string(),
                        reason: "a collection has exactly one root".to_string(),
                    }
                    .into());
                }
                self.root = Some(id.clone());
                (generator.component_type().to_string(), None)
            }
        };

        trace!(id = %id, path = %request_path, "Adding component");
        self.entries.insert(
            id,
            Entry {
                generator,
                root_name: root_name.into(),
                request_path,
                requester,
                requested: IndexMap::new(),
            },
        );
        Ok(())
    }

    /// Record that an existing component was requested again under another
    /// name, so relative containment lookups through that name resolve.
    pub fn add_request(&mut self, id: &ComponentId, edge: RequestEdge) -> Result<()> {
        if self.is_locked() {
            return Err(LogicError::CollectionLocked(id.to_string()).into());
        }
        if !self.entries.contains_key(id) {
            return Err(LogicError::UnknownComponent(id.to_string()).into());
        }
        self.entry_mut(&edge.requester)?
            .requested
            .insert(edge.local_name, id.clone());
        Ok(())
    }

    fn child_path(&self, requester: &ComponentId, local_name: &str) -> Result<String> {
        Ok(format!("{}/{}", self.entry(requester)?.request_path, local_name))
    }

    fn entry(&self, id: &ComponentId) -> Result<&Entry> {
        self.entries
            .get(id)
            .ok_or_else(|| LogicError::UnknownComponent(id.to_string()).into())
    }

    fn entry_mut(&mut self, id: &ComponentId) -> Result<&mut Entry> {
        self.entries
            .get_mut(id)
            .ok_or_else(|| LogicError::UnknownComponent(id.to_string()).into())
    }

    /// Whether a component is present.
    pub fn contains(&self, id: &ComponentId) -> bool {
        self.entries.contains_key(id)
    }

    /// A component's generator.
    pub fn get(&self, id: &ComponentId) -> Result<&dyn Generator> {
        Ok(self.entry(id)?.generator.as_ref())
    }

    /// Mutable generator access, for merging requests before assembly.
    pub fn get_mut(&mut self, id: &ComponentId) -> Result<&mut dyn Generator> {
        if self.is_locked() {
            return Err(LogicError::CollectionLocked(id.to_string()).into());
        }
        Ok(self.entry_mut(id)?.generator.as_mut())
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collection has no components.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Component identifiers in the order they were added.
    pub fn ids(&self) -> impl Iterator<Item = &ComponentId> {
        self.entries.keys()
    }

    /// The root component.
    pub fn root_id(&self) -> Result<&ComponentId> {
        self.root
            .as_ref()
            .ok_or_else(|| LogicError::UnknownComponent("<root>".to_string()).into())
    }

    /// Machine name of the root a component belongs to.
    pub fn root_name(&self, id: &ComponentId) -> Result<&str> {
        Ok(&self.entry(id)?.root_name)
    }

    /// Slash-joined request names from the root to a component.
    pub fn request_path(&self, id: &ComponentId) -> Result<&str> {
        Ok(&self.entry(id)?.request_path)
    }

    /// The component that first requested `id`. `None` for the root.
    pub fn requester(&self, id: &ComponentId) -> Result<Option<&ComponentId>> {
        Ok(self.entry(id)?.requester.as_ref())
    }

    /// Components `id` requested, keyed by local name.
    pub fn requested(&self, id: &ComponentId) -> Result<&IndexMap<String, ComponentId>> {
        Ok(&self.entry(id)?.requested)
    }

    /// The nearest component above `id` in the request graph that is a root
    /// component.
    pub fn closest_requesting_root(&self, id: &ComponentId) -> Result<&ComponentId> {
        let entry = self.entry(id)?;
        let Some(mut current) = entry.requester.as_ref() else {
            return Err(LogicError::RootHasNoRequester(id.to_string()).into());
        };
        loop {
            let ancestor = self.entry(current)?;
            if ancestor.generator.is_root_component() {
                return Ok(current);
            }
            match ancestor.requester.as_ref() {
                Some(next) => current = next,
                None => {
                    return Err(LogicError::UnresolvedContainment {
                        id: id.to_string(),
                        reason: "no requesting component is a root component".to_string(),
                    }
                    .into())
                }
            }
        }
    }

    /// Whether the containment tree has been assembled.
    pub fn is_locked(&self) -> bool {
        self.containment.is_some()
    }

    /// Resolve every component's containment location and freeze the
    /// collection.
    pub fn assemble_containment_tree(&mut self) -> Result<()> {
        if self.is_locked() {
            return Err(LogicError::ContainmentAlreadyAssembled.into());
        }
        let root = self.root_id()?.clone();

        let mut tree = ContainmentTree::default();
        for id in self.entries.keys() {
            if *id == root {
                continue;
            }
            let parent = self.resolve_container(id)?;
            trace!(child = %id, parent = %parent, "Containment edge");
            tree.children.entry(parent.clone()).or_default().push(id.clone());
            tree.parents.insert(id.clone(), parent);
        }

        // Every chain of containers has to end at the root.
        for id in self.entries.keys() {
            let mut current = id;
            let mut steps = 0;
            while let Some(parent) = tree.parents.get(current) {
                current = parent;
                steps += 1;
                if steps > self.entries.len() {
                    return Err(LogicError::UnresolvedContainment {
                        id: id.to_string(),
                        reason: "containment forms a cycle".to_string(),
                    }
                    .into());
                }
            }
        }

        debug!(
            components = self.entries.len(),
            edges = tree.parents.len(),
            "Assembled containment tree"
        );
        self.containment = Some(tree);
        Ok(())
    }

    fn resolve_container(&self, id: &ComponentId) -> Result<ComponentId> {
        let unresolved = |reason: String| -> GenerationError {
            LogicError::UnresolvedContainment {
                id: id.to_string(),
                reason,
            }
            .into()
        };

        let location = self.entry(id)?.generator.containment();
        if location.is_root() {
            return Err(unresolved("only the root component may have no container".to_string()));
        }

        let mut current = id.clone();
        for step in &location.0 {
            current = match step {
                ContainmentStep::Requester => self
                    .requester(&current)?
                    .cloned()
                    .ok_or_else(|| unresolved(format!("'{}' has no requester", current)))?,
                ContainmentStep::NearestRoot => self
                    .closest_requesting_root(&current)
                    .map_err(|_| unresolved(format!("no root component above '{}'", current)))?
                    .clone(),
                ContainmentStep::TopRoot => self.root_id()?.clone(),
                ContainmentStep::Child(name) => self
                    .find_requested(&current, name)?
                    .ok_or_else(|| unresolved(format!("'{}' requested nothing named '{}'", current, name)))?
                    .clone(),
            };
        }

        if current == *id {
            return Err(unresolved(format!("'{}' resolves to itself", location)));
        }
        Ok(current)
    }

    /// A requested component by local name, or by the base name of a
    /// repeated request when it produced exactly one occurrence.
    fn find_requested(&self, id: &ComponentId, name: &str) -> Result<Option<&ComponentId>> {
        let requested = &self.entry(id)?.requested;
        if let Some(child) = requested.get(name) {
            return Ok(Some(child));
        }
        let prefix = format!("{}/", name);
        let mut matches = requested
            .iter()
            .filter(|(local, _)| local.starts_with(&prefix))
            .map(|(_, child)| child);
        match (matches.next(), matches.next()) {
            (Some(only), None) => Ok(Some(only)),
            _ => Ok(None),
        }
    }

    fn tree(&self) -> Result<&ContainmentTree> {
        self.containment
            .as_ref()
            .ok_or_else(|| LogicError::ContainmentNotAssembled.into())
    }

    /// Components whose output is contained by `id`, in request order.
    pub fn containment_children(&self, id: &ComponentId) -> Result<&[ComponentId]> {
        let tree = self.tree()?;
        self.entry(id)?;
        Ok(tree.children.get(id).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// The container of `id`. `None` for the root.
    pub fn containment_parent(&self, id: &ComponentId) -> Result<Option<&ComponentId>> {
        let tree = self.tree()?;
        self.entry(id)?;
        Ok(tree.parents.get(id))
    }

    /// The root components containing `id`, outermost first, including `id`
    /// itself when it is a root component.
    pub fn containing_roots(&self, id: &ComponentId) -> Result<Vec<&ComponentId>> {
        let Some((start, _)) = self.entries.get_key_value(id) else {
            return Err(LogicError::UnknownComponent(id.to_string()).into());
        };
        let mut roots = Vec::new();
        let mut current = Some(start);
        while let Some(node) = current {
            if self.entry(node)?.generator.is_root_component() {
                roots.push(node);
            }
            current = self.containment_parent(node)?;
        }
        roots.reverse();
        Ok(roots)
    }
}
