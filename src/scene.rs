// Scene module: a hierarchy of transform nodes

use std::fmt;

use glam::{Mat4, Quat, Vec3};

use crate::error::{Result, TransformError};
use crate::math::{self, AxisAngle, Transform};

/// Handle to a node inside a [`Scene`].
///
/// Handles carry a generation, so a handle to a removed node never
/// resolves to whatever node later reuses its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// An object in the scene: a name, a local transform and its place in the
/// hierarchy.
///
/// Nodes are deliberately not `Clone`; use [`Scene::clone_subtree`] to
/// duplicate a node together with its descendants.
#[derive(Debug)]
pub struct TransformNode {
    pub name: String,
    transform: Transform,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl TransformNode {
    fn new(name: String, transform: Transform) -> Self {
        Self {
            name,
            transform,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub fn local_position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn set_local_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    /// The stored rotation, including angles below
    /// [`ROTATION_EPSILON`](crate::ROTATION_EPSILON) that world queries report
    /// as identity.
    pub fn local_rotation(&self) -> AxisAngle {
        self.transform.rotation()
    }

    pub fn local_quaternion(&self) -> Quat {
        self.transform.quaternion()
    }

    pub fn set_local_rotation(&mut self, rotation: AxisAngle) {
        self.transform.set_rotation(rotation);
    }

    pub fn local_scale(&self) -> Vec3 {
        self.transform.scale
    }

    /// Zero or negative factors are accepted. A zero factor makes world
    /// rotation and world-to-local queries at or below this node fail.
    pub fn set_local_scale(&mut self, scale: Vec3) {
        self.transform.scale = scale;
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn local_to_parent_matrix(&self) -> Mat4 {
        self.transform.matrix()
    }

    pub fn parent_to_local_matrix(&self) -> Result<Mat4> {
        self.transform.inverse_matrix()
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<TransformNode>,
}

/// Owns every node and the links between them.
#[derive(Debug, Default)]
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl Scene {
    /// Creates a new, empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a root node to the scene.
    pub fn add_node(&mut self, name: impl Into<String>, transform: Transform) -> NodeId {
        let node = TransformNode::new(name.into(), transform);
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    /// Removes a node, severing every link to it.
    ///
    /// Its children become roots (they are not removed) and it leaves its
    /// parent's children. The returned node is detached.
    pub fn remove_node(&mut self, id: NodeId) -> Result<TransformNode> {
        let node = self.get(id)?;
        let parent = node.parent;
        let children = node.children.clone();

        for child in children {
            self.get_mut(child)?.parent = None;
        }
        if let Some(parent) = parent {
            self.get_mut(parent)?.children.retain(|&c| c != id);
        }

        let slot = &mut self.slots[id.index as usize];
        let mut node = slot.node.take().ok_or(TransformError::NodeNotFound(id))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;

        log::trace!("Removed node {} ({:?})", id, node.name);
        node.parent = None;
        node.children.clear();
        Ok(node)
    }

    pub fn node(&self, id: NodeId) -> Option<&TransformNode> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut TransformNode> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn get(&self, id: NodeId) -> Result<&TransformNode> {
        self.node(id).ok_or(TransformError::NodeNotFound(id))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut TransformNode> {
        self.node_mut(id).ok_or(TransformError::NodeNotFound(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Live nodes in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TransformNode)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.node.as_ref().map(|node| {
                let id = NodeId {
                    index: index as u32,
                    generation: slot.generation,
                };
                (id, node)
            })
        })
    }

    /// Nodes without a parent.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(id, _)| id)
    }

    /// Gets the first node with the given name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.iter().find(|(_, node)| node.name == name).map(|(id, _)| id)
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.get(id)?.children)
    }

    /// Parent, grandparent, and so on up to the root.
    pub fn ancestors(&self, id: NodeId) -> Result<Ancestors<'_>> {
        let next = self.get(id)?.parent;
        Ok(Ancestors { scene: self, next })
    }

    /// Moves `id` under `new_parent` at position `index` among its children.
    ///
    /// `index` is clamped, so anything past the end appends. `None` makes the
    /// node a root. The local transform is left as is, so the world pose
    /// generally changes.
    pub fn set_parent(
        &mut self,
        id: NodeId,
        new_parent: Option<NodeId>,
        index: usize,
    ) -> Result<()> {
        let old_parent = self.get(id)?.parent;
        if let Some(parent) = new_parent {
            self.get(parent)?;
            if parent == id || self.ancestors(parent)?.any(|ancestor| ancestor == id) {
                return Err(TransformError::HierarchyCycle { node: id, parent });
            }
        }

        if let Some(old) = old_parent {
            self.get_mut(old)?.children.retain(|&c| c != id);
        }
        self.get_mut(id)?.parent = new_parent;
        if let Some(parent) = new_parent {
            let children = &mut self.get_mut(parent)?.children;
            let index = index.min(children.len());
            children.insert(index, id);
        }

        log::trace!("Reparented {} from {:?} to {:?}", id, old_parent, new_parent);
        Ok(())
    }

    /// Duplicates `id` and all of its descendants, attaching the copy at the
    /// end of `parent`'s children. Returns the copy of `id`.
    pub fn clone_subtree(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<NodeId> {
        if let Some(parent) = parent {
            self.get(parent)?;
        }

        // Snapshot first: `parent` may itself live inside the subtree.
        let mut order: Vec<(NodeId, Option<usize>)> = Vec::new();
        let mut stack = vec![(id, None)];
        while let Some((source, copied_parent)) = stack.pop() {
            let position = order.len();
            order.push((source, copied_parent));
            for &child in self.get(source)?.children.iter().rev() {
                stack.push((child, Some(position)));
            }
        }

        let mut created = Vec::with_capacity(order.len());
        for (source, copied_parent) in order {
            let node = self.get(source)?;
            let (name, transform) = (node.name.clone(), node.transform);
            let copy = self.add_node(name, transform);
            let attach_to = match copied_parent {
                Some(position) => Some(created[position]),
                None => parent,
            };
            self.set_parent(copy, attach_to, usize::MAX)?;
            created.push(copy);
        }
        Ok(created[0])
    }

    /// This node's local matrix composed with every ancestor's, up to the root.
    pub fn local_to_world_matrix(&self, id: NodeId) -> Result<Mat4> {
        let node = self.get(id)?;
        let mut matrix = node.local_to_parent_matrix();
        let mut next = node.parent;
        while let Some(parent) = next {
            let parent = self.get(parent)?;
            matrix = parent.local_to_parent_matrix() * matrix;
            next = parent.parent;
        }
        Ok(matrix)
    }

    pub fn world_to_local_matrix(&self, id: NodeId) -> Result<Mat4> {
        math::invert(&self.local_to_world_matrix(id)?)
    }

    pub fn world_position(&self, id: NodeId) -> Result<Vec3> {
        Ok(math::extract_translation(&self.local_to_world_matrix(id)?))
    }

    pub fn world_scale(&self, id: NodeId) -> Result<Vec3> {
        let scale = math::extract_scale(&self.local_to_world_matrix(id)?);
        if !scale.is_finite() {
            return Err(TransformError::MatrixDecomposition);
        }
        Ok(scale)
    }

    pub fn world_quaternion(&self, id: NodeId) -> Result<Quat> {
        math::extract_quaternion(&self.local_to_world_matrix(id)?)
    }

    pub fn world_rotation(&self, id: NodeId) -> Result<AxisAngle> {
        Ok(AxisAngle::from_quat(self.world_quaternion(id)?))
    }
}

/// Iterator over a node's ancestors, nearest first.
pub struct Ancestors<'a> {
    scene: &'a Scene,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.scene.node(current).and_then(|node| node.parent);
        Some(current)
    }
}
