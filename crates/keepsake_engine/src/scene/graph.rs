//! Retained scene graph
//!
//! Tree of nodes rooted at a single group. Every node carries a local
//! transform (position, Euler rotation, scale) relative to its parent, plus
//! handles to the GPU resources it draws with. Nodes are stored in a slot
//! map, so removed nodes leave only dead keys behind.

use crate::foundation::collections::{GeometryHandle, HandleMap, MaterialHandle, NodeId};
use crate::foundation::math::{Transform, Vec3};

/// What a node is
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Pure transform node
    Group,
    /// Textured surface
    Mesh {
        /// Shape
        geometry: GeometryHandle,
        /// Appearance
        material: MaterialHandle,
    },
    /// Point sprites
    Points {
        /// Point positions
        geometry: GeometryHandle,
        /// Sprite appearance
        material: MaterialHandle,
    },
    /// Uniform light
    AmbientLight {
        /// Brightness
        intensity: f32,
    },
    /// Omnidirectional light with a falloff range
    PointLight {
        /// Brightness
        intensity: f32,
        /// Falloff distance
        range: f32,
    },
}

impl NodeKind {
    /// GPU resources referenced by the node
    pub fn resources(&self) -> Option<(GeometryHandle, MaterialHandle)> {
        match *self {
            Self::Mesh { geometry, material } | Self::Points { geometry, material } => {
                Some((geometry, material))
            }
            _ => None,
        }
    }
}

/// Local transform with rotation kept as Euler angles so it can be animated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    /// Position relative to the parent
    pub position: Vec3,
    /// Euler angles in radians
    pub rotation: Vec3,
    /// Per-axis scale
    pub scale: Vec3,
}

impl NodeTransform {
    /// Transform at a position
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Builder: set rotation
    #[must_use]
    pub fn rotated(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder: set scale
    #[must_use]
    pub fn scaled(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Convert to a quaternion-based transform
    pub fn to_transform(&self) -> Transform {
        Transform::from_euler(self.position, self.rotation, self.scale)
    }

    /// Convert from a quaternion-based transform
    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            position: transform.position,
            rotation: transform.euler_angles(),
            scale: transform.scale,
        }
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::repeat(1.0),
        }
    }
}

/// Scene-graph node
#[derive(Debug, Clone)]
pub struct Node {
    /// Debug name
    pub name: String,
    /// Node type and resources
    pub kind: NodeKind,
    /// Local transform
    pub transform: NodeTransform,
    /// Whether the node (and its subtree) is drawn
    pub visible: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// Parent node, `None` only for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Exponential fog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    /// Fog colour (linear RGB)
    pub color: Vec3,
    /// Density
    pub density: f32,
}

/// Tree of nodes under a single root group
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: HandleMap<NodeId, Node>,
    root: NodeId,
    /// Scene fog, if any
    pub fog: Option<Fog>,
}

impl SceneGraph {
    /// Create a graph holding only the root group
    pub fn new() -> Self {
        let mut nodes = HandleMap::with_key();
        let root = nodes.insert(Node {
            name: "root".to_string(),
            kind: NodeKind::Group,
            transform: NodeTransform::default(),
            visible: true,
            parent: None,
            children: Vec::new(),
        });
        Self { nodes, root, fog: None }
    }

    /// Root group
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether only the root is left
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Whether a node is still in the graph
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Add a node under `parent`; a missing parent falls back to the root
    pub fn add(&mut self, parent: NodeId, name: impl Into<String>, kind: NodeKind, transform: NodeTransform) -> NodeId {
        let parent = if self.nodes.contains_key(parent) { parent } else { self.root };
        let id = self.nodes.insert(Node {
            name: name.into(),
            kind,
            transform,
            visible: true,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(id);
        }
        id
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Look up a node for modification
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Local transform of a node
    pub fn transform(&self, id: NodeId) -> Option<&NodeTransform> {
        self.nodes.get(id).map(|node| &node.transform)
    }

    /// Local transform of a node, for modification
    pub fn transform_mut(&mut self, id: NodeId) -> Option<&mut NodeTransform> {
        self.nodes.get_mut(id).map(|node| &mut node.transform)
    }

    /// Transform from node space to world space
    pub fn world_transform(&self, id: NodeId) -> Option<Transform> {
        let node = self.nodes.get(id)?;
        let local = node.transform.to_transform();
        match node.parent {
            Some(parent) => Some(self.world_transform(parent)?.combine(&local)),
            None => Some(local),
        }
    }

    /// Whether `ancestor` is `id` or one of its ancestors
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.nodes.get(node_id).and_then(|node| node.parent);
        }
        false
    }

    /// Move a node under a new parent, keeping its world transform
    ///
    /// Returns false (and changes nothing) if either node is missing, if the
    /// move would create a cycle, or if the new parent's transform cannot be
    /// inverted.
    pub fn attach(&mut self, id: NodeId, new_parent: NodeId) -> bool {
        if id == self.root || !self.nodes.contains_key(new_parent) || self.is_ancestor(id, new_parent) {
            return false;
        }
        let (Some(world), Some(parent_world)) = (self.world_transform(id), self.world_transform(new_parent)) else {
            return false;
        };
        let Some(parent_inverse) = parent_world.to_matrix().try_inverse() else {
            return false;
        };
        let local = Transform::from_matrix(parent_inverse * world.to_matrix());

        if let Some(old_parent) = self.nodes.get(id).and_then(|node| node.parent) {
            if let Some(old) = self.nodes.get_mut(old_parent) {
                old.children.retain(|child| *child != id);
            }
        }
        if let Some(parent_node) = self.nodes.get_mut(new_parent) {
            parent_node.children.push(id);
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = Some(new_parent);
            node.transform = NodeTransform::from_transform(&local);
        }
        true
    }

    /// Remove a node and its whole subtree, returning the removed nodes
    ///
    /// The root cannot be removed. Resource handles held by the removed
    /// nodes are not freed; that is the caller's job.
    pub fn remove(&mut self, id: NodeId) -> Vec<Node> {
        if id == self.root || !self.nodes.contains_key(id) {
            return Vec::new();
        }
        if let Some(parent) = self.nodes.get(id).and_then(|node| node.parent) {
            if let Some(parent_node) = self.nodes.get_mut(parent) {
                parent_node.children.retain(|child| *child != id);
            }
        }

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next) {
                stack.extend(node.children.iter().copied());
                removed.push(node);
            }
        }
        removed
    }

    /// Depth-first, pre-order list of every node reachable from the root
    pub fn traverse(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(id) {
                order.push(id);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        order
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
