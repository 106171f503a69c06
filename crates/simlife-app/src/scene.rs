//! Scene abstraction: the request/response contract with the engine.
//!
//! No rendering happens here; the presentation layer consumes this graph.
//! Node ids are never reused, so a deferred task holding a stale id sees
//! `is_alive == false` and becomes a no-op instead of touching a new
//! occupant.

use std::collections::HashMap;

use simlife_core::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

#[derive(Debug)]
pub struct Node {
    pub name: String,
    pub parent: Option<NodeId>,
    pub transform: Transform,
}

#[derive(Debug, Default)]
pub struct Scene {
    nodes: HashMap<NodeId, Node>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, parent: Option<NodeId>, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                name: name.into(),
                parent,
                transform: Transform::IDENTITY,
            },
        );
        id
    }

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn transform(&self, id: NodeId) -> Option<Transform> {
        self.nodes.get(&id).map(|n| n.transform)
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Transform) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.transform = transform;
        }
    }

    /// Removes the node and any of its descendants.
    pub fn remove(&mut self, id: NodeId) {
        if self.nodes.remove(&id).is_none() {
            return;
        }
        let orphans: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.parent == Some(id))
            .map(|(child, _)| *child)
            .collect();
        for child in orphans {
            self.remove(child);
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| *id)
    }
}

/// The well-known nodes every session has.
#[derive(Debug, Clone, Copy)]
pub struct Rig {
    pub world: NodeId,
    pub camera: NodeId,
    pub avatar: NodeId,
    pub hands: [NodeId; 2],
}

impl Rig {
    pub fn build(scene: &mut Scene) -> Rig {
        let world = scene.attach(None, "World");
        let avatar = scene.attach(Some(world), "Avatar");
        let camera = scene.attach(Some(world), "Camera");
        let left = scene.attach(Some(avatar), "HandLeft");
        let right = scene.attach(Some(avatar), "HandRight");
        Rig {
            world,
            camera,
            avatar,
            hands: [left, right],
        }
    }
}
