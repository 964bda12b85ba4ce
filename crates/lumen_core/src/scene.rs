//! Scene graph.
//!
//! Nodes live in an arena ([`SceneGraph`]) and refer to each other by
//! [`NodeId`]. Each node keeps a cached bounding box that covers its own
//! primitives and every descendant; `None` marks a cache that needs
//! recomputing. Whenever a node is dirty, so are all of its ancestors.

use std::fmt;

use lumen_math::{Bounds, Similarity, Vec3};

use crate::error::{SceneError, SceneResult};
use crate::primitive::Primitive;

/// Handle to a node in a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SceneNode {
    primitives: Vec<Primitive>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    bounds: Option<Bounds>,
}

impl SceneNode {
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Cached bounds, or `None` if an edit has invalidated them.
    pub fn cached_bounds(&self) -> Option<Bounds> {
        self.bounds
    }
}

/// Arena of scene nodes under construction.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode::default());
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> SceneResult<&SceneNode> {
        self.nodes.get(id.0).ok_or(SceneError::UnknownNode(id.0))
    }

    fn node_mut(&mut self, id: NodeId) -> SceneResult<&mut SceneNode> {
        self.nodes.get_mut(id.0).ok_or(SceneError::UnknownNode(id.0))
    }

    /// Make `child` a child of `parent`.
    ///
    /// Fails if either id is unknown, if `child` already has a parent, or if
    /// `child` is `parent` itself or one of its ancestors.
    pub fn attach_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        self.node(parent)?;
        if self.node(child)?.parent.is_some() {
            return Err(SceneError::AlreadyAttached(child.0));
        }

        let mut ancestor = Some(parent);
        while let Some(id) = ancestor {
            if id == child {
                return Err(SceneError::Cycle {
                    parent: parent.0,
                    child: child.0,
                });
            }
            ancestor = self.nodes[id.0].parent;
        }

        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.invalidate(parent);
        Ok(())
    }

    pub fn attach_primitive(&mut self, node: NodeId, primitive: impl Into<Primitive>) -> SceneResult<()> {
        self.node_mut(node)?.primitives.push(primitive.into());
        self.invalidate(node);
        Ok(())
    }

    /// Mark `node` and its ancestors dirty.
    fn invalidate(&mut self, node: NodeId) {
        let mut current = Some(node);
        while let Some(id) = current {
            let n = &mut self.nodes[id.0];
            if n.bounds.is_none() && id != node {
                // Ancestors of a dirty node are already dirty.
                break;
            }
            n.bounds = None;
            current = n.parent;
        }
    }

    /// Ids of `node` and all its descendants, parents before children.
    pub fn subtree(&self, node: NodeId) -> SceneResult<Vec<NodeId>> {
        self.node(node)?;
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        Ok(out)
    }

    /// Apply a similarity transform to every primitive in the subtree.
    pub fn transform(&mut self, node: NodeId, transform: &Similarity) -> SceneResult<()> {
        if !transform.is_valid() {
            return Err(SceneError::InvalidTransform);
        }
        let subtree = self.subtree(node)?;
        for id in subtree {
            let n = &mut self.nodes[id.0];
            for primitive in &mut n.primitives {
                primitive.transform(transform);
            }
            n.bounds = None;
        }
        self.invalidate(node);
        Ok(())
    }

    pub fn translate(&mut self, node: NodeId, offset: Vec3) -> SceneResult<()> {
        self.transform(node, &Similarity::from_translation(offset))
    }

    /// Uniform scale about the world origin.
    pub fn scale(&mut self, node: NodeId, factor: f32) -> SceneResult<()> {
        self.transform(node, &Similarity::from_scale(factor))
    }

    /// Rotation of `angle` radians about `axis` through the world origin.
    pub fn rotate(&mut self, node: NodeId, axis: Vec3, angle: f32) -> SceneResult<()> {
        self.transform(node, &Similarity::from_axis_angle(axis, angle))
    }

    /// Recompute dirty bounds below `node` and return the node's bounds.
    ///
    /// Runs as an iterative post-order walk; clean subtrees are skipped.
    pub fn update_bounds(&mut self, node: NodeId) -> SceneResult<Bounds> {
        self.node(node)?;
        let mut stack = vec![(node, false)];
        let mut updated = 0usize;

        while let Some((id, expanded)) = stack.pop() {
            if self.nodes[id.0].bounds.is_some() {
                continue;
            }
            if !expanded {
                stack.push((id, true));
                for &child in &self.nodes[id.0].children {
                    if self.nodes[child.0].bounds.is_none() {
                        stack.push((child, false));
                    }
                }
                continue;
            }

            let n = &self.nodes[id.0];
            let own = n
                .primitives
                .iter()
                .fold(Bounds::EMPTY, |acc, p| acc.union(&p.bounds()));
            let bounds = n.children.iter().fold(own, |acc, c| {
                acc.union(&self.nodes[c.0].bounds.unwrap_or(Bounds::EMPTY))
            });
            self.nodes[id.0].bounds = Some(bounds);
            updated += 1;
        }

        if updated > 0 {
            log::debug!("Updated bounds of {} scene node(s) under {}", updated, node);
        }
        Ok(self.nodes[node.0].bounds.unwrap_or(Bounds::EMPTY))
    }
}

/// A finalised, read-only scene ready for rendering.
#[derive(Debug, Clone)]
pub struct Scene {
    graph: SceneGraph,
    root: NodeId,
}

impl Scene {
    /// Finalise `graph` with `root` as the top node, bringing every cached
    /// bounds below it up to date.
    pub fn new(mut graph: SceneGraph, root: NodeId) -> SceneResult<Self> {
        graph.update_bounds(root)?;
        Ok(Self { graph, root })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Bounds of the whole scene.
    pub fn bounds(&self) -> Bounds {
        self.node_bounds(self.root)
    }

    pub fn node(&self, id: NodeId) -> &SceneNode {
        &self.graph.nodes[id.0]
    }

    pub fn node_bounds(&self, id: NodeId) -> Bounds {
        self.graph.nodes[id.0].bounds.unwrap_or(Bounds::EMPTY)
    }

    /// Every primitive reachable from the root.
    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        let ids = self.graph.subtree(self.root).unwrap_or_default();
        ids.into_iter()
            .flat_map(move |id| self.graph.nodes[id.0].primitives.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::primitive::{Disc, Sphere};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    fn material() -> Arc<Material> {
        Material::builder().build().unwrap()
    }

    fn sphere(center: Vec3, radius: f32) -> Sphere {
        Sphere::new(center, radius, material()).unwrap()
    }

    fn check_containment(graph: &SceneGraph, root: NodeId) {
        for id in graph.subtree(root).unwrap() {
            let node = graph.node(id).unwrap();
            let bounds = node.cached_bounds().unwrap();
            for p in node.primitives() {
                assert!(bounds.contains(&p.bounds()), "node {id} misses a primitive");
            }
            let mut ancestor = node.parent();
            while let Some(a) = ancestor {
                let outer = graph.node(a).unwrap();
                assert!(outer.cached_bounds().unwrap().contains(&bounds));
                ancestor = outer.parent();
            }
        }
    }

    #[test]
    fn test_attach_rejects_second_parent_and_cycles() {
        let mut g = SceneGraph::new();
        let a = g.add_node();
        let b = g.add_node();
        let c = g.add_node();

        g.attach_child(a, b).unwrap();
        g.attach_child(b, c).unwrap();

        assert_eq!(g.attach_child(a, c), Err(SceneError::AlreadyAttached(c.index())));
        assert_eq!(
            g.attach_child(c, a),
            Err(SceneError::Cycle {
                parent: c.index(),
                child: a.index()
            })
        );
        assert!(matches!(g.attach_child(a, a), Err(SceneError::Cycle { .. })));
        assert_eq!(g.attach_child(a, NodeId(99)), Err(SceneError::UnknownNode(99)));
    }

    #[test]
    fn test_bounds_cover_descendants() {
        let mut g = SceneGraph::new();
        let root = g.add_node();
        let child = g.add_node();
        g.attach_child(root, child).unwrap();
        g.attach_primitive(root, sphere(Vec3::ZERO, 1.0)).unwrap();
        g.attach_primitive(child, sphere(Vec3::new(10.0, 0.0, 0.0), 2.0))
            .unwrap();

        let b = g.update_bounds(root).unwrap();
        assert!(b.contains_point(Vec3::new(12.0, 0.0, 0.0)));
        assert!(b.contains_point(Vec3::new(-1.0, 0.0, 0.0)));
        check_containment(&g, root);
    }

    #[test]
    fn test_edits_invalidate_ancestors() {
        let mut g = SceneGraph::new();
        let root = g.add_node();
        let mid = g.add_node();
        let leaf = g.add_node();
        let other = g.add_node();
        g.attach_child(root, mid).unwrap();
        g.attach_child(mid, leaf).unwrap();
        g.attach_child(root, other).unwrap();
        g.attach_primitive(leaf, sphere(Vec3::ZERO, 1.0)).unwrap();
        g.attach_primitive(other, sphere(Vec3::ONE, 1.0)).unwrap();
        g.update_bounds(root).unwrap();

        g.translate(leaf, Vec3::new(0.0, 100.0, 0.0)).unwrap();
        assert!(g.node(leaf).unwrap().cached_bounds().is_none());
        assert!(g.node(mid).unwrap().cached_bounds().is_none());
        assert!(g.node(root).unwrap().cached_bounds().is_none());
        assert!(g.node(other).unwrap().cached_bounds().is_some());

        let b = g.update_bounds(root).unwrap();
        assert!(b.contains_point(Vec3::new(0.0, 101.0, 0.0)));
        check_containment(&g, root);
    }

    #[test]
    fn test_transform_applies_to_whole_subtree() {
        let mut g = SceneGraph::new();
        let root = g.add_node();
        let child = g.add_node();
        g.attach_child(root, child).unwrap();
        g.attach_primitive(child, sphere(Vec3::X, 0.5)).unwrap();

        g.scale(root, 2.0).unwrap();
        match &g.node(child).unwrap().primitives()[0] {
            Primitive::Sphere(s) => {
                assert_eq!(s.center(), Vec3::new(2.0, 0.0, 0.0));
                assert_eq!(s.radius(), 1.0);
            }
            other => panic!("unexpected primitive {other:?}"),
        }

        assert_eq!(g.scale(root, 0.0), Err(SceneError::InvalidTransform));
        assert_eq!(
            g.translate(root, Vec3::splat(f32::NAN)),
            Err(SceneError::InvalidTransform)
        );
    }

    #[test]
    fn test_randomized_edits_keep_bounds_contained() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut g = SceneGraph::new();
        let root = g.add_node();
        let mut nodes = vec![root];

        for _ in 0..20 {
            let node = g.add_node();
            let parent = nodes[rng.gen_range(0..nodes.len())];
            g.attach_child(parent, node).unwrap();
            let center = Vec3::new(
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
            );
            if rng.gen_bool(0.5) {
                g.attach_primitive(node, sphere(center, rng.gen_range(0.1..2.0)))
                    .unwrap();
            } else {
                let normal = Vec3::new(rng.gen(), rng.gen(), rng.gen()) + Vec3::splat(0.1);
                let disc = Disc::new(center, normal, rng.gen_range(0.1..2.0), material()).unwrap();
                g.attach_primitive(node, disc).unwrap();
            }
            nodes.push(node);
        }
        g.update_bounds(root).unwrap();

        for _ in 0..200 {
            let node = nodes[rng.gen_range(0..nodes.len())];
            match rng.gen_range(0..3) {
                0 => {
                    let offset = Vec3::new(
                        rng.gen_range(-3.0..3.0),
                        rng.gen_range(-3.0..3.0),
                        rng.gen_range(-3.0..3.0),
                    );
                    g.translate(node, offset).unwrap();
                }
                1 => g.scale(node, rng.gen_range(0.5..1.5)).unwrap(),
                _ => {
                    let axis = Vec3::new(
                        rng.gen_range(-1.0..1.0),
                        rng.gen_range(-1.0..1.0),
                        rng.gen_range(-1.0..1.0),
                    );
                    g.rotate(node, axis, rng.gen_range(-3.0..3.0)).unwrap();
                }
            }
            if rng.gen_bool(0.3) {
                g.update_bounds(root).unwrap();
                check_containment(&g, root);
            }
        }

        g.update_bounds(root).unwrap();
        check_containment(&g, root);
    }

    #[test]
    fn test_scene_new_finalises_bounds() {
        let mut g = SceneGraph::new();
        let root = g.add_node();
        let child = g.add_node();
        g.attach_child(root, child).unwrap();
        g.attach_primitive(child, sphere(Vec3::ZERO, 1.0)).unwrap();

        let scene = Scene::new(g, root).unwrap();
        assert!(scene.bounds().contains_point(Vec3::ONE * 0.5));
        assert_eq!(scene.primitives().count(), 1);
        assert!(scene.node(child).cached_bounds().is_some());

        assert!(Scene::new(SceneGraph::new(), NodeId(0)).is_err());
    }
}
