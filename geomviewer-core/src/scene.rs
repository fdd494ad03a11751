//! Scene nodes and the scene graph

use crate::mesh::{Aabb, TriangleMesh};
use serde::{Deserialize, Serialize};

/// Edge color applied whenever edge display is toggled on
pub const EDGE_COLOR: [f32; 3] = [0.0, 0.0, 0.5019];

/// Per-node display properties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderProps {
    pub edge_visibility: bool,
    pub edge_color: [f32; 3],
}

impl Default for RenderProps {
    fn default() -> Self {
        Self {
            edge_visibility: false,
            edge_color: EDGE_COLOR,
        }
    }
}

/// One loaded, renderable piece of geometry plus its display properties
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub mesh: TriangleMesh,
    pub props: RenderProps,
}

impl SceneNode {
    /// Wrap a renderable mesh with default display properties
    pub fn new(mesh: TriangleMesh) -> Self {
        Self {
            mesh,
            props: RenderProps::default(),
        }
    }
}

/// An ordered, insert-only collection of scene nodes
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    /// Create a new empty scene graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node; nodes live until the session is torn down
    pub fn add(&mut self, node: SceneNode) {
        self.nodes.push(node);
    }

    /// Number of nodes in the graph
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over the nodes
    pub fn iter(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter()
    }

    /// Iterate mutably over the nodes
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SceneNode> {
        self.nodes.iter_mut()
    }

    /// Union bounds of all node meshes, `None` when nothing is loaded
    pub fn bounds(&self) -> Option<Aabb> {
        self.nodes
            .iter()
            .filter_map(|node| node.mesh.bounds())
            .reduce(Aabb::union)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Point3f;

    fn triangle_at(offset: f32) -> TriangleMesh {
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(offset, 0.0, 0.0),
                Point3f::new(offset + 1.0, 0.0, 0.0),
                Point3f::new(offset, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn test_default_props() {
        let node = SceneNode::new(triangle_at(0.0));
        assert!(!node.props.edge_visibility);
        assert_eq!(node.props.edge_color, EDGE_COLOR);
    }

    #[test]
    fn test_graph_bounds_union() {
        let mut graph = SceneGraph::new();
        assert!(graph.bounds().is_none());

        graph.add(SceneNode::new(triangle_at(0.0)));
        graph.add(SceneNode::new(triangle_at(5.0)));
        let bounds = graph.bounds().unwrap();
        assert_eq!(bounds.min.x, 0.0);
        assert_eq!(bounds.max.x, 6.0);
    }
}
