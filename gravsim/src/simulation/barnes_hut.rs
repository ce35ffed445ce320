//! # Barnes–Hut Quadtree (2D)
//!
//! This module implements a **2D Barnes–Hut quadtree** for approximating
//! gravitational forces in an `N`-body system. The goal is to replace the
//! naive `O(N²)` all-pairs force calculation with an approximate `O(N log N)`
//! method while preserving good accuracy for distant interactions.
//!
//! ## Core Concepts
//!
//! - The root square covers the unit domain, grown to enclose any body that
//!   sits outside it, and is recursively subdivided into 4 quadrants.
//! - Each quadrant becomes a node of the tree.
//! - A node is empty, a leaf holding one body, or internal with children.
//! - Each node stores:
//!   - total mass of its subtree
//!   - center of mass (COM)
//!   - its square bounds (center + half extent)
//!
//! ## Memory layout
//!
//! Nodes live in one `Vec` and refer to their children by index. The tree is
//! rebuilt from scratch every step; [`BarnesHutTree::rebuild`] truncates the
//! vector and keeps its capacity, so steady-state steps do not allocate.
//!
//! ## Quadrant order
//!
//! Screen orientation, y grows downward:
//!
//! ```text
//!  NW (0) | NE (1)
//!  -------+-------
//!  SW (2) | SE (3)
//! ```

use crate::simulation::states::{normalize_or_zero, Body, NVec2, DOMAIN};

pub const NW: usize = 0;
pub const NE: usize = 1;
pub const SW: usize = 2;
pub const SE: usize = 3;

/// Smoothing term of the density probe
pub const DENSITY_EPS: f64 = 1e-4;

/// Offsets of each child's center from its parent's center, in units of the
/// child's half extent, indexed NW, NE, SW, SE.
const QUADRANT_OFFSETS: [(f64, f64); 4] = [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)];

/// A single quadtree node.
///
/// Each node represents a square region of space that may contain:
/// - zero bodies (empty)
/// - exactly one body (leaf node, `body_index = Some(i)`)
/// - multiple bodies (internal node with children)
///
/// A leaf at the depth cap may additionally have absorbed bodies that share
/// its position. `body_index` keeps the first occupant; the others are
/// chained behind it (see [`BarnesHutTree::leaf_bodies`]) and folded into
/// `count`, `mass` and `com`.
#[derive(Debug, Clone)]
pub struct QuadNode {
    pub center: NVec2,
    pub half: f64,
    pub mass: f64,
    pub com: NVec2,
    pub count: usize, // bodies aggregated in this subtree
    pub body_index: Option<usize>, // Some(i) if this leaf holds body i
    pub children: [Option<usize>; 4], // indices into BarnesHutTree::nodes
}

impl QuadNode {
    fn new(center: NVec2, half: f64) -> Self {
        Self {
            center,
            half,
            mass: 0.0,
            com: NVec2::zeros(),
            count: 0,
            body_index: None,
            children: [None; 4],
        }
    }

    /// Edge length of the node's square
    pub fn size(&self) -> f64 {
        2.0 * self.half
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    /// Inclusive containment test; points on a shared edge belong to both
    /// neighbours and are resolved by quadrant order.
    pub fn contains(&self, p: &NVec2) -> bool {
        p.x >= self.center.x - self.half
            && p.x <= self.center.x + self.half
            && p.y >= self.center.y - self.half
            && p.y <= self.center.y + self.half
    }

    fn child_center(&self, quadrant: usize) -> NVec2 {
        let (ox, oy) = QUADRANT_OFFSETS[quadrant];
        let quarter = 0.5 * self.half;
        self.center + NVec2::new(ox * quarter, oy * quarter)
    }

    /// Pick the quadrant a point belongs to.
    ///
    /// The first quadrant (NW, NE, SW, SE) whose inclusive bounds contain the
    /// point wins. Points outside the node altogether fall back to a plain
    /// comparison against the center. The tree sizes its root to enclose
    /// every body, so insertion only takes that path through rounding at a
    /// child edge.
    pub fn quadrant_for(&self, p: &NVec2) -> usize {
        let quarter = 0.5 * self.half;
        for quadrant in [NW, NE, SW, SE] {
            let c = self.child_center(quadrant);
            let inside = p.x >= c.x - quarter
                && p.x <= c.x + quarter
                && p.y >= c.y - quarter
                && p.y <= c.y + quarter;
            if inside {
                return quadrant;
            }
        }

        let mut quadrant = NW;
        if p.x > self.center.x { quadrant |= 1; } // east
        if p.y > self.center.y { quadrant |= 2; } // south
        quadrant
    }
}

/// A complete 2D Barnes–Hut quadtree built over the body registry.
///
/// This structure owns:
/// - a vector of all quadtree nodes (`nodes`)
/// - an index into that list representing the root (`root`)
///
/// It never owns bodies; leaves record the registry index of their occupant.
#[derive(Debug, Clone)]
pub struct BarnesHutTree {
    pub nodes: Vec<QuadNode>,
    pub root: usize,
    members: Vec<LeafMember>, // one per registry index, snapshot of the last build
    max_depth: usize,
    merged: usize,
}

/// Position and mass of a body as it was inserted, plus the next body that
/// shares its depth-capped leaf.
#[derive(Debug, Clone)]
struct LeafMember {
    pos: NVec2,
    mass: f64,
    next: Option<usize>,
}

impl BarnesHutTree {
    /// An empty tree covering the unit domain.
    pub fn new(max_depth: usize) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: 0,
            members: Vec::new(),
            max_depth,
            merged: 0,
        };
        tree.reset(&[]);
        tree
    }

    /// Build a fresh tree over `bodies`.
    pub fn build(bodies: &[Body], max_depth: usize) -> Self {
        let mut tree = Self::new(max_depth);
        tree.rebuild(bodies);
        tree
    }

    /// Discard every node and re-insert `bodies` in registry order.
    ///
    /// Node storage is truncated, not freed, so a tree kept across steps
    /// stops allocating once it has seen its largest body set.
    pub fn rebuild(&mut self, bodies: &[Body]) {
        self.reset(bodies);
        for i in 0..bodies.len() {
            self.insert_body(self.root, i, 0);
        }
    }

    /// Number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[self.root].is_empty()
    }

    pub fn root(&self) -> &QuadNode {
        &self.nodes[self.root]
    }

    /// Bodies that were folded into a depth-capped leaf during the last build
    pub fn merged_bodies(&self) -> usize {
        self.merged
    }

    /// Number of levels below the root
    pub fn depth(&self) -> usize {
        self.depth_from(self.root)
    }

    /// Registry indices held by a leaf: the occupant first, then every body
    /// merged into it at the depth cap, in insertion order.
    pub fn leaf_bodies<'a>(&'a self, node: &QuadNode) -> impl Iterator<Item = usize> + 'a {
        std::iter::successors(node.body_index, move |&i| self.members[i].next)
    }

    /// Barnes–Hut force on body `i`.
    ///
    /// Traverses the tree from the root. A node whose size over softened
    /// distance falls below `theta`, or any leaf, acts as a single point
    /// mass at its center of mass:
    ///
    /// `F = G * M * m / (d'² + softening) * normalize(com - x)`,
    /// with `d' = sqrt(d² + softening²)`.
    ///
    /// Empty nodes contribute nothing. Leaves contribute body by body,
    /// skipping body `i` itself, so bodies merged at the depth cap still
    /// attract each other pairwise. With `theta == 0` every internal node is
    /// opened and the result is the exact pairwise sum.
    ///
    /// # Parameters
    /// - `i`         : Registry index of the body (for self-skip).
    /// - `body`      : The body itself, for position and mass.
    /// - `theta`     : Opening threshold.
    /// - `G`         : Gravitational constant.
    /// - `softening` : Softening length.
    #[allow(non_snake_case)]
    pub fn approximate_force(&self, i: usize, body: &Body, theta: f64, G: f64, softening: f64) -> NVec2 {
        self.approximate_force_counted(i, body, theta, G, softening).0
    }

    /// Same as [`BarnesHutTree::approximate_force`], also returning how many
    /// nodes the traversal visited.
    #[allow(non_snake_case)]
    pub fn approximate_force_counted(&self, i: usize, body: &Body, theta: f64, G: f64, softening: f64) -> (NVec2, usize) {
        let mut probe = ForceProbe {
            index: i,
            pos: body.x,
            mass: body.m,
            theta,
            G,
            softening,
            acc: NVec2::zeros(),
            visited: 0,
        };
        self.traverse_force(self.root, &mut probe);
        (probe.acc, probe.visited)
    }

    /// Diagnostic density around body `i`.
    ///
    /// Same recursion shape as the force query, except a node is accepted
    /// when its center of mass lies within `radius` of the body, and it
    /// contributes `M / (d² + DENSITY_EPS)` with no direction. Leaves always
    /// contribute, member by member, without the body itself.
    pub fn accumulate_density(&self, i: usize, body: &Body, radius: f64) -> f64 {
        let mut density = 0.0;
        self.traverse_density(self.root, i, body.x, radius, &mut density);
        density
    }

    // helpers ==============================================================================

    fn reset(&mut self, bodies: &[Body]) {
        let (center, half) = bounding_square(bodies);
        self.nodes.clear();
        self.nodes.push(QuadNode::new(center, half));
        self.root = 0;
        self.merged = 0;

        self.members.clear();
        self.members.extend(bodies.iter().map(|b| LeafMember { pos: b.x, mass: b.m, next: None }));
    }

    /// Insert a single body below `node_idx`.
    ///
    /// - An empty node becomes a leaf that stores the body.
    /// - A leaf below the depth cap pushes its occupant down into a child
    ///   and turns internal; the new body then follows.
    /// - A leaf at the depth cap absorbs the body into its aggregate.
    /// - An internal node forwards the body to the matching child and then
    ///   recomputes its mass and center of mass from its children.
    ///
    /// Positions and masses come from the member snapshot taken in
    /// `reset`, so insertion never has to look back into the registry.
    fn insert_body(&mut self, node_idx: usize, body_idx: usize, depth: usize) {
        let (pos, mass) = (self.members[body_idx].pos, self.members[body_idx].mass);
        let node = &self.nodes[node_idx];

        // Case 1: empty -> just store body here
        if node.is_empty() {
            let node = &mut self.nodes[node_idx];
            node.body_index = Some(body_idx);
            node.mass = mass;
            node.com = pos;
            node.count = 1;
            return;
        }

        if node.is_leaf() {
            // Case 2: occupied leaf at the cap -> merge, stop recursing
            if depth >= self.max_depth {
                if let Some(head) = node.body_index {
                    self.members[body_idx].next = self.members[head].next.replace(body_idx);
                }
                let node = &mut self.nodes[node_idx];
                let total = node.mass + mass;
                node.com = (node.com * node.mass + pos * mass) / total;
                node.mass = total;
                node.count += 1;
                self.merged += 1;
                return;
            }

            // Case 3: occupied leaf -> push the occupant down one level
            if let Some(existing_idx) = self.nodes[node_idx].body_index.take() {
                let existing_pos = self.members[existing_idx].pos;
                let child = self.child_for(node_idx, &existing_pos);
                self.insert_body(child, existing_idx, depth + 1);
            }
        }

        // Case 4: internal (or just became internal) -> descend
        let child = self.child_for(node_idx, &pos);
        self.insert_body(child, body_idx, depth + 1);
        self.aggregate(node_idx);
    }

    /// Index of the child that `pos` routes to, creating it on first use.
    fn child_for(&mut self, node_idx: usize, pos: &NVec2) -> usize {
        let quadrant = self.nodes[node_idx].quadrant_for(pos);
        match self.nodes[node_idx].children[quadrant] {
            Some(idx) => idx,
            None => {
                let parent = &self.nodes[node_idx];
                let child = QuadNode::new(parent.child_center(quadrant), 0.5 * parent.half);
                let new_idx = self.nodes.len();
                self.nodes.push(child);
                self.nodes[node_idx].children[quadrant] = Some(new_idx);
                new_idx
            }
        }
    }

    /// Recompute mass, center of mass and count of `node_idx` from its
    /// children. Called on the way back up from every insertion.
    fn aggregate(&mut self, node_idx: usize) {
        let mut mass = 0.0;
        let mut weighted = NVec2::zeros();
        let mut count = 0;

        for child in self.nodes[node_idx].children.iter().flatten() {
            let cn = &self.nodes[*child];
            mass += cn.mass;
            weighted += cn.com * cn.mass;
            count += cn.count;
        }

        let node = &mut self.nodes[node_idx];
        node.mass = mass;
        node.com = if mass > 0.0 { weighted / mass } else { NVec2::zeros() };
        node.count = count;
    }

    fn depth_from(&self, node_idx: usize) -> usize {
        self.nodes[node_idx]
            .children
            .iter()
            .flatten()
            .map(|&c| 1 + self.depth_from(c))
            .max()
            .unwrap_or(0)
    }

    /// Recursively accumulate the force on `probe` from the subtree at
    /// `node_idx`.
    ///
    /// - **Empty node**: no contribution.
    /// - **Leaf**: one point-mass interaction per member body other than the
    ///   querying one.
    /// - **size / d' < theta**: one point-mass interaction with the node's
    ///   aggregate.
    /// - **Otherwise**: descend into every existing child.
    fn traverse_force(&self, node_idx: usize, probe: &mut ForceProbe) {
        let node = &self.nodes[node_idx];
        probe.visited += 1;

        if node.mass == 0.0 {
            return;
        }

        if node.is_leaf() {
            let self_index = probe.index;
            for j in self.leaf_bodies(node).filter(|&j| j != self_index) {
                let member = &self.members[j];
                probe.attract(member.pos, member.mass);
            }
            return;
        }

        let d_soft = ((node.com - probe.pos).norm_squared() + probe.softening * probe.softening).sqrt();
        if node.size() / d_soft < probe.theta {
            probe.attract(node.com, node.mass);
        } else {
            for child in node.children.iter().flatten() {
                self.traverse_force(*child, probe);
            }
        }
    }

    fn traverse_density(&self, node_idx: usize, body_idx: usize, pos: NVec2, radius: f64, density: &mut f64) {
        let node = &self.nodes[node_idx];

        if node.mass == 0.0 {
            return;
        }

        if node.is_leaf() {
            for j in self.leaf_bodies(node).filter(|&j| j != body_idx) {
                let member = &self.members[j];
                *density += member.mass / ((member.pos - pos).norm_squared() + DENSITY_EPS);
            }
            return;
        }

        let distance = (node.com - pos).norm();
        if distance <= radius {
            *density += node.mass / (distance * distance + DENSITY_EPS);
        } else {
            for child in node.children.iter().flatten() {
                self.traverse_density(*child, body_idx, pos, radius, density);
            }
        }
    }
}

/// Per-query state threaded through the force traversal
#[allow(non_snake_case)]
struct ForceProbe {
    index: usize,
    pos: NVec2,
    mass: f64,
    theta: f64,
    G: f64,
    softening: f64,
    acc: NVec2,
    visited: usize,
}

impl ForceProbe {
    /// Add the softened pull of a point mass at `at`. A zero direction (the
    /// body sitting exactly on it) contributes nothing.
    fn attract(&mut self, at: NVec2, mass: f64) {
        let r = at - self.pos;
        let dir = normalize_or_zero(&r);
        if dir == NVec2::zeros() {
            return;
        }
        let d2_soft = r.norm_squared() + self.softening * self.softening;
        self.acc += dir * (self.G * mass * self.mass / (d2_soft + self.softening));
    }
}

/// Smallest square around the unit domain that also encloses every body,
/// as `(center, half extent)`. Bodies inside the domain leave it at the
/// unit square.
fn bounding_square(bodies: &[Body]) -> (NVec2, f64) {
    let mut lo = NVec2::zeros();
    let mut hi = NVec2::new(DOMAIN, DOMAIN);
    for b in bodies {
        lo = lo.inf(&b.x);
        hi = hi.sup(&b.x);
    }
    (0.5 * (lo + hi), 0.5 * (hi - lo).max())
}
