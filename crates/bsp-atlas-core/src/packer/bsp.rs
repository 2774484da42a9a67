//! Binary space partition packer (lightmap-style node splitting).
//!
//! The canvas is a tree of rectangles. Leaves are either free or hold exactly one
//! padded placement; internal nodes are split in two along one axis. Traversal order
//! at each internal node is chosen by a draw from [`ShiftXorRng`], so one seed fully
//! determines a layout.

use super::Packer;
use crate::model::Rect;
use crate::rng::ShiftXorRng;

/// Draws below this visit the left child first.
const LEFT_FIRST_BELOW: u32 = 0x4000_0000;

/// Index of a node in a [`BspTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    rect: Rect,
    used: bool,
    children: Option<(NodeId, NodeId)>,
}

impl Node {
    fn leaf(rect: Rect) -> Self {
        Self {
            rect,
            used: false,
            children: None,
        }
    }
}

/// Arena-backed BSP tree. Each packing trial owns one and drops it whole.
#[derive(Debug, Clone)]
pub struct BspTree {
    nodes: Vec<Node>,
}

impl BspTree {
    const ROOT: NodeId = NodeId(0);

    pub fn new(root: Rect) -> Self {
        Self {
            nodes: vec![Node::leaf(root)],
        }
    }

    /// Tree over a `width` x `height` atlas. Row 0 and column 0 stay empty so no
    /// placement touches the top/left edge.
    pub fn for_canvas(width: u32, height: u32) -> Self {
        Self::new(Rect::new(
            1,
            1,
            width.saturating_sub(1),
            height.saturating_sub(1),
        ))
    }

    pub fn root_rect(&self) -> Rect {
        self.nodes[Self::ROOT.0].rect
    }

    /// Places a `w` x `h` request (already padded) and returns the leaf it now occupies.
    pub fn insert(&mut self, w: u32, h: u32, rng: &mut ShiftXorRng) -> Option<Rect> {
        self.insert_at(Self::ROOT, w, h, rng)
    }

    fn insert_at(&mut self, id: NodeId, w: u32, h: u32, rng: &mut ShiftXorRng) -> Option<Rect> {
        if let Some((left, right)) = self.nodes[id.0].children {
            let (first, second) = if rng.next_u32() < LEFT_FIRST_BELOW {
                (left, right)
            } else {
                (right, left)
            };
            return self
                .insert_at(first, w, h, rng)
                .or_else(|| self.insert_at(second, w, h, rng));
        }

        let node = &mut self.nodes[id.0];
        if node.used || w > node.rect.w || h > node.rect.h {
            return None;
        }
        node.used = true;
        let r = node.rect;
        let dx = r.w - w;
        let dy = r.h - h;
        if dx == 0 && dy == 0 {
            return Some(r);
        }

        // Split along the axis with more slack; the first child matches the request on
        // that axis and receives it, the second is left for later placements.
        let (a, b) = if dx >= dy {
            (Rect::new(r.x, r.y, w, r.h), Rect::new(r.x + w, r.y, dx, r.h))
        } else {
            (Rect::new(r.x, r.y, r.w, h), Rect::new(r.x, r.y + h, r.w, dy))
        };
        let first = self.push(a);
        let second = self.push(b);
        self.nodes[id.0].children = Some((first, second));
        self.insert_at(first, w, h, rng)
    }

    fn push(&mut self, rect: Rect) -> NodeId {
        self.nodes.push(Node::leaf(rect));
        NodeId(self.nodes.len() - 1)
    }

    /// Sum over free leaves of `area²` (saturating). Split and occupied nodes add nothing,
    /// so a completely filled canvas scores 0.
    pub fn score(&self) -> u64 {
        self.nodes
            .iter()
            .filter(|n| !n.used)
            .map(|n| n.rect.area().saturating_mul(n.rect.area()))
            .fold(0u64, |acc, s| acc.saturating_add(s))
    }

    /// True if some free leaf can take a `w` x `h` request. Consumes no draws.
    pub fn fits(&self, w: u32, h: u32) -> bool {
        self.nodes
            .iter()
            .any(|n| n.children.is_none() && !n.used && w <= n.rect.w && h <= n.rect.h)
    }

    /// Leaf rectangles with their used flag, in arena order.
    pub fn leaves(&self) -> impl Iterator<Item = (Rect, bool)> + '_ {
        self.nodes
            .iter()
            .filter(|n| n.children.is_none())
            .map(|n| (n.rect, n.used))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// One packing trial: a fresh tree plus the generator seeded for it.
///
/// Requests are the sprite's trimmed size; a 1px gutter is added on the right and
/// bottom before insertion and the returned rectangle is the unpadded sprite area.
#[derive(Debug, Clone)]
pub struct BspPacker {
    tree: BspTree,
    rng: ShiftXorRng,
}

impl BspPacker {
    pub const GUTTER: u32 = 1;

    pub fn new(width: u32, height: u32, seed: u32) -> Self {
        Self {
            tree: BspTree::for_canvas(width, height),
            rng: ShiftXorRng::new(seed),
        }
    }

    pub fn score(&self) -> u64 {
        self.tree.score()
    }

    pub fn tree(&self) -> &BspTree {
        &self.tree
    }
}

impl Packer for BspPacker {
    fn can_pack(&self, w: u32, h: u32) -> bool {
        self.tree
            .fits(w.saturating_add(Self::GUTTER), h.saturating_add(Self::GUTTER))
    }

    fn pack(&mut self, w: u32, h: u32) -> Option<Rect> {
        let leaf = self.tree.insert(
            w.saturating_add(Self::GUTTER),
            h.saturating_add(Self::GUTTER),
            &mut self.rng,
        )?;
        Some(Rect::new(leaf.x, leaf.y, w, h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves_tile_root(tree: &BspTree) -> bool {
        let leaves: Vec<Rect> = tree.leaves().map(|(r, _)| r).collect();
        let root = tree.root_rect();
        let area: u64 = leaves.iter().map(|r| r.area()).sum();
        if area != root.area() {
            return false;
        }
        for (i, a) in leaves.iter().enumerate() {
            if !root.contains(a) {
                return false;
            }
            for b in &leaves[i + 1..] {
                if a.intersects(b) {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn split_prefers_x_on_ties() {
        let mut tree = BspTree::new(Rect::new(0, 0, 10, 10));
        let mut rng = ShiftXorRng::new(0);
        let r = tree.insert(4, 4, &mut rng).expect("fits");
        assert_eq!(r, Rect::new(0, 0, 4, 4));
        // X split first (4x10 | 6x10), then the 4x10 column is split along Y.
        let leaves: Vec<Rect> = tree.leaves().map(|(r, _)| r).collect();
        assert!(leaves.contains(&Rect::new(4, 0, 6, 10)));
        assert!(leaves.contains(&Rect::new(0, 4, 4, 6)));
        assert!(leaves_tile_root(&tree));
    }

    #[test]
    fn split_along_larger_slack() {
        let mut tree = BspTree::new(Rect::new(0, 0, 10, 20));
        let mut rng = ShiftXorRng::new(0);
        tree.insert(10, 5, &mut rng).expect("fits");
        let leaves: Vec<(Rect, bool)> = tree.leaves().collect();
        assert_eq!(
            leaves,
            vec![(Rect::new(0, 0, 10, 5), true), (Rect::new(0, 5, 10, 15), false)]
        );
    }

    #[test]
    fn exact_fit_does_not_split() {
        let mut tree = BspTree::new(Rect::new(1, 1, 8, 8));
        let mut rng = ShiftXorRng::new(3);
        assert_eq!(tree.insert(8, 8, &mut rng), Some(Rect::new(1, 1, 8, 8)));
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.score(), 0);
        assert_eq!(tree.insert(1, 1, &mut rng), None);
    }

    #[test]
    fn leaves_keep_tiling_under_random_inserts() {
        let mut tree = BspTree::new(Rect::new(1, 1, 255, 255));
        let mut rng = ShiftXorRng::new(17);
        let mut sizes = ShiftXorRng::new(99);
        for _ in 0..200 {
            let w = sizes.next_u32() % 40 + 1;
            let h = sizes.next_u32() % 40 + 1;
            let _ = tree.insert(w, h, &mut rng);
            assert!(leaves_tile_root(&tree));
        }
    }

    #[test]
    fn score_counts_free_leaves_squared() {
        let mut tree = BspTree::new(Rect::new(0, 0, 10, 10));
        assert_eq!(tree.score(), 100 * 100);
        let mut rng = ShiftXorRng::new(0);
        tree.insert(10, 4, &mut rng).expect("fits");
        assert_eq!(tree.score(), 60 * 60);
    }

    #[test]
    fn packer_adds_gutter() {
        let mut p = BspPacker::new(10, 10, 0);
        // 9x9 interior: an 8x8 sprite plus its gutter is an exact fit.
        assert!(p.can_pack(8, 8));
        assert!(!p.can_pack(9, 8));
        assert_eq!(p.pack(8, 8), Some(Rect::new(1, 1, 8, 8)));
        assert_eq!(p.score(), 0);
        assert!(!p.can_pack(1, 1));
    }
}
