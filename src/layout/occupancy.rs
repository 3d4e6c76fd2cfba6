use std::collections::HashMap;

use crate::model::{Envelope, Rect, UnitKind, Wall};

// Buckets per envelope axis; the cell grows on large floors so one commit
// touches a bounded number of buckets.
const MAX_CELLS_PER_AXIS: f32 = 256.0;

/// Claimed floor area for one generation run.
///
/// Rectangles are stored exactly; a uniform bucket grid narrows every query
/// to the rectangles near the candidate, so overlap tests stay exact while
/// placement checks cost roughly constant time on large floors.
#[derive(Debug)]
pub struct OccupancyIndex {
    envelope: Envelope,
    eps: f32,
    cell: f32,
    claimed: Vec<(Rect, UnitKind)>,
    buckets: HashMap<(i32, i32), Vec<usize>>,
}

impl OccupancyIndex {
    pub fn new(envelope: Envelope, eps: f32, cell: f32) -> Self {
        let requested = if cell.is_finite() && cell > 0.0 { cell } else { 1.0 };
        let floor_span = envelope.width.max(envelope.height);
        let cell = if floor_span.is_finite() {
            requested.max(floor_span / MAX_CELLS_PER_AXIS)
        } else {
            requested
        };
        Self {
            envelope,
            eps,
            cell,
            claimed: Vec::new(),
            buckets: HashMap::new(),
        }
    }

    pub fn envelope(&self) -> Envelope {
        self.envelope
    }

    pub fn epsilon(&self) -> f32 {
        self.eps
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }

    /// True iff `rect` lies inside the envelope and shares no area with any
    /// committed rectangle. Touching edges is allowed.
    pub fn can_place(&self, rect: &Rect) -> bool {
        if rect.width <= 0.0 || rect.height <= 0.0 || !rect.within(&self.envelope, self.eps) {
            return false;
        }
        !self
            .nearby(rect)
            .any(|idx| self.claimed[idx].0.overlaps(rect, self.eps))
    }

    /// True iff some side of `rect` lies on the envelope edge or against one
    /// of `corridors`.
    pub fn touches_boundary_or_corridor(&self, rect: &Rect, corridors: &[Rect]) -> bool {
        Wall::ALL.into_iter().any(|wall| {
            rect.wall_on_boundary(wall, &self.envelope, self.eps)
                || corridors
                    .iter()
                    .any(|corridor| rect.shares_edge(wall, corridor, self.eps))
        })
    }

    /// True iff the `wall` side of `rect` rests against a committed unit of `kind`.
    pub fn wall_touches_kind(&self, rect: &Rect, wall: Wall, kind: UnitKind) -> bool {
        self.nearby(rect).any(|idx| {
            let (other, other_kind) = &self.claimed[idx];
            *other_kind == kind && rect.shares_edge(wall, other, self.eps)
        })
    }

    /// Records `rect` as occupied for the rest of the run.
    pub fn commit(&mut self, rect: Rect, kind: UnitKind) {
        let idx = self.claimed.len();
        self.claimed.push((rect, kind));
        let (x0, y0, x1, y1) = self.cell_span(&rect);
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                self.buckets.entry((cx, cy)).or_default().push(idx);
            }
        }
    }

    fn cell_span(&self, rect: &Rect) -> (i32, i32, i32, i32) {
        // Padded by eps so neighbours that only touch land in a shared bucket,
        // and clamped to the envelope grid plus one ring.
        let limit = MAX_CELLS_PER_AXIS as i32 + 1;
        let cell = |v: f32| ((v / self.cell).floor() as i32).clamp(-1, limit);
        (
            cell(rect.x - self.eps),
            cell(rect.y - self.eps),
            cell(rect.right() + self.eps),
            cell(rect.top() + self.eps),
        )
    }

    fn nearby(&self, rect: &Rect) -> impl Iterator<Item = usize> + '_ {
        let (x0, y0, x1, y1) = self.cell_span(rect);
        let mut seen: Vec<usize> = Vec::new();
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                if let Some(indices) = self.buckets.get(&(cx, cy)) {
                    seen.extend_from_slice(indices);
                }
            }
        }
        seen.sort_unstable();
        seen.dedup();
        seen.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> OccupancyIndex {
        OccupancyIndex::new(Envelope::new(30.0, 20.0), 0.01, 4.0)
    }

    #[test]
    fn rejects_outside_envelope() {
        let idx = index();
        assert!(idx.can_place(&Rect::new(0.0, 0.0, 30.0, 20.0)));
        assert!(!idx.can_place(&Rect::new(-1.0, 0.0, 3.0, 5.0)));
        assert!(!idx.can_place(&Rect::new(28.0, 16.0, 3.0, 5.0)));
        assert!(!idx.can_place(&Rect::new(1.0, 1.0, 0.0, 5.0)));
    }

    #[test]
    fn touching_is_allowed_overlap_is_not() {
        let mut idx = index();
        idx.commit(Rect::new(0.0, 9.0, 30.0, 2.0), UnitKind::Corridor);
        assert!(idx.can_place(&Rect::new(0.0, 4.0, 3.0, 5.0)));
        assert!(idx.can_place(&Rect::new(0.0, 11.0, 3.0, 5.0)));
        assert!(!idx.can_place(&Rect::new(0.0, 5.0, 3.0, 5.0)));
        // within epsilon of touching still counts as touching
        assert!(idx.can_place(&Rect::new(0.0, 4.005, 3.0, 5.0)));
    }

    #[test]
    fn large_rectangles_are_found_from_any_bucket() {
        let mut idx = index();
        idx.commit(Rect::new(0.0, 0.0, 30.0, 20.0), UnitKind::Lobby);
        assert!(!idx.can_place(&Rect::new(25.0, 15.0, 1.0, 1.0)));
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn huge_floor_commits_touch_bounded_buckets() {
        let mut idx = OccupancyIndex::new(Envelope::new(1e9, 1e9), 0.01, 4.0);
        idx.commit(Rect::new(0.0, 5e8, 1e9, 1e6), UnitKind::Corridor);
        assert!(idx.buckets.len() <= 2 * (MAX_CELLS_PER_AXIS as usize + 3));
        assert!(!idx.can_place(&Rect::new(7.5e8, 5.001e8, 1e3, 1e3)));
        assert!(idx.can_place(&Rect::new(7.5e8, 4e8, 1e3, 1e3)));
    }

    #[test]
    fn boundary_or_corridor_contact() {
        let idx = index();
        let corridor = Rect::new(0.0, 9.0, 30.0, 2.0);
        assert!(idx.touches_boundary_or_corridor(&Rect::new(5.0, 4.0, 3.0, 5.0), &[corridor]));
        assert!(idx.touches_boundary_or_corridor(&Rect::new(0.0, 2.0, 3.0, 5.0), &[]));
        assert!(!idx.touches_boundary_or_corridor(&Rect::new(5.0, 2.0, 3.0, 5.0), &[corridor]));
    }

    #[test]
    fn wall_contact_by_kind() {
        let mut idx = index();
        idx.commit(Rect::new(3.0, 4.0, 3.0, 5.0), UnitKind::Room);
        idx.commit(Rect::new(0.0, 9.0, 30.0, 2.0), UnitKind::Corridor);
        let candidate = Rect::new(0.0, 4.0, 3.0, 5.0);
        assert!(idx.wall_touches_kind(&candidate, Wall::Right, UnitKind::Room));
        assert!(!idx.wall_touches_kind(&candidate, Wall::Left, UnitKind::Room));
        assert!(idx.wall_touches_kind(&candidate, Wall::Top, UnitKind::Corridor));
    }
}
