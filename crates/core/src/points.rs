//! Draggable measurement points
//!
//! Four named points exist for the whole session. They are never removed,
//! only repositioned through [`PointCommand`]s, and they may leave the
//! visible viewport.

use crate::geometry::{ScreenPoint, Viewport};
use serde::{Deserialize, Serialize};

/// Name of one of the four measurement points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PointId {
    /// Shared origin of every axis
    P1,
    /// Width endpoint
    P2,
    /// Depth endpoint
    P3,
    /// Height endpoint
    P4,
}

impl PointId {
    /// All points in order
    pub const ALL: [PointId; 4] = [PointId::P1, PointId::P2, PointId::P3, PointId::P4];

    fn index(self) -> usize {
        match self {
            PointId::P1 => 0,
            PointId::P2 => 1,
            PointId::P3 => 2,
            PointId::P4 => 3,
        }
    }
}

/// One atomic mutation of the point store
///
/// Drag gestures arrive as a stream of small `Move` deltas; auto-scan
/// snapping uses `Set`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointCommand {
    /// Translate a point by a screen-space delta
    Move { id: PointId, dx: f64, dy: f64 },
    /// Place a point at an absolute position
    Set { id: PointId, x: f64, y: f64 },
}

impl PointCommand {
    /// The point this command mutates
    pub fn target(&self) -> PointId {
        match *self {
            PointCommand::Move { id, .. } | PointCommand::Set { id, .. } => id,
        }
    }
}

/// Storage for the four measurement points
#[derive(Debug, Clone, PartialEq)]
pub struct PointStore {
    points: [ScreenPoint; 4],
}

impl PointStore {
    /// Create a store from explicit positions (P1..P4)
    pub fn new(points: [ScreenPoint; 4]) -> Self {
        Self { points }
    }

    /// Create a store with the default layout for a viewport
    pub fn with_viewport(viewport: Viewport) -> Self {
        let mut store = Self::new([ScreenPoint::default(); 4]);
        store.layout(viewport);
        store
    }

    /// Reset positions to the default layout for a viewport
    ///
    /// P1 and P2 sit on a horizontal line at 40% height, P3 below P1 and P4
    /// above it.
    pub fn layout(&mut self, viewport: Viewport) {
        self.points = [
            viewport.at_fraction(0.3, 0.4),
            viewport.at_fraction(0.7, 0.4),
            viewport.at_fraction(0.3, 0.6),
            viewport.at_fraction(0.3, 0.2),
        ];
    }

    /// Current position of a point
    pub fn point(&self, id: PointId) -> ScreenPoint {
        self.points[id.index()]
    }

    /// Translate a point, returning its new position
    pub fn move_point(&mut self, id: PointId, dx: f64, dy: f64) -> ScreenPoint {
        let slot = &mut self.points[id.index()];
        *slot = slot.translated(dx, dy);
        *slot
    }

    /// Place a point at an absolute position, returning it
    pub fn set_point(&mut self, id: PointId, x: f64, y: f64) -> ScreenPoint {
        let slot = &mut self.points[id.index()];
        *slot = ScreenPoint::new(x, y);
        *slot
    }

    /// Apply a command, returning the mutated point's new position
    pub fn apply(&mut self, command: PointCommand) -> ScreenPoint {
        match command {
            PointCommand::Move { id, dx, dy } => self.move_point(id, dx, dy),
            PointCommand::Set { id, x, y } => self.set_point(id, x, y),
        }
    }

    /// Pixel distance between two points
    pub fn distance(&self, a: PointId, b: PointId) -> f64 {
        self.point(a).distance_to(&self.point(b))
    }

    /// Iterate over all points in order
    pub fn iter(&self) -> impl Iterator<Item = (PointId, ScreenPoint)> + '_ {
        PointId::ALL.into_iter().map(move |id| (id, self.point(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let store = PointStore::with_viewport(Viewport::new(1000.0, 1000.0));
        assert_eq!(store.point(PointId::P1), ScreenPoint::new(300.0, 400.0));
        assert_eq!(store.point(PointId::P2), ScreenPoint::new(700.0, 400.0));
        assert_eq!(store.point(PointId::P3), ScreenPoint::new(300.0, 600.0));
        assert_eq!(store.point(PointId::P4), ScreenPoint::new(300.0, 200.0));
        assert_eq!(store.distance(PointId::P1, PointId::P2), 400.0);
    }

    #[test]
    fn test_move_accumulates_deltas() {
        let mut store = PointStore::new([ScreenPoint::default(); 4]);
        store.move_point(PointId::P2, 10.0, 0.0);
        store.move_point(PointId::P2, 5.0, -3.0);
        assert_eq!(store.point(PointId::P2), ScreenPoint::new(15.0, -3.0));
        assert_eq!(store.point(PointId::P1), ScreenPoint::default());
    }

    #[test]
    fn test_no_clamping() {
        let mut store = PointStore::with_viewport(Viewport::new(100.0, 100.0));
        let p = store.apply(PointCommand::Set {
            id: PointId::P3,
            x: -500.0,
            y: 10_000.0,
        });
        assert_eq!(p, ScreenPoint::new(-500.0, 10_000.0));
    }

    #[test]
    fn test_command_target() {
        let command = PointCommand::Move {
            id: PointId::P4,
            dx: 1.0,
            dy: 1.0,
        };
        assert_eq!(command.target(), PointId::P4);
    }

    #[test]
    fn test_iter_in_order() {
        let store = PointStore::with_viewport(Viewport::new(1000.0, 1000.0));
        let ids: Vec<PointId> = store.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, PointId::ALL);
        assert_eq!(
            store.iter().nth(3),
            Some((PointId::P4, ScreenPoint::new(300.0, 200.0)))
        );
    }
}
