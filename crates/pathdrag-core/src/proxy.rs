//! Coordinate accessor used while a drag is in flight.
//!
//! Instead of swapping the shape's accessor out, the drag controller keeps
//! a view mode. In preview mode a read reprojects the session snapshot
//! through the current screen transform and hands back a fresh structure;
//! otherwise it returns the stored coordinates.

use crate::reproject::{ProjectionContext, reproject};
use crate::session::DragSession;
use crate::shape::{Coordinates, Path};

/// Which coordinates a read returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accessor {
    /// The shape's committed coordinates.
    #[default]
    Stored,
    /// Live preview of the drag in progress.
    Preview,
}

/// Switches coordinate reads between stored and preview mode.
#[derive(Debug, Clone, Default)]
pub struct CoordinateProxy {
    accessor: Accessor,
}

impl CoordinateProxy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route reads through the drag preview. Returns false when already
    /// installed.
    pub fn install(&mut self) -> bool {
        let installed = self.accessor == Accessor::Stored;
        self.accessor = Accessor::Preview;
        installed
    }

    /// Restore reads of stored coordinates. No-op when not installed.
    pub fn uninstall(&mut self) -> bool {
        let removed = self.accessor == Accessor::Preview;
        self.accessor = Accessor::Stored;
        removed
    }

    pub fn is_installed(&self) -> bool {
        self.accessor == Accessor::Preview
    }

    pub fn accessor(&self) -> Accessor {
        self.accessor
    }

    /// Read the shape's coordinates through the current accessor.
    ///
    /// Falls back to the stored coordinates when no session is active.
    pub fn read(
        &self,
        shape: &Path,
        session: Option<&DragSession>,
        ctx: &ProjectionContext<'_>,
    ) -> Coordinates {
        match (self.accessor, session) {
            (Accessor::Preview, Some(session)) => {
                reproject(session.snapshot(), session.transform(), ctx)
            }
            _ => shape.lat_lngs().clone(),
        }
    }
}
