//! Boundary tags for mesh faces.
//!
//! Each boundary face carries a tag that selects the boundary condition
//! applied by the face layer.

/// Tag identifying the type of a boundary face.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BoundaryTag {
    /// Inviscid slip wall (mirrored normal velocity)
    #[default]
    SlipWall,

    /// Far field held at the configured free-stream state
    Farfield,

    /// Outflow copying the interior state
    Extrapolate,

    /// Periodic boundary paired with the opposite side of the same group
    Periodic(u32),

    /// Overset fringe receiving data from another grid
    Overset,

    /// Custom tag for user-defined boundary conditions
    Custom(u32),
}

impl BoundaryTag {
    /// Check if this is a periodic boundary.
    pub fn is_periodic(&self) -> bool {
        matches!(self, BoundaryTag::Periodic(_))
    }

    /// Check if this is a solid wall.
    pub fn is_wall(&self) -> bool {
        matches!(self, BoundaryTag::SlipWall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_tag_equality() {
        assert_eq!(BoundaryTag::SlipWall, BoundaryTag::SlipWall);
        assert_ne!(BoundaryTag::SlipWall, BoundaryTag::Farfield);
        assert_eq!(BoundaryTag::Periodic(1), BoundaryTag::Periodic(1));
        assert_ne!(BoundaryTag::Periodic(1), BoundaryTag::Periodic(2));
    }

    #[test]
    fn test_is_periodic() {
        assert!(BoundaryTag::Periodic(0).is_periodic());
        assert!(!BoundaryTag::SlipWall.is_periodic());
        assert!(!BoundaryTag::Farfield.is_periodic());
    }

    #[test]
    fn test_is_wall() {
        assert!(BoundaryTag::SlipWall.is_wall());
        assert!(!BoundaryTag::Extrapolate.is_wall());
        assert!(!BoundaryTag::Periodic(0).is_wall());
    }
}
