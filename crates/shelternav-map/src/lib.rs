pub mod animate;
pub mod overlay;
pub mod surface;

pub use animate::AnimatorHandle;
pub use overlay::OverlayManager;
pub use surface::{Facing, MapSurface, MarkerKind, OverlayId, PolylineStyle};
