pub mod frame;
pub mod mask;
pub mod point;
pub mod region;
pub mod symbol;

pub use frame::{Color, Frame, PixelFormat};
pub use mask::BinaryMask;
pub use point::{Point, PointI};
pub use region::{AxisRect, CandidateRegion};
pub use symbol::{DecodedSymbol, SymbolData, SymbolKind};
