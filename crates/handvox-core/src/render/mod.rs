//! Software render pipeline
//!
//! [`RenderPipeline`] turns the voxel world into screen-space
//! [`DrawablePrimitive`]s sorted back to front. [`Canvas`] rasterizes them:
//! opaque pixels go through the [`ZBuffer`], translucent pixels are blended
//! in emission order.

mod color;
mod pipeline;
mod primitive;
mod raster;
mod zbuffer;

pub use color::{Color, DEFAULT_PALETTE};
pub use pipeline::{project_point, FrameStats, RenderPipeline, RenderSettings};
pub use primitive::{DrawablePrimitive, PrimitiveKind, ScreenPoint};
pub use raster::Canvas;
pub use zbuffer::ZBuffer;
