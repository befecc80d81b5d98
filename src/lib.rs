#![forbid(unsafe_code)]

pub mod assets;
pub mod capability;
pub mod config;
pub mod foundation;
pub mod jobs;
pub mod overrides;
pub mod render;
pub mod session;
pub mod sprite;
pub mod text;

pub use assets::locator::{AssetLocator, AssetQuery, AssetSet, CharacterImage};
pub use capability::Capabilities;
pub use config::load::{LoadedEvent, load_current_event};
pub use foundation::color::Rgba8;
pub use foundation::core::{CanvasGeometry, Side};
pub use foundation::error::{ThumbError, ThumbResult};
pub use jobs::{RenderJob, run_batch, run_job};
pub use overrides::cascade::{OverrideSet, ResolvedOverride};
pub use render::composite::Canvas;
pub use render::compositor::{EventContext, RenderReport, Thumbnail, ThumbnailRequest, render_thumbnail};
pub use session::editor::{EditorSession, PageState, SideValues};
pub use sprite::outline::OutlineConfig;
pub use text::engine::TextEngine;
