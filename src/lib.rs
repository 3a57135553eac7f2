pub mod assets;
pub mod camera;
pub mod cli;
pub mod context;
pub mod core;
pub mod demos;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod lights;
pub mod material;
pub mod panel;
pub mod params;
pub mod renderer;
pub mod scene;

pub use context::{SceneContext, Viewport};
pub use demos::DemoKind;
pub use error::{Result, SceneError};
pub use params::{ParamChange, ParamClass, ParamStore, ParamValue};
pub use scene::{GeometryHandle, GeometryHeap, Scene};
