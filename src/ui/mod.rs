pub mod controls;
pub mod gamepad;
pub mod input;
pub mod renderer;
pub mod sound;

use std::io;
use std::time::Instant;

use crate::sim::session::Session;

/// Which panel covers the side bar.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Overlay {
    None,
    Help,
    Progress,
}

/// What a display sink may look at for one frame. Read-only.
pub struct SceneView<'a> {
    pub session: &'a Session,
    pub now: Instant,
    pub overlay: Overlay,
    pub link_status: &'a str,
}

/// Display sink for the climbing scene. The core never reads anything back.
pub trait Renderable {
    fn render(&mut self, scene: &SceneView) -> io::Result<()>;
    fn on_resize(&mut self, width: u16, height: u16);
}
