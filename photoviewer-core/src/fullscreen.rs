/// Host-provided fullscreen capability.
pub trait Fullscreen {
    fn is_supported(&self) -> bool;
    fn request(&self);
    fn exit(&self);
}

/// For hosts without any fullscreen API.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unsupported;

impl Fullscreen for Unsupported {
    fn is_supported(&self) -> bool {
        false
    }
    fn request(&self) {}
    fn exit(&self) {}
}

/// Wraps the capability with a boolean mirror so redundant calls are never
/// made. A missing capability is logged and leaves the mirror untouched.
pub struct FullscreenToggle {
    capability: Box<dyn Fullscreen>,
    active: bool,
}

impl std::fmt::Debug for FullscreenToggle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FullscreenToggle")
            .field("supported", &self.capability.is_supported())
            .field("active", &self.active)
            .finish()
    }
}

impl FullscreenToggle {
    pub fn new(capability: Box<dyn Fullscreen>) -> Self {
        Self { capability, active: false }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn enter(&mut self) {
        if self.active {
            return;
        }
        if !self.capability.is_supported() {
            log::info!("Fullscreen API is not supported.");
            return;
        }
        self.active = true;
        self.capability.request();
    }

    pub fn leave(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if !self.capability.is_supported() {
            log::info!("Fullscreen API is not supported.");
            return;
        }
        self.capability.exit();
    }

    pub fn toggle(&mut self) {
        if self.active {
            self.leave();
        } else {
            self.enter();
        }
    }

    /// Fullscreen changed behind our back (e.g. the browser's own exit key).
    pub fn sync(&mut self, active: bool) {
        self.active = active;
    }
}
