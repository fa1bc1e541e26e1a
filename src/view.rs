use log::info;

/// Page the view collaborator should make visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewRequest {
    Overview,
    SectorActive,
    Revealed,
    SessionEnd,
}

/// Idempotent visibility switches; nothing is returned to the caller.
pub trait ViewToggle {
    fn show_overview(&mut self);
    fn show_sector_active(&mut self);
    fn show_revealed(&mut self);
    fn show_session_end(&mut self);

    fn apply(&mut self, request: ViewRequest) {
        match request {
            ViewRequest::Overview => self.show_overview(),
            ViewRequest::SectorActive => self.show_sector_active(),
            ViewRequest::Revealed => self.show_revealed(),
            ViewRequest::SessionEnd => self.show_session_end(),
        }
    }
}

/// Which page the HUD currently draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewState {
    visible: ViewRequest,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState { visible: ViewRequest::Overview }
    }
}

impl ViewState {
    pub fn visible(&self) -> ViewRequest {
        self.visible
    }

    fn switch(&mut self, to: ViewRequest) {
        if self.visible != to {
            info!("view: {:?} -> {:?}", self.visible, to);
            self.visible = to;
        }
    }
}

impl ViewToggle for ViewState {
    fn show_overview(&mut self) {
        self.switch(ViewRequest::Overview);
    }

    fn show_sector_active(&mut self) {
        self.switch(ViewRequest::SectorActive);
    }

    fn show_revealed(&mut self) {
        self.switch(ViewRequest::Revealed);
    }

    fn show_session_end(&mut self) {
        self.switch(ViewRequest::SessionEnd);
    }
}

/// Process-wide cosmetic flags toggled from the terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Theme {
    pub quantum: bool,
    pub matrix: bool,
}
