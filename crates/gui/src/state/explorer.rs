//! Page-level UI state: selected bone, chat visibility, navigation menu and
//! pending scroll requests.

use shared::BoneId;

/// Sections the navigation can scroll to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Hero,
    Explorer,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplorerState {
    pub selected_bone: BoneId,
    pub chat_visible: bool,
    pub menu_open: bool,
    pub scroll_target: Option<Section>,
}

impl ExplorerState {
    /// Returns true if the selection changed
    pub fn select_bone(&mut self, bone: BoneId) -> bool {
        if self.selected_bone == bone {
            return false;
        }
        tracing::debug!("Selected bone {bone}");
        self.selected_bone = bone;
        true
    }

    pub fn open_chat(&mut self) {
        self.chat_visible = true;
    }

    pub fn close_chat(&mut self) {
        self.chat_visible = false;
    }

    pub fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
    }

    pub fn close_menu(&mut self) {
        self.menu_open = false;
    }

    /// Ask the page to bring `section` into view; also closes the menu
    pub fn request_scroll(&mut self, section: Section) {
        self.scroll_target = Some(section);
        self.menu_open = false;
    }

    /// Consume the pending scroll request
    pub fn take_scroll(&mut self) -> Option<Section> {
        self.scroll_target.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = ExplorerState::default();
        assert_eq!(s.selected_bone, BoneId::Frontal);
        assert!(!s.chat_visible);
        assert!(!s.menu_open);
        assert_eq!(s.scroll_target, None);
    }

    #[test]
    fn test_select_bone_reports_change() {
        let mut s = ExplorerState::default();
        assert!(!s.select_bone(BoneId::Frontal));
        assert!(s.select_bone(BoneId::Mandible));
        assert_eq!(s.selected_bone, BoneId::Mandible);
    }

    #[test]
    fn test_scroll_request_closes_menu_and_is_consumed_once() {
        let mut s = ExplorerState::default();
        s.toggle_menu();
        assert!(s.menu_open);
        s.request_scroll(Section::Explorer);
        assert!(!s.menu_open);
        assert_eq!(s.take_scroll(), Some(Section::Explorer));
        assert_eq!(s.take_scroll(), None);
    }

    #[test]
    fn test_chat_visibility() {
        let mut s = ExplorerState::default();
        s.open_chat();
        assert!(s.chat_visible);
        s.close_chat();
        assert!(!s.chat_visible);
    }
}
