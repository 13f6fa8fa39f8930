/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Bridge between embedded web content and tab records.
//!
//! Inbound, the content surface reports [`ContentEvent`]s for a tab and they
//! become [`TabPatch`]es. Outbound, user navigation produces
//! [`NavigationCommand`]s for the surface to execute.

use log::debug;
use url::Url;

use crate::manager::{WindowAction, WindowManagerState};
use crate::model::{Tab, TabId, TabPatch, WindowId};

/// Chromium's "aborted" load error; reported when a navigation is replaced.
pub const ERR_ABORTED: i32 = -3;

const SEARCH_URL: &str = "https://www.google.com/search?q=";

/// Something the content surface observed for one tab.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentEvent {
    DomReady,
    LoadStart,
    LoadStop,
    Navigate {
        url: String,
        can_go_back: bool,
        can_go_forward: bool,
        is_main_frame: bool,
    },
    TitleUpdated(String),
    FaviconUpdated(Vec<String>),
    LoadFailed {
        is_main_frame: bool,
        error_code: i32,
    },
    /// The page asked for a new window. It opens in the same tab.
    NewWindowRequested(String),
}

/// Instruction for the content surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationCommand {
    NavigateTo { tab: TabId, url: String },
    Reload(TabId),
    Stop(TabId),
    GoBack(TabId),
    GoForward(TabId),
}

/// Tab changes implied by `event`, or `None` when it changes nothing.
pub fn tab_patch_for(event: &ContentEvent) -> Option<TabPatch> {
    match event {
        ContentEvent::DomReady | ContentEvent::NewWindowRequested(_) => None,
        ContentEvent::LoadStart => Some(TabPatch::loading(true)),
        ContentEvent::LoadStop => Some(TabPatch::loading(false)),
        ContentEvent::Navigate {
            url,
            can_go_back,
            can_go_forward,
            is_main_frame,
        } => is_main_frame.then(|| TabPatch {
            url: Some(url.clone()),
            can_go_back: Some(*can_go_back),
            can_go_forward: Some(*can_go_forward),
            ..TabPatch::default()
        }),
        ContentEvent::TitleUpdated(title) => Some(TabPatch {
            title: Some(title.clone()),
            ..TabPatch::default()
        }),
        ContentEvent::FaviconUpdated(urls) => urls.first().map(|favicon| TabPatch {
            favicon: Some(favicon.clone()),
            ..TabPatch::default()
        }),
        ContentEvent::LoadFailed {
            is_main_frame,
            error_code,
        } => {
            if *is_main_frame && *error_code != ERR_ABORTED {
                debug!("Main frame load failed with code {error_code}");
                Some(TabPatch::loading(false))
            } else {
                None
            }
        },
    }
}

/// Resolve a tab id to the update action for `event`.
pub fn content_event_action(
    state: &WindowManagerState,
    tab: TabId,
    event: &ContentEvent,
) -> Option<WindowAction> {
    let patch = tab_patch_for(event)?;
    let (window, index) = state
        .windows
        .iter()
        .find_map(|w| w.tab_index(tab).map(|index| (w.id, index)))?;
    Some(WindowAction::UpdateTab {
        window,
        index,
        patch,
    })
}

/// Turn URL-bar input into a URL: explicit http(s) URLs are kept, bare
/// hostnames get `https://`, anything else becomes a web search.
pub fn normalize_url_input(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let lower = input.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Some(input.to_string());
    }
    if input.contains('.') && !input.contains(char::is_whitespace) {
        let candidate = format!("https://{input}");
        if Url::parse(&candidate).is_ok() {
            return Some(candidate);
        }
    }
    let query: String = url::form_urlencoded::byte_serialize(input.as_bytes()).collect();
    Some(format!("{SEARCH_URL}{query}"))
}

/// Actions and commands for user-driven navigation of the tab at
/// `index` in `window`.
pub struct NavigationController;

impl NavigationController {
    /// Load whatever the user typed into the URL bar.
    pub fn submit(
        state: &WindowManagerState,
        window: WindowId,
        index: usize,
        input: &str,
    ) -> Option<(WindowAction, NavigationCommand)> {
        let tab = Self::tab(state, window, index)?;
        let url = normalize_url_input(input)?;
        let action = WindowAction::UpdateTab {
            window,
            index,
            patch: TabPatch {
                url: Some(url.clone()),
                is_loading: Some(true),
                ..TabPatch::default()
            },
        };
        Some((action, NavigationCommand::NavigateTo { tab: tab.id, url }))
    }

    /// Follow a page's request for a new window inside the same tab.
    pub fn new_window_request(tab: TabId, event: &ContentEvent) -> Option<NavigationCommand> {
        match event {
            ContentEvent::NewWindowRequested(url) => Some(NavigationCommand::NavigateTo {
                tab,
                url: url.clone(),
            }),
            _ => None,
        }
    }

    pub fn go_back(state: &WindowManagerState, window: WindowId, index: usize) -> Option<NavigationCommand> {
        let tab = Self::tab(state, window, index)?;
        tab.can_go_back.then_some(NavigationCommand::GoBack(tab.id))
    }

    pub fn go_forward(state: &WindowManagerState, window: WindowId, index: usize) -> Option<NavigationCommand> {
        let tab = Self::tab(state, window, index)?;
        tab.can_go_forward.then_some(NavigationCommand::GoForward(tab.id))
    }

    /// Reload, or stop when the tab is still loading.
    pub fn reload_or_stop(state: &WindowManagerState, window: WindowId, index: usize) -> Option<NavigationCommand> {
        let tab = Self::tab(state, window, index)?;
        Some(if tab.is_loading {
            NavigationCommand::Stop(tab.id)
        } else {
            NavigationCommand::Reload(tab.id)
        })
    }

    pub fn reload(state: &WindowManagerState, window: WindowId, index: usize) -> Option<NavigationCommand> {
        Self::tab(state, window, index).map(|tab| NavigationCommand::Reload(tab.id))
    }

    fn tab(state: &WindowManagerState, window: WindowId, index: usize) -> Option<&Tab> {
        state.window(window)?.tabs.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::WindowManager;
    use rstest::rstest;

    #[rstest]
    #[case("https://example.com/a", "https://example.com/a")]
    #[case("HTTP://Example.com", "HTTP://Example.com")]
    #[case("example.com", "https://example.com")]
    #[case("  docs.rs/euclid  ", "https://docs.rs/euclid")]
    #[case("rust borrow checker", "https://www.google.com/search?q=rust+borrow+checker")]
    #[case("a.b c", "https://www.google.com/search?q=a.b+c")]
    #[case("c++ & you", "https://www.google.com/search?q=c%2B%2B+%26+you")]
    fn normalizes_url_bar_input(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_url_input(input).as_deref(), Some(expected));
    }

    #[test]
    fn test_blank_input_is_ignored() {
        assert_eq!(normalize_url_input("   "), None);
    }

    #[rstest]
    #[case(ContentEvent::DomReady, None)]
    #[case(ContentEvent::LoadStart, Some(TabPatch::loading(true)))]
    #[case(ContentEvent::LoadStop, Some(TabPatch::loading(false)))]
    #[case(ContentEvent::LoadFailed { is_main_frame: true, error_code: -105 }, Some(TabPatch::loading(false)))]
    #[case(ContentEvent::LoadFailed { is_main_frame: true, error_code: ERR_ABORTED }, None)]
    #[case(ContentEvent::LoadFailed { is_main_frame: false, error_code: -105 }, None)]
    #[case(ContentEvent::FaviconUpdated(Vec::new()), None)]
    fn maps_content_events(#[case] event: ContentEvent, #[case] expected: Option<TabPatch>) {
        assert_eq!(tab_patch_for(&event), expected);
    }

    #[test]
    fn test_navigate_only_patches_main_frame() {
        let event = ContentEvent::Navigate {
            url: "https://example.com/next".to_string(),
            can_go_back: true,
            can_go_forward: false,
            is_main_frame: true,
        };
        let patch = tab_patch_for(&event).unwrap();
        assert_eq!(patch.url.as_deref(), Some("https://example.com/next"));
        assert_eq!(patch.can_go_back, Some(true));
        assert_eq!(patch.title, None);

        let subframe = ContentEvent::Navigate {
            url: "https://ads.example".to_string(),
            can_go_back: false,
            can_go_forward: false,
            is_main_frame: false,
        };
        assert_eq!(tab_patch_for(&subframe), None);
    }

    #[test]
    fn test_favicon_uses_first_url() {
        let event = ContentEvent::FaviconUpdated(vec![
            "https://example.com/a.ico".to_string(),
            "https://example.com/b.ico".to_string(),
        ]);
        assert_eq!(
            tab_patch_for(&event).and_then(|p| p.favicon).as_deref(),
            Some("https://example.com/a.ico")
        );
    }

    #[test]
    fn test_event_resolves_tab_to_window_and_index() {
        let mut manager = WindowManager::new();
        manager.dispatch(WindowAction::create_default());
        let window = manager.state().windows[0].id;
        manager.dispatch(WindowAction::AddTab {
            window,
            url: Some("https://example.com".to_string()),
        });
        let tab = manager.state().windows[0].tabs[1].id;

        let action = content_event_action(manager.state(), tab, &ContentEvent::TitleUpdated("Example".into()));
        assert_eq!(
            action,
            Some(WindowAction::UpdateTab {
                window,
                index: 1,
                patch: TabPatch {
                    title: Some("Example".to_string()),
                    ..TabPatch::default()
                },
            })
        );
        assert_eq!(content_event_action(manager.state(), TabId::new(), &ContentEvent::LoadStop), None);
    }

    #[test]
    fn test_submit_and_history_flags() {
        let mut manager = WindowManager::new();
        manager.dispatch(WindowAction::create_default());
        let window = manager.state().windows[0].id;
        let tab = manager.state().windows[0].tabs[0].id;

        let (action, command) = NavigationController::submit(manager.state(), window, 0, "rust-lang.org").unwrap();
        assert_eq!(
            command,
            NavigationCommand::NavigateTo {
                tab,
                url: "https://rust-lang.org".to_string()
            }
        );
        manager.dispatch(action);
        assert_eq!(manager.state().windows[0].tabs[0].url, "https://rust-lang.org");
        assert!(manager.state().windows[0].tabs[0].is_loading);

        assert_eq!(NavigationController::go_back(manager.state(), window, 0), None);
        manager.dispatch(WindowAction::UpdateTab {
            window,
            index: 0,
            patch: TabPatch {
                can_go_back: Some(true),
                is_loading: Some(false),
                ..TabPatch::default()
            },
        });
        assert_eq!(
            NavigationController::go_back(manager.state(), window, 0),
            Some(NavigationCommand::GoBack(tab))
        );
        assert_eq!(
            NavigationController::reload_or_stop(manager.state(), window, 0),
            Some(NavigationCommand::Reload(tab))
        );
    }

    #[test]
    fn test_new_window_request_stays_in_tab() {
        let tab = TabId::new();
        let event = ContentEvent::NewWindowRequested("https://example.com/popup".to_string());
        assert_eq!(tab_patch_for(&event), None);
        assert_eq!(
            NavigationController::new_window_request(tab, &event),
            Some(NavigationCommand::NavigateTo {
                tab,
                url: "https://example.com/popup".to_string()
            })
        );
    }
}
