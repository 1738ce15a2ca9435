//! Search box and result state, driven by user intents and fetch completions.
//!
//! [`SearchState::apply`] is a pure transition: it returns the next snapshot plus
//! the effects (network calls, timers) the caller must run. Each effect completes
//! with exactly one [`Action`] that is fed back in.
//!
//! Overlapping fetches are not cancelled. Whichever completion arrives last wins.

use std::time::Duration;

use crate::{
    geolocation::Located,
    model::{Coordinates, Lookup, PlaceSuggestion},
    provider::MIN_SUGGESTION_QUERY,
};

/// How long a blur waits before hiding the dropdown, so that a pointer pick on a
/// suggestion lands first.
pub const BLUR_HIDE_DELAY: Duration = Duration::from_millis(200);

/// Which trigger path issued a weather fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    /// Device position on mount.
    Initial,
    /// Default location name on mount.
    Fallback,
    /// User search or suggestion pick.
    Search,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Locate,
    FetchByCoordinates {
        coords: Coordinates,
        origin: FetchOrigin,
    },
    FetchByName { query: String, origin: FetchOrigin },
    FetchSuggestions(String),
    HideAfter(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
}

impl NavKey {
    /// Arrow keys must not scroll the surrounding view.
    pub fn suppresses_default(self) -> bool {
        matches!(self, NavKey::ArrowDown | NavKey::ArrowUp)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Mounted,
    Located(Located),
    TextChanged(String),
    SuggestionChosen(PlaceSuggestion),
    SubmitSearch,
    Key(NavKey),
    Focus,
    Blur,
    BlurElapsed,
    SuggestionsLoaded(Vec<PlaceSuggestion>),
    WeatherLoaded { lookup: Lookup, origin: FetchOrigin },
}

/// Result of applying one action.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: SearchState,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    query_text: String,
    suggestions: Vec<PlaceSuggestion>,
    suggestions_visible: bool,
    selected_index: Option<usize>,
    loading: bool,
    result: Option<Lookup>,
    fallback_location: String,
}

impl SearchState {
    /// State before mount. `fallback_location` is looked up when no device
    /// position is available.
    pub fn new(fallback_location: impl Into<String>) -> Self {
        Self {
            query_text: String::new(),
            suggestions: Vec::new(),
            suggestions_visible: false,
            selected_index: None,
            loading: true,
            result: None,
            fallback_location: fallback_location.into(),
        }
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn suggestions(&self) -> &[PlaceSuggestion] {
        &self.suggestions
    }

    pub fn suggestions_visible(&self) -> bool {
        self.suggestions_visible
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn selected_suggestion(&self) -> Option<&PlaceSuggestion> {
        self.selected_index.and_then(|i| self.suggestions.get(i))
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn result(&self) -> Option<&Lookup> {
        self.result.as_ref()
    }

    pub fn fallback_location(&self) -> &str {
        &self.fallback_location
    }

    /// Whether the dropdown should be drawn at all.
    pub fn dropdown_open(&self) -> bool {
        self.suggestions_visible && !self.suggestions.is_empty()
    }

    pub fn apply(&self, action: Action) -> Transition {
        let mut state = self.clone();
        let effects = state.reduce(action);
        Transition { state, effects }
    }

    fn reduce(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Mounted => {
                self.loading = true;
                self.result = None;
                vec![Effect::Locate]
            }
            Action::Located(Located::At(coords)) => {
                let origin = FetchOrigin::Initial;
                vec![Effect::FetchByCoordinates { coords, origin }]
            }
            Action::Located(Located::UseFallback) => vec![self.fallback_fetch()],
            Action::WeatherLoaded { lookup, origin } => self.on_loaded(lookup, origin),
            Action::TextChanged(value) => {
                let long_enough = value.chars().count() >= MIN_SUGGESTION_QUERY;
                self.query_text = value;
                if long_enough {
                    vec![Effect::FetchSuggestions(self.query_text.clone())]
                } else {
                    self.clear_suggestions();
                    vec![]
                }
            }
            Action::SuggestionsLoaded(suggestions) => {
                self.suggestions_visible = !suggestions.is_empty();
                self.suggestions = suggestions;
                self.selected_index = None;
                vec![]
            }
            Action::SuggestionChosen(suggestion) => {
                self.query_text = suggestion.display_name;
                self.clear_suggestions();
                self.loading = true;
                vec![Effect::FetchByCoordinates {
                    coords: suggestion.coordinates,
                    origin: FetchOrigin::Search,
                }]
            }
            Action::SubmitSearch => {
                if self.query_text.trim().is_empty() {
                    return vec![];
                }
                self.hide_dropdown();
                self.loading = true;
                vec![Effect::FetchByName {
                    query: self.query_text.clone(),
                    origin: FetchOrigin::Search,
                }]
            }
            Action::Key(key) => self.on_key(key),
            Action::Focus => {
                if !self.suggestions.is_empty() {
                    self.suggestions_visible = true;
                    self.selected_index = None;
                }
                vec![]
            }
            Action::Blur => vec![Effect::HideAfter(BLUR_HIDE_DELAY)],
            Action::BlurElapsed => {
                self.hide_dropdown();
                vec![]
            }
        }
    }

    fn on_loaded(&mut self, lookup: Lookup, origin: FetchOrigin) -> Vec<Effect> {
        // A device position the provider can't resolve still gets a screen.
        if origin == FetchOrigin::Initial && !lookup.is_found() {
            return vec![self.fallback_fetch()];
        }

        self.result = Some(lookup);
        self.loading = false;
        if origin == FetchOrigin::Search {
            self.query_text.clear();
        }
        vec![]
    }

    fn on_key(&mut self, key: NavKey) -> Vec<Effect> {
        let len = self.suggestions.len();
        match key {
            NavKey::ArrowDown if self.dropdown_open() => {
                self.selected_index = match self.selected_index {
                    Some(i) if i + 1 < len => Some(i + 1),
                    _ => Some(0),
                };
                vec![]
            }
            NavKey::ArrowUp if self.dropdown_open() => {
                self.selected_index = match self.selected_index {
                    Some(i) if i > 0 => Some(i - 1),
                    _ => Some(len - 1),
                };
                vec![]
            }
            NavKey::ArrowDown | NavKey::ArrowUp => vec![],
            NavKey::Enter => {
                let picked = self
                    .suggestions_visible
                    .then(|| self.selected_suggestion().cloned())
                    .flatten();
                match picked {
                    Some(suggestion) => self.reduce(Action::SuggestionChosen(suggestion)),
                    None => self.reduce(Action::SubmitSearch),
                }
            }
            NavKey::Escape => {
                self.hide_dropdown();
                vec![]
            }
        }
    }

    fn fallback_fetch(&mut self) -> Effect {
        self.loading = true;
        Effect::FetchByName {
            query: self.fallback_location.clone(),
            origin: FetchOrigin::Fallback,
        }
    }

    fn hide_dropdown(&mut self) {
        self.suggestions_visible = false;
        self.selected_index = None;
    }

    fn clear_suggestions(&mut self) {
        self.suggestions.clear();
        self.hide_dropdown();
    }
}
