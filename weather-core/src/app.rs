use std::collections::VecDeque;

use log::debug;
use tokio::sync::mpsc;

use crate::{
    controller::{Action, Effect, SearchState, Transition},
    format,
    geolocation::{Geolocator, PositionOptions, locate},
    provider::WeatherApi,
    view::{self, Screen},
};

/// Owns the search state and runs the effects it asks for.
///
/// Fetches are awaited inside `dispatch`, so when it returns the state reflects
/// all completed I/O for that intent. Timers are not: they run as spawned tasks
/// and their actions are applied at the start of the next `dispatch`, or by
/// [`WeatherApp::next_timer`].
#[derive(Debug)]
pub struct WeatherApp<A> {
    api: A,
    geolocator: Option<Box<dyn Geolocator>>,
    position_options: PositionOptions,
    state: SearchState,
    timer_tx: mpsc::UnboundedSender<Action>,
    timer_rx: mpsc::UnboundedReceiver<Action>,
    pending_timers: usize,
}

impl<A: WeatherApi> WeatherApp<A> {
    pub fn new(api: A, fallback_location: impl Into<String>) -> Self {
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        Self {
            api,
            geolocator: None,
            position_options: PositionOptions::default(),
            state: SearchState::new(fallback_location),
            timer_tx,
            timer_rx,
            pending_timers: 0,
        }
    }

    pub fn with_geolocator(mut self, geolocator: impl Geolocator + 'static) -> Self {
        self.geolocator = Some(Box::new(geolocator));
        self
    }

    pub fn with_position_options(mut self, options: PositionOptions) -> Self {
        self.position_options = options;
        self
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Number of spawned timers whose action has not been applied yet.
    pub fn pending_timers(&self) -> usize {
        self.pending_timers
    }

    /// Render with today's local date.
    pub fn screen(&self) -> Screen {
        view::render(&self.state, &format::today())
    }

    pub async fn mount(&mut self) {
        self.dispatch(Action::Mounted).await;
    }

    pub async fn dispatch(&mut self, action: Action) {
        let mut queue = self.elapsed_timers();
        queue.push_back(action);
        self.run_queue(queue).await;
    }

    /// Apply timer actions that have already fired, without waiting.
    pub async fn flush_timers(&mut self) {
        let queue = self.elapsed_timers();
        self.run_queue(queue).await;
    }

    /// Wait for the next timer to fire and apply its action. Returns `false` at
    /// once if no timer is pending.
    pub async fn next_timer(&mut self) -> bool {
        if self.pending_timers == 0 {
            return false;
        }

        match self.timer_rx.recv().await {
            Some(action) => {
                self.pending_timers -= 1;
                self.run_queue(VecDeque::from([action])).await;
                true
            }
            None => false,
        }
    }

    fn elapsed_timers(&mut self) -> VecDeque<Action> {
        let mut fired = VecDeque::new();
        while let Ok(action) = self.timer_rx.try_recv() {
            self.pending_timers = self.pending_timers.saturating_sub(1);
            fired.push_back(action);
        }
        fired
    }

    async fn run_queue(&mut self, mut queue: VecDeque<Action>) {
        while let Some(action) = queue.pop_front() {
            debug!("apply {action:?}");
            let Transition { state, effects } = self.state.apply(action);
            self.state = state;

            for effect in effects {
                if let Some(next) = self.run(effect).await {
                    queue.push_back(next);
                }
            }
        }
    }

    async fn run(&mut self, effect: Effect) -> Option<Action> {
        let action = match effect {
            Effect::Locate => {
                let located = locate(self.geolocator.as_deref(), &self.position_options).await;
                Action::Located(located)
            }
            Effect::FetchByCoordinates { coords, origin } => Action::WeatherLoaded {
                lookup: self.api.fetch_by_coordinates(coords).await,
                origin,
            },
            Effect::FetchByName { query, origin } => Action::WeatherLoaded {
                lookup: self.api.fetch_by_name(&query).await,
                origin,
            },
            Effect::FetchSuggestions(query) => {
                Action::SuggestionsLoaded(self.api.fetch_suggestions(&query).await)
            }
            Effect::HideAfter(delay) => {
                self.spawn_timer(delay, Action::BlurElapsed);
                return None;
            }
        };
        Some(action)
    }

    fn spawn_timer(&mut self, delay: std::time::Duration, action: Action) {
        let tx = self.timer_tx.clone();
        self.pending_timers += 1;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the app was dropped.
            let _ = tx.send(action);
        });
    }
}
