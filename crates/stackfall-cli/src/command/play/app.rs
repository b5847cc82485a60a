use std::time::Duration;

use crossterm::event::Event;
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};
use stackfall_engine::{GameSession, GameSnapshot, InputOutcome};
use stackfall_runtime::{App, RenderMode, Runtime};

use crate::view::widgets::{KeyBinding, KeyBindingDisplay, SessionDisplay};

use super::keymap;

const PLAYING_BINDINGS: &[KeyBinding] = &[
    (&["←", "→"], "Move"),
    (&["↓"], "Soft Drop"),
    (&["↑"], "Firm Drop"),
    (&["Space"], "Hard Drop"),
    (&["Z", "X"], "Rotate"),
    (&["C"], "Hold"),
    (&["R"], "Reset"),
    (&["Esc", "Q"], "Quit"),
];

const GAME_OVER_BINDINGS: &[KeyBinding] = &[(&["Click", "R"], "Restart"), (&["Esc", "Q"], "Quit")];

#[derive(Debug)]
pub(super) struct PlayApp {
    session: GameSession,
    snapshot: GameSnapshot,
    tick_interval: Duration,
    fps: u32,
    show_ghost: bool,
    is_exiting: bool,
}

impl PlayApp {
    pub(super) fn new(
        session: GameSession,
        tick_interval: Duration,
        fps: u32,
        show_ghost: bool,
    ) -> Self {
        let snapshot = session.snapshot();
        Self {
            session,
            snapshot,
            tick_interval,
            fps,
            show_ghost,
            is_exiting: false,
        }
    }

    pub(super) fn session(&self) -> &GameSession {
        &self.session
    }
}

impl App for PlayApp {
    fn init(&mut self, runtime: &mut Runtime) {
        runtime.set_tick_interval(Some(self.tick_interval));
        runtime.set_render_mode(RenderMode::throttled_from_rate(f64::from(self.fps)));
        runtime.set_mouse_capture(true);
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, _runtime: &mut Runtime, event: Event) {
        let Some(command) = keymap::command_for(&event, self.snapshot.is_game_over()) else {
            return;
        };
        let outcome = self.session.on_input(command);
        tracing::trace!(?command, ?outcome, "input");
        if outcome == InputOutcome::ExitRequested {
            self.is_exiting = true;
        }
        self.snapshot = self.session.snapshot();
    }

    fn draw(&self, frame: &mut Frame) {
        let session_display = SessionDisplay::new(&self.snapshot, self.show_ghost);
        let bindings = if self.snapshot.is_game_over() {
            GAME_OVER_BINDINGS
        } else {
            PLAYING_BINDINGS
        };
        let help = KeyBindingDisplay::new(bindings);

        let [main_area, help_area] =
            Layout::vertical([Constraint::Length(session_display.height()), Constraint::Length(1)])
                .areas::<2>(frame.area());
        frame.render_widget(session_display, main_area);
        frame.render_widget(help, help_area);
    }

    fn update(&mut self, _runtime: &mut Runtime, elapsed: Duration) {
        if self.snapshot.is_game_over() {
            return;
        }
        self.session.on_tick(elapsed);
        self.snapshot = self.session.snapshot();
    }
}
