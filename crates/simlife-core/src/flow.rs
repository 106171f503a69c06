//! Screen-flow state machine: Loading -> MainMenu -> Running <-> Paused.
//!
//! Pure event-in, effects-out: the caller feeds [`FlowEvent`]s and applies
//! the returned [`FlowEffect`]s (registering the sim loop, suspending
//! input, scheduling the pause timeout, quitting). Invalid or redundant
//! events are no-ops, never panics: a second Start while already running
//! does nothing, a menu toggle during loading does nothing.

use std::time::Duration;

/// Progress value at which loading is logically complete.
pub const LOADING_COMPLETE: f32 = 100.0;

/// Largest per-tick loading increment accepted from the caller. Keeps the
/// bar monotone even if the caller hands in garbage.
pub const LOADING_MAX_STEP: f32 = 8.0;

/// Settle delay between loading hitting 100 and the visible menu cut.
pub const LOADING_SETTLE: Duration = Duration::from_millis(1200);

/// Pause panel auto-resume timeout, applied uniformly to both
/// presentations.
pub const PAUSE_AUTO_RESUME: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Loading,
    MainMenu,
    Running,
    Paused,
}

/// Desktop 2-D panels vs. VR world-anchored panels. Chosen once at
/// `Loading` entry, never re-evaluated mid-session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Desktop,
    Vr,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowEvent {
    /// One frame. `loading_increment` only matters while loading; the
    /// caller supplies a bounded random step.
    Tick {
        dt: Duration,
        loading_increment: f32,
    },
    /// Explicit "Start" selection from the main menu.
    StartSelected,
    /// VR menu button edge or desktop Esc.
    MenuToggled,
    /// Explicit "Resume" from the pause panel.
    ResumeSelected,
    /// Explicit user exit.
    QuitRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowEffect {
    /// Loading finished settling; present the main menu.
    ShowMainMenu,
    /// Activate the simulation loop and VR per-frame tick. Emitted at
    /// most once per session.
    StartSimulation,
    /// Entering pause: suspend avatar/camera input, world time keeps
    /// running.
    SuspendInput,
    /// Leaving pause: input handling resumes.
    ResumeInput,
    /// Schedule the pause auto-dismiss. `epoch` identifies this pause
    /// instance; a stale timeout must be ignored.
    SchedulePauseTimeout { delay: Duration, epoch: u64 },
    /// Tear down and exit with code 0.
    Exit,
}

#[derive(Debug)]
pub struct ScreenFlow {
    screen: Screen,
    presentation: Presentation,
    progress: f32,
    settle_remaining: Option<Duration>,
    sim_started: bool,
    pause_epoch: u64,
}

impl ScreenFlow {
    pub fn new(presentation: Presentation) -> Self {
        Self {
            screen: Screen::Loading,
            presentation,
            progress: 0.0,
            settle_remaining: None,
            sim_started: false,
            pause_epoch: 0,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn presentation(&self) -> Presentation {
        self.presentation
    }

    /// Loading progress in `0..=100`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn handle(&mut self, event: FlowEvent) -> Vec<FlowEffect> {
        match event {
            FlowEvent::Tick {
                dt,
                loading_increment,
            } => self.on_tick(dt, loading_increment),
            FlowEvent::StartSelected => self.on_start(),
            FlowEvent::MenuToggled => self.on_menu_toggled(),
            FlowEvent::ResumeSelected => self.on_resume(),
            FlowEvent::QuitRequested => vec![FlowEffect::Exit],
        }
    }

    /// Pause auto-dismiss callback. Only resumes if the session is still
    /// in the same pause instance the timeout was armed for.
    pub fn auto_dismiss(&mut self, epoch: u64) -> Vec<FlowEffect> {
        if self.screen == Screen::Paused && self.pause_epoch == epoch {
            self.resume()
        } else {
            Vec::new()
        }
    }

    fn on_tick(&mut self, dt: Duration, loading_increment: f32) -> Vec<FlowEffect> {
        if self.screen != Screen::Loading {
            return Vec::new();
        }

        if self.progress < LOADING_COMPLETE {
            let step = loading_increment.clamp(0.0, LOADING_MAX_STEP);
            self.progress = (self.progress + step).min(LOADING_COMPLETE);
            if self.progress >= LOADING_COMPLETE {
                self.settle_remaining = Some(LOADING_SETTLE);
            }
            return Vec::new();
        }

        // Fully loaded; count the settle delay down to the menu cut.
        if let Some(remaining) = self.settle_remaining {
            if let Some(left) = remaining.checked_sub(dt) {
                if left > Duration::ZERO {
                    self.settle_remaining = Some(left);
                    return Vec::new();
                }
            }
            self.settle_remaining = None;
            self.screen = Screen::MainMenu;
            return vec![FlowEffect::ShowMainMenu];
        }
        Vec::new()
    }

    fn on_start(&mut self) -> Vec<FlowEffect> {
        if self.screen != Screen::MainMenu {
            return Vec::new();
        }
        self.screen = Screen::Running;
        if self.sim_started {
            return Vec::new();
        }
        self.sim_started = true;
        vec![FlowEffect::StartSimulation]
    }

    fn on_menu_toggled(&mut self) -> Vec<FlowEffect> {
        match self.screen {
            Screen::Running => {
                self.screen = Screen::Paused;
                self.pause_epoch += 1;
                vec![
                    FlowEffect::SuspendInput,
                    FlowEffect::SchedulePauseTimeout {
                        delay: PAUSE_AUTO_RESUME,
                        epoch: self.pause_epoch,
                    },
                ]
            }
            Screen::Paused => self.resume(),
            _ => Vec::new(),
        }
    }

    fn on_resume(&mut self) -> Vec<FlowEffect> {
        if self.screen == Screen::Paused {
            self.resume()
        } else {
            Vec::new()
        }
    }

    fn resume(&mut self) -> Vec<FlowEffect> {
        self.screen = Screen::Running;
        vec![FlowEffect::ResumeInput]
    }
}
