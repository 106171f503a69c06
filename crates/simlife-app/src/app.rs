//! Application composition and the per-frame dispatcher.
//!
//! `App` owns the four components (settings, VR session, screen flow,
//! scheduler) plus the scene, and is driven by an externally-owned frame
//! callback. No engine globals: everything reaches its collaborators
//! through this struct.

use std::time::Duration;

use rand::{thread_rng, Rng};
use simlife_common::Settings;
use simlife_core::flow::LOADING_MAX_STEP;
use simlife_core::{
    AxisSample, ButtonEvent, FlowEffect, FlowEvent, Presentation, Quat, Screen, ScreenFlow,
    Scheduler, Vec3,
};
use simlife_vr::{Action, Bindings, SessionManager, Steer, VrError, VrOptions, VrRuntime};
use tracing::{debug, info, warn};

use crate::desktop::DesktopCamera;
use crate::scene::{NodeId, Rig, Scene};

/// Desktop camera anchor: high and pulled back for an overhead framing.
const CAMERA_BASE: Vec3 = Vec3::new(0.0, 20.0, 40.0);

/// Lifetime of the transient hand-aura effect.
const AURA_LIFETIME: Duration = Duration::from_millis(800);

/// How long the intro text stays up after Loading entry.
const INTRO_TEXT_LIFETIME: Duration = Duration::from_secs(4);

/// Tasks deferred through the frame scheduler. Each is guarded against
/// target liveness when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredTask {
    RemoveNode(NodeId),
    FinishIntroText(NodeId),
    DismissPause { epoch: u64 },
}

pub struct App {
    settings: Settings,
    scene: Scene,
    rig: Rig,
    flow: ScreenFlow,
    scheduler: Scheduler<DeferredTask>,
    session: SessionManager,
    bindings: Bindings,
    camera: DesktopCamera,
    sim_registered: bool,
    input_suspended: bool,
    exit_requested: bool,
}

impl App {
    pub fn new(settings: Settings, runtime: Box<dyn VrRuntime>) -> App {
        let mut scene = Scene::new();
        let rig = Rig::build(&mut scene);

        let mut session = SessionManager::new(runtime);
        let vr_opts = VrOptions {
            enabled: settings.vr_enabled(),
            user_height_m: settings.user_height_m,
            snap_turn_degrees: settings.snap_turn_degrees,
        };
        match session.initialize(&vr_opts) {
            Ok(()) => {}
            Err(VrError::Unavailable(reason)) => {
                info!(%reason, "continuing in desktop mode");
            }
            Err(err) => {
                warn!(%err, "vr initialization failed, continuing in desktop mode");
            }
        }

        // Presentation is picked once here and never re-evaluated.
        let presentation = if session.initialized() {
            Presentation::Vr
        } else {
            Presentation::Desktop
        };
        let flow = ScreenFlow::new(presentation);

        let hand = match settings.handedness {
            simlife_common::Handedness::Left => simlife_core::Hand::Left,
            simlife_common::Handedness::Right => simlife_core::Hand::Right,
        };
        let bindings = Bindings::standard(hand, settings.effects_enabled);

        // The intro text goes up with the loading screen and takes itself
        // down on a timer, whatever screen is showing by then.
        let mut scheduler = Scheduler::new();
        let intro = scene.attach(Some(rig.world), "IntroText");
        scheduler.schedule(INTRO_TEXT_LIFETIME, DeferredTask::FinishIntroText(intro));

        App {
            settings,
            scene,
            rig,
            flow,
            scheduler,
            session,
            bindings,
            camera: DesktopCamera::new(CAMERA_BASE),
            sim_registered: false,
            input_suspended: false,
            exit_requested: false,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn screen(&self) -> Screen {
        self.flow.screen()
    }

    pub fn presentation(&self) -> Presentation {
        self.flow.presentation()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn rig(&self) -> Rig {
        self.rig
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn sim_registered(&self) -> bool {
        self.sim_registered
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Feeds one user/menu event through the flow.
    pub fn submit(&mut self, event: FlowEvent) {
        let effects = self.flow.handle(event);
        self.apply(effects);
    }

    /// One frame. Drains due deferred tasks, advances the flow, then runs
    /// whichever per-frame path the current mode calls for.
    pub fn tick(&mut self, dt: Duration) {
        for task in self.scheduler.advance(dt) {
            self.run_task(task);
        }

        let loading_increment = if self.flow.screen() == Screen::Loading {
            thread_rng().gen_range(0.5..=LOADING_MAX_STEP)
        } else {
            0.0
        };
        let effects = self.flow.handle(FlowEvent::Tick {
            dt,
            loading_increment,
        });
        self.apply(effects);

        // Loading, menu, and pause all leave the world untouched.
        if self.flow.screen() != Screen::Running {
            return;
        }

        if self.session.initialized() {
            self.session.tick();
            self.publish_vr_poses();
        } else {
            self.camera.update(dt.as_secs_f32(), &mut self.scene, &self.rig);
        }
    }

    /// Routes a controller button edge through the bindings table.
    pub fn handle_button(&mut self, event: ButtonEvent) {
        let Some(action) = self.bindings.dispatch(event) else {
            return;
        };
        match action {
            Action::TogglePause => self.submit(FlowEvent::MenuToggled),
            Action::Interact(hand) => {
                if self.flow.screen() == Screen::Running && !self.input_suspended {
                    self.toggle_grab(hand);
                }
            }
            Action::SpawnHandAura(hand) => {
                if self.flow.screen() == Screen::Running && self.session.initialized() {
                    self.spawn_hand_aura(hand);
                }
            }
            Action::Recenter => {
                if self.flow.screen() == Screen::Running {
                    self.session.recenter();
                }
            }
        }
    }

    /// Routes a joystick sample into VR locomotion.
    pub fn handle_axis(&mut self, sample: AxisSample, dt: Duration) {
        if self.flow.screen() != Screen::Running || self.input_suspended {
            return;
        }
        let Some(steer) = self.session.steer(sample, dt.as_secs_f32()) else {
            return;
        };
        let Some(mut avatar) = self.scene.transform(self.rig.avatar) else {
            return;
        };
        match steer {
            Steer::Translate(delta) => avatar.position += delta,
            Steer::SnapTurn(degrees) => {
                avatar.rotation = Quat::from_yaw(degrees.to_radians()).mul(avatar.rotation);
            }
        }
        self.scene.set_transform(self.rig.avatar, avatar);
    }

    fn publish_vr_poses(&mut self) {
        self.scene.set_transform(self.rig.camera, self.session.head());
        for index in 0..2 {
            if self.session.controller_bound(index) {
                self.scene
                    .set_transform(self.rig.hands[index], self.session.hand(index));
            }
        }
    }

    /// Grip toggles a grab marker under the hand node: first press grabs,
    /// the next releases. Overlap resolution stays with the engine side.
    fn toggle_grab(&mut self, hand: simlife_core::Hand) {
        let name = match hand {
            simlife_core::Hand::Left => "GrabLeft",
            simlife_core::Hand::Right => "GrabRight",
        };
        match self.scene.find_by_name(name) {
            Some(existing) => self.scene.remove(existing),
            None => {
                self.scene.attach(Some(self.rig.hands[hand.index()]), name);
            }
        }
        debug!(?hand, "grab toggled");
    }

    fn spawn_hand_aura(&mut self, hand: simlife_core::Hand) {
        let name = match hand {
            simlife_core::Hand::Left => "AuraLeft",
            simlife_core::Hand::Right => "AuraRight",
        };
        let node = self.scene.attach(Some(self.rig.hands[hand.index()]), name);
        self.scheduler
            .schedule(AURA_LIFETIME, DeferredTask::RemoveNode(node));
    }

    fn apply(&mut self, effects: Vec<FlowEffect>) {
        for effect in effects {
            match effect {
                FlowEffect::ShowMainMenu => {
                    info!("loading settled, main menu up");
                }
                FlowEffect::StartSimulation => {
                    self.sim_registered = true;
                    info!("simulation loop activated");
                }
                FlowEffect::SuspendInput => {
                    self.input_suspended = true;
                }
                FlowEffect::ResumeInput => {
                    self.input_suspended = false;
                }
                FlowEffect::SchedulePauseTimeout { delay, epoch } => {
                    self.scheduler
                        .schedule(delay, DeferredTask::DismissPause { epoch });
                }
                FlowEffect::Exit => {
                    self.session.shutdown();
                    self.exit_requested = true;
                }
            }
        }
    }

    fn run_task(&mut self, task: DeferredTask) {
        match task {
            DeferredTask::RemoveNode(id) => {
                if self.scene.is_alive(id) {
                    self.scene.remove(id);
                } else {
                    debug!(?id, "deferred removal target already gone");
                }
            }
            DeferredTask::FinishIntroText(id) => {
                if self.scene.is_alive(id) {
                    self.scene.remove(id);
                    info!("intro text finished");
                } else {
                    debug!(?id, "intro text already gone");
                }
            }
            DeferredTask::DismissPause { epoch } => {
                let effects = self.flow.auto_dismiss(epoch);
                self.apply(effects);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simlife_common::StrapMode;
    use simlife_core::{Button, Edge, Hand};
    use simlife_vr::runtime::SessionCaps;
    use simlife_vr::types::{Pose, TrackingSnapshot};
    use simlife_vr::{HeadlessRuntime, TrackingError, VrResult};

    const FRAME: Duration = Duration::from_millis(16);

    /// Probes present and serves steady poses until `fatal_after` reads.
    struct StubRuntime {
        reads: u32,
        fatal_after: Option<u32>,
    }

    impl StubRuntime {
        fn steady() -> Self {
            Self {
                reads: 0,
                fatal_after: None,
            }
        }

        fn fatal_after(reads: u32) -> Self {
            Self {
                reads: 0,
                fatal_after: Some(reads),
            }
        }
    }

    impl VrRuntime for StubRuntime {
        fn probe(&self) -> bool {
            true
        }

        fn begin_session(&mut self, _caps: SessionCaps) -> VrResult<()> {
            Ok(())
        }

        fn read_poses(&mut self) -> Result<TrackingSnapshot, TrackingError> {
            self.reads += 1;
            if let Some(limit) = self.fatal_after {
                if self.reads > limit {
                    return Err(TrackingError::Fatal("stub runtime died".into()));
                }
            }
            Ok(TrackingSnapshot {
                head: Pose {
                    position: [0.0, 1.6, 0.0],
                    orientation: [0.0, 0.0, 0.0, 1.0],
                },
                hands: [Some(Pose::default()), Some(Pose::default())],
            })
        }

        fn end_session(&mut self) {}
    }

    fn desktop_app() -> App {
        App::new(Settings::default(), Box::new(HeadlessRuntime))
    }

    fn vr_app(runtime: StubRuntime) -> App {
        App::new(Settings::default(), Box::new(runtime))
    }

    fn drive_to_running(app: &mut App) {
        for _ in 0..2_000 {
            app.tick(FRAME);
            if app.screen() == Screen::MainMenu {
                break;
            }
        }
        assert_eq!(app.screen(), Screen::MainMenu, "loading never settled");
        app.submit(FlowEvent::StartSelected);
        assert_eq!(app.screen(), Screen::Running);
    }

    #[test]
    fn headless_host_runs_desktop_presentation() {
        let app = desktop_app();
        assert_eq!(app.presentation(), Presentation::Desktop);
        assert!(!app.session().initialized());
    }

    #[test]
    fn vr_host_runs_vr_presentation() {
        let app = vr_app(StubRuntime::steady());
        assert_eq!(app.presentation(), Presentation::Vr);
        assert!(app.session().initialized());
    }

    #[test]
    fn strap_off_forces_desktop_even_with_hardware() {
        let settings = Settings {
            vr_strap: StrapMode::Off,
            ..Settings::default()
        };
        let app = App::new(settings, Box::new(StubRuntime::steady()));
        assert_eq!(app.presentation(), Presentation::Desktop);
    }

    #[test]
    fn world_is_untouched_until_running() {
        let mut app = desktop_app();
        let camera_before = app.scene().transform(app.rig().camera).unwrap();
        for _ in 0..50 {
            app.tick(FRAME);
        }
        // Still loading or menu: the camera must not have moved.
        assert_ne!(app.screen(), Screen::Running);
        assert_eq!(
            app.scene().transform(app.rig().camera).unwrap(),
            camera_before
        );
    }

    #[test]
    fn double_start_keeps_running_and_registers_once() {
        let mut app = desktop_app();
        drive_to_running(&mut app);
        assert!(app.sim_registered());

        app.submit(FlowEvent::StartSelected);
        assert_eq!(app.screen(), Screen::Running);
        assert!(app.sim_registered());
    }

    #[test]
    fn pause_round_trip_preserves_transforms_bit_identical() {
        let mut app = desktop_app();
        drive_to_running(&mut app);
        for _ in 0..30 {
            app.tick(FRAME);
        }

        let camera = app.scene().transform(app.rig().camera).unwrap();
        let avatar = app.scene().transform(app.rig().avatar).unwrap();

        app.submit(FlowEvent::MenuToggled);
        assert_eq!(app.screen(), Screen::Paused);
        for _ in 0..40 {
            app.tick(FRAME);
        }
        app.submit(FlowEvent::ResumeSelected);
        assert_eq!(app.screen(), Screen::Running);

        assert_eq!(app.scene().transform(app.rig().camera).unwrap(), camera);
        assert_eq!(app.scene().transform(app.rig().avatar).unwrap(), avatar);
    }

    #[test]
    fn pause_auto_dismisses_after_timeout() {
        let mut app = desktop_app();
        drive_to_running(&mut app);

        app.submit(FlowEvent::MenuToggled);
        assert_eq!(app.screen(), Screen::Paused);

        // A little over five seconds of frames.
        for _ in 0..330 {
            app.tick(FRAME);
        }
        assert_eq!(app.screen(), Screen::Running);
    }

    #[test]
    fn stale_pause_timeout_does_not_fire_after_manual_resume() {
        let mut app = desktop_app();
        drive_to_running(&mut app);

        app.submit(FlowEvent::MenuToggled);
        app.submit(FlowEvent::ResumeSelected);
        app.submit(FlowEvent::MenuToggled);

        // Well before either timeout: still paused.
        for _ in 0..160 {
            app.tick(FRAME);
        }
        assert_eq!(app.screen(), Screen::Paused);

        // Past the timeout: the stale epoch is ignored, the current one
        // dismisses the pause.
        for _ in 0..200 {
            app.tick(FRAME);
        }
        assert_eq!(app.screen(), Screen::Running);
    }

    #[test]
    fn menu_button_pauses_via_bindings() {
        let mut app = vr_app(StubRuntime::steady());
        drive_to_running(&mut app);

        app.handle_button(ButtonEvent {
            hand: Hand::Right,
            button: Button::Menu,
            edge: Edge::Pressed,
        });
        assert_eq!(app.screen(), Screen::Paused);

        // Unbound edge: nothing happens.
        app.handle_button(ButtonEvent {
            hand: Hand::Left,
            button: Button::Menu,
            edge: Edge::Released,
        });
        assert_eq!(app.screen(), Screen::Paused);
    }

    #[test]
    fn vr_tick_publishes_head_pose_to_camera() {
        let mut app = vr_app(StubRuntime::steady());
        drive_to_running(&mut app);
        app.tick(FRAME);

        let camera = app.scene().transform(app.rig().camera).unwrap();
        assert_eq!(camera.position.y, 1.6);
    }

    #[test]
    fn fatal_tracking_falls_back_to_desktop_updates() {
        let mut app = vr_app(StubRuntime::fatal_after(3));
        drive_to_running(&mut app);

        for _ in 0..10 {
            app.tick(FRAME);
        }
        assert!(!app.session().initialized());

        // The desktop camera path has taken over: the camera leaves the
        // last head pose.
        let before = app.scene().transform(app.rig().camera).unwrap();
        for _ in 0..30 {
            app.tick(FRAME);
        }
        let after = app.scene().transform(app.rig().camera).unwrap();
        assert_ne!(before, after, "desktop bob should be driving the camera");
    }

    #[test]
    fn snap_turn_rotates_avatar_once_while_held() {
        let mut app = vr_app(StubRuntime::steady());
        drive_to_running(&mut app);
        app.tick(FRAME);

        let initial = app.scene().transform(app.rig().avatar).unwrap().rotation;
        for _ in 0..10 {
            app.handle_axis(
                AxisSample {
                    hand: Hand::Right,
                    x: 0.9,
                    y: 0.0,
                },
                FRAME,
            );
        }
        let turned = app.scene().transform(app.rig().avatar).unwrap().rotation;
        let expected = Quat::from_yaw(app.settings().snap_turn_degrees.to_radians()).mul(initial);
        assert!(
            (turned.y - expected.y).abs() < 1e-5 && (turned.w - expected.w).abs() < 1e-5,
            "avatar should have turned exactly one snap increment"
        );
    }

    #[test]
    fn aura_effect_expires_through_the_scheduler() {
        let mut app = vr_app(StubRuntime::steady());
        drive_to_running(&mut app);

        app.handle_button(ButtonEvent {
            hand: Hand::Left,
            button: Button::Trigger,
            edge: Edge::Pressed,
        });
        assert!(app.scene().find_by_name("AuraLeft").is_some());

        for _ in 0..60 {
            app.tick(FRAME);
        }
        assert!(app.scene().find_by_name("AuraLeft").is_none());
    }

    #[test]
    fn deferred_removal_of_dead_node_is_a_no_op() {
        let mut app = vr_app(StubRuntime::steady());
        drive_to_running(&mut app);

        app.handle_button(ButtonEvent {
            hand: Hand::Left,
            button: Button::Trigger,
            edge: Edge::Pressed,
        });
        let aura = app.scene().find_by_name("AuraLeft").unwrap();

        // Kill the aura's parent hand node before the timer fires.
        let hand_node = app.rig().hands[0];
        app.scene_mut().remove(hand_node);
        assert!(!app.scene().is_alive(aura));

        // The deferred removal fires against a dead node and must not
        // disturb anything.
        for _ in 0..60 {
            app.tick(FRAME);
        }
        assert_eq!(app.screen(), Screen::Running);
    }

    #[test]
    fn intro_text_takes_itself_down_on_its_timer() {
        let mut app = desktop_app();
        assert!(app.scene().find_by_name("IntroText").is_some());

        // A little over four seconds of frames.
        for _ in 0..260 {
            app.tick(FRAME);
        }
        assert!(app.scene().find_by_name("IntroText").is_none());

        // Nothing else to fire; later frames stay quiet.
        let count = app.scene().node_count();
        for _ in 0..60 {
            app.tick(FRAME);
        }
        assert_eq!(app.scene().node_count(), count);
    }

    #[test]
    fn intro_text_timer_survives_an_already_dead_target() {
        let mut app = desktop_app();
        let intro = app.scene().find_by_name("IntroText").unwrap();
        app.scene_mut().remove(intro);

        for _ in 0..260 {
            app.tick(FRAME);
        }
        assert!(app.scene().find_by_name("IntroText").is_none());
        assert_ne!(app.screen(), Screen::Running);
    }

    #[test]
    fn grip_toggles_a_grab_marker_under_the_hand() {
        let mut app = vr_app(StubRuntime::steady());
        drive_to_running(&mut app);

        let grip = ButtonEvent {
            hand: Hand::Right,
            button: Button::Grip,
            edge: Edge::Pressed,
        };
        app.handle_button(grip);
        assert!(app.scene().find_by_name("GrabRight").is_some());
        assert!(app.scene().find_by_name("GrabLeft").is_none());

        app.handle_button(grip);
        assert!(app.scene().find_by_name("GrabRight").is_none());
    }

    #[test]
    fn grip_while_paused_does_not_grab() {
        let mut app = vr_app(StubRuntime::steady());
        drive_to_running(&mut app);
        app.submit(FlowEvent::MenuToggled);

        app.handle_button(ButtonEvent {
            hand: Hand::Left,
            button: Button::Grip,
            edge: Edge::Pressed,
        });
        assert!(app.scene().find_by_name("GrabLeft").is_none());
    }

    #[test]
    fn off_hand_menu_recenters_the_head() {
        let mut app = vr_app(StubRuntime::steady());
        drive_to_running(&mut app);
        app.tick(FRAME);
        assert_eq!(app.scene().transform(app.rig().camera).unwrap().position.y, 1.6);

        // Default handedness is right, so the left menu button recenters.
        app.handle_button(ButtonEvent {
            hand: Hand::Left,
            button: Button::Menu,
            edge: Edge::Pressed,
        });
        app.tick(FRAME);
        let y = app.scene().transform(app.rig().camera).unwrap().position.y;
        assert!((y - app.settings().user_height_m).abs() < 1e-5);
        assert_eq!(app.screen(), Screen::Running, "recenter must not pause");
    }

    #[test]
    fn quit_sets_exit_and_shuts_the_session_down() {
        let mut app = vr_app(StubRuntime::steady());
        drive_to_running(&mut app);

        app.submit(FlowEvent::QuitRequested);
        assert!(app.exit_requested());
        assert!(!app.session().initialized());
    }

    #[test]
    fn axis_input_is_ignored_while_paused() {
        let mut app = vr_app(StubRuntime::steady());
        drive_to_running(&mut app);
        app.tick(FRAME);

        app.submit(FlowEvent::MenuToggled);
        let avatar = app.scene().transform(app.rig().avatar).unwrap();
        app.handle_axis(
            AxisSample {
                hand: Hand::Left,
                x: 0.0,
                y: 1.0,
            },
            FRAME,
        );
        assert_eq!(app.scene().transform(app.rig().avatar).unwrap(), avatar);
    }
}
