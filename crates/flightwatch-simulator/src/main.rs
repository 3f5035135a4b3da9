//! Desktop simulator for the flightwatch watch face.
//!
//! Renders a live [`Session`] in an SDL2 window via `embedded-graphics-simulator`.
//! Key presses are posted on the session event channel exactly as watch
//! buttons would be, and the host clock drives the one-second tick.
//!
//! # Key bindings
//!
//! | Key   | Action                                  |
//! |-------|-----------------------------------------|
//! | N     | Next flight phase                       |
//! | P     | Undo last phase change                  |
//! | Space | Cycle info item                         |
//! | D     | Back to default info item               |
//! | R     | Toggle cruise check reminders           |
//! | F     | Toggle flight plan alarm                |
//! | E     | Cycle endurance budget presets          |
//! | Enter | Dismiss reminder                        |
//! | T     | ET flyback                              |
//! | W     | Warp the clock forward five minutes     |
//! | Q     | Quit                                    |

mod face;

use std::time::{SystemTime, UNIX_EPOCH};

use embassy_time::{Duration, Instant};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use log::{error, info, warn};

use flightwatch::{
    AlarmKind, Haptics, Session, SessionConfig, SessionEvent, VibePattern, get_event_receiver,
    get_event_sender,
};

use crate::face::{FACE_HEIGHT_PX, FACE_WIDTH_PX, draw_face};

/// Pixel scale factor for the simulator window.
const WINDOW_SCALE: u32 = 3;

/// Target frame duration (~30 FPS).
const FRAME_DURATION: std::time::Duration = std::time::Duration::from_millis(33);

/// Clock jump applied by the warp key.
const WARP_STEP: Duration = Duration::from_secs(5 * 60);

/// Endurance budgets offered by the E key, zero disables tracking.
const ENDURANCE_PRESETS_SECS: [u64; 6] = [0, 30 * 60, 60 * 60, 2 * 3_600, 3 * 3_600, 4 * 3_600];

/// Stand-in for the vibration motor.
struct LogHaptics;

impl Haptics for LogHaptics {
    fn vibrate(&mut self, pattern: VibePattern) {
        info!("Bzzz {:?}", pattern);
    }
}

/// Host wall clock plus the accumulated warp, as a UTC epoch instant.
fn watch_now(warp: Duration) -> Instant {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    Instant::from_secs(secs) + warp
}

fn keycode_to_event(keycode: Keycode, endurance_preset: &mut usize) -> Option<SessionEvent> {
    match keycode {
        Keycode::N => Some(SessionEvent::Advance),
        Keycode::P => Some(SessionEvent::Retreat),
        Keycode::Space => Some(SessionEvent::CycleDisplay { to_default: false }),
        Keycode::D => Some(SessionEvent::CycleDisplay { to_default: true }),
        Keycode::R => Some(SessionEvent::InhibitToggle(AlarmKind::CruiseCheck)),
        Keycode::F => Some(SessionEvent::InhibitToggle(AlarmKind::FlightPlanClose)),
        Keycode::E => {
            *endurance_preset = (*endurance_preset + 1) % ENDURANCE_PRESETS_SECS.len();
            Some(SessionEvent::EnduranceInput(Duration::from_secs(
                ENDURANCE_PRESETS_SECS[*endurance_preset],
            )))
        }
        Keycode::Return | Keycode::KpEnter => Some(SessionEvent::DismissReminder),
        Keycode::T => Some(SessionEvent::Flyback),
        _ => None,
    }
}

fn main() {
    env_logger::init();
    info!("Starting flightwatch simulator");
    info!(
        "Display: {}×{} (scale {}×)",
        FACE_WIDTH_PX, FACE_HEIGHT_PX, WINDOW_SCALE
    );
    info!("Keys: N=Next  P=Undo  Space=Cycle  D=Default  R/F=Alarms  E=Endurance  T=Flyback  W=Warp  Q=Quit");

    let mut warp = Duration::from_secs(0);
    let mut session = match Session::new(SessionConfig::default(), LogHaptics, watch_now(warp)) {
        Ok(session) => session,
        Err(e) => {
            error!("Invalid session config: {}", e);
            return;
        }
    };

    let sender = get_event_sender();
    let receiver = get_event_receiver();

    let mut display = SimulatorDisplay::<Rgb565>::new(Size::new(FACE_WIDTH_PX, FACE_HEIGHT_PX));
    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new("Flightwatch Simulator", &output_settings);

    // The SDL window is lazily initialized on the first `update()` call.
    // We must call `update()` once before `events()` or it will panic.
    if let Err(e) = draw_face(&session, watch_now(warp), &mut display) {
        error!("Draw error: {:?}", e);
    }
    window.update(&display);

    let mut endurance_preset = 0;
    let mut last_tick = watch_now(warp);

    'running: loop {
        let frame_start = std::time::Instant::now();

        // --- SDL events ---------------------------------------------------
        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,

                SimulatorEvent::KeyDown { keycode, .. } => {
                    if keycode == Keycode::Q || keycode == Keycode::Escape {
                        break 'running;
                    }

                    if keycode == Keycode::W {
                        warp += WARP_STEP;
                        info!("Clock warped by {}s", warp.as_secs());
                        continue;
                    }

                    if let Some(event) = keycode_to_event(keycode, &mut endurance_preset) {
                        if sender.try_send(event).is_err() {
                            warn!("Event queue full, dropping {:?}", event);
                        }
                    }
                }

                _ => {}
            }
        }

        // --- One-second tick ------------------------------------------------
        let now = watch_now(warp);
        if now.as_secs() != last_tick.as_secs() {
            if sender.try_send(SessionEvent::Tick).is_err() {
                warn!("Event queue full, dropping tick");
            }
            last_tick = now;
        }

        // --- Session and render ---------------------------------------------
        if session.drain_events(&receiver, now) > 0 {
            if let Err(e) = draw_face(&session, now, &mut display) {
                error!("Draw error: {:?}", e);
            }
        }

        window.update(&display);

        // --- Frame pacing -------------------------------------------------
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    info!("Simulator exiting");
}
