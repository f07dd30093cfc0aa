use std::path::PathBuf;
use std::process;

use clap::Parser;
use xtal_io::prelude::*;

const LABEL_FG: Rgba = [240, 240, 240, 255];
const LABEL_BG: Rgba = [20, 20, 28, 255];
const LABEL_OUTLINE: Rgba = [200, 80, 80, 255];

/// Frame loop with session recording and replay.
/// F5 toggles recording, F1 toggles a modal scope, Escape stops playback.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Record the session to this file
    #[arg(long, conflicts_with = "play")]
    record: Option<PathBuf>,

    /// Replay a recorded session
    #[arg(long)]
    play: Option<PathBuf>,

    /// Frame rate for live operation
    #[arg(long)]
    fps: Option<f32>,
}

fn main() {
    init_logger();
    let args = Args::parse();

    if let Err(err) = run(args) {
        error!("{}", err);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), String> {
    let mut settings = storage::load_settings_or_default();
    if let Some(fps) = args.fps {
        settings.fps = fps;
    }

    let backend =
        WinitBackend::new(&settings.window_title, settings.window_size)?;
    let mut controller = ModeController::new(backend, settings);

    let initial = match (args.record, args.play) {
        (Some(target), _) => Some(ModeSwitch::Record { target }),
        (None, Some(path)) => Some(ModeSwitch::Play {
            source: PlaySource::Path(path),
        }),
        (None, None) => None,
    };
    if let Some(switch) = initial {
        controller
            .switch_mode(switch)
            .map_err(|err| err.to_string())?;
    }

    let mut hooks = DemoHooks::new();
    let mut frames: u64 = 0;

    loop {
        let events = controller.services().get_events();
        let mut quit = false;
        let mut toggle_recording = false;

        for event in &events {
            match event {
                RawEvent::Quit => quit = true,
                RawEvent::KeyDown(stroke) if stroke.key == "F5" => {
                    toggle_recording = true;
                }
                RawEvent::KeyDown(stroke) if stroke.key == "F1" => {
                    let is_modal = controller.modal().is_modal();
                    controller.modal_mut().set_modal(!is_modal);
                }
                _ => {
                    if !controller.modal().is_modal() {
                        debug!("{:?}", event);
                    }
                }
            }
        }

        if quit {
            break;
        }
        if toggle_recording {
            toggle_record_mode(&mut controller);
        }

        hooks.mode_name = controller.mode_name();
        controller.watch_window_size(&mut hooks);
        controller.services().update_screen();

        let (flow, fps) = controller.services().frame_checkups_with_fps();
        frames += 1;
        if frames % 240 == 0 {
            info!(
                "{} frame {} at {:.1} fps",
                controller.mode_name(),
                controller.state().frame_index(),
                fps
            );
        }

        match controller.handle_flow(flow) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => error!("{}", err),
        }
    }

    let report = controller.shutdown();
    if !report.is_clean() {
        warn!("{} temp files could not be removed", report.failures.len());
    }

    Ok(())
}

fn toggle_record_mode(controller: &mut ModeController) {
    let switch = match controller.mode_name() {
        ModeName::Record => ModeSwitch::Normal,
        ModeName::Normal => ModeSwitch::Record {
            target: storage::session_output_path(
                &controller.settings().sessions_dir,
                "session-demo",
            ),
        },
        ModeName::Play => return,
    };

    if let Err(err) = controller.switch_mode(switch) {
        error!("{}", err);
    }
}

struct DemoHooks {
    labels: LabelCache<BlockText>,
    mode_name: ModeName,
}

impl DemoHooks {
    fn new() -> Self {
        Self {
            labels: LabelCache::new(BlockText),
            mode_name: ModeName::Normal,
        }
    }
}

impl WindowHooks for DemoHooks {
    fn window_resize_setups(&mut self, size: Size) {
        info!("Window resized to {}x{}", size[0], size[1]);
    }

    fn redraw(&mut self, services: &mut dyn FrameServices) {
        let label = self.labels.get_label(
            self.mode_name.as_str(),
            LABEL_FG,
            LABEL_BG,
            LABEL_OUTLINE,
            4,
        );
        debug!(
            "Mode label {}x{} ({} cached)",
            label.rect.width,
            label.rect.height,
            self.labels.len()
        );
        services.update_screen();
    }
}

/// One solid cell per glyph; spaces stay background.
struct BlockText;

impl TextRenderer for BlockText {
    fn render(&mut self, text: &str, fg: Rgba, bg: Rgba) -> Bitmap {
        let glyph = [8, 16];
        let count = text.chars().count() as u32;
        let mut bitmap = Bitmap::new(count * glyph[0], glyph[1], bg);

        for (i, c) in text.chars().enumerate() {
            if c.is_whitespace() {
                continue;
            }
            let x = i as i32 * glyph[0] as i32;
            bitmap.fill_rect(Rect::new(x + 1, 2, glyph[0] - 2, glyph[1] - 4), fg);
        }

        bitmap
    }
}
