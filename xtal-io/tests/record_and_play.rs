mod support;

use std::fs;

use xtal_io::prelude::*;

use support::{
    fast_settings, part_files, scratch_dir, scripted_controller, service_frame,
};

#[test]
fn recorded_session_replays_frame_for_frame() {
    let dir = scratch_dir("replay");
    let target = dir.join("take.jsonl");
    let (mut controller, handle) = scripted_controller(fast_settings(&dir));

    controller
        .switch_mode(ModeSwitch::Record {
            target: target.clone(),
        })
        .unwrap();
    assert_eq!(controller.state().frame_index(), -1);
    assert_eq!(part_files(&dir).len(), 1);

    handle.push_events([RawEvent::pointer_moved(10, 10)]);
    handle.push_events([RawEvent::button_down([10, 10], 1)]);
    handle.push_events([]);

    let mut live = Vec::new();
    for _ in 0..3 {
        let (events, flow) = service_frame(&mut controller);
        assert_eq!(flow, Flow::Continue);
        live.push(events);
    }
    assert_eq!(controller.state().frame_index(), 2);

    controller.switch_mode(ModeSwitch::Normal).unwrap();
    assert!(target.exists());
    assert!(part_files(&dir).is_empty());

    controller
        .switch_mode(ModeSwitch::Play {
            source: PlaySource::Path(target),
        })
        .unwrap();
    assert_eq!(controller.mode_name(), ModeName::Play);
    assert_eq!(controller.state().frame_index(), -1);

    let (events, flow) = service_frame(&mut controller);
    assert_eq!(events, live[0]);
    assert_eq!(events, vec![RawEvent::pointer_moved(10, 10)]);
    assert_eq!(flow, Flow::Continue);

    let (events, flow) = service_frame(&mut controller);
    assert_eq!(events, vec![RawEvent::button_down([10, 10], 1)]);
    assert_eq!(controller.services().get_mouse_pressed(), [true, false, false]);
    assert_eq!(flow, Flow::Continue);

    let (events, flow) = service_frame(&mut controller);
    assert!(events.is_empty());
    assert_eq!(flow, Flow::SessionEnded);

    assert_eq!(
        controller.handle_flow(flow).unwrap(),
        LoopControl::Continue
    );
    assert_eq!(controller.mode_name(), ModeName::Normal);
}

#[test]
fn every_modeled_kind_survives_a_session() {
    let dir = scratch_dir("kinds");
    let target = dir.join("kinds.jsonl");
    let (mut controller, handle) = scripted_controller(fast_settings(&dir));

    let batch = vec![
        RawEvent::PointerMoved(PointerMotion {
            pos: [4, 5],
            rel: [1, -1],
            buttons: [false, false, true],
            touch: false,
            window: Some(2),
        }),
        RawEvent::KeyDown(KeyStroke {
            key: "KeyA".to_string(),
            scancode: 30,
            modifiers: Modifiers::LSHIFT,
            unicode: "A".to_string(),
            window: None,
        }),
        RawEvent::TextInput(TextInput {
            text: "A".to_string(),
            window: None,
        }),
        RawEvent::Wheel(Wheel {
            delta: [0.0, -1.5],
            flipped: true,
            touch: false,
            window: None,
        }),
        RawEvent::WindowResized(WindowResize {
            size: [400, 300],
            window: None,
        }),
        RawEvent::key_up("KeyA"),
        RawEvent::button_up([4, 5], 3),
    ];

    controller
        .switch_mode(ModeSwitch::Record {
            target: target.clone(),
        })
        .unwrap();
    handle.push_events(batch.clone());
    service_frame(&mut controller);
    controller.switch_mode(ModeSwitch::Normal).unwrap();

    controller
        .switch_mode(ModeSwitch::Play {
            source: PlaySource::Path(target),
        })
        .unwrap();
    let (events, flow) = service_frame(&mut controller);

    assert_eq!(events, batch);
    assert_eq!(flow, Flow::SessionEnded);
}

#[test]
fn internal_wakeups_are_neither_served_nor_recorded() {
    let dir = scratch_dir("wakeups");
    let target = dir.join("take.jsonl");
    let (mut controller, handle) = scripted_controller(fast_settings(&dir));

    controller
        .switch_mode(ModeSwitch::Record {
            target: target.clone(),
        })
        .unwrap();
    handle.push_events([
        RawEvent::User(UserEvent { code: 1 }),
        RawEvent::key_down("KeyZ"),
    ]);
    let (events, _) = service_frame(&mut controller);
    assert_eq!(events, vec![RawEvent::key_down("KeyZ")]);
    controller.switch_mode(ModeSwitch::Normal).unwrap();

    let log = SessionLog::load(&target).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log.frame(0).unwrap().len(), 1);
    assert_eq!(log.frame(0).unwrap()[0].code(), "kd");
}

#[test]
fn live_escape_aborts_playback() {
    let dir = scratch_dir("abort");
    let mut log = SessionLog::new(SessionHeader::new(1000.0, [200, 100]));
    for _ in 0..5 {
        log.push_frame(vec![compact(&RawEvent::pointer_moved(1, 1))]);
    }
    let (mut controller, handle) = scripted_controller(fast_settings(&dir));

    controller
        .switch_mode(ModeSwitch::Play {
            source: PlaySource::Log(log),
        })
        .unwrap();
    assert!(!handle.mouse_visible());
    assert_eq!(handle.requested_size(), Some([200, 100]));

    let (_, flow) = service_frame(&mut controller);
    assert_eq!(flow, Flow::Continue);

    handle.push_events([RawEvent::key_down("Escape")]);
    let (events, flow) = service_frame(&mut controller);
    assert_eq!(events, vec![RawEvent::pointer_moved(1, 1)]);
    assert_eq!(flow, Flow::SwitchMode(ModeSwitch::Normal));

    controller.handle_flow(flow).unwrap();
    assert_eq!(controller.mode_name(), ModeName::Normal);
    assert!(handle.mouse_visible());
    assert!(handle.resizable());
}

#[test]
fn truncated_log_plays_what_it_has() {
    let dir = scratch_dir("truncated");
    let target = dir.join("broken.jsonl");
    let header =
        serde_json::to_string(&SessionHeader::new(1000.0, [320, 240])).unwrap();
    let frame = serde_json::to_string(&vec![compact(&RawEvent::key_down(
        "KeyP",
    ))])
    .unwrap();
    fs::write(&target, format!("{header}\n{frame}\n{{oops\n{frame}\n"))
        .unwrap();

    let mut settings = fast_settings(&dir);
    settings.on_session_end = SessionEndPolicy::Quit;
    let (mut controller, _handle) = scripted_controller(settings);
    controller
        .switch_mode(ModeSwitch::Play {
            source: PlaySource::Path(target),
        })
        .unwrap();

    let (events, flow) = service_frame(&mut controller);
    assert_eq!(events, vec![RawEvent::key_down("KeyP")]);
    assert_eq!(flow, Flow::SessionEnded);
    assert_eq!(controller.handle_flow(flow).unwrap(), LoopControl::Exit);
}
