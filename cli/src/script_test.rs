use super::*;
use sandbox::entity::Label;

fn parse(json: &str) -> Script {
    serde_json::from_str(json).unwrap()
}

fn run(json: &str) -> Result<Report, ScriptError> {
    replay(&parse(json), Settings::default(), InputConfig::default())
}

#[test]
fn minimal_script_uses_default_viewport() {
    let script = parse(r#"{ "events": [] }"#);
    assert_eq!(script.viewport, Size::new(800.0, 600.0));
    assert!(!script.reset);
    assert!(script.settings.is_none());
}

#[test]
fn events_parse_with_defaults() {
    let script = parse(
        r#"{ "events": [
            { "at_ms": 0, "type": "pointer_down", "x": 1, "y": 2 },
            { "at_ms": 5, "type": "key_down", "key": "ArrowLeft" },
            { "at_ms": 9, "type": "touch_start", "touches": [ { "id": 3, "pos": { "x": 4, "y": 5 } } ] }
        ] }"#,
    );
    let Event::PointerDown { button, modifiers, .. } = &script.events[0].event else {
        panic!("expected pointer_down");
    };
    assert_eq!(*button, Button::Primary);
    assert!(!modifiers.shift);
    assert!(matches!(&script.events[1].event, Event::KeyDown { key } if key.0 == "ArrowLeft"));
    assert!(matches!(&script.events[2].event, Event::TouchStart { touches } if touches[0].id == 3));
}

#[test]
fn click_places_one_box() {
    let report = run(
        r#"{ "events": [
            { "at_ms": 0, "type": "template", "name": "Box" },
            { "at_ms": 10, "type": "pointer_down", "x": 100, "y": 100 },
            { "at_ms": 20, "type": "pointer_up", "x": 100, "y": 100 }
        ] }"#,
    )
    .unwrap();
    assert_eq!(report.object_count, 1);
    assert_eq!(report.mode, Mode::Create);
}

#[test]
fn held_shift_click_rapid_fires() {
    let report = run(
        r#"{ "events": [
            { "at_ms": 0, "type": "template", "name": "Box" },
            { "at_ms": 0, "type": "pointer_down", "x": 100, "y": 100, "modifiers": { "shift": true } },
            { "at_ms": 350, "type": "pointer_up", "x": 100, "y": 100 },
            { "at_ms": 1000, "type": "wait" }
        ] }"#,
    )
    .unwrap();
    assert_eq!(report.object_count, 4);
}

#[test]
fn drawn_wall_is_ground() {
    let report = run(
        r#"{ "events": [
            { "at_ms": 0, "type": "template", "name": "Draw Wall" },
            { "at_ms": 0, "type": "pointer_down", "x": 100, "y": 100 },
            { "at_ms": 20, "type": "pointer_move", "x": 200, "y": 100 },
            { "at_ms": 40, "type": "pointer_up", "x": 200, "y": 100 }
        ] }"#,
    )
    .unwrap();
    assert_eq!(report.entities.len(), 1);
    assert!(report.entities[0].bodies().iter().all(|b| b.label == Label::Ground));
}

#[test]
fn reset_starts_from_floor_and_box() {
    let report = run(r#"{ "reset": true, "events": [] }"#).unwrap();
    assert_eq!(report.entities.len(), 2);
    assert_eq!(report.object_count, 1);
}

#[test]
fn unknown_template_fails() {
    let err = run(r#"{ "events": [ { "at_ms": 0, "type": "template", "name": "Rocket" } ] }"#).unwrap_err();
    assert!(matches!(err, ScriptError::UnknownTemplate(name) if name == "Rocket"));
}

#[test]
fn backwards_timestamp_fails() {
    let err = run(
        r#"{ "events": [
            { "at_ms": 50, "type": "wait" },
            { "at_ms": 10, "type": "wait" }
        ] }"#,
    )
    .unwrap_err();
    assert!(matches!(err, ScriptError::OutOfOrder { index: 1, at_ms: 10 }));
}

#[test]
fn script_settings_are_validated() {
    let err = run(r#"{ "settings": { "gravity": 9 }, "events": [] }"#).unwrap_err();
    assert!(matches!(err, ScriptError::Settings(ConfigError::OutOfRange { field: "gravity", .. })));
}

#[test]
fn report_serializes_view_and_entities() {
    let report = run(r#"{ "reset": true, "events": [] }"#).unwrap();
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["object_count"], 1);
    assert_eq!(value["entities"].as_array().map(Vec::len), Some(2));
    assert!(value["view"]["scale"].is_number());
}
