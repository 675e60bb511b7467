use hintsweeper_common::{
    models::{Cell, ClockState, GameStatus, Hud, Pos, TimerView},
    params::{GameParams, ParamInput},
    protocol::{CellUpdate, ClientMessage, ServerMessage},
};
use serde_json::json;

fn hud() -> Hud {
    Hud {
        mines_left: 20,
        mines_total: 20,
        large_hint_available: true,
        hints: 0,
        penalty_seconds: 0,
        paused: false,
        timer: TimerView {
            timed: false,
            state: ClockState::Idle,
            seconds: 0,
            band: None,
        },
    }
}

#[test]
fn reveal_accepts_a_composite_key() {
    let message: ClientMessage =
        serde_json::from_str(r#"{"action": "reveal", "pos": "cell-2-9"}"#).unwrap();
    assert!(matches!(
        message,
        ClientMessage::Reveal {
            pos: Pos { x: 9, y: 2 }
        }
    ));
}

#[test]
fn malformed_key_rejects_the_whole_message() {
    let error = serde_json::from_str::<ClientMessage>(r#"{"action": "chord", "pos": "cell-2"}"#)
        .unwrap_err();
    assert!(error.to_string().contains("cell-2"));
}

#[test]
fn unit_actions_and_hints() {
    let pause: ClientMessage = serde_json::from_str(r#"{"action": "pause"}"#).unwrap();
    assert!(matches!(pause, ClientMessage::Pause));

    let hint: ClientMessage = serde_json::from_str(r#"{"action": "hint", "big": true}"#).unwrap();
    assert!(matches!(hint, ClientMessage::Hint { big: true }));
}

#[test]
fn restart_takes_raw_form_values() {
    let message: ClientMessage = serde_json::from_str(
        r#"{"action": "restart", "params": {"width": "12", "height": 8, "timed": true}}"#,
    )
    .unwrap();
    let ClientMessage::Restart { params } = message else {
        panic!("expected restart");
    };
    assert_eq!(params.width, Some(ParamInput::Text("12".to_string())));
    assert_eq!(
        params.resolve(),
        GameParams {
            width: 12,
            height: 8,
            mines: 22,
            timed: true
        }
    );
}

#[test]
fn server_messages_are_tagged_by_type() {
    let update = ServerMessage::Update {
        updates: vec![CellUpdate {
            pos: Pos { x: 1, y: 0 },
            value: Cell::Revealed { adjacent: 3 },
        }],
        status: GameStatus::InProgress,
        hud: hud(),
    };
    let value = serde_json::to_value(&update).unwrap();
    assert_eq!(value["type"], "update");
    assert_eq!(value["status"], "inProgress");
    assert_eq!(
        value["updates"][0],
        json!({"pos": {"x": 1, "y": 0}, "value": {"state": "revealed", "adjacent": 3}})
    );

    let back: ServerMessage = serde_json::from_value(value).unwrap();
    assert_eq!(back, update);
}

#[test]
fn error_message_shape() {
    let value = serde_json::to_value(ServerMessage::Error {
        message: "bad".to_string(),
    })
    .unwrap();
    assert_eq!(value, json!({"type": "error", "message": "bad"}));
}
