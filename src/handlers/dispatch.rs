//! Protocol dispatcher
//!
//! Routes one decoded envelope to the registry/gateway operations and
//! produces at most one direct reply. Every handler failure is absorbed
//! into the reply's status string; nothing here ever drops a connection.

use crate::protocol::{Action, Envelope, MetaValue, Payload};
use crate::state::{AppState, ConnContext};

use super::{chat, connection, room};

pub fn dispatch(state: &AppState, ctx: &ConnContext, envelope: Envelope) -> Option<Envelope> {
    match envelope.action {
        Action::Register => match connection::register_user(state, ctx.user_id, &envelope) {
            Ok(()) => Some(Envelope::reply(Action::Register, "Registered")),
            Err(err) => {
                tracing::debug!(user_id = %ctx.user_id, %err, "Register rejected");
                Some(Envelope::reply(Action::Register, "Failed"))
            }
        },
        Action::Chat => match chat::send_chat(state, ctx.user_id, &envelope) {
            Ok(()) => None,
            Err(err) => {
                tracing::debug!(user_id = %ctx.user_id, %err, "Chat rejected");
                Some(Envelope::reply(Action::Confirmation, "Failed to send message"))
            }
        },
        Action::CreateRoom => match room::create_room(state, &envelope) {
            Ok(()) => Some(Envelope::reply(Action::CreateRoom, "Success")),
            Err(err) => {
                tracing::debug!(user_id = %ctx.user_id, %err, "createRoom rejected");
                Some(Envelope::reply(Action::CreateRoom, "Failed"))
            }
        },
        Action::Join => match room::join_room(state, ctx.user_id, &envelope) {
            Ok(name) => Some(Envelope {
                action: Action::Join,
                meta: Some(MetaValue::Text(name)),
                msg: Some(Payload::Text("Success".into())),
            }),
            Err(err) => {
                tracing::debug!(user_id = %ctx.user_id, %err, "Join rejected");
                Some(Envelope::reply(Action::Join, "failed"))
            }
        },
        Action::Leave => match room::leave_room(state, ctx.user_id, &envelope) {
            Ok(()) => Some(Envelope::reply(Action::Leave, "Success")),
            Err(err) => {
                tracing::debug!(user_id = %ctx.user_id, %err, "Leave rejected");
                Some(Envelope::reply(Action::Leave, "failed"))
            }
        },
        Action::FetchRooms => Some(Envelope {
            action: Action::FetchRooms,
            meta: None,
            msg: Some(Payload::Names(room::fetch_rooms(state))),
        }),
        Action::FetchUsers => match room::fetch_users(state, &envelope) {
            Ok(users) => Some(Envelope {
                action: Action::FetchUsers,
                meta: None,
                msg: Some(Payload::Users(users)),
            }),
            Err(err) => {
                tracing::debug!(user_id = %ctx.user_id, %err, "fetchUsers rejected");
                Some(Envelope::reply(Action::FetchUsers, "Failed"))
            }
        },
        Action::Confirmation | Action::Unknown => Some(Envelope::unrecognized()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::protocol::UserInfo;
    use tokio::sync::mpsc;

    struct Client {
        ctx: ConnContext,
        rx: mpsc::UnboundedReceiver<Envelope>,
    }

    impl Client {
        fn connect(state: &AppState) -> Self {
            let (tx, mut rx) = mpsc::unbounded_channel();
            let ctx = connection::handle_open(state, tx);
            rx.try_recv().unwrap(); // welcome confirmation
            Self { ctx, rx }
        }

        fn send(&mut self, state: &AppState, json: &str) -> Option<Envelope> {
            let envelope: Envelope = serde_json::from_str(json).unwrap();
            dispatch(state, &self.ctx, envelope)
        }

        fn recv(&mut self) -> Envelope {
            self.rx.try_recv().expect("expected a broadcast")
        }

        fn drain(&mut self) {
            while self.rx.try_recv().is_ok() {}
        }
    }

    fn roster_names(envelope: &Envelope) -> Vec<String> {
        match &envelope.msg {
            Some(Payload::Users(users)) => {
                users.iter().map(|user: &UserInfo| user.name.clone()).collect()
            }
            other => panic!("expected a user list, got {other:?}"),
        }
    }

    #[test]
    fn register_confirms() {
        let state = AppState::new(Config::default());
        let mut alice = Client::connect(&state);
        let reply = alice.send(&state, r#"{"action":"register","meta":"Alice"}"#);
        assert_eq!(reply, Some(Envelope::reply(Action::Register, "Registered")));
    }

    #[test]
    fn create_room_then_fetch_rooms() {
        let state = AppState::new(Config::default());
        let mut alice = Client::connect(&state);

        let reply = alice.send(&state, r#"{"action":"createRoom","msg":"lobby"}"#);
        assert_eq!(reply, Some(Envelope::reply(Action::CreateRoom, "Success")));

        let reply = alice.send(&state, r#"{"action":"fetchRooms"}"#).unwrap();
        assert_eq!(
            reply.msg,
            Some(Payload::Names(vec!["global".into(), "lobby".into()]))
        );
    }

    #[test]
    fn duplicate_room_reports_failed() {
        let state = AppState::new(Config::default());
        let mut alice = Client::connect(&state);
        alice.send(&state, r#"{"action":"createRoom","msg":"lobby"}"#);
        let reply = alice.send(&state, r#"{"action":"createRoom","msg":"lobby"}"#);
        assert_eq!(reply, Some(Envelope::reply(Action::CreateRoom, "Failed")));
    }

    #[test]
    fn double_join_rosters_both_users_everywhere() {
        let state = AppState::new(Config::default());
        let mut alice = Client::connect(&state);
        let mut bob = Client::connect(&state);
        alice.send(&state, r#"{"action":"register","meta":"Alice"}"#);
        bob.send(&state, r#"{"action":"register","meta":"Bob"}"#);
        alice.send(&state, r#"{"action":"createRoom","msg":"lobby"}"#);

        let reply = alice.send(&state, r#"{"action":"join","msg":"lobby"}"#).unwrap();
        assert_eq!(reply.msg, Some(Payload::Text("Success".into())));
        assert_eq!(reply.meta, Some(MetaValue::Text("lobby".into())));
        alice.drain();

        bob.send(&state, r#"{"action":"join","msg":"lobby"}"#);

        for client in [&mut alice, &mut bob] {
            let roster = client.recv();
            assert_eq!(roster.action, Action::FetchUsers);
            assert_eq!(roster_names(&roster), ["Alice", "Bob"]);
        }
    }

    #[test]
    fn chat_without_a_room_gets_the_failure_confirmation() {
        let state = AppState::new(Config::default());
        let mut alice = Client::connect(&state);
        alice.send(&state, r#"{"action":"register","meta":"Alice"}"#);

        let reply = alice.send(&state, r#"{"action":"chat","meta":"lobby","msg":"hi"}"#);
        assert_eq!(
            reply,
            Some(Envelope::reply(Action::Confirmation, "Failed to send message"))
        );
    }

    #[test]
    fn chat_broadcasts_name_and_text_with_no_direct_reply() {
        let state = AppState::new(Config::default());
        let mut alice = Client::connect(&state);
        alice.send(&state, r#"{"action":"register","meta":"Alice"}"#);
        alice.send(&state, r#"{"action":"join","msg":"global"}"#);
        alice.drain();

        let reply = alice.send(&state, r#"{"action":"chat","msg":"hello"}"#);
        assert_eq!(reply, None);

        let broadcast = alice.recv();
        assert_eq!(broadcast.action, Action::Chat);
        assert_eq!(
            broadcast.msg,
            Some(Payload::Names(vec!["Alice".into(), "hello".into()]))
        );
    }

    #[test]
    fn join_missing_room_reports_failed() {
        let state = AppState::new(Config::default());
        let mut alice = Client::connect(&state);
        alice.send(&state, r#"{"action":"register","meta":"Alice"}"#);
        let reply = alice.send(&state, r#"{"action":"join","msg":"nowhere"}"#);
        assert_eq!(reply, Some(Envelope::reply(Action::Join, "failed")));
    }

    #[test]
    fn leave_never_joined_room_reports_failed() {
        let state = AppState::new(Config::default());
        let mut alice = Client::connect(&state);
        alice.send(&state, r#"{"action":"register","meta":"Alice"}"#);
        let reply = alice.send(&state, r#"{"action":"leave","msg":"global"}"#);
        assert_eq!(reply, Some(Envelope::reply(Action::Leave, "failed")));
    }

    #[test]
    fn fetch_users_lists_online_occupants() {
        let state = AppState::new(Config::default());
        let mut alice = Client::connect(&state);
        let mut bob = Client::connect(&state);
        alice.send(&state, r#"{"action":"register","meta":"Alice"}"#);
        bob.send(&state, r#"{"action":"register","meta":"Bob"}"#);
        alice.send(&state, r#"{"action":"join","msg":"global"}"#);

        let reply = bob.send(&state, r#"{"action":"fetchUsers","msg":"global"}"#).unwrap();
        assert_eq!(roster_names(&reply), ["Alice"]);
    }

    #[test]
    fn unknown_action_gets_the_unrecognized_reply() {
        let state = AppState::new(Config::default());
        let mut alice = Client::connect(&state);
        let reply = alice.send(&state, r#"{"action":"teleport","msg":"moon"}"#);
        assert_eq!(reply, Some(Envelope::unrecognized()));
    }
}
