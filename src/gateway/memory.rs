use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{oneshot, Notify};

use crate::types::{ClientError, Result};

use super::CommandGateway;

enum Reply {
    Resolve(Value),
    Reject(String),
}

enum Scripted {
    Ready(Reply),
    Held {
        reply: oneshot::Receiver<Reply>,
        invoked: Arc<Notify>,
    },
}

/// A command the gateway received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub command: String,
    pub args: Value,
}

#[derive(Default)]
struct ScriptState {
    queues: HashMap<String, VecDeque<Scripted>>,
    calls: Vec<RecordedCall>,
}

/// In-memory gateway answering from a per-command queue of scripted replies.
///
/// Every call is recorded. A command without a queued reply is rejected.
#[derive(Default)]
pub struct ScriptedGateway {
    state: Mutex<ScriptState>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply for the next `command` call.
    pub fn respond(&self, command: &str, value: impl Serialize) -> &Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.push(command, Scripted::Ready(Reply::Resolve(value)));
        self
    }

    /// Queue a rejection carrying `message`.
    pub fn reject(&self, command: &str, message: &str) -> &Self {
        self.push(command, Scripted::Ready(Reply::Reject(message.to_string())));
        self
    }

    /// Queue a reply that stays pending until the returned handle settles it.
    pub fn hold(&self, command: &str) -> HeldResponse {
        let (tx, rx) = oneshot::channel();
        let invoked = Arc::new(Notify::new());
        self.push(
            command,
            Scripted::Held {
                reply: rx,
                invoked: Arc::clone(&invoked),
            },
        );
        HeldResponse {
            command: command.to_string(),
            reply: tx,
            invoked,
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().calls.clone()
    }

    /// Arguments of every call to `command`, in call order.
    pub fn calls_to(&self, command: &str) -> Vec<Value> {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.command == command)
            .map(|call| call.args.clone())
            .collect()
    }

    pub fn call_count(&self, command: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.command == command)
            .count()
    }

    /// Scripted replies not consumed yet, across all commands.
    pub fn pending(&self) -> usize {
        self.state.lock().queues.values().map(VecDeque::len).sum()
    }

    fn push(&self, command: &str, scripted: Scripted) {
        self.state
            .lock()
            .queues
            .entry(command.to_string())
            .or_default()
            .push_back(scripted);
    }
}

#[async_trait]
impl CommandGateway for ScriptedGateway {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value> {
        let next = {
            let mut state = self.state.lock();
            state.calls.push(RecordedCall {
                command: command.to_string(),
                args,
            });
            state
                .queues
                .get_mut(command)
                .and_then(VecDeque::pop_front)
        };

        let reply = match next {
            Some(Scripted::Ready(reply)) => reply,
            Some(Scripted::Held { reply, invoked }) => {
                invoked.notify_one();
                reply
                    .await
                    .unwrap_or_else(|_| Reply::Reject(format!("{command} was never answered")))
            }
            None => Reply::Reject(format!("No scripted response for {command}")),
        };

        match reply {
            Reply::Resolve(value) => Ok(value),
            Reply::Reject(message) => Err(ClientError::Gateway {
                command: command.to_string(),
                message,
            }),
        }
    }
}

/// A pending reply created by [`ScriptedGateway::hold`].
pub struct HeldResponse {
    command: String,
    reply: oneshot::Sender<Reply>,
    invoked: Arc<Notify>,
}

impl HeldResponse {
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Wait until the gateway has received the call this reply belongs to.
    pub async fn invoked(&self) {
        self.invoked.notified().await;
    }

    pub fn resolve(self, value: impl Serialize) {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        let _ = self.reply.send(Reply::Resolve(value));
    }

    pub fn reject(self, message: &str) {
        let _ = self.reply.send(Reply::Reject(message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn replies_are_consumed_in_order() {
        let gateway = ScriptedGateway::new();
        gateway
            .respond("list_scheduled_backups", json!(["a"]))
            .reject("list_scheduled_backups", "Scheduler offline");

        let first = gateway.invoke("list_scheduled_backups", json!({})).await;
        let second = gateway.invoke("list_scheduled_backups", json!({})).await;

        assert_eq!(first.unwrap(), json!(["a"]));
        assert_eq!(second.unwrap_err().to_string(), "Scheduler offline");
        assert_eq!(gateway.call_count("list_scheduled_backups"), 2);
        assert_eq!(gateway.pending(), 0);
    }

    #[tokio::test]
    async fn unscripted_command_is_rejected_and_recorded() {
        let gateway = ScriptedGateway::new();
        let result = gateway
            .invoke("run_backup", json!({ "jobId": "job-1" }))
            .await;

        assert!(matches!(result, Err(ClientError::Gateway { .. })));
        assert_eq!(gateway.calls_to("run_backup"), vec![json!({ "jobId": "job-1" })]);
    }

    #[tokio::test]
    async fn held_reply_waits_for_release() {
        let gateway = Arc::new(ScriptedGateway::new());
        let held = gateway.hold("list_repositories");

        let task = {
            let gateway = Arc::clone(&gateway);
            tokio::spawn(async move { gateway.invoke("list_repositories", json!({})).await })
        };

        held.invoked().await;
        assert!(!task.is_finished());
        held.resolve(json!([]));

        assert_eq!(task.await.unwrap().unwrap(), json!([]));
    }
}
