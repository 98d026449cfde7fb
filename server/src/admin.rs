use serde::Serialize;
use system::ParticipantId;
use tokio::sync::oneshot::Sender;

#[derive(Debug)]
pub enum AdminCommand {
    DescribeSession { tx: Sender<SessionDescription> },
}

/// Read-only view of the shared session, for operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionDescription {
    pub participants: Vec<ParticipantId>,
    pub history_depth: usize,
    pub redo_depth: usize,
}
