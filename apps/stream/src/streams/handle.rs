use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Main,
    Game,
}

/// One open feed and the task reading it.
///
/// Dropping a handle detaches the task; only `cancel` stops it.
#[derive(Debug)]
pub struct StreamHandle {
    owner_account_id: i64,
    kind: StreamKind,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl StreamHandle {
    pub fn new(
        owner_account_id: i64,
        kind: StreamKind,
        token: CancellationToken,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            owner_account_id,
            kind,
            token,
            task,
        }
    }

    pub fn owner_account_id(&self) -> i64 {
        self.owner_account_id
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The reader task has returned (feed closed, failed, or cancelled).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
