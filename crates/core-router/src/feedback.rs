use crate::types::ChannelId;

/// One human-readable note about a degenerate or unroutable condition
/// encountered during channel-map construction or routing (spec §7 item 6,
/// supplemented from `grouteMain.c`/`DBWfdback.c`). Not an error: the build
/// and the routing driver both keep going after pushing one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackEntry {
    pub message: String,
    pub channel: Option<ChannelId>,
}

/// Append-only feedback log, consumed the same way an `UndoSink` is:
/// optional, never fails, never inspected by the code that writes to it.
#[derive(Debug, Default, Clone)]
pub struct Feedback {
    pub entries: Vec<FeedbackEntry>,
}

impl Feedback {
    pub fn push(&mut self, message: impl Into<String>, channel: Option<ChannelId>) {
        self.entries.push(FeedbackEntry {
            message: message.into(),
            channel,
        });
    }
}
