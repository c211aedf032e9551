#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
    Warning,
    Info,
}

impl MessageKind {
    pub fn color(self) -> &'static str {
        match self {
            MessageKind::Success => "#28a745",
            MessageKind::Error => "#dc3545",
            MessageKind::Warning => "#ffc107",
            MessageKind::Info => "#17a2b8",
        }
    }
}

/// Short-lived messages shown to the visitor.
pub trait Feedback: 'static {
    fn show(&self, text: &str, kind: MessageKind);
}
