use serde::{Deserialize, Serialize};
use std::fmt;

pub type ParticipantId = u16;

/// Fully encoded canvas contents at some point in time, e.g. a PNG data URL.
///
/// Never inspected by the server; only the client surface knows how to decode it.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(String);

impl Snapshot {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drops snapshots that carry no data. Clients send `""` when they have nothing to record.
    pub fn present(snapshot: Option<Snapshot>) -> Option<Snapshot> {
        snapshot.filter(|s| !s.is_empty())
    }
}

// data URLs get big, keep logs readable
impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const PREVIEW: usize = 24;
        match self.0.char_indices().nth(PREVIEW) {
            Some((end, _)) => write!(f, "Snapshot({}.. {} bytes)", &self.0[..end], self.0.len()),
            None => write!(f, "Snapshot({})", self.0),
        }
    }
}

impl From<&str> for Snapshot {
    fn from(encoded: &str) -> Self {
        Self::new(encoded)
    }
}

impl From<String> for Snapshot {
    fn from(encoded: String) -> Self {
        Self(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_treats_empty_snapshot_as_absent() {
        assert_eq!(Snapshot::present(Some(Snapshot::new(""))), None);
        assert_eq!(Snapshot::present(None), None);
        assert_eq!(
            Snapshot::present(Some(Snapshot::new("data:image/png;base64,AA"))),
            Some(Snapshot::new("data:image/png;base64,AA"))
        );
    }

    #[test]
    fn it_shortens_debug_output() {
        let long = Snapshot::new(format!("data:image/png;base64,{}", "A".repeat(1000)));
        let debug = format!("{:?}", long);
        assert!(debug.len() < 80);
        assert!(debug.contains("1022 bytes"));
    }
}
