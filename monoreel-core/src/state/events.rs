//! Events that trigger state transitions

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Stream lifecycle events
    /// Boot-time open or post-upload reopen started
    OpenRequested,
    /// Stream opened and header decoded
    Opened,
    /// Stream could not be opened
    OpenFailed,
    /// Handle closed (upload started, or fault)
    Close,

    // Frame events
    /// Frame period elapsed since the last rendered frame
    FrameDue,
    /// Frame read in full and handed to the sink
    FrameShown,
    /// Frame read came up short even after rewinding
    FrameDropped,
}
