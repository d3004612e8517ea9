//! State machine definition
//!
//! Playback behavior is a function of the current state and an event.

use super::events::Event;

/// Playback states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// No stream handle; nothing renders
    #[default]
    Closed,
    /// Opening the stream and decoding its header
    Opening,
    /// Stream open, waiting for the next frame period
    Ready,
    /// Reading a frame and writing it to the display
    Rendering,
}

impl State {
    /// Process an event and return the next state
    ///
    /// This is the core state transition logic.
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            // Any state can be closed
            (_, Close) => Closed,

            // Closed transitions
            (Closed, OpenRequested) => Opening,

            // Opening transitions
            (Opening, Opened) => Ready,
            (Opening, OpenFailed) => Closed,

            // Ready transitions
            (Ready, FrameDue) => Rendering,

            // Rendering transitions
            (Rendering, FrameShown) => Ready,
            (Rendering, FrameDropped) => Ready,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_flow() {
        let state = State::Closed;

        let opening = state.transition(Event::OpenRequested);
        assert_eq!(opening, State::Opening);

        let ready = opening.transition(Event::Opened);
        assert_eq!(ready, State::Ready);
    }

    #[test]
    fn test_open_failure_returns_to_closed() {
        let opening = State::Closed.transition(Event::OpenRequested);
        assert_eq!(opening.transition(Event::OpenFailed), State::Closed);
    }

    #[test]
    fn test_render_cycle() {
        let ready = State::Ready;

        let rendering = ready.transition(Event::FrameDue);
        assert_eq!(rendering, State::Rendering);
        assert_eq!(rendering.transition(Event::FrameShown), State::Ready);

        // A dropped frame also goes back to waiting
        assert_eq!(rendering.transition(Event::FrameDropped), State::Ready);
    }

    #[test]
    fn test_close_from_any_state() {
        let states = [
            State::Closed,
            State::Opening,
            State::Ready,
            State::Rendering,
        ];

        for state in states {
            assert_eq!(state.transition(Event::Close), State::Closed);
        }
    }

    #[test]
    fn test_frame_events_ignored_while_closed() {
        assert_eq!(State::Closed.transition(Event::FrameDue), State::Closed);
        assert_eq!(State::Closed.transition(Event::FrameShown), State::Closed);
        assert_eq!(State::Opening.transition(Event::FrameDue), State::Opening);
    }

    #[test]
    fn test_reopen_requires_close() {
        // A live stream is never reopened in place
        assert_eq!(State::Ready.transition(Event::OpenRequested), State::Ready);
        assert_eq!(
            State::Rendering.transition(Event::OpenRequested),
            State::Rendering
        );
    }
}
