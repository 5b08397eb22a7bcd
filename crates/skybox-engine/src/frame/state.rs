use crate::error::{RenderError, RenderResult};

/// Orchestrator lifecycle.
///
/// Steady state cycles `Ready → Updating → DrawingBackground →
/// DrawingForeground → Presenting → Ready`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum FrameState {
    Uninitialized,
    Ready,
    Updating,
    DrawingBackground,
    DrawingForeground,
    Presenting,
    Terminated,
}

impl FrameState {
    pub fn can_advance_to(self, next: FrameState) -> bool {
        use FrameState::*;
        match (self, next) {
            (Terminated, _) => false,
            (_, Terminated) => true,
            (Uninitialized, Ready)
            | (Ready, Updating)
            | (Updating, DrawingBackground)
            | (DrawingBackground, DrawingForeground)
            | (DrawingForeground, Presenting)
            | (Presenting, Ready) => true,
            _ => false,
        }
    }
}

/// Tracks the current [`FrameState`] and rejects out-of-order steps.
#[derive(Debug)]
pub struct FrameCycle {
    state: FrameState,
}

impl FrameCycle {
    pub fn new() -> Self {
        Self {
            state: FrameState::Uninitialized,
        }
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn advance(&mut self, next: FrameState) -> RenderResult<()> {
        if !self.state.can_advance_to(next) {
            return Err(RenderError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        log::trace!("frame state {:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Moves to `Terminated`; returns false if already there.
    pub fn terminate(&mut self) -> bool {
        if self.state == FrameState::Terminated {
            return false;
        }
        self.state = FrameState::Terminated;
        true
    }
}

impl Default for FrameCycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready() -> FrameCycle {
        let mut cycle = FrameCycle::new();
        cycle.advance(FrameState::Ready).unwrap();
        cycle
    }

    #[test]
    fn starts_uninitialized() {
        assert_eq!(FrameCycle::new().state(), FrameState::Uninitialized);
    }

    #[test]
    fn full_frame_returns_to_ready() {
        let mut cycle = ready();
        for next in [
            FrameState::Updating,
            FrameState::DrawingBackground,
            FrameState::DrawingForeground,
            FrameState::Presenting,
            FrameState::Ready,
        ] {
            cycle.advance(next).unwrap();
        }
        assert_eq!(cycle.state(), FrameState::Ready);
    }

    #[test]
    fn cannot_draw_before_update() {
        let mut cycle = ready();
        let err = cycle.advance(FrameState::DrawingBackground).unwrap_err();
        assert!(matches!(
            err,
            RenderError::InvalidTransition {
                from: FrameState::Ready,
                to: FrameState::DrawingBackground
            }
        ));
    }

    #[test]
    fn foreground_never_precedes_background() {
        let mut cycle = ready();
        cycle.advance(FrameState::Updating).unwrap();
        assert!(cycle.advance(FrameState::DrawingForeground).is_err());
    }

    #[test]
    fn uninitialized_cannot_update() {
        let mut cycle = FrameCycle::new();
        assert!(cycle.advance(FrameState::Updating).is_err());
    }

    #[test]
    fn terminate_from_mid_frame() {
        let mut cycle = ready();
        cycle.advance(FrameState::Updating).unwrap();
        assert!(cycle.terminate());
        assert_eq!(cycle.state(), FrameState::Terminated);
        assert!(!cycle.terminate());
    }

    #[test]
    fn terminated_is_final() {
        let mut cycle = ready();
        cycle.advance(FrameState::Terminated).unwrap();
        assert!(cycle.advance(FrameState::Ready).is_err());
        assert!(cycle.advance(FrameState::Terminated).is_err());
    }
}
