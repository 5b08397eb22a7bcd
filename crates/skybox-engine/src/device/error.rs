use crate::error::{RenderError, RenderResult};

/// Out-of-memory, validation and internal error scopes around one unit of
/// GPU work.
///
/// wgpu reports most failures to the device rather than the call site. While
/// these scopes are pushed the failure is caught here instead of reaching the
/// uncaptured-error handler.
pub struct ErrorScopes {
    internal: wgpu::ErrorScopeGuard,
    out_of_memory: wgpu::ErrorScopeGuard,
    validation: wgpu::ErrorScopeGuard,
}

impl ErrorScopes {
    pub fn push(device: &wgpu::Device) -> Self {
        let internal = device.push_error_scope(wgpu::ErrorFilter::Internal);
        let out_of_memory = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let validation = device.push_error_scope(wgpu::ErrorFilter::Validation);
        Self {
            internal,
            out_of_memory,
            validation,
        }
    }

    /// Pops innermost first and returns the first error caught.
    pub fn pop(self) -> Option<wgpu::Error> {
        let Self {
            internal,
            out_of_memory,
            validation,
        } = self;
        let validation = pollster::block_on(validation.pop());
        let out_of_memory = pollster::block_on(out_of_memory.pop());
        let internal = pollster::block_on(internal.pop());
        validation.or(out_of_memory).or(internal)
    }
}

/// Combines the work's own result with what its error scopes caught.
///
/// An error the work returned itself wins: anything the GPU reported after
/// it is a consequence.
pub fn settle<T>(
    result: RenderResult<T>,
    caught: Option<wgpu::Error>,
    on_error: impl FnOnce(wgpu::Error) -> RenderError,
) -> RenderResult<T> {
    let value = result?;
    match caught {
        Some(err) => Err(on_error(err)),
        None => Ok(value),
    }
}

/// Runs `work` inside fresh error scopes.
pub fn scoped<T>(
    device: &wgpu::Device,
    work: impl FnOnce() -> RenderResult<T>,
    on_error: impl FnOnce(wgpu::Error) -> RenderError,
) -> RenderResult<T> {
    let scopes = ErrorScopes::push(device);
    let result = work();
    settle(result, scopes.pop(), on_error)
}

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Unrecoverable; the session ends.
    Fatal,
}

/// Lost/Outdated surfaces are the resize race and need a reconfigure.
/// Anything other than a timeout beyond that is fatal.
pub fn classify_surface_error(err: &wgpu::SurfaceError) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        wgpu::SurfaceError::Timeout => SurfaceErrorAction::SkipFrame,
        wgpu::SurfaceError::OutOfMemory | wgpu::SurfaceError::Other => SurfaceErrorAction::Fatal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validation(description: &str) -> wgpu::Error {
        wgpu::Error::Validation {
            source: Box::new(std::io::Error::other("source")),
            description: description.to_string(),
        }
    }

    fn frame_error(err: wgpu::Error) -> RenderError {
        RenderError::Frame(err.to_string())
    }

    // ── error scopes ──────────────────────────────────────────────────────

    #[test]
    fn clean_scope_keeps_the_value() {
        assert_eq!(settle(Ok(7), None, frame_error).unwrap(), 7);
    }

    #[test]
    fn caught_error_becomes_a_render_error() {
        let err = settle(Ok(()), Some(validation("invalid bind group")), frame_error)
            .unwrap_err();
        match err {
            RenderError::Frame(message) => assert!(message.contains("invalid bind group")),
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn own_error_beats_caught_error() {
        let result: RenderResult<()> = settle(
            Err(RenderError::UnknownHandle("mesh")),
            Some(validation("follow-on")),
            frame_error,
        );
        assert!(matches!(result, Err(RenderError::UnknownHandle("mesh"))));
    }

    #[test]
    fn out_of_memory_becomes_a_render_error() {
        let oom = wgpu::Error::OutOfMemory {
            source: Box::new(std::io::Error::other("heap")),
        };
        assert!(matches!(
            settle(Ok(()), Some(oom), frame_error),
            Err(RenderError::Frame(_))
        ));
    }

    // ── surface errors ────────────────────────────────────────────────────

    #[test]
    fn lost_and_outdated_reconfigure() {
        assert_eq!(
            classify_surface_error(&wgpu::SurfaceError::Lost),
            SurfaceErrorAction::Reconfigured
        );
        assert_eq!(
            classify_surface_error(&wgpu::SurfaceError::Outdated),
            SurfaceErrorAction::Reconfigured
        );
    }

    #[test]
    fn timeout_skips() {
        assert_eq!(
            classify_surface_error(&wgpu::SurfaceError::Timeout),
            SurfaceErrorAction::SkipFrame
        );
    }

    #[test]
    fn out_of_memory_is_fatal() {
        assert_eq!(
            classify_surface_error(&wgpu::SurfaceError::OutOfMemory),
            SurfaceErrorAction::Fatal
        );
        assert_eq!(
            classify_surface_error(&wgpu::SurfaceError::Other),
            SurfaceErrorAction::Fatal
        );
    }
}
