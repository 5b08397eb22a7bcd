//! Constant (uniform) buffers.

use wgpu::util::DeviceExt;

use crate::error::{RenderError, RenderResult};

/// How often a constant buffer is rewritten.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UpdateFrequency {
    /// Filled at creation and never written again.
    Static,
    /// Rewritten in full every frame.
    PerFrame,
}

impl UpdateFrequency {
    pub fn usage(self) -> wgpu::BufferUsages {
        match self {
            UpdateFrequency::Static => wgpu::BufferUsages::UNIFORM,
            UpdateFrequency::PerFrame => wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        }
    }
}

/// A uniform buffer bound to the vertex stage.
pub struct ConstantBuffer {
    pub(crate) buffer: wgpu::Buffer,
    pub label: String,
    pub size: u64,
    pub frequency: UpdateFrequency,
}

impl ConstantBuffer {
    /// Creates the buffer, filled with `initial` when given and zeroed
    /// otherwise. A static buffer must be given its full contents here.
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        size: u64,
        frequency: UpdateFrequency,
        initial: Option<&[u8]>,
    ) -> RenderResult<Self> {
        check_creation(label, size, frequency, initial)?;

        let buffer = match initial {
            Some(contents) => device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: frequency.usage(),
            }),
            None => device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size,
                usage: frequency.usage(),
                mapped_at_creation: false,
            }),
        };
        Ok(Self {
            buffer,
            label: label.to_string(),
            size,
            frequency,
        })
    }

    /// Replaces the whole contents. Partial writes are rejected, and so is
    /// any write to a static buffer.
    pub fn write(&self, queue: &wgpu::Queue, data: &[u8]) -> RenderResult<()> {
        check_update(&self.label, self.size, self.frequency, data)?;
        queue.write_buffer(&self.buffer, 0, data);
        Ok(())
    }
}

pub fn check_full_write(label: &str, size: u64, data: &[u8]) -> RenderResult<()> {
    if data.len() as u64 != size {
        return Err(RenderError::PartialWrite {
            label: label.to_string(),
            expected: size,
            actual: data.len() as u64,
        });
    }
    Ok(())
}

fn check_creation(
    label: &str,
    size: u64,
    frequency: UpdateFrequency,
    initial: Option<&[u8]>,
) -> RenderResult<()> {
    match (frequency, initial) {
        (UpdateFrequency::Static, None) => Err(RenderError::StaticBuffer {
            label: label.to_string(),
            reason: "needs its contents at creation",
        }),
        (_, Some(contents)) => check_full_write(label, size, contents),
        (UpdateFrequency::PerFrame, None) => Ok(()),
    }
}

fn check_update(
    label: &str,
    size: u64,
    frequency: UpdateFrequency,
    data: &[u8],
) -> RenderResult<()> {
    if frequency == UpdateFrequency::Static {
        return Err(RenderError::StaticBuffer {
            label: label.to_string(),
            reason: "cannot be rewritten",
        });
    }
    check_full_write(label, size, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── updates ───────────────────────────────────────────────────────────

    #[test]
    fn exact_size_accepted() {
        let matrix = [0u8; 64];
        assert!(check_full_write("model", 64, &matrix).is_ok());
        assert!(check_update("model", 64, UpdateFrequency::PerFrame, &matrix).is_ok());
    }

    #[test]
    fn short_write_rejected() {
        let err = check_full_write("model", 64, &[0u8; 48]).unwrap_err();
        match err {
            RenderError::PartialWrite {
                expected, actual, ..
            } => assert_eq!((expected, actual), (64, 48)),
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn oversized_write_rejected() {
        assert!(check_full_write("model", 64, &[0u8; 80]).is_err());
    }

    #[test]
    fn static_buffer_is_never_rewritten() {
        let err = check_update("palette", 64, UpdateFrequency::Static, &[0u8; 64]).unwrap_err();
        assert!(matches!(err, RenderError::StaticBuffer { .. }));
    }

    // ── creation ──────────────────────────────────────────────────────────

    #[test]
    fn static_buffer_needs_contents() {
        assert!(matches!(
            check_creation("palette", 64, UpdateFrequency::Static, None),
            Err(RenderError::StaticBuffer { .. })
        ));
        assert!(check_creation("palette", 64, UpdateFrequency::Static, Some(&[0u8; 64])).is_ok());
    }

    #[test]
    fn initial_contents_must_fill_the_buffer() {
        assert!(matches!(
            check_creation("palette", 64, UpdateFrequency::Static, Some(&[0u8; 16])),
            Err(RenderError::PartialWrite { .. })
        ));
    }

    #[test]
    fn per_frame_buffer_may_start_zeroed() {
        assert!(check_creation("model", 64, UpdateFrequency::PerFrame, None).is_ok());
    }

    #[test]
    fn only_per_frame_buffers_accept_copies() {
        assert!(!UpdateFrequency::Static
            .usage()
            .contains(wgpu::BufferUsages::COPY_DST));
        assert!(UpdateFrequency::PerFrame
            .usage()
            .contains(wgpu::BufferUsages::COPY_DST));
    }
}
