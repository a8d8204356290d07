//! Offscreen render target
//!
//! Stand-in for a GPU texture render target. The relay filter only needs the
//! side effect of rendering its parent, so the target counts passes and never
//! holds pixels.

/// An offscreen render target
#[derive(Debug, Default)]
pub struct TexRender {
    rendered: bool,
    in_pass: bool,
    passes: u64,
}

impl TexRender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow the target to be rendered again this frame
    pub fn reset(&mut self) {
        self.rendered = false;
    }

    /// Begin a render pass
    ///
    /// Returns false if the target was already rendered since the last
    /// `reset`, a pass is already open, or the size is zero.
    pub fn begin(&mut self, cx: u32, cy: u32) -> bool {
        if self.rendered || self.in_pass || cx == 0 || cy == 0 {
            return false;
        }
        self.in_pass = true;
        true
    }

    /// Close the current render pass
    pub fn end(&mut self) {
        if self.in_pass {
            self.in_pass = false;
            self.rendered = true;
            self.passes += 1;
        }
    }

    /// Number of completed passes
    pub fn render_passes(&self) -> u64 {
        self.passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_lifecycle() {
        let mut tex = TexRender::new();
        assert!(tex.begin(1, 1));
        tex.end();
        assert_eq!(tex.render_passes(), 1);

        // Must reset before rendering again
        assert!(!tex.begin(1, 1));
        tex.reset();
        assert!(tex.begin(1, 1));
        tex.end();
        assert_eq!(tex.render_passes(), 2);
    }

    #[test]
    fn test_zero_size_rejected() {
        let mut tex = TexRender::new();
        assert!(!tex.begin(0, 1));
        tex.end();
        assert_eq!(tex.render_passes(), 0);
    }
}
