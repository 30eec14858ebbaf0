/// Observer of export step counts
pub trait ProgressReporter {
    /// Add `steps` to the total
    fn append(&mut self, steps: u64);

    /// Complete one step
    fn advance(&mut self);

    fn finish(&mut self);
}

/// Reporter that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn append(&mut self, _steps: u64) {}

    fn advance(&mut self) {}

    fn finish(&mut self) {}
}
