#[derive(Debug, Clone, Copy, Default)]
pub struct Ls8CoreOpts {
  max_cycles: Option<u64>,
  trace: bool,
}

impl Ls8CoreOpts {
  pub fn new() -> Self {
    Self::default()
  }

  // Method to apply options
  pub fn with_options(mut self, opts: impl IntoIterator<Item = impl FnOnce(&mut Self)>) -> Self {
    for opt in opts {
      opt(&mut self);
    }
    self
  }

  pub fn max_cycles(&self) -> Option<u64> {
    self.max_cycles
  }

  pub fn trace(&self) -> bool {
    self.trace
  }
}

// Functional option for bounding the number of executed instructions
pub fn with_max_cycles(value: u64) -> impl FnOnce(&mut Ls8CoreOpts) {
  move |opts: &mut Ls8CoreOpts| {
    opts.max_cycles = Some(value);
  }
}

// Functional option for the per-instruction trace printer
pub fn with_trace(enabled: bool) -> impl FnOnce(&mut Ls8CoreOpts) {
  move |opts: &mut Ls8CoreOpts| {
    opts.trace = enabled;
  }
}
