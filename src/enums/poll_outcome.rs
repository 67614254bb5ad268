/// How a polling job ended. Explicit stops do not produce an outcome;
/// the stopping caller already knows why the job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Completed,
    Failed,
    TickCapReached,
    ErrorsExhausted,
}
