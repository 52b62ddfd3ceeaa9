/// An observer of sampled events.
///
/// Observers are called synchronously, on the thread that produced the sample, once per accepted sample. The first
/// parameter is always the measured value (for latencies, the elapsed time in nanoseconds). There is no buffering or
/// retrying between the sampler and its observers: a slow observer slows down the caller directly, so implementations
/// should do as little work as possible and must never block indefinitely.
pub trait EventObserver: Send + Sync {
    /// Handles a single sampled event.
    fn on_event(&self, parameters: &[u64]);
}

impl<F> EventObserver for F
where
    F: Fn(&[u64]) + Send + Sync,
{
    fn on_event(&self, parameters: &[u64]) {
        self(parameters)
    }
}
