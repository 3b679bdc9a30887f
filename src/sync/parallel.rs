use std::thread;

/// Applies a pure function to each element concurrently, one worker per
/// element, preserving input order in the output regardless of completion
/// order. Blocks the calling thread until all workers finish.
pub fn parallel_map<T, U, F>(items: &[T], f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync,
{
    let f = &f;
    thread::scope(|scope| {
        let handles: Vec<_> = items
            .iter()
            .map(|item| scope.spawn(move || f(item)))
            .collect();
        // Joining in spawn order keeps results index-aligned with the input.
        handles
            .into_iter()
            .map(|handle| handle.join().expect("parallel worker panicked"))
            .collect()
    })
}

/// Maps each element concurrently, then folds the ordered results
/// sequentially into the accumulator. Returns the initial accumulator
/// unchanged on empty input.
pub fn parallel_reduce<T, U, A, F, R>(items: &[T], init: A, map: F, fold: R) -> A
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync,
    R: Fn(A, U) -> A,
{
    parallel_map(items, map).into_iter().fold(init, fold)
}
