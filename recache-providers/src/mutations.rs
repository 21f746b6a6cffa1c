//! Pure list scans behind [`crate::ActionsList`].
//!
//! Every scan snapshots `count` once before iterating, so positional
//! predicates always see the length the list had when the call started.
//! None of these functions touch an engine; they take a list by value and
//! return the edited list.

/// Splice `elements` in at the first position in `0..=count` accepted by
/// `position`. Unchanged when no position matches.
pub fn insert_at<T, P>(mut items: Vec<T>, position: P, elements: Vec<T>) -> Vec<T>
where
    P: Fn(usize, usize) -> bool,
{
    let count = items.len();
    if let Some(at) = (0..=count).find(|&p| position(p, count)) {
        items.splice(at..at, elements);
    }
    items
}

/// Remove the first element accepted by `predicate`, if any.
pub fn remove_first<T, P>(mut items: Vec<T>, predicate: P) -> Vec<T>
where
    P: Fn(usize, usize, &T) -> bool,
{
    if let Some(at) = first_match(&items, &predicate) {
        items.remove(at);
    }
    items
}

/// Remove every element accepted by `predicate`, keeping survivor order.
pub fn remove_all<T, P>(items: Vec<T>, predicate: P) -> Vec<T>
where
    P: Fn(usize, usize, &T) -> bool,
{
    let count = items.len();
    let marks: Vec<bool> = items
        .iter()
        .enumerate()
        .map(|(position, element)| predicate(position, count, element))
        .collect();
    remove_marked(items, &marks)
}

/// Remove the elements whose mark is set. `marks` is indexed by position.
pub fn remove_marked<T>(items: Vec<T>, marks: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .zip(marks.iter().copied().chain(std::iter::repeat(false)))
        .filter_map(|(element, marked)| (!marked).then_some(element))
        .collect()
}

/// Accumulator for [`tail_window_marks`].
#[derive(Debug, Default)]
struct WindowScan {
    window_entered: bool,
    marks: Vec<bool>,
}

/// Mark the trailing window of width `min(n, count)`.
///
/// The window opens at the position where `count - position` equals the
/// width and stays open to the end of the list. Inside the window each
/// position is additionally gated by `gate(count)`.
pub fn tail_window_marks<T, G>(items: &[T], n: usize, gate: G) -> Vec<bool>
where
    G: Fn(usize) -> bool,
{
    let count = items.len();
    let width = n.min(count);

    items
        .iter()
        .enumerate()
        .fold(WindowScan::default(), |mut scan, (position, _)| {
            if !scan.window_entered {
                scan.window_entered = width > 0 && count - position == width;
            }
            scan.marks.push(scan.window_entered && gate(count));
            scan
        })
        .marks
}

/// Substitute the first element accepted by `predicate` with
/// `replace(element)`.
pub fn replace_first<T, P, R>(mut items: Vec<T>, predicate: P, replace: R) -> Vec<T>
where
    P: Fn(usize, usize, &T) -> bool,
    R: FnOnce(T) -> T,
{
    if let Some(at) = first_match(&items, &predicate) {
        let element = items.remove(at);
        items.insert(at, replace(element));
    }
    items
}

/// Substitute every element accepted by `predicate`.
pub fn replace_all<T, P, R>(items: Vec<T>, predicate: P, mut replace: R) -> Vec<T>
where
    P: Fn(usize, usize, &T) -> bool,
    R: FnMut(T) -> T,
{
    let count = items.len();
    items
        .into_iter()
        .enumerate()
        .map(|(position, element)| {
            if predicate(position, count, &element) {
                replace(element)
            } else {
                element
            }
        })
        .collect()
}

fn first_match<T, P>(items: &[T], predicate: &P) -> Option<usize>
where
    P: Fn(usize, usize, &T) -> bool,
{
    let count = items.len();
    items
        .iter()
        .enumerate()
        .position(|(position, element)| predicate(position, count, element))
}
